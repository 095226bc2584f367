use std::process::{Command, Stdio};
use std::thread;

use crate::error::{Error, Result};

/// Spawns the OS opener for task links without waiting for it.
#[derive(Debug, Clone, Default)]
pub struct Launcher {
    command: Option<String>,
}

impl Launcher {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    pub fn open(&self, url: &str) -> Result<()> {
        let parts = self.command_parts();
        let Some((program, args)) = parts.split_first() else {
            return Err(Error::OperationFailed("no link opener configured".to_string()));
        };
        let mut child = Command::new(program)
            .args(args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| Error::OperationFailed(format!("failed to launch '{program}': {err}")))?;
        tracing::info!(program = %program, url = %url, "opened link");

        // Reap the opener off the UI thread.
        thread::spawn(move || {
            if let Err(err) = child.wait() {
                tracing::warn!(error = %err, "link opener did not exit cleanly");
            }
        });
        Ok(())
    }

    fn command_parts(&self) -> Vec<String> {
        match self.command.as_deref() {
            Some(value) => value.split_whitespace().map(str::to_string).collect(),
            None => platform_opener(std::env::consts::OS),
        }
    }
}

/// Default opener per OS. None of these pass the URL through a shell, so
/// query characters such as `&` or `|` stay part of the argument.
fn platform_opener(os: &str) -> Vec<String> {
    let parts: &[&str] = match os {
        "macos" => &["open"],
        "windows" => &["rundll32", "url.dll,FileProtocolHandler"],
        _ => &["xdg-open"],
    };
    parts.iter().map(|part| part.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_is_split_on_whitespace() {
        let launcher = Launcher::new(Some("firefox --new-tab".to_string()));
        assert_eq!(launcher.command_parts(), vec!["firefox", "--new-tab"]);
    }

    #[test]
    fn windows_opener_avoids_the_shell() {
        let parts = platform_opener("windows");
        assert_eq!(parts, vec!["rundll32", "url.dll,FileProtocolHandler"]);
        assert!(!parts.iter().any(|part| part.eq_ignore_ascii_case("cmd")));
    }

    #[test]
    fn default_openers_per_os() {
        assert_eq!(platform_opener("macos"), vec!["open"]);
        assert_eq!(platform_opener("linux"), vec!["xdg-open"]);
        assert_eq!(platform_opener("freebsd"), vec!["xdg-open"]);
    }

    #[cfg(unix)]
    #[test]
    fn spawned_opener_is_reaped() {
        let launcher = Launcher::new(Some("true".to_string()));
        launcher.open("https://example.com/?a=1&b=2").expect("open");
    }

    #[test]
    fn blank_override_is_an_error() {
        let launcher = Launcher::new(Some("   ".to_string()));
        assert!(launcher.open("https://example.com").is_err());
    }
}
