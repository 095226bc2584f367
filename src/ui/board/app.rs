use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::error::Result;
use crate::service::TaskService;
use crate::store::TaskStore;

use super::board::{Board, BoardDefaults, Outcome};
use super::launcher::Launcher;
use super::view;

const EVENT_POLL_MS: u64 = 120;

pub struct BoardOptions {
    pub defaults: BoardDefaults,
    pub open_command: Option<String>,
}

pub fn run<S: TaskStore>(service: TaskService<S>, options: BoardOptions) -> Result<()> {
    let mut board = Board::load(service, options.defaults)?;
    let launcher = Launcher::new(options.open_command);
    let result = run_terminal(&mut board, &launcher);
    board.close();
    result
}

fn run_terminal<S: TaskStore>(board: &mut Board<S>, launcher: &Launcher) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, board, launcher);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<S: TaskStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    board: &mut Board<S>,
    launcher: &Launcher,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| view::render(frame, board))?;
            dirty = false;
        }

        if !event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match board.handle_key(key) {
                    Outcome::Continue => {}
                    Outcome::Quit => break,
                    Outcome::Open(url) => {
                        if let Err(err) = launcher.open(&url) {
                            tracing::warn!(url = %url, error = %err, "link open failed");
                            board.set_error(err.to_string());
                        }
                    }
                }
                dirty = true;
            }
            Event::Resize(_, _) => dirty = true,
            _ => {}
        }
    }
    Ok(())
}
