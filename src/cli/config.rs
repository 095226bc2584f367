//! pace config command implementations.

use serde::Serialize;

use crate::cli::{load_context, GlobalOptions};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::store::TaskStore;

#[derive(Serialize)]
struct ConfigEntry {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

#[derive(Serialize)]
struct ConfigListOutput {
    entries: Vec<ConfigEntry>,
    count: usize,
}

pub fn run_get(global: GlobalOptions, key: String) -> Result<()> {
    let ctx = load_context(&global)?;
    let value = ctx.service.store().get_config(&key)?;
    let human = HumanOutput::new(format!("{key} = {value}"));
    emit_success(
        global.output(),
        "config get",
        &ConfigEntry {
            key,
            value: Some(value),
        },
        Some(&human),
    )
}

pub fn run_set(global: GlobalOptions, key: String, value: String) -> Result<()> {
    let ctx = load_context(&global)?;
    ctx.service.store().set_config(&key, &value)?;
    tracing::info!(key = %key, "config value set");
    let human = HumanOutput::new(format!("pace config set: {key} = {value}"));
    emit_success(
        global.output(),
        "config set",
        &ConfigEntry {
            key,
            value: Some(value),
        },
        Some(&human),
    )
}

pub fn run_unset(global: GlobalOptions, key: String) -> Result<()> {
    let ctx = load_context(&global)?;
    ctx.service.store().unset_config(&key)?;
    let human = HumanOutput::new(format!("pace config unset: removed {key}"));
    emit_success(
        global.output(),
        "config unset",
        &ConfigEntry { key, value: None },
        Some(&human),
    )
}

pub fn run_list(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global)?;
    let entries: Vec<ConfigEntry> = ctx
        .service
        .store()
        .all_config()?
        .into_iter()
        .map(|(key, value)| ConfigEntry {
            key,
            value: Some(value),
        })
        .collect();

    let mut human = HumanOutput::new("Config");
    for entry in &entries {
        human.push_line(format!(
            "{} = {}",
            entry.key,
            entry.value.as_deref().unwrap_or_default()
        ));
    }
    if entries.is_empty() {
        human.push_line("(no entries)");
    }
    let count = entries.len();
    emit_success(
        global.output(),
        "config list",
        &ConfigListOutput { entries, count },
        Some(&human),
    )
}
