//! pace tui command implementation.

use crate::cli::{load_context, GlobalOptions};
use crate::error::Result;
use crate::ui::board::{self, BoardDefaults, BoardOptions};

pub fn run(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global)?;
    let options = BoardOptions {
        defaults: BoardDefaults {
            task_type: ctx.config.tasks.task_type()?,
            priority: ctx.config.tasks.default_priority,
        },
        open_command: ctx.config.board.open_command.clone(),
    };
    tracing::debug!(pace_dir = %ctx.storage.root().display(), "starting board");
    board::run(ctx.service, options)
}
