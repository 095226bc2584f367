//! Command-line interface for pace
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is handled in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::service::TaskService;
use crate::sqlite::SqliteStore;
use crate::storage::Storage;

mod board;
mod config;
mod dep;
mod init;
mod task;

/// pace - local task tracker
///
/// Tasks with dependencies, labels and priorities, a filter/update
/// expression language for batch edits, and a Kanban board.
#[derive(Parser, Debug)]
#[command(name = "pace")]
#[command(author, version, long_about = None)]
#[command(about = "pace - local task tracker with dependencies, labels, priorities and a Kanban board")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Pace directory (defaults to the nearest .pace/ or the global one)
    #[arg(long, global = true, env = "PACE_DIR")]
    pub pace_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a project .pace/ directory in the current directory
    Init,

    /// Show the resolved pace directory and ID prefix
    Info,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Persisted settings (e.g. id_prefix)
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Open the interactive Kanban board
    #[command(visible_alias = "board")]
    Tui,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task, or many with --bulk
    Create {
        /// Task title
        #[arg(long)]
        title: Option<String>,

        /// Task description
        #[arg(long)]
        description: Option<String>,

        /// Status: todo, in-progress, done
        #[arg(long, default_value = "todo")]
        status: String,

        /// Type: task, bug, feature, chore, docs (config default when omitted)
        #[arg(long = "type")]
        task_type: Option<String>,

        /// Priority 1-4 (config default when omitted)
        #[arg(long)]
        priority: Option<String>,

        /// Label to attach (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Link for the task (https:// is added when no scheme is given)
        #[arg(long)]
        url: Option<String>,

        /// JSON array of tasks, or '-' to read it from stdin
        #[arg(long, conflicts_with = "title")]
        bulk: Option<String>,
    },

    /// Show one task
    Get {
        id: String,
    },

    /// List tasks sorted by priority
    List {
        /// Filter (status=X, type=X, priority=X, label=X; repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Include the symbol legend
        #[arg(long)]
        pretty: bool,
    },

    /// Update one task by ID, or every task matching --filter
    Update {
        id: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long = "type")]
        task_type: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        url: Option<String>,

        /// Label to add (repeatable)
        #[arg(long = "label")]
        add_labels: Vec<String>,

        /// Label to remove (repeatable)
        #[arg(long = "remove-label")]
        remove_labels: Vec<String>,

        /// Select tasks instead of an ID (repeatable)
        #[arg(long = "filter", conflicts_with = "id")]
        filters: Vec<String>,

        /// Field assignment for filtered updates (status=X, type=X, priority=X)
        #[arg(long = "set", requires = "filters")]
        sets: Vec<String>,

        /// Preview a filtered update without applying it
        #[arg(long, requires = "filters")]
        dry_run: bool,
    },

    /// Delete tasks by ID, or every task matching --filter
    Delete {
        ids: Vec<String>,

        #[arg(long = "filter", conflicts_with = "ids")]
        filters: Vec<String>,

        /// Preview a filtered delete without applying it
        #[arg(long)]
        dry_run: bool,
    },

    /// List tasks with no open blockers
    Ready {
        #[arg(long)]
        pretty: bool,
    },

    /// Case-insensitive search over titles and descriptions
    Search {
        query: String,
    },

    /// Blocking relationships
    #[command(subcommand)]
    Dep(DepCommands),

    /// Task labels
    #[command(subcommand)]
    Label(LabelCommands),
}

#[derive(Subcommand, Debug)]
pub enum DepCommands {
    /// Record that <blocker> blocks <blocked>
    Add { blocker: String, blocked: String },

    /// Remove a blocking relationship
    Remove { blocker: String, blocked: String },

    /// Show direct blockers and blockees
    List { id: String },

    /// Draw the dependency tree of a task
    Tree {
        id: String,

        /// up (blockers), down (blocks) or both
        #[arg(long)]
        direction: Option<String>,

        /// Only show tasks with this status
        #[arg(long)]
        status: Option<String>,

        /// Maximum depth to display
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
    },

    /// Make each task block the next: a blocks b, b blocks c, ...
    Chain {
        #[arg(required = true, num_args = 2..)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LabelCommands {
    Add { id: String, label: String },
    Remove { id: String, label: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    List,
}

/// Flags shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub pace_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

/// Resolved storage, file config and service for one command.
pub(crate) struct Context {
    pub storage: Storage,
    pub config: Config,
    pub service: TaskService<SqliteStore>,
}

pub(crate) fn load_context(global: &GlobalOptions) -> Result<Context> {
    let storage = Storage::resolve(global.pace_dir.as_deref())?;
    let config = storage.load_config()?;
    let service = TaskService::new(storage.open_store()?)?;
    Ok(Context {
        storage,
        config,
        service,
    })
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        let global = GlobalOptions {
            pace_dir: self.pace_dir,
            json: self.json,
            quiet: self.quiet,
        };
        match self.command {
            Commands::Init => init::run_init(global),
            Commands::Info => init::run_info(global),
            Commands::Tui => board::run(global),
            Commands::Config(cmd) => match cmd {
                ConfigCommands::Get { key } => config::run_get(global, key),
                ConfigCommands::Set { key, value } => config::run_set(global, key, value),
                ConfigCommands::Unset { key } => config::run_unset(global, key),
                ConfigCommands::List => config::run_list(global),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Create {
                    title,
                    description,
                    status,
                    task_type,
                    priority,
                    labels,
                    url,
                    bulk,
                } => task::run_create(task::CreateOptions {
                    title,
                    description,
                    status,
                    task_type,
                    priority,
                    labels,
                    url,
                    bulk,
                    global,
                }),
                TaskCommands::Get { id } => task::run_get(global, id),
                TaskCommands::List { filters, pretty } => task::run_list(task::ListOptions {
                    filters,
                    pretty,
                    global,
                }),
                TaskCommands::Update {
                    id,
                    title,
                    description,
                    status,
                    task_type,
                    priority,
                    url,
                    add_labels,
                    remove_labels,
                    filters,
                    sets,
                    dry_run,
                } => task::run_update(task::UpdateOptions {
                    id,
                    title,
                    description,
                    status,
                    task_type,
                    priority,
                    url,
                    add_labels,
                    remove_labels,
                    filters,
                    sets,
                    dry_run,
                    global,
                }),
                TaskCommands::Delete {
                    ids,
                    filters,
                    dry_run,
                } => task::run_delete(task::DeleteOptions {
                    ids,
                    filters,
                    dry_run,
                    global,
                }),
                TaskCommands::Ready { pretty } => task::run_ready(global, pretty),
                TaskCommands::Search { query } => task::run_search(global, query),
                TaskCommands::Label(cmd) => match cmd {
                    LabelCommands::Add { id, label } => task::run_label_add(global, id, label),
                    LabelCommands::Remove { id, label } => {
                        task::run_label_remove(global, id, label)
                    }
                },
                TaskCommands::Dep(cmd) => match cmd {
                    DepCommands::Add { blocker, blocked } => dep::run_add(global, blocker, blocked),
                    DepCommands::Remove { blocker, blocked } => {
                        dep::run_remove(global, blocker, blocked)
                    }
                    DepCommands::List { id } => dep::run_list(global, id),
                    DepCommands::Tree {
                        id,
                        direction,
                        status,
                        max_depth,
                    } => dep::run_tree(dep::TreeOptions {
                        id,
                        direction,
                        status,
                        max_depth,
                        global,
                    }),
                    DepCommands::Chain { ids } => dep::run_chain(global, ids),
                },
            },
        }
    }
}
