//! pace - local task tracking library
//!
//! This library provides the core functionality for the pace CLI and its
//! Kanban board: tasks with dependencies, labels and priorities kept in a
//! local SQLite database.
//!
//! # Core Concepts
//!
//! - **Tasks**: titled work items with a status, type, priority and link
//! - **Dependencies**: "blocker blocks blocked" edges; cycles are tolerated
//! - **Ready tasks**: unfinished tasks whose blockers are all done
//! - **Filters and updates**: `key=value` tokens driving batch edits
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: File configuration from `config.toml`
//! - `error`: Error types and result aliases
//! - `storage`: Pace directory resolution
//! - `store` / `sqlite`: Storage contract and its SQLite implementation
//! - `task`: Task entity, validation and JSON shape
//! - `filter`: Filter and update expressions
//! - `graph`: Readiness and dependency trees
//! - `service` / `bulk`: Task operations and batch results
//! - `style`: Status, priority and type symbols
//! - `ui`: Interactive Kanban board

pub mod bulk;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod output;
pub mod service;
pub mod sqlite;
pub mod storage;
pub mod store;
pub mod style;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
