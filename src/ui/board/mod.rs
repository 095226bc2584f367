pub mod app;
#[allow(clippy::module_inception)]
pub mod board;
pub mod form;
pub mod launcher;
pub mod view;
pub mod viewer;

pub use app::{run, BoardOptions};
pub use board::{Board, BoardDefaults, Outcome, Overlay};
