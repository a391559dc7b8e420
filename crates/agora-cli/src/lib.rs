//! Agora CLI library
//!
//! Argument definitions, the dataset-backed context and command handlers.
//! `main.rs` only parses arguments, sets up logging and prints results.

pub mod commands;
pub mod context;
pub mod handlers;

pub use commands::{Cli, Commands, StoryCommand};
pub use context::CliContext;
pub use handlers::CliHandler;
