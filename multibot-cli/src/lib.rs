//! # multibot-cli
//!
//! Command-line foundation: argument parsing, config loading and wiring of the handlers into
//! the dispatcher.

pub mod cli;

pub use cli::{build_multi_bot, load_config, Cli, Commands, RunArgs, DEFAULT_DATABASE_URL};
