//! Terminal host for tic-tac-toe.
//!
//! Parses command-line arguments and configuration, then feeds typed lines
//! and loopback server events into a [`tictactoe_session::Coordinator`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod cli;
mod config;
mod input;

pub use app::{App, Step};
pub use cli::{Cli, Command};
pub use config::{ClientConfig, ConfigError, DEFAULT_CONFIG_PATH, LoopbackSettings};
pub use input::{HELP, Input};
