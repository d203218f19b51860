//! Command-line interface for tictactoe.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe - play locally or against the loopback game server
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(about = "Tic-tac-toe in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (defaults to tictactoe.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How to play
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Both marks on this terminal
    Local,

    /// Create a networked game and play X
    Host,

    /// Join a networked game and play O
    Join {
        /// Game id shared by the host
        game_id: String,
    },
}
