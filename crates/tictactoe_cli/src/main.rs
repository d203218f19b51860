//! tictactoe - terminal client
//!
//! Plays locally or against the in-process loopback game server.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use tictactoe_cli::{App, Cli, ClientConfig, HELP, Step};
use tictactoe_session::{LoopbackTransport, TokioScheduler};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::load(cli.config.as_deref())?;
    let (scheduler, mut events) = TokioScheduler::spawn();
    let transport = LoopbackTransport::new(scheduler, config.loopback().to_loopback_config());
    let mut app = App::new(transport);

    info!(command = ?cli.command, "Starting tictactoe");
    print(vec![HELP.to_string()]);
    print(app.start(&cli.command));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match app.handle_line(&line) {
                    Step::Continue(out) => print(out),
                    Step::Quit => break,
                },
                None => break,
            },
            event = events.recv() => match event {
                Some(event) => print(app.handle_event(event)),
                None => {
                    warn!("Event channel closed");
                    break;
                }
            },
        }
    }

    info!("Goodbye");
    Ok(())
}

fn print(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
