//! Book Pricer
//!
//! Reads an add/reduce order feed, maintains both sides of the book and prints
//! the cost of buying and the proceeds of selling a target size whenever
//! either one changes.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use book_pricer::{Config, ConfigOverrides, FeedReader, FeedRunner, OutputFormat, Pricer, Publisher};

#[derive(Parser)]
#[command(name = "pricer")]
#[command(about = "Tracks the cost and proceeds of executing a target size against a limit order book")]
struct Cli {
    /// Target size in shares
    target_size: Option<u64>,

    /// Input feed file (defaults to standard input)
    input: Option<PathBuf>,

    /// Configuration file
    #[arg(long, env = "PRICER_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Abort on the first malformed line
    #[arg(long)]
    strict: bool,

    /// Report insufficient liquidity even before any value was computed
    #[arg(long)]
    emit_initial_insufficient: bool,
}

/// `RUST_LOG` when set and valid, otherwise `info`
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Stdout carries the emissions, logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&ConfigOverrides {
        config_file: cli.config,
        target_size: cli.target_size,
        input: cli.input,
        output_format: cli.format,
        strict: cli.strict,
        emit_initial_insufficient: cli.emit_initial_insufficient,
    })?;
    info!(config = ?config, "Configuration loaded");

    let pricer = Pricer::new(config.target_size)?
        .with_initial_insufficient(config.emit_initial_insufficient);
    let publisher = Publisher::new(tokio::io::stdout(), config.output_format);
    let mut runner = FeedRunner::new(pricer, publisher, config.strict);

    let mut reader = FeedReader::open(config.input.as_deref()).await?;
    if let Err(e) = runner.run(&mut reader).await {
        error!(error = %e, stats = ?runner.stats(), "Pricer stopped");
        return Err(e.into());
    }

    Ok(())
}
