//! ECHO GEN - collect voice samples and speak text in a cloned voice

mod app;
mod input_utils;
mod ledger;
mod session;
mod speech;
mod ui;
mod voice;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "echo-gen")]
#[command(about = "Collect voice samples and speak text in a cloned voice")]
#[command(version)]
struct Args {
    /// Path to the sample ledger (defaults to ~/Desktop/audio_samples.csv)
    #[arg(short, long)]
    ledger: Option<PathBuf>,

    /// Directory where recorded samples are written
    #[arg(short = 'd', long, default_value = ".")]
    samples_dir: PathBuf,

    /// Username to start the session with
    #[arg(short, long)]
    user: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn default_ledger_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    Ok(home.join("Desktop").join("audio_samples.csv"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let ledger = match args.ledger {
        Some(path) => path,
        None => default_ledger_path()?,
    };

    // Run the app
    let mut app = app::App::new(ledger, args.samples_dir, args.user)?;
    app.run().await
}
