use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toastline_core::Strategy;
use tracing_subscriber::EnvFilter;

mod demo;
mod replay;
mod script;

#[derive(Parser)]
#[command(name = "toastline")]
#[command(about = "Drive a toastline queue from a script or in real time", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON script on a manual clock
    Replay {
        /// Path to the script
        script: PathBuf,
        /// Print one JSON object per step instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show sample toasts flowing through the queue in real time
    Demo {
        /// Ordering strategy
        #[arg(long, value_enum, default_value_t = Strategy::Priority)]
        strategy: Strategy,
        #[arg(long, default_value_t = 3)]
        max_toasts: usize,
        /// Number of toasts to add
        #[arg(long, default_value_t = 6)]
        count: usize,
        /// Delay between toasts
        #[arg(long, default_value_t = 400)]
        interval_ms: u64,
        /// Lifetime of each toast
        #[arg(long, default_value_t = 1500)]
        duration_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { script: path, json } => {
            let parsed = script::load(&path)?;
            if parsed.steps.is_empty() {
                bail!("{} has no steps", path.display());
            }
            let reports = replay::run(&parsed)?;
            for report in &reports {
                if json {
                    println!("{}", serde_json::to_string(report)?);
                } else {
                    print!("{}", replay::render(report));
                }
            }
        }
        Commands::Demo {
            strategy,
            max_toasts,
            count,
            interval_ms,
            duration_ms,
        } => {
            demo::run(demo::DemoOptions {
                strategy,
                max_toasts,
                count,
                interval_ms,
                duration_ms,
            })
            .await?;
        }
    }

    Ok(())
}
