// ckpt-sweep - Checkpoint sweep driver
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ckpt_sweep::config::{load_config, write_default_config, SweepConfig};
use ckpt_sweep::sweep::{Driver, TrainerCommand};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "ckpt-sweep")]
#[command(about = "Replay saved training checkpoints through an external trainer", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a TOML config file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// First episode index (inclusive)
    #[arg(long)]
    start: Option<u64>,

    /// Last episode index (inclusive)
    #[arg(long)]
    stop: Option<u64>,

    /// Index increment between episodes
    #[arg(long)]
    step: Option<u64>,

    /// Pointer file rewritten before each trainer run
    #[arg(long = "pointer-file")]
    pointer_file: Option<PathBuf>,

    /// Environment name passed to the trainer as --env
    #[arg(long)]
    env: Option<String>,

    /// Trainer executable
    #[arg(long)]
    trainer: Option<String>,

    /// Failure policy: ignore, abort, or retry
    #[arg(long = "on-failure")]
    on_failure: Option<String>,

    /// Write a JSON sweep report to this path after the run
    #[arg(long = "report")]
    report: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Print the resolved plan without writing files or spawning anything
    Plan,
    /// Write a default ckpt-sweep.toml in the current directory
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    match args.command {
        Some(Command::Init) => run_init(),
        Some(Command::Plan) => {
            let config = resolve_config(&args)?;
            run_plan(&config)
        }
        None => {
            let config = resolve_config(&args)?;
            run_sweep(config, args.report).await
        }
    }
}

/// Load the config file and fold in CLI overrides.
fn resolve_config(args: &Args) -> Result<SweepConfig> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(start) = args.start {
        config.start = start;
    }
    if let Some(stop) = args.stop {
        config.stop = stop;
    }
    if let Some(step) = args.step {
        config.step = step;
    }
    if let Some(path) = &args.pointer_file {
        config.pointer_file = path.clone();
    }
    if let Some(env) = &args.env {
        config.trainer.env_name = env.clone();
    }
    if let Some(program) = &args.trainer {
        config.trainer.program = program.clone();
    }
    if let Some(policy) = &args.on_failure {
        config.on_failure = policy.parse()?;
    }

    config.validate()?;
    Ok(config)
}

async fn run_sweep(config: SweepConfig, report: Option<PathBuf>) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            eprintln!("Interrupt already pending; still waiting for the current trainer run");
        } else {
            eprintln!("Interrupt received; finishing the current trainer run, then stopping");
        }
    })
    .context("Failed to install interrupt handler")?;

    let driver = Driver::new(config, shutdown);
    let summary = driver.run().await?;

    if let Some(path) = report {
        summary.write_report(&path)?;
        tracing::info!(path = %path.display(), "Sweep report written");
    }

    if summary.interrupted {
        tracing::warn!(
            episodes_run = summary.episodes_run,
            "Sweep interrupted before completing the full range"
        );
    }

    Ok(())
}

fn run_plan(config: &SweepConfig) -> Result<()> {
    let range = config.range()?;

    println!("pointer file:      {}", config.pointer_file.display());
    println!("checkpoint prefix: {}", config.checkpoint_prefix);
    println!(
        "episodes:          {} ({}..={} step {})",
        range.count(),
        range.start(),
        range.stop(),
        range.step()
    );
    println!("on failure:        {}", config.on_failure);
    println!();

    for episode in range.iter() {
        let command = TrainerCommand::for_episode(&config.trainer, episode);
        println!("{}", command.display_line());
    }

    Ok(())
}

fn run_init() -> Result<()> {
    let path = Path::new("ckpt-sweep.toml");
    write_default_config(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn init_tracing() {
    // Diagnostics go to stderr; stdout carries only the per-episode index
    // lines and plan/init output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
