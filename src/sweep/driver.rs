// Driver loop
//
// One pass over the episode range: rewrite the pointer file, run the
// trainer to completion, record the outcome, move on.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{FailurePolicy, SweepConfig};
use crate::errors;
use crate::pointer::CheckpointPointer;
use crate::sweep::trainer::TrainerCommand;

/// Per-episode failure record.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeFailure {
    pub episode: u64,
    pub status: String,
}

/// Outcome of a whole sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub episodes_run: u64,
    pub failures: Vec<EpisodeFailure>,
    pub interrupted: bool,
}

impl SweepSummary {
    /// Write the summary as pretty JSON.
    pub fn write_report(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize sweep report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write sweep report: {}", path.display()))?;
        Ok(())
    }
}

/// Runs the sweep: strictly sequential, one trainer process at a time.
pub struct Driver {
    config: SweepConfig,
    shutdown: Arc<AtomicBool>,
}

impl Driver {
    /// Create a driver. The shutdown flag is polled between episodes; the
    /// current trainer run is always allowed to finish.
    pub fn new(config: SweepConfig, shutdown: Arc<AtomicBool>) -> Self {
        Self { config, shutdown }
    }

    /// Run the sweep to completion (or until interrupted).
    pub async fn run(&self) -> Result<SweepSummary> {
        let range = self.config.range()?;

        if let Some(parent) = self.config.pointer_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create pointer directory: {}", parent.display())
                })?;
            }
        }

        // Held for the whole run; released when the file handle drops.
        let _lock = self.acquire_lock()?;

        let started_at = Utc::now();
        let mut episodes_run = 0u64;
        let mut failures = Vec::new();
        let mut interrupted = false;

        tracing::info!(
            start = range.start(),
            stop = range.stop(),
            step = range.step(),
            episodes = range.count(),
            pointer_file = %self.config.pointer_file.display(),
            "Starting checkpoint sweep"
        );

        for episode in range.iter() {
            if self.shutdown.load(Ordering::SeqCst) {
                tracing::info!(episode = episode, "Interrupt received, stopping sweep");
                interrupted = true;
                break;
            }

            let pointer =
                CheckpointPointer::for_episode(&self.config.checkpoint_prefix, episode);
            pointer.write_to(&self.config.pointer_file)?;

            if let Some(failure) = self.run_trainer(episode).await? {
                if self.config.on_failure == FailurePolicy::Abort {
                    bail!(
                        "Trainer failed at episode {} ({}); aborting sweep",
                        failure.episode,
                        failure.status
                    );
                }
                failures.push(failure);
            }

            episodes_run += 1;
            println!("{episode}");
        }

        let summary = SweepSummary {
            started_at,
            finished_at: Utc::now(),
            episodes_run,
            failures,
            interrupted,
        };

        tracing::info!(
            episodes_run = summary.episodes_run,
            failures = summary.failures.len(),
            interrupted = summary.interrupted,
            "Checkpoint sweep finished"
        );

        Ok(summary)
    }

    /// Run the trainer for one episode, applying the retry policy.
    ///
    /// Returns Some(failure) if the episode ultimately failed. Spawn errors
    /// are fatal regardless of policy: no later episode can succeed either.
    async fn run_trainer(&self, episode: u64) -> Result<Option<EpisodeFailure>> {
        let command = TrainerCommand::for_episode(&self.config.trainer, episode);
        let max_attempts = match self.config.on_failure {
            FailurePolicy::Retry => u64::from(self.config.retry_attempts) + 1,
            _ => 1,
        };

        let mut attempt = 0u64;
        loop {
            attempt += 1;
            tracing::debug!(
                episode = episode,
                attempt = attempt,
                command = %command.display_line(),
                "Invoking trainer"
            );

            let outcome = command.run(self.config.trainer.timeout_secs).await?;
            if outcome.success() {
                tracing::info!(episode = episode, "Trainer run completed");
                return Ok(None);
            }

            tracing::warn!(
                episode = episode,
                attempt = attempt,
                max_attempts = max_attempts,
                status = %outcome.describe(),
                "Trainer run failed"
            );

            if attempt >= max_attempts {
                return Ok(Some(EpisodeFailure {
                    episode,
                    status: outcome.describe(),
                }));
            }
        }
    }

    /// Take an exclusive advisory lock next to the pointer file so two
    /// sweeps never drive the same checkpoint slot.
    fn acquire_lock(&self) -> Result<File> {
        let lock_path = lock_path_for(&self.config.pointer_file);
        let lock_file = File::create(&lock_path)
            .with_context(|| format!("Failed to create sweep lock: {}", lock_path.display()))?;

        if lock_file.try_lock_exclusive().is_err() {
            bail!(errors::sweep_lock_held_error(&lock_path));
        }

        Ok(lock_file)
    }
}

fn lock_path_for(pointer_file: &Path) -> PathBuf {
    let mut name = pointer_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "checkpoint".into());
    name.push(".lock");
    pointer_file.with_file_name(name)
}
