// Configuration structs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::sweep::EpisodeRange;

/// Top-level sweep configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// First episode index (inclusive)
    pub start: u64,

    /// Last episode index (inclusive)
    pub stop: u64,

    /// Index increment between episodes
    pub step: u64,

    /// Pointer file rewritten before each trainer run
    pub pointer_file: PathBuf,

    /// Checkpoint name prefix; episode 1000 becomes "episode_1000"
    pub checkpoint_prefix: String,

    /// What to do when a trainer run exits non-zero or times out
    pub on_failure: FailurePolicy,

    /// Extra attempts per episode when on_failure = "retry"
    pub retry_attempts: u32,

    /// External trainer invocation settings
    pub trainer: TrainerConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start: 1000,
            stop: 47000,
            step: 1000,
            pointer_file: PathBuf::from("checkpoint"),
            checkpoint_prefix: "episode_".to_string(),
            on_failure: FailurePolicy::Ignore,
            retry_attempts: 2,
            trainer: TrainerConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Episode range described by start/stop/step.
    pub fn range(&self) -> Result<EpisodeRange, ConfigError> {
        EpisodeRange::new(self.start, self.stop, self.step)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.range()?;
        if self.trainer.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "trainer.program must not be empty".into(),
            ));
        }
        if self.checkpoint_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "checkpoint_prefix must not be empty".into(),
            ));
        }
        if self.pointer_file.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "pointer_file must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// External trainer invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Executable run once per episode
    pub program: String,

    /// Fixed arguments placed before --env/--save
    pub args: Vec<String>,

    /// Value passed to the trainer as --env
    pub env_name: String,

    /// Kill a trainer run after this many seconds (0 = wait forever)
    pub timeout_secs: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["main.py".to_string()],
            env_name: "BreakoutNoFrameskip-v4".to_string(),
            timeout_secs: 0,
        }
    }
}

/// Policy applied when a trainer run fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and continue with the next episode
    Ignore,
    /// Stop the sweep immediately
    Abort,
    /// Re-run the episode up to retry_attempts more times, then continue
    Retry,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ignore => "ignore",
            Self::Abort => "abort",
            Self::Retry => "retry",
        };
        f.write_str(name)
    }
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(Self::Ignore),
            "abort" => Ok(Self::Abort),
            "retry" => Ok(Self::Retry),
            other => Err(ConfigError::Validation(format!(
                "unknown on_failure policy '{other}' (expected ignore, abort, or retry)"
            ))),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Validation(String),
}
