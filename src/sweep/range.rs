// Episode index range

use crate::config::ConfigError;

/// Closed arithmetic progression of episode indices:
/// start, start+step, ... while the index stays <= stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRange {
    start: u64,
    stop: u64,
    step: u64,
}

impl EpisodeRange {
    pub fn new(start: u64, stop: u64, step: u64) -> Result<Self, ConfigError> {
        if step == 0 {
            return Err(ConfigError::Validation("step must be > 0".into()));
        }
        if start > stop {
            return Err(ConfigError::Validation(format!(
                "start ({start}) must not exceed stop ({stop})"
            )));
        }
        Ok(Self { start, stop, step })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Number of indices in the progression.
    pub fn count(&self) -> u64 {
        (self.stop - self.start) / self.step + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> {
        (self.start..=self.stop).step_by(self.step as usize)
    }
}
