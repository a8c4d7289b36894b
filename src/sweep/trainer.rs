// External trainer invocation
//
// Builds one trainer command per episode and runs it to completion.

use anyhow::{Context, Result};
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Command;

use crate::config::TrainerConfig;
use crate::errors;

/// One trainer invocation for a specific episode index.
#[derive(Debug, Clone)]
pub struct TrainerCommand {
    program: String,
    args: Vec<String>,
}

impl TrainerCommand {
    /// Assemble the argv for an episode: fixed args first, then
    /// `--env <env_name> --save <episode>` with the index in plain decimal.
    pub fn for_episode(config: &TrainerConfig, episode: u64) -> Self {
        let mut args = config.args.clone();
        args.push("--env".to_string());
        args.push(config.env_name.clone());
        args.push("--save".to_string());
        args.push(episode.to_string());

        Self {
            program: config.program.clone(),
            args,
        }
    }

    /// Shell-style rendering for logs and dry runs.
    pub fn display_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Run the command, blocking until it exits.
    ///
    /// The child inherits the driver's stdout/stderr. A timeout of zero waits
    /// forever; otherwise the child is killed when the timeout expires.
    pub async fn run(&self, timeout_secs: u64) -> Result<TrainerOutcome> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        let mut child = cmd
            .spawn()
            .with_context(|| errors::trainer_not_found_error(&self.display_line()))?;

        if timeout_secs == 0 {
            let status = child
                .wait()
                .await
                .context("Failed to wait for trainer process")?;
            return Ok(TrainerOutcome::Exited(status));
        }

        match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await {
            Ok(status) => Ok(TrainerOutcome::Exited(
                status.context("Failed to wait for trainer process")?,
            )),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout_secs,
                    command = %self.display_line(),
                    "Trainer run exceeded timeout, killing it"
                );
                child
                    .kill()
                    .await
                    .context("Failed to kill timed-out trainer process")?;
                Ok(TrainerOutcome::TimedOut)
            }
        }
    }
}

/// Result of one trainer run.
#[derive(Debug, Clone, Copy)]
pub enum TrainerOutcome {
    Exited(ExitStatus),
    TimedOut,
}

impl TrainerOutcome {
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(status) if status.success())
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Exited(status) => status.to_string(),
            Self::TimedOut => "timed out".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trainer_config(program: &str, args: &[&str]) -> TrainerConfig {
        TrainerConfig {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env_name: "BreakoutNoFrameskip-v4".to_string(),
            timeout_secs: 0,
        }
    }

    #[test]
    fn test_display_line_matches_invocation_contract() {
        let config = trainer_config("python3", &["main.py"]);
        let command = TrainerCommand::for_episode(&config, 1000);
        assert_eq!(
            command.display_line(),
            "python3 main.py --env BreakoutNoFrameskip-v4 --save 1000"
        );
    }

    #[test]
    fn test_episode_index_is_last_argument() {
        let config = trainer_config("trainer", &[]);
        let command = TrainerCommand::for_episode(&config, 47000);
        assert_eq!(command.args.last().map(String::as_str), Some("47000"));
        assert_eq!(command.args, vec!["--env", "BreakoutNoFrameskip-v4", "--save", "47000"]);
    }

    #[tokio::test]
    async fn test_successful_run_reports_success() {
        let command = TrainerCommand {
            program: "true".to_string(),
            args: vec![],
        };
        let outcome = command.run(0).await.unwrap();
        assert!(outcome.success());
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_failure() {
        let command = TrainerCommand {
            program: "false".to_string(),
            args: vec![],
        };
        let outcome = command.run(0).await.unwrap();
        assert!(!outcome.success());
    }

    #[tokio::test]
    async fn test_missing_program_is_a_spawn_error() {
        let command = TrainerCommand {
            program: "ckpt-sweep-no-such-trainer".to_string(),
            args: vec![],
        };
        assert!(command.run(0).await.is_err());
    }

    #[tokio::test]
    async fn test_timeout_kills_hung_trainer() {
        let command = TrainerCommand {
            program: "sleep".to_string(),
            args: vec!["30".to_string()],
        };
        let outcome = command.run(1).await.unwrap();
        assert!(matches!(outcome, TrainerOutcome::TimedOut));
        assert!(!outcome.success());
        assert_eq!(outcome.describe(), "timed out");
    }
}
