// Configuration loader
// Resolves the sweep configuration from a TOML file, falling back to defaults

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use super::settings::SweepConfig;

/// Per-project config file searched in the working directory.
const PROJECT_CONFIG: &str = "ckpt-sweep.toml";

/// Load configuration, trying in order: an explicit path (missing file is an
/// error), ./ckpt-sweep.toml, ~/.ckpt-sweep/config.toml, built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<SweepConfig> {
    if let Some(path) = explicit {
        return read_config_file(path);
    }

    let project = Path::new(PROJECT_CONFIG);
    if project.exists() {
        return read_config_file(project);
    }

    if let Some(home) = dirs::home_dir() {
        let user = home.join(".ckpt-sweep").join("config.toml");
        if user.exists() {
            return read_config_file(&user);
        }
    }

    tracing::debug!("No config file found, using built-in defaults");
    Ok(SweepConfig::default())
}

fn read_config_file(path: &Path) -> Result<SweepConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: SweepConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Loaded sweep config");
    Ok(config)
}

/// Write a commented default config to the given path.
///
/// Refuses to overwrite an existing file.
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Refusing to overwrite existing config: {}", path.display());
    }

    fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

const DEFAULT_CONFIG_TOML: &str = r#"# ckpt-sweep configuration

# Episode range (inclusive bounds, fixed step)
start = 1000
stop = 47000
step = 1000

# Pointer file rewritten before each trainer run
pointer_file = "checkpoint"

# Checkpoint name prefix; episode 1000 becomes "episode_1000"
checkpoint_prefix = "episode_"

# ignore | abort | retry
on_failure = "ignore"
retry_attempts = 2

[trainer]
program = "python3"
args = ["main.py"]
env_name = "BreakoutNoFrameskip-v4"
# Kill a trainer run after this many seconds (0 = no timeout)
timeout_secs = 0
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sweep.toml");
        fs::write(&path, "stop = 3000\n\n[trainer]\nenv_name = \"PongNoFrameskip-v4\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.start, 1000);
        assert_eq!(config.stop, 3000);
        assert_eq!(config.trainer.env_name, "PongNoFrameskip-v4");
        assert_eq!(config.trainer.program, "python3");
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.toml");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "start = \"not a number\"").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_default_template_parses_and_validates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ckpt-sweep.toml");
        write_default_config(&path).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.on_failure, FailurePolicy::Ignore);
        assert_eq!(config.range().unwrap().count(), 47);
    }

    #[test]
    fn test_write_default_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ckpt-sweep.toml");
        write_default_config(&path).unwrap();
        assert!(write_default_config(&path).is_err());
    }
}
