// Checkpoint pointer file
//
// Two-line key/value text format that checkpoint-based trainers read to
// select the active snapshot (model_checkpoint_path / all_model_checkpoint_paths).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Record naming the active checkpoint.
///
/// The active name is always the first entry of `all_paths`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPointer {
    primary: String,
    all_paths: Vec<String>,
}

impl CheckpointPointer {
    /// Pointer selecting a single episode checkpoint, e.g. "episode_3000".
    pub fn for_episode(prefix: &str, episode: u64) -> Self {
        let name = format!("{prefix}{episode}");
        Self {
            primary: name.clone(),
            all_paths: vec![name],
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn all_paths(&self) -> &[String] {
        &self.all_paths
    }

    /// Render the on-disk form.
    ///
    /// First line newline-terminated, one all_model_checkpoint_paths line per
    /// known checkpoint, no trailing newline after the last line.
    pub fn render(&self) -> String {
        let mut out = format!("model_checkpoint_path: \"{}\"\n", self.primary);
        let lines: Vec<String> = self
            .all_paths
            .iter()
            .map(|p| format!("all_model_checkpoint_paths: \"{p}\""))
            .collect();
        out.push_str(&lines.join("\n"));
        out
    }

    /// Overwrite the pointer file with this record (truncate, never append).
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write checkpoint pointer: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_is_byte_exact() {
        let pointer = CheckpointPointer::for_episode("episode_", 3000);
        assert_eq!(
            pointer.render(),
            "model_checkpoint_path: \"episode_3000\"\nall_model_checkpoint_paths: \"episode_3000\""
        );
    }

    #[test]
    fn test_primary_is_first_of_all_paths() {
        let pointer = CheckpointPointer::for_episode("episode_", 1000);
        assert_eq!(pointer.primary(), "episode_1000");
        assert_eq!(pointer.all_paths().first().map(String::as_str), Some("episode_1000"));
        assert_eq!(pointer.all_paths().len(), 1);
    }

    #[test]
    fn test_index_is_plain_decimal() {
        let pointer = CheckpointPointer::for_episode("episode_", 1000);
        assert!(pointer.render().contains("episode_1000"));
        assert!(!pointer.render().contains("episode_01000"));
        assert!(!pointer.render().contains("+"));
    }

    #[test]
    fn test_write_fully_overwrites_previous_pointer() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("checkpoint");

        CheckpointPointer::for_episode("episode_", 1000)
            .write_to(&path)
            .unwrap();
        CheckpointPointer::for_episode("episode_", 2000)
            .write_to(&path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "model_checkpoint_path: \"episode_2000\"\nall_model_checkpoint_paths: \"episode_2000\""
        );
        assert!(!content.contains("1000"));
    }

    #[test]
    fn test_custom_prefix() {
        let pointer = CheckpointPointer::for_episode("step_", 500);
        assert_eq!(pointer.primary(), "step_500");
    }
}
