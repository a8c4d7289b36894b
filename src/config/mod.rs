// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{load_config, write_default_config};
pub use settings::{ConfigError, FailurePolicy, SweepConfig, TrainerConfig};
