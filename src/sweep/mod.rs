// Sweep module
// Range iteration, trainer invocation, and the driver loop

mod driver;
mod range;
mod trainer;

pub use driver::{Driver, EpisodeFailure, SweepSummary};
pub use range::EpisodeRange;
pub use trainer::{TrainerCommand, TrainerOutcome};
