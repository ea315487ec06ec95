pub mod output;
pub mod progress;
pub mod prompt;
pub mod signals;

pub use output::{OutputFormatter, OutputMode};
pub use progress::{ProgressManager, StageProgress};
pub use signals::GracefulShutdown;
