pub mod job;
pub mod progress;

pub use job::{BatchJob, FileTask};
pub use progress::{BatchSummary, ProgressEvent};
