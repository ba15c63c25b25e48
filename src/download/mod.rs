//! Download orchestration: site flows, downloader, job queue and worker

pub mod downloader;
pub mod error;
pub mod flow;
pub mod queue;
pub mod worker;

// Re-exports for convenience
pub use downloader::Downloader;
pub use error::DownloadError;
pub use flow::Site;
pub use queue::{DownloadJob, JobQueue, JobState};
pub use worker::{JobObserver, Worker};
