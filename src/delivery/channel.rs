//! Direct delivery channel abstraction.
//!
//! The channel fully owns transmission semantics (chunking, size limits)
//! and reports only success or failure back to the resolver.

use async_trait::async_trait;
use std::path::Path;

use crate::core::error::AppResult;
use crate::download::queue::DownloadJob;

/// A channel the resolver can push a file through directly, e.g. replying
/// with the document in the requesting chat.
#[async_trait]
pub trait DirectChannel: Send + Sync {
    /// Transmit the file at `path` to the requester.
    async fn send(&self, path: &Path) -> AppResult<()>;
}

/// Produces the direct channel for a given job, if one applies.
///
/// Jobs submitted outside a chat context have no channel and skip the
/// direct route entirely.
pub trait ChannelFactory: Send + Sync {
    fn for_job(&self, job: &DownloadJob) -> Option<Box<dyn DirectChannel>>;
}
