//! Browser session abstraction.
//!
//! Site flows and the downloader are written against the [`BrowserEngine`] /
//! [`BrowserSession`] traits rather than a concrete automation backend. The
//! production implementation drives Chrome over the DevTools protocol
//! ([`cdp::CdpEngine`]); tests substitute an in-memory session.
//!
//! A session holds login/cookie state specific to one flow run and is never
//! shared across jobs: the downloader acquires one session per call and
//! releases it on every exit path.

pub mod cdp;

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::download::error::DownloadError;

/// A UI element whose activation starts or confirms a file download.
///
/// Marketplaces change their markup frequently, so triggers are probed from
/// an ordered candidate list instead of relying on a single fixed selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Match by CSS selector
    Css(&'static str),
    /// Match a `<button>`/`<a>` by visible text content
    Text(&'static str),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Css(sel) => write!(f, "css:{}", sel),
            Trigger::Text(text) => write!(f, "text:{}", text),
        }
    }
}

/// One live browser page inside an isolated browsing context.
///
/// All waits are individually time-boxed by the caller-supplied durations;
/// exceeding a bound fails that step only.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate the page to `url`.
    async fn goto(&self, url: &str) -> Result<(), DownloadError>;

    /// Fill an input matched by `selector` with `value`.
    async fn fill(&self, selector: &str, value: &str) -> Result<(), DownloadError>;

    /// Click the element matched by `selector`.
    async fn click(&self, selector: &str) -> Result<(), DownloadError>;

    /// Click `selector` if it becomes visible within `timeout`.
    ///
    /// Absence is not an error; used for cookie-consent dialogs that may
    /// or may not appear. Returns whether a click happened.
    async fn try_click(&self, selector: &'static str, timeout: Duration) -> bool;

    /// Wait until the page reaches a settled state after a navigation or
    /// form submit, bounded by `timeout`.
    async fn wait_network_idle(&self, timeout: Duration) -> Result<(), DownloadError>;

    /// Whether the trigger currently matches a visible element.
    async fn is_visible(&self, trigger: &Trigger) -> bool;

    /// Click the element matched by `trigger` (selector or text match).
    async fn click_trigger(&self, trigger: &Trigger) -> Result<(), DownloadError>;

    /// Click `trigger` and await the browser-initiated download it starts,
    /// bounded by `timeout`. The file is persisted under the
    /// browser-suggested filename in the session's download directory.
    async fn download_via(
        &self,
        trigger: &Trigger,
        timeout: Duration,
    ) -> Result<PathBuf, DownloadError>;

    /// Tear the session down, closing the underlying browser.
    async fn close(&mut self);
}

/// Factory for scoped browser sessions, one per download job.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Launch a fresh browser session whose downloads land in `download_dir`.
    async fn launch(&self, download_dir: &Path) -> Result<Box<dyn BrowserSession>, DownloadError>;
}
