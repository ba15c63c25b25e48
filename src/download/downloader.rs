//! Download orchestrator.
//!
//! Routes a URL to its marketplace flow, manages the browser session
//! lifecycle around the flow run, and converts every flow failure into a
//! logged `None` rather than letting it cross the component boundary.

use std::path::PathBuf;
use std::sync::Arc;

use crate::browser::BrowserEngine;
use crate::core::config::{AppConfig, SiteCredentials};
use crate::download::flow::Site;

/// Drives one scoped browser session per download.
///
/// Owns the marketplace credentials and the local download directory.
/// Sessions are never shared: each call launches its own browser and
/// releases it on success, flow failure and unexpected fault alike.
pub struct Downloader {
    engine: Arc<dyn BrowserEngine>,
    freepik: Option<SiteCredentials>,
    envato: Option<SiteCredentials>,
    download_dir: PathBuf,
}

impl Downloader {
    /// Creates a downloader from the injected configuration.
    pub fn new(engine: Arc<dyn BrowserEngine>, config: &AppConfig) -> Self {
        Self {
            engine,
            freepik: config.freepik.clone(),
            envato: config.envato.clone(),
            download_dir: config.download_dir.clone(),
        }
    }

    fn credentials_for(&self, site: Site) -> Option<&SiteCredentials> {
        match site {
            Site::Freepik => self.freepik.as_ref(),
            Site::Envato => self.envato.as_ref(),
        }
    }

    /// Downloads the asset behind `url` and returns the local file path.
    ///
    /// Unsupported URLs and unconfigured marketplaces return `None` without
    /// launching a browser or consulting credentials. Flow failures are
    /// logged with their subcategory and also return `None`; the caller is
    /// responsible for any user-facing message.
    pub async fn download_file(&self, url: &str) -> Option<PathBuf> {
        let Some(site) = Site::for_url(url) else {
            log::warn!("Unsupported URL: {}", url);
            return None;
        };
        let Some(credentials) = self.credentials_for(site) else {
            log::warn!("{} is not configured, skipping {}", site.name(), url);
            return None;
        };

        let mut session = match self.engine.launch(&self.download_dir).await {
            Ok(session) => session,
            Err(e) => {
                log::error!("[{}] Browser launch failed for {}: {}", e.subcategory(), url, e);
                return None;
            }
        };

        // The session is torn down on every path out of this scope.
        let result = site.run(session.as_ref(), url, credentials).await;
        session.close().await;

        match result {
            Ok(path) => {
                log::info!("Download finished: {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("[{}] Download of {} failed: {}", e.subcategory(), url, e);
                None
            }
        }
    }

    /// Connectivity self-test: runs the sign-in portion of the flow only.
    ///
    /// Returns `None` when the marketplace has no credentials configured
    /// (distinct from a failed login), `Some(bool)` otherwise.
    pub async fn test_login(&self, site: Site) -> Option<bool> {
        let credentials = self.credentials_for(site)?;

        let mut session = match self.engine.launch(&self.download_dir).await {
            Ok(session) => session,
            Err(e) => {
                log::error!("[{}] Browser launch failed for {} self-test: {}", e.subcategory(), site.name(), e);
                return Some(false);
            }
        };

        let result = site.login(session.as_ref(), credentials).await;
        session.close().await;

        match result {
            Ok(()) => Some(true),
            Err(e) => {
                log::warn!("{} login self-test failed: {}", site.name(), e);
                Some(false)
            }
        }
    }

    /// The shared local download directory.
    pub fn download_dir(&self) -> &PathBuf {
        &self.download_dir
    }
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("freepik_configured", &self.freepik.is_some())
            .field("envato_configured", &self.envato.is_some())
            .field("download_dir", &self.download_dir)
            .finish()
    }
}
