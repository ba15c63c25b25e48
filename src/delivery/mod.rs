//! Delivery of downloaded files to their requester.
//!
//! Given a local file, the [`DeliveryResolver`] walks a configurable ordered
//! policy of routes (direct chat channel, cloud storage) and executes the
//! first one that succeeds, deleting the local copy only after that first
//! success and never on failure: a failed job's file stays on disk for
//! diagnosis and manual recovery.

pub mod channel;
pub mod drive;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::error::AppResult;
use crate::delivery::channel::DirectChannel;
use crate::delivery::drive::StorageClient;

/// Terminal value returned to the original caller for each job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// File was sent through the direct channel; local copy deleted
    SentViaChannel(PathBuf),
    /// File was uploaded to cloud storage; local copy deleted, shareable
    /// link returned
    UploadedToStorage(String),
    /// No delivery path applied; file retained at the given path
    KeptLocal(PathBuf),
    /// An applicable delivery path failed; file retained
    Failed,
}

/// One delivery route the resolver may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryRoute {
    /// Send through the job's direct chat channel (best-effort)
    Direct,
    /// Upload to cloud storage and share a link
    Storage,
}

/// Ordered delivery routes.
///
/// Whether direct delivery is attempted before the cloud upload is
/// configuration (`DELIVERY_POLICY`), not a hard-coded order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPolicy {
    routes: Vec<DeliveryRoute>,
}

impl Default for DeliveryPolicy {
    /// Direct chat first, cloud storage as the fallback.
    fn default() -> Self {
        Self {
            routes: vec![DeliveryRoute::Direct, DeliveryRoute::Storage],
        }
    }
}

impl DeliveryPolicy {
    /// Parses a comma-separated route list, e.g. `"storage,direct"`.
    /// Unknown or empty input falls back to the default order.
    pub fn parse(value: &str) -> Self {
        let routes: Vec<DeliveryRoute> = value
            .split(',')
            .filter_map(|part| match part.trim().to_ascii_lowercase().as_str() {
                "direct" => Some(DeliveryRoute::Direct),
                "storage" => Some(DeliveryRoute::Storage),
                _ => None,
            })
            .collect();
        if routes.is_empty() {
            Self::default()
        } else {
            Self { routes }
        }
    }

    pub fn routes(&self) -> &[DeliveryRoute] {
        &self.routes
    }
}

impl fmt::Display for DeliveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .routes
            .iter()
            .map(|r| match r {
                DeliveryRoute::Direct => "direct",
                DeliveryRoute::Storage => "storage",
            })
            .collect();
        write!(f, "{}", names.join(","))
    }
}

/// Decides and executes delivery for one downloaded file.
pub struct DeliveryResolver {
    storage: Option<Arc<dyn StorageClient>>,
    policy: DeliveryPolicy,
}

impl DeliveryResolver {
    pub fn new(storage: Option<Arc<dyn StorageClient>>, policy: DeliveryPolicy) -> Self {
        Self { storage, policy }
    }

    /// Delivers `path`, walking the policy routes in order.
    ///
    /// Any unexpected fault is caught here and converted to
    /// [`DeliveryOutcome::Failed`]; this never propagates an error to the
    /// caller.
    pub async fn deliver(
        &self,
        path: &Path,
        direct: Option<&dyn DirectChannel>,
    ) -> DeliveryOutcome {
        match self.try_deliver(path, direct).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Delivery of {} failed unexpectedly: {}", path.display(), e);
                DeliveryOutcome::Failed
            }
        }
    }

    async fn try_deliver(
        &self,
        path: &Path,
        direct: Option<&dyn DirectChannel>,
    ) -> AppResult<DeliveryOutcome> {
        let mut storage_failed = false;

        for route in self.policy.routes() {
            match route {
                DeliveryRoute::Direct => {
                    let Some(channel) = direct else { continue };
                    match channel.send(path).await {
                        Ok(()) => {
                            log::info!("File sent via direct channel: {}", path.display());
                            remove_local(path);
                            return Ok(DeliveryOutcome::SentViaChannel(path.to_path_buf()));
                        }
                        Err(e) => {
                            // Direct delivery is best-effort, not
                            // authoritative: fall through to the next route.
                            log::warn!(
                                "Direct channel send failed for {}: {}, trying next route",
                                path.display(),
                                e
                            );
                        }
                    }
                }
                DeliveryRoute::Storage => {
                    let Some(storage) = &self.storage else { continue };
                    if !storage.is_configured() {
                        log::debug!("Storage has no target folder, skipping route");
                        continue;
                    }
                    if !storage.test_reachable().await {
                        log::warn!("Storage not reachable, skipping route");
                        continue;
                    }
                    match storage.upload(path).await {
                        Ok(stored) => {
                            // The upload itself reported success, so the
                            // local copy goes away even if the permission
                            // change below fails.
                            remove_local(path);
                            if let Err(e) = storage.set_public_readable(&stored.id).await {
                                log::warn!(
                                    "Sharing policy update failed for {}: {}, link may not be public",
                                    stored.id,
                                    e
                                );
                            }
                            log::info!("File uploaded to storage: {}", stored.web_view_link);
                            return Ok(DeliveryOutcome::UploadedToStorage(stored.web_view_link));
                        }
                        Err(e) => {
                            log::error!("Storage upload of {} failed: {}", path.display(), e);
                            storage_failed = true;
                        }
                    }
                }
            }
        }

        if storage_failed {
            // Storage was applicable and failed: this is a failed job, not a
            // silent local retention.
            Ok(DeliveryOutcome::Failed)
        } else {
            log::warn!(
                "No delivery channel configured or available for {}; keeping the file locally",
                path.display()
            );
            Ok(DeliveryOutcome::KeptLocal(path.to_path_buf()))
        }
    }
}

/// Removes the delivered file. A failure here is logged, not fatal: the
/// delivery itself already succeeded.
fn remove_local(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::info!("Local file removed after delivery: {}", path.display()),
        Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
    }
}
