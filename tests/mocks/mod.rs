//! In-memory collaborators for pipeline tests.
//!
//! The mock browser session executes flows against a scripted page: a set
//! of "visible" triggers and a download filename that materializes as a
//! real file in the download directory, so file-lifecycle assertions run
//! against the actual filesystem.

#![allow(dead_code)] // Not every test binary uses every mock

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stockfetch::browser::{BrowserEngine, BrowserSession, Trigger};
use stockfetch::core::config::{AppConfig, SiteCredentials};
use stockfetch::core::error::{AppError, AppResult};
use stockfetch::delivery::channel::{ChannelFactory, DirectChannel};
use stockfetch::delivery::drive::{StorageClient, StoredFile};
use stockfetch::delivery::{DeliveryOutcome, DeliveryPolicy};
use stockfetch::download::error::DownloadError;
use stockfetch::download::queue::DownloadJob;
use stockfetch::download::worker::JobObserver;

/// Scripted page behavior shared by every session the engine launches.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    /// Display forms of triggers that count as visible (e.g.
    /// "css:button.download-button", "text:Download")
    pub visible: Vec<String>,
    /// Filename written into the download dir when a download fires;
    /// `None` makes `download_via` time out
    pub download_filename: Option<String>,
    /// Fail every navigation (simulates an unreachable marketplace)
    pub fail_navigation: bool,
}

impl PageScript {
    pub fn with_visible(triggers: &[&str]) -> Self {
        Self {
            visible: triggers.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn downloading(mut self, filename: &str) -> Self {
        self.download_filename = Some(filename.to_string());
        self
    }
}

/// Browser engine that hands out scripted sessions and counts launches.
pub struct MockEngine {
    pub script: PageScript,
    pub launches: AtomicUsize,
    pub ops: Arc<Mutex<Vec<String>>>,
}

impl MockEngine {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            launches: AtomicUsize::new(0),
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserEngine for MockEngine {
    async fn launch(&self, download_dir: &Path) -> Result<Box<dyn BrowserSession>, DownloadError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            script: self.script.clone(),
            ops: Arc::clone(&self.ops),
            download_dir: download_dir.to_path_buf(),
        }))
    }
}

pub struct MockSession {
    script: PageScript,
    ops: Arc<Mutex<Vec<String>>>,
    download_dir: PathBuf,
}

impl MockSession {
    fn record(&self, op: String) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn goto(&self, url: &str) -> Result<(), DownloadError> {
        self.record(format!("goto:{}", url));
        if self.script.fail_navigation {
            return Err(DownloadError::Navigation(format!("cannot reach {}", url)));
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, _value: &str) -> Result<(), DownloadError> {
        self.record(format!("fill:{}", selector));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), DownloadError> {
        self.record(format!("click:{}", selector));
        Ok(())
    }

    async fn try_click(&self, selector: &'static str, _timeout: Duration) -> bool {
        let visible = self.script.visible.contains(&format!("css:{}", selector));
        if visible {
            self.record(format!("try_click:{}", selector));
        }
        visible
    }

    async fn wait_network_idle(&self, _timeout: Duration) -> Result<(), DownloadError> {
        self.record("wait_network_idle".to_string());
        Ok(())
    }

    async fn is_visible(&self, trigger: &Trigger) -> bool {
        self.script.visible.contains(&trigger.to_string())
    }

    async fn click_trigger(&self, trigger: &Trigger) -> Result<(), DownloadError> {
        if self.is_visible(trigger).await {
            self.record(format!("click_trigger:{}", trigger));
            Ok(())
        } else {
            Err(DownloadError::TriggerNotFound(format!("{} not visible", trigger)))
        }
    }

    async fn download_via(
        &self,
        trigger: &Trigger,
        _timeout: Duration,
    ) -> Result<PathBuf, DownloadError> {
        self.record(format!("download_via:{}", trigger));
        let Some(ref filename) = self.script.download_filename else {
            return Err(DownloadError::Timeout("no download started".to_string()));
        };
        let path = self.download_dir.join(filename);
        std::fs::write(&path, b"mock asset bytes")
            .map_err(|e| DownloadError::Other(e.to_string()))?;
        Ok(path)
    }

    async fn close(&mut self) {
        self.record("close".to_string());
    }
}

/// Direct channel that records sends and can be scripted to fail.
pub struct MockChannel {
    pub fail: bool,
    pub sent: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockChannel {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl DirectChannel for MockChannel {
    async fn send(&self, path: &Path) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Anyhow(anyhow::anyhow!("channel unavailable")));
        }
        self.sent.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Factory wrapping a shared mock channel; hands it to every job.
pub struct MockChannelFactory {
    pub fail: bool,
    pub sent: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockChannelFactory {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ChannelFactory for MockChannelFactory {
    fn for_job(&self, _job: &DownloadJob) -> Option<Box<dyn DirectChannel>> {
        Some(Box::new(MockChannel {
            fail: self.fail,
            sent: Arc::clone(&self.sent),
        }))
    }
}

/// Storage client with scriptable reachability and upload failure.
pub struct MockStorage {
    pub configured: bool,
    pub reachable: bool,
    pub fail_upload: bool,
    pub uploads: Arc<Mutex<Vec<PathBuf>>>,
    pub public_ids: Arc<Mutex<Vec<String>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            configured: true,
            reachable: true,
            fail_upload: false,
            uploads: Arc::new(Mutex::new(Vec::new())),
            public_ids: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageClient for MockStorage {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn upload(&self, path: &Path) -> AppResult<StoredFile> {
        if self.fail_upload {
            return Err(AppError::Storage("quota exceeded".to_string()));
        }
        self.uploads.lock().unwrap().push(path.to_path_buf());
        Ok(StoredFile {
            id: "file-1".to_string(),
            web_view_link: "https://drive.google.com/file/d/file-1/view".to_string(),
        })
    }

    async fn set_public_readable(&self, file_id: &str) -> AppResult<()> {
        self.public_ids.lock().unwrap().push(file_id.to_string());
        Ok(())
    }

    async fn test_reachable(&self) -> bool {
        self.reachable
    }
}

/// Observer that records events as "kind:url" strings.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn terminal_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with("done:") || e.starts_with("error:"))
            .count()
    }
}

#[async_trait]
impl JobObserver for RecordingObserver {
    async fn on_started(&self, job: &DownloadJob) {
        self.events.lock().unwrap().push(format!("started:{}", job.url));
    }

    async fn on_done(&self, job: &DownloadJob, outcome: &DeliveryOutcome) {
        let tag = match outcome {
            DeliveryOutcome::SentViaChannel(_) => "sent",
            DeliveryOutcome::UploadedToStorage(_) => "uploaded",
            DeliveryOutcome::KeptLocal(_) => "kept",
            DeliveryOutcome::Failed => "failed",
        };
        self.events.lock().unwrap().push(format!("done:{}:{}", tag, job.url));
    }

    async fn on_error(&self, job: &DownloadJob, _message: &str) {
        self.events.lock().unwrap().push(format!("error:{}", job.url));
    }
}

/// AppConfig with both marketplaces configured and the given download dir.
pub fn test_config(download_dir: &Path) -> AppConfig {
    AppConfig {
        telegram_token: "test-token".to_string(),
        freepik: Some(SiteCredentials {
            email: "freepik@example.com".to_string(),
            password: "secret".to_string(),
        }),
        envato: Some(SiteCredentials {
            email: "envato@example.com".to_string(),
            password: "secret".to_string(),
        }),
        download_dir: download_dir.to_path_buf(),
        drive_folder_id: Some("folder-1".to_string()),
        drive_access_token: Some("token".to_string()),
        delivery_policy: DeliveryPolicy::default(),
    }
}
