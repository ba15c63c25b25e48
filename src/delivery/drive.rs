//! Google Drive storage collaborator.
//!
//! Implements the three operations the delivery resolver needs against the
//! Drive v3 REST API: multipart upload into the target folder, flipping the
//! file to "anyone with the link may view", and a reachability probe.
//! Authentication is the deployment's concern; the client consumes a
//! bearer access token from configuration.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

use crate::core::config::AppConfig;
use crate::core::error::{AppError, AppResult};

const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

/// Upload result handed back to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage-side file id (used for the permission change)
    pub id: String,
    /// Shareable link for the requester
    pub web_view_link: String,
}

/// The storage operations the delivery resolver depends on.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Whether a target folder is configured; without one the storage
    /// route is skipped entirely.
    fn is_configured(&self) -> bool;

    /// Upload the file into the target folder and return its id and link.
    async fn upload(&self, path: &Path) -> AppResult<StoredFile>;

    /// Make the file readable by anyone with the link.
    async fn set_public_readable(&self, file_id: &str) -> AppResult<()>;

    /// Probe whether the service (and the target folder, if set) is
    /// reachable with the current token.
    async fn test_reachable(&self) -> bool;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    web_view_link: Option<String>,
}

/// Google Drive v3 client over plain REST.
pub struct DriveClient {
    http: reqwest::Client,
    access_token: String,
    folder_id: Option<String>,
}

impl DriveClient {
    /// Builds the client when an access token is configured; `None`
    /// disables the storage route altogether.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let access_token = config.drive_access_token.clone()?;
        Some(Self {
            http: reqwest::Client::new(),
            access_token,
            folder_id: config.drive_folder_id.clone(),
        })
    }
}

#[async_trait]
impl StorageClient for DriveClient {
    fn is_configured(&self) -> bool {
        self.folder_id.is_some()
    }

    async fn upload(&self, path: &Path) -> AppResult<StoredFile> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::Storage(format!("invalid file name: {}", path.display())))?;
        let bytes = tokio::fs::read(path).await?;

        let metadata = serde_json::json!({
            "name": file_name,
            "parents": self.folder_id.as_ref().map(|id| vec![id.clone()]).unwrap_or_default(),
        });

        // Drive's multipart upload wants multipart/related (metadata part +
        // media part), which reqwest's Form type does not produce, so the
        // body is assembled by hand.
        let boundary = "stockfetch_drive_upload";
        let mut body = Vec::with_capacity(bytes.len() + 512);
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Type: application/octet-stream\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let response = self
            .http
            .post(format!(
                "{DRIVE_UPLOAD_URL}?uploadType=multipart&fields=id,webViewLink"
            ))
            .bearer_auth(&self.access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }

        let file: DriveFile = response.json().await?;
        log::info!("Uploaded {} to Drive as {}", file_name, file.id);
        Ok(StoredFile {
            web_view_link: file
                .web_view_link
                .ok_or_else(|| AppError::Storage("upload response had no webViewLink".to_string()))?,
            id: file.id,
        })
    }

    async fn set_public_readable(&self, file_id: &str) -> AppResult<()> {
        let response = self
            .http
            .post(format!("{DRIVE_API_URL}/files/{file_id}/permissions"))
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "type": "anyone", "role": "reader" }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }
        Ok(())
    }

    async fn test_reachable(&self) -> bool {
        let url = match &self.folder_id {
            Some(folder) => format!("{DRIVE_API_URL}/files/{folder}?fields=id"),
            None => format!("{DRIVE_API_URL}/files?pageSize=1&fields=files(id)"),
        };
        match self.http.get(url).bearer_auth(&self.access_token).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                log::warn!("Drive reachability probe failed: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient")
            .field("folder_id", &self.folder_id)
            .finish()
    }
}
