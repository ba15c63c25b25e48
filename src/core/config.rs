//! Configuration for the bot
//!
//! Environment variables are read once at startup into `Lazy` statics and
//! then materialized into an [`AppConfig`] that is passed to constructors.
//! Components never read the environment themselves.

use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};
use crate::delivery::DeliveryPolicy;

/// Telegram bot token
/// Read once at startup from the TELEGRAM_TOKEN environment variable
pub static TELEGRAM_TOKEN: Lazy<String> =
    Lazy::new(|| env::var("TELEGRAM_TOKEN").unwrap_or_default());

/// Freepik account email (empty = Freepik flow disabled)
pub static FREEPIK_EMAIL: Lazy<String> = Lazy::new(|| env::var("FREEPIK_EMAIL").unwrap_or_default());

/// Freepik account password
pub static FREEPIK_PASSWORD: Lazy<String> =
    Lazy::new(|| env::var("FREEPIK_PASSWORD").unwrap_or_default());

/// Envato Elements account email (empty = Envato flow disabled)
pub static ENVATO_EMAIL: Lazy<String> = Lazy::new(|| env::var("ENVATO_EMAIL").unwrap_or_default());

/// Envato Elements account password
pub static ENVATO_PASSWORD: Lazy<String> =
    Lazy::new(|| env::var("ENVATO_PASSWORD").unwrap_or_default());

/// Target Google Drive folder ID (empty = cloud delivery path is skipped)
pub static DRIVE_FOLDER_ID: Lazy<String> =
    Lazy::new(|| env::var("DRIVE_FOLDER_ID").unwrap_or_default());

/// Bearer access token for the Google Drive API.
/// Obtaining/refreshing the token from the service-account credential file
/// is the deployment's concern, not this process's.
pub static DRIVE_ACCESS_TOKEN: Lazy<String> =
    Lazy::new(|| env::var("DRIVE_ACCESS_TOKEN").unwrap_or_default());

/// Download folder path
/// Read from DOWNLOAD_FOLDER environment variable, defaults to ./downloads
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "./downloads".to_string()));

/// Log file path
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "stockfetch.log".to_string()));

/// Delivery route order, e.g. "direct,storage" (see `DeliveryPolicy::parse`)
pub static DELIVERY_POLICY: Lazy<String> =
    Lazy::new(|| env::var("DELIVERY_POLICY").unwrap_or_default());

/// Login credentials for one marketplace.
///
/// Loaded once at startup, owned by the `Downloader` and passed by reference
/// into the matching site flow. Never mutated.
#[derive(Debug, Clone)]
pub struct SiteCredentials {
    pub email: String,
    pub password: String,
}

impl SiteCredentials {
    /// Builds credentials from an email/password pair; `None` unless both
    /// values are non-empty (a half-configured marketplace stays disabled).
    pub fn from_pair(email: &str, password: &str) -> Option<Self> {
        if email.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

/// Process-wide configuration, resolved once in `main` and injected into
/// constructors rather than read ambiently.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telegram bot token
    pub telegram_token: String,
    /// Freepik credentials (None = flow disabled)
    pub freepik: Option<SiteCredentials>,
    /// Envato credentials (None = flow disabled)
    pub envato: Option<SiteCredentials>,
    /// Local directory downloaded files land in
    pub download_dir: PathBuf,
    /// Google Drive target folder (None = cloud route skipped)
    pub drive_folder_id: Option<String>,
    /// Google Drive bearer token (None = Drive client not constructed)
    pub drive_access_token: Option<String>,
    /// Ordered delivery routes
    pub delivery_policy: DeliveryPolicy,
}

impl AppConfig {
    /// Resolves the configuration from the environment statics.
    ///
    /// # Errors
    /// Returns an error if `TELEGRAM_TOKEN` is missing; everything else is
    /// optional and merely disables the corresponding feature.
    pub fn from_env() -> AppResult<Self> {
        if TELEGRAM_TOKEN.is_empty() {
            return Err(AppError::Config(
                "TELEGRAM_TOKEN environment variable not set".to_string(),
            ));
        }
        let none_if_empty = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        Ok(Self {
            telegram_token: TELEGRAM_TOKEN.clone(),
            freepik: SiteCredentials::from_pair(&FREEPIK_EMAIL, &FREEPIK_PASSWORD),
            envato: SiteCredentials::from_pair(&ENVATO_EMAIL, &ENVATO_PASSWORD),
            download_dir: PathBuf::from(DOWNLOAD_FOLDER.as_str()),
            drive_folder_id: none_if_empty(&DRIVE_FOLDER_ID),
            drive_access_token: none_if_empty(&DRIVE_ACCESS_TOKEN),
            delivery_policy: DeliveryPolicy::parse(&DELIVERY_POLICY),
        })
    }
}

/// Bounded waits for individual browser steps.
///
/// Each wait is individually time-boxed; exceeding a bound fails that step,
/// there is no global per-job timeout.
pub mod timeouts {
    use super::Duration;

    /// Wait for an optional cookie-consent banner (absence is not an error)
    pub const COOKIE_BANNER_WAIT_SECS: u64 = 5;

    /// Wait for the page to settle after submitting the login form
    pub const NETWORK_IDLE_WAIT_SECS: u64 = 30;

    /// Wait for the browser-initiated download to start and complete
    pub const DOWNLOAD_EVENT_WAIT_SECS: u64 = 120;

    /// Cookie banner wait duration
    pub fn cookie_banner() -> Duration {
        Duration::from_secs(COOKIE_BANNER_WAIT_SECS)
    }

    /// Network idle wait duration
    pub fn network_idle() -> Duration {
        Duration::from_secs(NETWORK_IDLE_WAIT_SECS)
    }

    /// Download event wait duration
    pub fn download_event() -> Duration {
        Duration::from_secs(DOWNLOAD_EVENT_WAIT_SECS)
    }
}

/// Queue processing configuration
pub mod queue {
    use super::Duration;

    /// Maximum number of jobs allowed in the queue to prevent unbounded
    /// memory growth
    pub const MAX_QUEUE_SIZE: usize = 1000;

    /// Interval between queue checks (in milliseconds)
    pub const CHECK_INTERVAL_MS: u64 = 100;

    /// Queue check interval duration
    pub fn check_interval() -> Duration {
        Duration::from_millis(CHECK_INTERVAL_MS)
    }
}
