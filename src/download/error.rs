use std::fmt;

/// Structured error type for the download pipeline.
///
/// Categorized so failures can be logged with a stable subcategory instead
/// of a free-form string; no component lets these cross a boundary as a
/// panic; they are converted to logged failure values.
#[derive(Debug)]
pub enum DownloadError {
    /// URL matches neither supported marketplace
    UnsupportedUrl(String),
    /// Marketplace has no credentials configured
    NotConfigured(String),
    /// Sign-in failed (bad credentials, login page changed)
    LoginFailed(String),
    /// No candidate download trigger was visible on the asset page
    TriggerNotFound(String),
    /// A bounded wait elapsed (network idle, download event)
    Timeout(String),
    /// Navigation or page-interaction failure
    Navigation(String),
    /// Browser launch/session failure
    Browser(String),
    /// Catch-all for uncategorized errors
    Other(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::UnsupportedUrl(msg)
            | DownloadError::NotConfigured(msg)
            | DownloadError::LoginFailed(msg)
            | DownloadError::TriggerNotFound(msg)
            | DownloadError::Timeout(msg)
            | DownloadError::Navigation(msg)
            | DownloadError::Browser(msg)
            | DownloadError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns a stable subcategory for log lines
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::UnsupportedUrl(_) => "unsupported_url",
            DownloadError::NotConfigured(_) => "not_configured",
            DownloadError::LoginFailed(_) => "login_failed",
            DownloadError::TriggerNotFound(_) => "trigger_not_found",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::Navigation(_) => "navigation",
            DownloadError::Browser(_) => "browser",
            DownloadError::Other(_) => "other",
        }
    }

    /// Returns the inner message
    pub fn message(&self) -> &str {
        match self {
            DownloadError::UnsupportedUrl(msg)
            | DownloadError::NotConfigured(msg)
            | DownloadError::LoginFailed(msg)
            | DownloadError::TriggerNotFound(msg)
            | DownloadError::Timeout(msg)
            | DownloadError::Navigation(msg)
            | DownloadError::Browser(msg)
            | DownloadError::Other(msg) => msg,
        }
    }
}

/// Plain strings become `DownloadError::Other`
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        DownloadError::Other(s)
    }
}

impl From<&str> for DownloadError {
    fn from(s: &str) -> Self {
        DownloadError::Other(s.to_string())
    }
}
