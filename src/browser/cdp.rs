//! Chrome DevTools protocol implementation of the browser session.
//!
//! Launches a headless Chrome per session via `chromiumoxide`, pins a fixed
//! desktop user-agent to reduce bot-detection friction, and captures
//! browser-initiated downloads through `Browser.setDownloadBehavior` plus
//! the `downloadWillBegin`/`downloadProgress` events.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    DownloadProgressState, EventDownloadProgress, EventDownloadWillBegin,
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};

use crate::browser::{BrowserEngine, BrowserSession, Trigger};
use crate::download::error::DownloadError;

/// Fixed desktop user-agent; marketplaces serve a different (and less
/// scrapeable) UI to obvious headless clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Interval between visibility polls in `try_click`.
const POLL_INTERVAL_MS: u64 = 250;

/// Launches one headless Chrome per session.
#[derive(Debug, Default)]
pub struct CdpEngine;

impl CdpEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserEngine for CdpEngine {
    async fn launch(&self, download_dir: &Path) -> Result<Box<dyn BrowserSession>, DownloadError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg(format!("--user-agent={}", USER_AGENT))
            .build()
            .map_err(DownloadError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DownloadError::Browser(format!("failed to launch Chrome: {}", e)))?;

        // The handler must be polled for the CDP connection to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DownloadError::Browser(format!("failed to open page: {}", e)))?;

        // Route downloads into the job's directory and enable the download
        // lifecycle events `download_via` listens for.
        let behavior = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(download_dir.to_string_lossy().to_string())
            .events_enabled(true)
            .build()
            .map_err(DownloadError::Browser)?;
        page.execute(behavior)
            .await
            .map_err(|e| DownloadError::Browser(format!("setDownloadBehavior failed: {}", e)))?;

        Ok(Box::new(CdpSession {
            browser,
            page,
            handler_task,
            download_dir: download_dir.to_path_buf(),
        }))
    }
}

/// One launched Chrome with a single page.
pub struct CdpSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    download_dir: PathBuf,
}

impl CdpSession {
    /// JavaScript probe for trigger visibility. `offsetParent` is null for
    /// `display:none` subtrees, which is how hidden duplicate buttons are
    /// skipped.
    fn visibility_js(trigger: &Trigger) -> String {
        match trigger {
            Trigger::Css(sel) => format!(
                "(() => {{ const el = document.querySelector('{}'); \
                 return !!(el && el.offsetParent !== null); }})()",
                sel
            ),
            Trigger::Text(text) => format!(
                "(() => {{ const els = Array.from(document.querySelectorAll('button, a')); \
                 return els.some(e => e.offsetParent !== null && e.textContent.trim().includes('{}')); }})()",
                text
            ),
        }
    }

    fn click_js(trigger: &Trigger) -> String {
        match trigger {
            Trigger::Css(sel) => format!(
                "(() => {{ const el = document.querySelector('{}'); \
                 if (el && el.offsetParent !== null) {{ el.click(); return true; }} return false; }})()",
                sel
            ),
            Trigger::Text(text) => format!(
                "(() => {{ const els = Array.from(document.querySelectorAll('button, a')); \
                 const el = els.find(e => e.offsetParent !== null && e.textContent.trim().includes('{}')); \
                 if (el) {{ el.click(); return true; }} return false; }})()",
                text
            ),
        }
    }

    async fn eval_bool(&self, js: String) -> bool {
        match self.page.evaluate(js).await {
            Ok(result) => result.into_value::<bool>().unwrap_or(false),
            Err(e) => {
                log::debug!("JS evaluation failed: {}", e);
                false
            }
        }
    }

}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn goto(&self, url: &str) -> Result<(), DownloadError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| DownloadError::Navigation(format!("goto {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), DownloadError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| DownloadError::Navigation(format!("field {} not found: {}", selector, e)))?;
        element
            .click()
            .await
            .map_err(|e| DownloadError::Navigation(format!("focus {} failed: {}", selector, e)))?;
        element
            .type_str(value)
            .await
            .map_err(|e| DownloadError::Navigation(format!("typing into {} failed: {}", selector, e)))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), DownloadError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| DownloadError::Navigation(format!("element {} not found: {}", selector, e)))?;
        element
            .click()
            .await
            .map_err(|e| DownloadError::Navigation(format!("click {} failed: {}", selector, e)))?;
        Ok(())
    }

    async fn try_click(&self, selector: &'static str, wait: Duration) -> bool {
        let deadline = Instant::now() + wait;
        loop {
            if self.eval_bool(Self::click_js(&Trigger::Css(selector))).await {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    async fn wait_network_idle(&self, wait: Duration) -> Result<(), DownloadError> {
        match timeout(wait, self.page.wait_for_navigation()).await {
            Ok(Ok(_)) => {
                // Give late XHRs a moment to settle; login redirects often
                // fire one more request after the load event.
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(())
            }
            Ok(Err(e)) => Err(DownloadError::Navigation(format!("navigation wait failed: {}", e))),
            Err(_) => Err(DownloadError::Timeout(format!(
                "page did not settle within {:?}",
                wait
            ))),
        }
    }

    async fn is_visible(&self, trigger: &Trigger) -> bool {
        self.eval_bool(Self::visibility_js(trigger)).await
    }

    async fn click_trigger(&self, trigger: &Trigger) -> Result<(), DownloadError> {
        if self.eval_bool(Self::click_js(trigger)).await {
            Ok(())
        } else {
            Err(DownloadError::TriggerNotFound(format!(
                "trigger {} not clickable",
                trigger
            )))
        }
    }

    async fn download_via(
        &self,
        trigger: &Trigger,
        wait: Duration,
    ) -> Result<PathBuf, DownloadError> {
        let mut begin_events = self
            .page
            .event_listener::<EventDownloadWillBegin>()
            .await
            .map_err(|e| DownloadError::Browser(format!("event listener failed: {}", e)))?;
        let mut progress_events = self
            .page
            .event_listener::<EventDownloadProgress>()
            .await
            .map_err(|e| DownloadError::Browser(format!("event listener failed: {}", e)))?;

        self.click_trigger(trigger).await?;

        let begin = timeout(wait, begin_events.next())
            .await
            .map_err(|_| {
                DownloadError::Timeout(format!("no download started within {:?}", wait))
            })?
            .ok_or_else(|| DownloadError::Browser("download event stream closed".to_string()))?;

        let guid = begin.guid.clone();
        let suggested = begin.suggested_filename.clone();
        log::info!("Download started: {} (guid {})", suggested, guid);

        let completion = async {
            while let Some(event) = progress_events.next().await {
                if event.guid != guid {
                    continue;
                }
                match &event.state {
                    DownloadProgressState::Completed => return Ok(()),
                    DownloadProgressState::Canceled => {
                        return Err(DownloadError::Browser("download was canceled".to_string()))
                    }
                    DownloadProgressState::InProgress => {}
                }
            }
            Err(DownloadError::Browser("download event stream closed".to_string()))
        };
        timeout(wait, completion)
            .await
            .map_err(|_| DownloadError::Timeout(format!("download did not finish within {:?}", wait)))??;

        Ok(self.download_dir.join(suggested))
    }

    async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            log::debug!("Browser close reported: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}
