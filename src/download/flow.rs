//! Marketplace-specific browser flows.
//!
//! Both marketplaces share the same flow shape (sign in, navigate to the
//! asset, probe for a download trigger, capture the download) and differ
//! only in URLs and selectors. The differences live in a [`SiteProfile`]
//! table; [`Site`] is the single polymorphic capability selected by URL
//! dispatch, not an inheritance chain.

use std::path::PathBuf;

use crate::browser::{BrowserSession, Trigger};
use crate::core::config::{timeouts, SiteCredentials};
use crate::download::error::DownloadError;

/// Supported marketplaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    Freepik,
    Envato,
}

/// Static per-marketplace selectors and URLs.
#[derive(Debug)]
pub struct SiteProfile {
    /// Sign-in page URL
    pub login_url: &'static str,
    /// Cookie-consent accept button, if the site shows one
    pub cookie_banner: Option<&'static str>,
    /// Email/username input selector
    pub email_field: &'static str,
    /// Password input selector
    pub password_field: &'static str,
    /// Login form submit selector
    pub submit: &'static str,
    /// Ordered candidate download triggers; the first visible one wins
    pub download_triggers: &'static [Trigger],
    /// Confirmation triggers probed after the first click (empty when the
    /// site downloads in one step); the last visible one wins, because the
    /// confirm affordance appears after the start button and duplicates its
    /// label
    pub confirm_triggers: &'static [Trigger],
}

/// Freepik changes selectors frequently, hence the broad candidate list.
const FREEPIK: SiteProfile = SiteProfile {
    login_url: "https://www.freepik.com/login",
    cookie_banner: Some("#onetrust-accept-btn-handler"),
    email_field: "input[name=\"email\"]",
    password_field: "input[name=\"password\"]",
    submit: "button[type=\"submit\"]",
    download_triggers: &[
        Trigger::Css("button.download-button"),
        Trigger::Css("button#download-file"),
        Trigger::Css("a.download-button"),
        Trigger::Text("Download"),
    ],
    confirm_triggers: &[],
};

/// Envato asks to attach the item to a project before the actual download
/// fires, so the initial trigger is followed by a confirmation probe.
const ENVATO: SiteProfile = SiteProfile {
    login_url: "https://elements.envato.com/sign-in",
    cookie_banner: None,
    email_field: "#username",
    password_field: "#password",
    submit: "button[type=\"submit\"]",
    download_triggers: &[Trigger::Text("Download")],
    confirm_triggers: &[Trigger::Text("Add & Download"), Trigger::Text("Download")],
};

impl Site {
    /// Routes a URL to its marketplace by substring match, `None` for
    /// unsupported hosts.
    pub fn for_url(url: &str) -> Option<Site> {
        if url.contains("freepik.com") {
            Some(Site::Freepik)
        } else if url.contains("elements.envato.com") {
            Some(Site::Envato)
        } else {
            None
        }
    }

    /// Human-readable marketplace name
    pub fn name(&self) -> &'static str {
        match self {
            Site::Freepik => "Freepik",
            Site::Envato => "Envato",
        }
    }

    fn profile(&self) -> &'static SiteProfile {
        match self {
            Site::Freepik => &FREEPIK,
            Site::Envato => &ENVATO,
        }
    }

    /// Signs in to the marketplace: navigate to the login page, dismiss the
    /// cookie banner if one appears, fill the credential fields, submit, and
    /// wait (bounded) for the page to settle.
    ///
    /// Also the body of the connectivity self-test, which runs nothing
    /// beyond this.
    pub async fn login(
        &self,
        session: &dyn BrowserSession,
        credentials: &SiteCredentials,
    ) -> Result<(), DownloadError> {
        let profile = self.profile();
        log::info!("Signing in to {} at {}", self.name(), profile.login_url);

        session.goto(profile.login_url).await?;

        if let Some(banner) = profile.cookie_banner {
            // Bounded wait; the banner not showing up is fine.
            if session.try_click(banner, timeouts::cookie_banner()).await {
                log::debug!("Dismissed cookie banner on {}", self.name());
            }
        }

        session.fill(profile.email_field, &credentials.email).await?;
        session.fill(profile.password_field, &credentials.password).await?;
        session.click(profile.submit).await?;
        session
            .wait_network_idle(timeouts::network_idle())
            .await
            .map_err(|e| DownloadError::LoginFailed(format!("{} login did not settle: {}", self.name(), e)))?;

        Ok(())
    }

    /// Runs the full flow: sign in, open the asset page, probe for a
    /// download trigger and capture the resulting file.
    ///
    /// Returns the local path of the saved file. The caller owns the browser
    /// session and tears it down on every exit path.
    pub async fn run(
        &self,
        session: &dyn BrowserSession,
        url: &str,
        credentials: &SiteCredentials,
    ) -> Result<PathBuf, DownloadError> {
        let profile = self.profile();

        self.login(session, credentials).await?;

        log::info!("Opening {} asset page: {}", self.name(), url);
        session.goto(url).await?;

        let Some(trigger) = first_visible(session, profile.download_triggers).await else {
            return Err(DownloadError::TriggerNotFound(format!(
                "no download button found on {} for {}",
                self.name(),
                url
            )));
        };
        log::info!("Using download trigger {} on {}", trigger, self.name());

        if profile.confirm_triggers.is_empty() {
            return session.download_via(trigger, timeouts::download_event()).await;
        }

        // Two-step download: the first click opens a confirmation dialog and
        // the download only fires from the confirm trigger.
        session.click_trigger(trigger).await?;
        let Some(confirm) = last_visible(session, profile.confirm_triggers).await else {
            return Err(DownloadError::TriggerNotFound(format!(
                "no download confirmation found on {} for {}",
                self.name(),
                url
            )));
        };
        log::info!("Confirming download via {} on {}", confirm, self.name());
        session.download_via(confirm, timeouts::download_event()).await
    }
}

/// Returns the first trigger in `candidates` that is currently visible.
///
/// The ordered probe is the tolerance mechanism for unstable third-party
/// markup: preferred selectors first, a broad text match last.
pub async fn first_visible<'a>(
    session: &dyn BrowserSession,
    candidates: &'a [Trigger],
) -> Option<&'a Trigger> {
    for trigger in candidates {
        if session.is_visible(trigger).await {
            return Some(trigger);
        }
    }
    None
}

/// Returns the last trigger in `candidates` that is currently visible.
///
/// Used for confirmation dialogs where the confirm affordance duplicates
/// the start button's label and should take priority among duplicates.
pub async fn last_visible<'a>(
    session: &dyn BrowserSession,
    candidates: &'a [Trigger],
) -> Option<&'a Trigger> {
    let mut found = None;
    for trigger in candidates {
        if session.is_visible(trigger).await {
            found = Some(trigger);
        }
    }
    found
}
