//! Message handling: marketplace link detection and the /status command.

use lazy_regex::regex;
use std::sync::Arc;
use teloxide::prelude::*;

use crate::download::flow::Site;
use crate::telegram::{Bot, HandlerDeps};

/// Extracts every supported marketplace link from a message text.
pub fn extract_marketplace_links(text: &str) -> Vec<String> {
    let re = regex!(r"https?://(?:www\.)?(?:freepik\.com|elements\.envato\.com)/[^\s]+");
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Formats a self-test result: configured marketplaces report pass/fail,
/// unconfigured ones are explicitly "not configured" rather than a failure.
fn check_label(result: Option<bool>) -> &'static str {
    match result {
        Some(true) => "ok ✅",
        Some(false) => "failed ❌",
        None => "not configured",
    }
}

/// Runs the connectivity self-tests and formats the /status report.
pub async fn status_report(deps: &HandlerDeps) -> String {
    let freepik = deps.downloader.test_login(Site::Freepik).await;
    let envato = deps.downloader.test_login(Site::Envato).await;
    let storage = match &deps.storage {
        Some(storage) => Some(storage.test_reachable().await),
        None => None,
    };

    format!(
        "Freepik login: {}\nEnvato login: {}\nGoogle Drive: {}",
        check_label(freepik),
        check_label(envato),
        check_label(storage)
    )
}

/// Handles one incoming message: answers /status, otherwise submits a job
/// per detected marketplace link.
pub async fn handle_message(bot: Bot, msg: Message, deps: Arc<HandlerDeps>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if text.trim().starts_with("/status") {
        let report = status_report(&deps).await;
        bot.send_message(msg.chat.id, report).await?;
        return Ok(());
    }

    for link in extract_marketplace_links(text) {
        bot.send_message(
            msg.chat.id,
            format!("Got your link: {}\nQueued for download.", link),
        )
        .await?;

        if deps.queue.submit(link, Some(msg.chat.id)).await.is_none() {
            bot.send_message(msg.chat.id, "The queue is full right now, please try again later.")
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_freepik_link() {
        let links = extract_marketplace_links("look at https://www.freepik.com/item/123 please");
        assert_eq!(links, vec!["https://www.freepik.com/item/123"]);
    }

    #[test]
    fn test_extract_multiple_links() {
        let text = "https://www.freepik.com/a and https://elements.envato.com/b";
        let links = extract_marketplace_links(text);
        assert_eq!(links.len(), 2);
        assert!(links[1].contains("elements.envato.com"));
    }

    #[test]
    fn test_extract_ignores_other_hosts() {
        let links = extract_marketplace_links("https://example.com/asset https://envato.com/x");
        assert!(links.is_empty());
    }

    #[test]
    fn test_check_label() {
        assert_eq!(check_label(Some(true)), "ok ✅");
        assert_eq!(check_label(Some(false)), "failed ❌");
        assert_eq!(check_label(None), "not configured");
    }
}
