//! Telegram bot integration: dispatcher wiring, message handlers, job
//! status notifications and the direct delivery channel.

pub mod channel;
pub mod handlers;
pub mod notifier;

use std::sync::Arc;
use teloxide::prelude::*;

use crate::core::config::AppConfig;
use crate::delivery::drive::StorageClient;
use crate::download::downloader::Downloader;
use crate::download::queue::JobQueue;

pub use channel::{TelegramChannel, TelegramChannelFactory};
pub use notifier::TelegramNotifier;

/// The bot type used throughout the crate.
pub type Bot = teloxide::Bot;

/// Creates the bot from the injected configuration.
pub fn create_bot(config: &AppConfig) -> Bot {
    Bot::new(&config.telegram_token)
}

/// Shared dependencies handed to every message handler invocation.
pub struct HandlerDeps {
    pub queue: Arc<JobQueue>,
    pub downloader: Arc<Downloader>,
    pub storage: Option<Arc<dyn StorageClient>>,
}

/// Runs the long-polling dispatcher until it is stopped (Ctrl-C).
pub async fn run_dispatcher(bot: Bot, deps: Arc<HandlerDeps>) {
    log::info!("Telegram dispatcher started");
    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let deps = Arc::clone(&deps);
        async move { handlers::handle_message(bot, msg, deps).await }
    })
    .await;
}
