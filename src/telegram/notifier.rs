//! Job status notifications back into the requesting chat.

use async_trait::async_trait;
use teloxide::prelude::*;

use crate::delivery::DeliveryOutcome;
use crate::download::queue::DownloadJob;
use crate::download::worker::JobObserver;
use crate::telegram::Bot;

/// Observer that turns job events into chat replies.
///
/// Jobs without a chat id (submitted outside the bot) are observed only in
/// the logs.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn reply(&self, job: &DownloadJob, text: String) {
        let Some(chat_id) = job.chat_id else { return };
        if let Err(e) = self.bot.send_message(chat_id, text).await {
            log::warn!("Failed to notify chat {} about job {}: {}", chat_id, job.id, e);
        }
    }
}

#[async_trait]
impl JobObserver for TelegramNotifier {
    async fn on_started(&self, job: &DownloadJob) {
        self.reply(job, "Starting the download…".to_string()).await;
    }

    async fn on_done(&self, job: &DownloadJob, outcome: &DeliveryOutcome) {
        match outcome {
            // The document itself already landed in the chat.
            DeliveryOutcome::SentViaChannel(_) => {}
            DeliveryOutcome::UploadedToStorage(link) => {
                self.reply(job, format!("Here is your file: {}", link)).await;
            }
            DeliveryOutcome::KeptLocal(path) => {
                self.reply(
                    job,
                    format!("No delivery channel is configured; the file was saved on the server at {}", path.display()),
                )
                .await;
            }
            DeliveryOutcome::Failed => {
                // Failed outcomes arrive through on_error instead.
            }
        }
    }

    async fn on_error(&self, job: &DownloadJob, _message: &str) {
        self.reply(job, "Sorry, something went wrong while processing your file.".to_string())
            .await;
    }
}
