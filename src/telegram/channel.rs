//! Direct delivery over Telegram: replies with the downloaded document in
//! the requesting chat.

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile};

use crate::core::error::AppResult;
use crate::delivery::channel::{ChannelFactory, DirectChannel};
use crate::download::queue::DownloadJob;
use crate::telegram::Bot;

/// Sends a file as a document into one chat.
#[derive(Clone)]
pub struct TelegramChannel {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramChannel {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl DirectChannel for TelegramChannel {
    async fn send(&self, path: &Path) -> AppResult<()> {
        self.bot
            .send_document(self.chat_id, InputFile::file(path.to_path_buf()))
            .await?;
        Ok(())
    }
}

/// Builds a [`TelegramChannel`] for jobs that came in through a chat;
/// jobs without a chat get no direct channel.
pub struct TelegramChannelFactory {
    bot: Bot,
}

impl TelegramChannelFactory {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl ChannelFactory for TelegramChannelFactory {
    fn for_job(&self, job: &DownloadJob) -> Option<Box<dyn DirectChannel>> {
        let chat_id = job.chat_id?;
        Some(Box::new(TelegramChannel::new(self.bot.clone(), chat_id)))
    }
}
