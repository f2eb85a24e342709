use std::path::Path;

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatAction, InputFile},
};

use crate::errors::HandlerResult;

/// Outgoing side of a chat, as the relay sees it
#[async_trait]
pub trait Replier: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> HandlerResult;

    /// Upload `path` as a streamable video
    async fn send_video(&self, chat_id: ChatId, path: &Path) -> HandlerResult;

    async fn send_upload_action(&self, chat_id: ChatId) -> HandlerResult;
}

#[async_trait]
impl Replier for Bot {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> HandlerResult {
        self.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn send_video(&self, chat_id: ChatId, path: &Path) -> HandlerResult {
        Requester::send_video(self, chat_id, InputFile::file(path))
            .supports_streaming(true)
            .await?;
        Ok(())
    }

    async fn send_upload_action(&self, chat_id: ChatId) -> HandlerResult {
        self.send_chat_action(chat_id, ChatAction::UploadVideo)
            .await?;
        Ok(())
    }
}
