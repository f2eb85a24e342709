use std::sync::Arc;

use teloxide::prelude::*;

use crate::{
    errors::{BotError, HandlerResult},
    queue::DownloadQueue,
    relay::{self, Request},
};

pub async fn link_received(bot: Bot, msg: Message, queue: Arc<DownloadQueue>) -> HandlerResult {
    let request = Request::from_message(&msg)
        .ok_or_else(|| BotError::general("Text should be here. It's invalid state"))?;

    let outcome = relay::handle(&bot, &queue, &request).await;
    log::info!("Request in chat {} finished: {}", request.chat_id, outcome);

    Ok(())
}
