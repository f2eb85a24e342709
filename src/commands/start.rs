use teloxide::prelude::*;

use crate::errors::HandlerResult;

pub const START_TEXT: &str =
    "Send me a video URL from YouTube, TikTok, or Facebook, and I'll download it in HD!";

pub async fn start(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, START_TEXT).await?;
    Ok(())
}
