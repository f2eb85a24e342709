use std::path::Path;

use log::{error, info, warn};
use strum::Display;
use teloxide::types::{ChatId, Message, MessageId};
use tokio::fs;

use crate::{
    errors::{BotError, BotResult},
    queue::DownloadQueue,
    transport::Replier,
    utils::{get_unique_job_id, is_url_candidate},
    video::DownloadJob,
};

/// Telegram's upload limit for bots
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

pub const INVALID_URL_TEXT: &str = "Please send a valid URL.";
pub const DOWNLOADING_TEXT: &str = "Downloading... This might take a moment.";
pub const TOO_LARGE_TEXT: &str =
    "Sorry, the video is larger than 50MB and can't be sent via Telegram bot API.";
pub const DOWNLOAD_FAILED_TEXT: &str =
    "Error downloading video. Make sure the URL is valid and public.";
pub const UNKNOWN_ERROR_TEXT: &str = "An unexpected error occurred. Please try again later.";

/// How a request ended. Each variant corresponds to exactly one reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Outcome {
    Sent,
    RejectedInput,
    TooLarge,
    DownloadFailed,
    UnknownError,
}

/// A text message that may carry a URL
#[derive(Debug, Clone)]
pub struct Request {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
}

impl Request {
    pub fn from_message(msg: &Message) -> Option<Self> {
        Some(Self {
            chat_id: msg.chat.id,
            message_id: msg.id,
            text: msg.text()?.to_string(),
        })
    }
}

/// Validates, downloads, size-checks and sends one video, then removes every
/// file the download left behind. Failures are answered in chat, never returned.
pub async fn handle<R>(replier: &R, queue: &DownloadQueue, request: &Request) -> Outcome
where
    R: Replier + ?Sized,
{
    let chat_id = request.chat_id;

    if !is_url_candidate(&request.text) {
        reply(replier, chat_id, INVALID_URL_TEXT).await;
        return Outcome::RejectedInput;
    }

    reply(replier, chat_id, DOWNLOADING_TEXT).await;

    let job_id = get_unique_job_id(chat_id, request.message_id);
    let mut job = match DownloadJob::create(queue.base_dir(), &job_id).await {
        Ok(job) => job,
        Err(e) => {
            error!("Failed to create job directory {}: {}", job_id, e);
            reply(replier, chat_id, UNKNOWN_ERROR_TEXT).await;
            return Outcome::UnknownError;
        }
    };

    let outcome = match deliver(replier, queue, request, &mut job).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_download_failure() => {
            error!("DownloadError for {}: {}", request.text, e);
            reply(replier, chat_id, DOWNLOAD_FAILED_TEXT).await;
            Outcome::DownloadFailed
        }
        Err(e) => {
            error!("General error for {}: {}", request.text, e);
            reply(replier, chat_id, UNKNOWN_ERROR_TEXT).await;
            Outcome::UnknownError
        }
    };

    job.cleanup().await;
    outcome
}

async fn deliver<R>(
    replier: &R,
    queue: &DownloadQueue,
    request: &Request,
    job: &mut DownloadJob,
) -> BotResult<Outcome>
where
    R: Replier + ?Sized,
{
    let chat_id = request.chat_id;

    info!(
        "Starting download for URL: {} ({} waiting)",
        request.text,
        queue.pending_count()
    );
    let extraction = queue.submit(&request.text, job.dir()).await?;

    let video = job.resolve(extraction.reported_path).await;
    info!("Download of {} complete. File: {}", extraction.id, video.display());

    let size = file_size(&video).await?;
    if size > MAX_UPLOAD_BYTES {
        warn!("File {} is too large for Telegram ({} bytes)", video.display(), size);
        reply(replier, chat_id, TOO_LARGE_TEXT).await;
        return Ok(Outcome::TooLarge);
    }

    if let Err(e) = replier.send_upload_action(chat_id).await {
        warn!("Failed to send upload action: {}", e);
    }

    info!("Sending video: {}", video.display());
    match replier.send_video(chat_id, &video).await {
        Ok(()) => {
            info!("Video sent successfully.");
            Ok(Outcome::Sent)
        }
        Err(e) if e.is_entity_too_large() => {
            warn!("Telegram rejected {} as too large", video.display());
            reply(replier, chat_id, TOO_LARGE_TEXT).await;
            Ok(Outcome::TooLarge)
        }
        Err(e) => Err(e),
    }
}

async fn file_size(path: &Path) -> BotResult<u64> {
    let metadata = fs::metadata(path).await.map_err(|e| {
        BotError::general(format!("Cannot read downloaded file {}: {}", path.display(), e))
    })?;
    Ok(metadata.len())
}

/// Sends a status message; a failed send is only logged
async fn reply<R>(replier: &R, chat_id: ChatId, text: &str)
where
    R: Replier + ?Sized,
{
    if let Err(e) = replier.send_text(chat_id, text).await {
        warn!("Failed to reply to chat {}: {}", chat_id, e);
    }
}
