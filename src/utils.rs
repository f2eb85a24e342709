use std::{io, path::Path};

use teloxide::types::{ChatId, MessageId};
use tokio::fs;

/// Only a prefix check. Anything else is left to the extractor to reject.
pub fn is_url_candidate(text: &str) -> bool {
    text.starts_with("http")
}

/// Directory name of the job serving one message
pub fn get_unique_job_id(chat_id: ChatId, message_id: MessageId) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("chat{}_msg{}_{}", chat_id.0, message_id.0, &suffix[..8])
}

/// Whether `name` has the shape produced by [`get_unique_job_id`]
pub fn is_job_dir_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("chat") else {
        return false;
    };
    let Some((chat, rest)) = rest.split_once("_msg") else {
        return false;
    };
    let Some((msg, suffix)) = rest.split_once('_') else {
        return false;
    };

    chat.parse::<i64>().is_ok()
        && msg.parse::<i32>().is_ok()
        && suffix.len() == 8
        && suffix.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Removes stale job directories inside `dir`. Anything else is left alone.
pub async fn clear_dir(dir: impl AsRef<Path>) -> io::Result<()> {
    let dir = dir.as_ref();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    while let Some(entry) = entries.next_entry().await? {
        let is_job = entry.file_name().to_str().is_some_and(is_job_dir_name);
        if !is_job || !entry.file_type().await?.is_dir() {
            continue;
        }

        let path = entry.path();
        fs::remove_dir_all(&path).await?;
        log::debug!("Removed stale {}", path.display());
    }

    Ok(())
}
