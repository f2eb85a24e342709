use std::fmt;

use teloxide::{ApiError, RequestError};

/// Error type shared by the whole bot
#[derive(Debug)]
pub enum BotError {
    /// yt-dlp ran but could not produce a video (bad URL, unsupported site, no stream)
    DownloadError(String),
    /// Filesystem errors
    FileSystemError(std::io::Error),
    /// Telegram API errors
    TelegramError(RequestError),
    /// Unexpected output from an external program
    ParseError(String),
    /// External command could not be started
    ExternalCommandError { command: String, stderr: String },
    /// Missing or invalid configuration
    ConfigError(String),
    /// General error with a description
    General(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::DownloadError(msg) => write!(f, "Download failed: {}", msg),
            BotError::FileSystemError(e) => write!(f, "Filesystem error: {}", e),
            BotError::TelegramError(e) => write!(f, "Telegram API error: {}", e),
            BotError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            BotError::ExternalCommandError { command, stderr } => {
                write!(f, "Command {} failed: {}", command, stderr)
            }
            BotError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            BotError::General(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::FileSystemError(e) => Some(e),
            BotError::TelegramError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::FileSystemError(err)
    }
}

impl From<RequestError> for BotError {
    fn from(err: RequestError) -> Self {
        BotError::TelegramError(err)
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::ParseError(format!("JSON parsing error: {}", err))
    }
}

impl BotError {
    pub fn download_error(msg: impl Into<String>) -> Self {
        Self::DownloadError(msg.into())
    }

    pub fn external_command_error(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ExternalCommandError {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }

    /// Failure reported by the extractor itself, as opposed to anything around it
    pub fn is_download_failure(&self) -> bool {
        matches!(self, BotError::DownloadError(_))
    }

    /// Telegram refused the upload because of its size
    pub fn is_entity_too_large(&self) -> bool {
        matches!(
            self,
            BotError::TelegramError(RequestError::Api(ApiError::RequestEntityTooLarge))
        )
    }
}

/// Result of bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Result for handlers
pub type HandlerResult = BotResult<()>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_extractor_failures_are_download_failures() {
        assert!(BotError::download_error("ERROR: Unsupported URL").is_download_failure());
        assert!(!BotError::external_command_error("yt-dlp", "not found").is_download_failure());
        assert!(!BotError::ParseError("garbage".into()).is_download_failure());
        assert!(!BotError::from(std::io::Error::other("disk")).is_download_failure());
    }

    #[test]
    fn recognises_telegram_size_rejection() {
        let err = BotError::from(RequestError::Api(ApiError::RequestEntityTooLarge));
        assert!(err.is_entity_too_large());
        assert!(!BotError::general("nope").is_entity_too_large());
        let other = BotError::from(RequestError::Api(ApiError::BotBlocked));
        assert!(!other.is_entity_too_large());
    }
}
