use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use tokio::process;

use crate::errors::{BotError, BotResult};

/// Container every download is merged into
pub const OUTPUT_CONTAINER: &str = "mp4";

/// Best combined stream at or below 1080p, else the best single file at or below 1080p
const FORMAT_SELECTOR: &str = "bestvideo[height<=1080]+bestaudio/best[height<=1080]";

/// Printed once the file reached its final location
const AFTER_MOVE_TEMPLATE: &str = "after_move:%(.{id,filepath})j";

/// What the extractor reports about a finished download
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Content identifier the file is named after
    pub id: String,
    /// Path of the file as reported, not necessarily with the merged extension
    pub reported_path: PathBuf,
}

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Download `url` into `dir`, returning once the file is on disk
    async fn extract(&self, url: &str, dir: &Path) -> BotResult<Extraction>;
}

#[derive(Debug, Deserialize)]
struct YtDlpReport {
    id: String,
    filepath: Option<String>,
}

pub struct YtDlp {
    program: String,
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn build_command(&self, url: &str, dir: &Path) -> process::Command {
        let output = dir.join("%(id)s.%(ext)s");

        let mut cmd = process::Command::new(&self.program);
        cmd.arg("--no-playlist")
            .args(["-f", FORMAT_SELECTOR])
            .args(["--merge-output-format", OUTPUT_CONTAINER])
            .arg("-o")
            .arg(output)
            .args(["--quiet", "--no-warnings"])
            .args(["--no-simulate", "--print", AFTER_MOVE_TEMPLATE])
            .arg(url);
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn extract(&self, url: &str, dir: &Path) -> BotResult<Extraction> {
        info!("Starting download: {} into {}", url, dir.display());

        let output = self
            .build_command(url, dir)
            .output()
            .await
            .map_err(|e| BotError::external_command_error(&self.program, e.to_string()))?;

        info!("yt-dlp exit code: {:?}", output.status.code());

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(BotError::download_error(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_report(&stdout, dir)
    }
}

/// Reads the last printed report line. yt-dlp prints one per downloaded item.
fn parse_report(stdout: &str, dir: &Path) -> BotResult<Extraction> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .ok_or_else(|| BotError::download_error("yt-dlp finished without producing a file"))?;

    let report: YtDlpReport = serde_json::from_str(line)?;

    let reported_path = match report.filepath {
        Some(path) => PathBuf::from(path),
        None => dir.join(format!("{}.{}", report.id, OUTPUT_CONTAINER)),
    };

    Ok(Extraction {
        id: report.id,
        reported_path,
    })
}
