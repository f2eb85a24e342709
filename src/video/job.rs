use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::fs;

use crate::video::ytdlp::OUTPUT_CONTAINER;

/// Intermediate containers yt-dlp may leave next to the merged file
const SIBLING_EXTENSIONS: [&str; 3] = ["mkv", "webm", "m4a"];

/// Scoped working directory of a single download.
///
/// Everything the extractor writes for one request lands in this directory,
/// and [`DownloadJob::cleanup`] removes it. If the owning handler is dropped
/// before cleanup ran, `Drop` schedules the removal on the runtime. The queue
/// worker notices the abandoned request, kills yt-dlp and removes the
/// directory once more, so a late write by the extractor does not survive.
pub struct DownloadJob {
    dir: PathBuf,
    reported: Option<PathBuf>,
    resolved: Option<PathBuf>,
    cleaned: bool,
}

impl DownloadJob {
    pub async fn create(base_dir: &Path, job_id: &str) -> io::Result<Self> {
        let dir = base_dir.join(job_id);
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            reported: None,
            resolved: None,
            cleaned: false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Picks the file to send for the name the extractor reported.
    ///
    /// The merge step does not always rename its output, so the merged
    /// container is preferred when it exists and the reported name is used
    /// otherwise.
    pub async fn resolve(&mut self, reported: PathBuf) -> PathBuf {
        let merged = reported.with_extension(OUTPUT_CONTAINER);
        let resolved = if fs::try_exists(&merged).await.unwrap_or(false) {
            merged
        } else {
            reported.clone()
        };

        self.reported = Some(reported);
        self.resolved = Some(resolved.clone());
        resolved
    }

    /// Removes the resolved file, its sibling containers and the job directory.
    /// Safe to call more than once.
    pub async fn cleanup(&mut self) {
        if let Some(resolved) = &self.resolved {
            remove_file_logged(resolved).await;
        }

        // Siblings are only known once the extractor produced a name
        if let Some(reported) = &self.reported {
            for ext in SIBLING_EXTENSIONS {
                remove_file_logged(&reported.with_extension(ext)).await;
            }
        }

        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => log::debug!("Removed job directory {}", self.dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::error!("Failed to remove {}: {}", self.dir.display(), e),
        }

        self.cleaned = true;
    }
}

impl Drop for DownloadJob {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }

        let dir = std::mem::take(&mut self.dir);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = fs::remove_dir_all(&dir).await {
                        if e.kind() != io::ErrorKind::NotFound {
                            log::error!("Failed to remove {}: {}", dir.display(), e);
                        }
                    }
                });
            }
            Err(_) => {
                if let Err(e) = std::fs::remove_dir_all(&dir) {
                    if e.kind() != io::ErrorKind::NotFound {
                        log::error!("Failed to remove {}: {}", dir.display(), e);
                    }
                }
            }
        }
    }
}

async fn remove_file_logged(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => log::info!("Cleaned up file: {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::error!("Failed to remove {}: {}", path.display(), e),
    }
}
