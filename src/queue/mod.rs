use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Semaphore};

use crate::errors::{BotError, BotResult};
use crate::video::{Extraction, Extractor};

/// Unique task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A download waiting for a worker slot
struct DownloadTask {
    id: TaskId,
    url: String,
    dir: PathBuf,
    reply: oneshot::Sender<BotResult<Extraction>>,
}

/// Runs extractions off the dispatcher, at most `max_concurrent` at a time.
pub struct DownloadQueue {
    /// Channel sender for submitting tasks
    sender: mpsc::UnboundedSender<DownloadTask>,
    /// Number of tasks waiting for a worker slot
    pending_count: Arc<AtomicUsize>,
    /// Parent directory of all job directories
    base_dir: PathBuf,
}

impl DownloadQueue {
    /// Create a new queue and start the worker
    pub fn new(
        extractor: Arc<dyn Extractor>,
        base_dir: impl Into<PathBuf>,
        max_concurrent: usize,
    ) -> Arc<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
        let pending_count = Arc::new(AtomicUsize::new(0));

        tokio::spawn(run_worker(
            receiver,
            extractor,
            semaphore,
            pending_count.clone(),
        ));

        Arc::new(Self {
            sender,
            pending_count,
            base_dir: base_dir.into(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get number of tasks waiting in queue
    pub fn pending_count(&self) -> usize {
        self.pending_count.load(Ordering::SeqCst)
    }

    /// Queue a download into `dir` and wait for it to finish
    pub async fn submit(&self, url: &str, dir: &Path) -> BotResult<Extraction> {
        let (reply, result) = oneshot::channel();
        let task = DownloadTask {
            id: TaskId::new(),
            url: url.to_string(),
            dir: dir.to_path_buf(),
            reply,
        };

        let position = self.pending_count.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("Queued download {} (position {})", task.id, position);

        if let Err(e) = self.sender.send(task) {
            self.pending_count.fetch_sub(1, Ordering::SeqCst);
            return Err(BotError::general(format!("Failed to submit task: {}", e)));
        }

        result
            .await
            .map_err(|_| BotError::general("Download worker dropped the task"))?
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<DownloadTask>,
    extractor: Arc<dyn Extractor>,
    semaphore: Arc<Semaphore>,
    pending_count: Arc<AtomicUsize>,
) {
    log::info!("Download worker started");

    while let Some(task) = receiver.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        pending_count.fetch_sub(1, Ordering::SeqCst);

        let extractor = extractor.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let mut task = task;
            log::info!("Processing download {}: {}", task.id, task.url);

            let result = tokio::select! {
                result = extractor.extract(&task.url, &task.dir) => Some(result),
                _ = task.reply.closed() => None,
            };
            // The extraction future is gone by now, and yt-dlp with it
            let Some(result) = result else {
                log::warn!("Requester of download {} is gone, cancelled", task.id);
                remove_abandoned_dir(&task.dir).await;
                return;
            };
            if let Err(e) = &result {
                log::debug!("Download {} failed: {}", task.id, e);
            }

            if task.reply.send(result).is_err() {
                log::warn!("Requester of download {} is gone", task.id);
                remove_abandoned_dir(&task.dir).await;
            }
        });
    }

    log::info!("Download worker stopped");
}

/// The requester's own cleanup may already have run, so the directory is
/// removed again once nothing writes to it any more.
async fn remove_abandoned_dir(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => log::debug!("Removed abandoned {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::error!("Failed to remove {}: {}", dir.display(), e),
    }
}
