pub mod job;
pub mod ytdlp;

pub use job::DownloadJob;
pub use ytdlp::{Extraction, Extractor, YtDlp};
