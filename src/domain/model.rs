use std::path::PathBuf;

use bytes::Bytes;

/// Fixed name offered to the file saver for every download.
pub const DOWNLOAD_FILENAME: &str = "tiktok-video.mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    PreviewLoading,
    Previewed,
    DownloadLoading,
    /// Last download failed. The resolved URL is kept so the download can be retried.
    DownloadError,
}

impl SessionPhase {
    pub fn allows_download(self) -> bool {
        matches!(self, SessionPhase::Previewed | SessionPhase::DownloadError)
    }
}

/// State of the single session owned by the request orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub resolved_url: Option<String>,
    /// Bumped on every preview submission; replies for older generations are stale.
    pub preview_generation: u64,
    /// Set from a granted download trigger until its completion, whatever
    /// previews run in between.
    pub download_in_flight: bool,
}

/// A resolved preview. References are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub playable_url: String,
}

#[derive(Debug, Clone)]
pub struct DownloadPayload {
    pub filename: String,
    pub bytes: Bytes,
}

impl DownloadPayload {
    pub fn new(bytes: Bytes) -> Self {
        Self {
            filename: DOWNLOAD_FILENAME.to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Cancelled,
}
