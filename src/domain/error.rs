use thiserror::Error;

pub const PREVIEW_UNAVAILABLE_MESSAGE: &str = "Could not load preview.";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Download failed";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Please enter a URL first")]
    EmptyInput,

    /// The server resolved the request but reported an error for the URL.
    #[error("{0}")]
    Resolution(String),

    #[error("Preview request failed: {0}")]
    PreviewUnavailable(String),

    #[error("Download request failed: {0}")]
    DownloadFailed(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("No preview has been resolved yet")]
    NotPreviewed,

    #[error("A download is already in progress")]
    DownloadInFlight,
}

impl AppError {
    /// Text shown to the user in the blocking notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Resolution(message) => message.clone(),
            AppError::PreviewUnavailable(_) => PREVIEW_UNAVAILABLE_MESSAGE.to_string(),
            AppError::DownloadFailed(_) | AppError::Io(_) => DOWNLOAD_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
