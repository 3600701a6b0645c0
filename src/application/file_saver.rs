use futures::{future::BoxFuture, FutureExt};

use crate::domain::{AppError, DownloadPayload, SaveOutcome};

/// Host capability that materializes a downloaded payload as a local file.
pub trait FileSaver: Send + Sync {
    fn save(&self, payload: DownloadPayload) -> BoxFuture<'static, Result<SaveOutcome, AppError>>;
}

/// Asks the user for a location with a native save dialog pre-filled with the
/// payload's filename, then writes the bytes there.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogSaver;

impl FileSaver for DialogSaver {
    fn save(&self, payload: DownloadPayload) -> BoxFuture<'static, Result<SaveOutcome, AppError>> {
        async move {
            let Some(handle) = rfd::AsyncFileDialog::new()
                .set_file_name(&payload.filename)
                .save_file()
                .await
            else {
                return Ok(SaveOutcome::Cancelled);
            };

            let path = handle.path().to_path_buf();
            tokio::fs::write(&path, &payload.bytes).await.map_err(|e| {
                AppError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;

            Ok(SaveOutcome::Saved(path))
        }
        .boxed()
    }
}
