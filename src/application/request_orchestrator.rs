use std::{future::Future, path::PathBuf, sync::Arc};

use bytes::Bytes;

use crate::{
    api::{ApiClient, PreviewReply},
    application::FileSaver,
    domain::{AppError, DownloadPayload, Preview, SaveOutcome, SessionPhase, SessionState},
    ui::DownloadView,
    utils::normalize_input,
};

#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub generation: u64,
    pub video_url: String,
}

/// Result of a preview request, tagged with the submission it belongs to.
#[derive(Debug, Clone)]
pub struct PreviewCompletion {
    pub generation: u64,
    pub video_url: String,
    pub result: Result<Preview, AppError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    Shown(Preview),
    Failed(AppError),
    /// A newer submission started while this one was in flight.
    Stale,
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub video_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    Cancelled,
    Failed(AppError),
}

/// Owns the session and drives both operations: resolving a preview and
/// downloading the resolved video.
///
/// Every method taking `&mut self` runs on the UI thread between two await
/// points of the request futures, so the session needs no locking.
pub struct RequestOrchestrator {
    api_client: ApiClient,
    saver: Arc<dyn FileSaver>,
    session: SessionState,
}

impl RequestOrchestrator {
    pub fn new(api_client: ApiClient, saver: Arc<dyn FileSaver>) -> Self {
        Self {
            api_client,
            saver,
            session: SessionState::default(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Start a preview for `input`. Blank input never issues a request.
    pub fn submit_preview(
        &mut self,
        view: &mut DownloadView,
        input: &str,
    ) -> Result<PreviewRequest, AppError> {
        let video_url = normalize_input(input).ok_or(AppError::EmptyInput)?;

        self.session.preview_generation += 1;
        self.session.phase = SessionPhase::PreviewLoading;
        self.session.resolved_url = None;
        view.begin_preview();

        tracing::info!(
            generation = self.session.preview_generation,
            %video_url,
            "preview submitted"
        );

        Ok(PreviewRequest {
            generation: self.session.preview_generation,
            video_url,
        })
    }

    pub fn resolve_preview(
        &self,
        request: PreviewRequest,
    ) -> impl Future<Output = PreviewCompletion> + Send + 'static {
        let client = self.api_client.clone();

        async move {
            let result = match client.preview(&request.video_url).await {
                Ok(PreviewReply::Ready {
                    title,
                    thumbnail,
                    url,
                }) => absolute_preview(&client, title, thumbnail.as_deref(), &url),
                Ok(PreviewReply::Rejected(message)) => Err(AppError::Resolution(message)),
                Err(e) => Err(AppError::PreviewUnavailable(e.to_string())),
            };

            PreviewCompletion {
                generation: request.generation,
                video_url: request.video_url,
                result,
            }
        }
    }

    pub fn complete_preview(
        &mut self,
        view: &mut DownloadView,
        completion: PreviewCompletion,
    ) -> PreviewOutcome {
        if completion.generation != self.session.preview_generation {
            tracing::debug!(
                generation = completion.generation,
                current = self.session.preview_generation,
                "discarding stale preview response"
            );
            return PreviewOutcome::Stale;
        }

        match completion.result {
            Ok(preview) => {
                let download_in_flight = self.session.download_in_flight;
                self.session.phase = if download_in_flight {
                    SessionPhase::DownloadLoading
                } else {
                    SessionPhase::Previewed
                };
                self.session.resolved_url = Some(completion.video_url);
                view.show_preview(&preview, !download_in_flight);
                tracing::info!(playable = %preview.playable_url, "preview ready");
                PreviewOutcome::Shown(preview)
            }
            Err(e) => {
                self.session.phase = SessionPhase::Idle;
                self.session.resolved_url = None;
                view.preview_failed(e.user_message());
                tracing::warn!(video_url = %completion.video_url, "preview failed: {}", e);
                PreviewOutcome::Failed(e)
            }
        }
    }

    /// Whether `generation` still belongs to the preview on screen.
    pub fn is_current_preview(&self, generation: u64) -> bool {
        generation == self.session.preview_generation
            && self.session.phase != SessionPhase::PreviewLoading
    }

    pub fn fetch_thumbnail(
        &self,
        source: String,
    ) -> impl Future<Output = Result<Bytes, AppError>> + Send + 'static {
        let client = self.api_client.clone();

        async move {
            client
                .fetch_asset(&source)
                .await
                .map_err(|e| AppError::PreviewUnavailable(e.to_string()))
        }
    }

    /// Claim the download trigger. Refused unless a preview has been resolved
    /// and no download is in flight.
    pub fn trigger_download(
        &mut self,
        view: &mut DownloadView,
    ) -> Result<DownloadRequest, AppError> {
        if self.session.download_in_flight {
            return Err(AppError::DownloadInFlight);
        }

        let video_url = match (&self.session.resolved_url, self.session.phase.allows_download()) {
            (Some(url), true) => url.clone(),
            _ => return Err(AppError::NotPreviewed),
        };

        self.session.phase = SessionPhase::DownloadLoading;
        self.session.download_in_flight = true;
        view.begin_download();

        tracing::info!(%video_url, "download started");

        Ok(DownloadRequest { video_url })
    }

    pub fn execute_download(
        &self,
        request: DownloadRequest,
    ) -> impl Future<Output = Result<SaveOutcome, AppError>> + Send + 'static {
        let client = self.api_client.clone();
        let saver = Arc::clone(&self.saver);

        async move {
            let bytes = client
                .download(&request.video_url)
                .await
                .map_err(|e| AppError::DownloadFailed(e.to_string()))?;

            saver.save(DownloadPayload::new(bytes)).await
        }
    }

    pub fn complete_download(
        &mut self,
        view: &mut DownloadView,
        result: Result<SaveOutcome, AppError>,
    ) -> DownloadOutcome {
        let (outcome, status_message) = match result {
            Ok(SaveOutcome::Saved(path)) => {
                tracing::info!(path = %path.display(), "download saved");
                let status = format!("Saved: {}", path.display());
                (DownloadOutcome::Saved(path), status)
            }
            Ok(SaveOutcome::Cancelled) => {
                tracing::info!("save dialog cancelled");
                (DownloadOutcome::Cancelled, "Download cancelled".to_string())
            }
            Err(e) => {
                tracing::warn!("download failed: {}", e);
                let status = format!("Download failed: {}", e);
                (DownloadOutcome::Failed(e), status)
            }
        };

        if !self.session.download_in_flight {
            tracing::warn!("download completion without a granted trigger ignored");
            return outcome;
        }
        self.session.download_in_flight = false;

        if self.session.phase != SessionPhase::DownloadLoading {
            // A preview is pending or failed meanwhile; it owns the trigger.
            view.status_message = status_message;
            return outcome;
        }

        self.session.phase = match outcome {
            DownloadOutcome::Failed(_) => SessionPhase::DownloadError,
            _ => SessionPhase::Previewed,
        };

        let notification = match &outcome {
            DownloadOutcome::Failed(e) => Some(e.user_message()),
            _ => None,
        };
        view.finish_download(status_message, notification);

        outcome
    }
}

fn absolute_preview(
    client: &ApiClient,
    title: Option<String>,
    thumbnail: Option<&str>,
    playable: &str,
) -> Result<Preview, AppError> {
    let resolve = |reference: &str| {
        client
            .resolve(reference)
            .map(String::from)
            .map_err(|e| AppError::PreviewUnavailable(e.to_string()))
    };

    Ok(Preview {
        title,
        thumbnail_url: thumbnail.map(&resolve).transpose()?,
        playable_url: resolve(playable)?,
    })
}
