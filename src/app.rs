use std::sync::Arc;

use iced::widget::image::Handle as ImageHandle;
use iced::{Task, Theme};

use crate::api::{ApiClient, ApiConfig};
use crate::application::{
    DialogSaver, DownloadOutcome, PreviewCompletion, PreviewOutcome, RequestOrchestrator,
};
use crate::domain::{AppError, SaveOutcome};
use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    orchestrator: RequestOrchestrator,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadApp {
    pub fn new() -> Self {
        let api_client = ApiClient::new(ApiConfig::default());
        let orchestrator = RequestOrchestrator::new(api_client, Arc::new(DialogSaver));

        Self {
            view: DownloadView::default(),
            orchestrator,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    PreviewResolved(PreviewCompletion),
    /// (Preview generation, thumbnail source, decoded image)
    ThumbnailLoaded(u64, String, Result<ImageHandle, String>),
    DownloadFinished(Result<SaveOutcome, AppError>),
    NotificationDismissed,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::PreviewPressed => {
                    let input = app.view.video_url.clone();
                    match app.orchestrator.submit_preview(&mut app.view, &input) {
                        Ok(request) => {
                            return Task::perform(
                                app.orchestrator.resolve_preview(request),
                                Message::PreviewResolved,
                            );
                        }
                        Err(e) => {
                            app.view.status_message = e.to_string();
                        }
                    }
                }
                DownloadMessage::DownloadPressed => {
                    match app.orchestrator.trigger_download(&mut app.view) {
                        Ok(request) => {
                            return Task::perform(
                                app.orchestrator.execute_download(request),
                                Message::DownloadFinished,
                            );
                        }
                        Err(e) => {
                            tracing::debug!("download trigger refused: {}", e);
                            app.view.status_message = e.to_string();
                        }
                    }
                }
                DownloadMessage::UrlChanged(_) | DownloadMessage::ThemeToggled => {}
            }
        }
        Message::PreviewResolved(completion) => {
            let generation = completion.generation;
            match app.orchestrator.complete_preview(&mut app.view, completion) {
                PreviewOutcome::Shown(preview) => {
                    if let Some(source) = preview.thumbnail_url {
                        let fetch = app.orchestrator.fetch_thumbnail(source.clone());
                        return Task::perform(
                            async move {
                                let result = match fetch.await {
                                    Ok(bytes) => decode_thumbnail(bytes).await,
                                    Err(e) => Err(e.to_string()),
                                };
                                (source, result)
                            },
                            move |(source, result)| {
                                Message::ThumbnailLoaded(generation, source, result)
                            },
                        );
                    }
                }
                PreviewOutcome::Failed(e) => return notify(e.user_message()),
                PreviewOutcome::Stale => {}
            }
        }
        Message::ThumbnailLoaded(generation, source, result) => {
            if !app.orchestrator.is_current_preview(generation) {
                return Task::none();
            }
            match result {
                Ok(handle) => {
                    app.view.set_thumbnail_image(&source, handle);
                }
                Err(e) => {
                    tracing::warn!(%source, "thumbnail unavailable: {}", e);
                }
            }
        }
        Message::DownloadFinished(result) => {
            if let DownloadOutcome::Failed(e) =
                app.orchestrator.complete_download(&mut app.view, result)
            {
                return notify(e.user_message());
            }
        }
        Message::NotificationDismissed => {
            app.view.dismiss_notification();
        }
    }
    Task::none()
}

/// Show a blocking message dialog, reported back once the user closes it.
fn notify(message: String) -> Task<Message> {
    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(rfd::MessageLevel::Warning)
                .set_title("TikTok Downloader")
                .set_description(&message)
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await;
        },
        |_| Message::NotificationDismissed,
    )
}

async fn decode_thumbnail(bytes: bytes::Bytes) -> Result<ImageHandle, String> {
    tokio::task::spawn_blocking(move || -> Result<ImageHandle, String> {
        let img = image::load_from_memory(&bytes).map_err(|e| e.to_string())?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(ImageHandle::from_rgba(width, height, rgba.into_raw()))
    })
    .await
    .map_err(|e| e.to_string())?
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

pub fn theme(app: &DownloadApp) -> Theme {
    if app.view.dark_theme {
        Theme::Dark
    } else {
        Theme::Light
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_decode_thumbnail_png() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        assert!(decode_thumbnail(bytes::Bytes::from(png)).await.is_ok());
    }

    #[tokio::test]
    async fn test_decode_thumbnail_garbage() {
        let result = decode_thumbnail(bytes::Bytes::from_static(b"not an image")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_theme_follows_toggle() {
        let mut app = DownloadApp::new();
        assert_eq!(theme(&app), Theme::Light);

        let _ = update(&mut app, Message::UiMessage(DownloadMessage::ThemeToggled));
        assert_eq!(theme(&app), Theme::Dark);
    }

    #[test]
    fn test_blank_preview_issues_no_task() {
        let mut app = DownloadApp::new();
        let _ = update(&mut app, Message::UiMessage(DownloadMessage::PreviewPressed));

        assert_eq!(app.view.status_message, "Please enter a URL first");
        assert!(!app.view.spinner_visible);
    }

    #[test]
    fn test_download_before_preview_is_refused() {
        let mut app = DownloadApp::new();
        let _ = update(&mut app, Message::UiMessage(DownloadMessage::DownloadPressed));

        assert_eq!(app.view.status_message, "No preview has been resolved yet");
        assert!(!app.view.download_enabled);
    }
}
