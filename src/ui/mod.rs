use iced::{
    widget::{button, column, container, image, row, text, text_input, Space},
    Element, Length,
};

use crate::domain::Preview;

/// Thumbnail surface. `image` stays `None` until the bytes are fetched and decoded.
#[derive(Debug, Clone)]
pub struct ThumbnailSurface {
    pub source: String,
    pub image: Option<image::Handle>,
}

/// Main view state
pub struct DownloadView {
    pub video_url: String,
    pub status_message: String,
    pub spinner_visible: bool,
    pub preview_section_visible: bool,
    pub preview_title: Option<String>,
    /// `Some` while the thumbnail surface is visible.
    pub thumbnail: Option<ThumbnailSurface>,
    /// Source of the playable surface, `Some` while visible.
    pub video: Option<String>,
    pub download_enabled: bool,
    /// Text of the last notification raised, cleared once its dialog is dismissed.
    pub notification: Option<String>,
    pub dark_theme: bool,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            video_url: String::new(),
            status_message: "Paste a video URL to preview it".to_string(),
            spinner_visible: false,
            preview_section_visible: false,
            preview_title: None,
            thumbnail: None,
            video: None,
            download_enabled: false,
            notification: None,
            dark_theme: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    PreviewPressed,
    DownloadPressed,
    ThemeToggled,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.video_url = url;
            }
            DownloadMessage::ThemeToggled => {
                self.dark_theme = !self.dark_theme;
            }
            DownloadMessage::PreviewPressed | DownloadMessage::DownloadPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn begin_preview(&mut self) {
        self.spinner_visible = true;
        self.preview_section_visible = true;
        self.preview_title = None;
        self.thumbnail = None;
        self.video = None;
        self.download_enabled = false;
        self.status_message = "Resolving preview...".to_string();
    }

    /// Show the resolved preview. `download_ready` is false while an earlier
    /// download still holds the trigger.
    pub fn show_preview(&mut self, preview: &Preview, download_ready: bool) {
        self.spinner_visible = false;
        self.preview_title = preview.title.clone();
        self.thumbnail = preview.thumbnail_url.as_ref().map(|source| ThumbnailSurface {
            source: source.clone(),
            image: None,
        });
        self.video = Some(preview.playable_url.clone());
        self.download_enabled = download_ready;
        self.status_message = "Preview ready".to_string();
    }

    pub fn preview_failed(&mut self, message: String) {
        self.spinner_visible = false;
        self.status_message = format!("Preview failed: {}", message);
        self.notification = Some(message);
    }

    /// Attach decoded pixels to the thumbnail surface if it still shows `source`.
    pub fn set_thumbnail_image(&mut self, source: &str, handle: image::Handle) -> bool {
        match self.thumbnail.as_mut() {
            Some(surface) if surface.source == source => {
                surface.image = Some(handle);
                true
            }
            _ => false,
        }
    }

    pub fn begin_download(&mut self) {
        self.download_enabled = false;
        self.status_message = "Downloading...".to_string();
    }

    pub fn finish_download(&mut self, status_message: String, notification: Option<String>) {
        self.download_enabled = true;
        self.status_message = status_message;
        if notification.is_some() {
            self.notification = notification;
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    fn preview_section(&self) -> Element<'_, DownloadMessage> {
        let thumbnail: Element<'_, DownloadMessage> = match &self.thumbnail {
            Some(ThumbnailSurface {
                image: Some(handle),
                ..
            }) => image(handle.clone())
                .width(Length::Fixed(320.0))
                .height(Length::Fixed(180.0))
                .into(),
            Some(ThumbnailSurface { source, .. }) => text(format!("Thumbnail: {}", source))
                .size(12)
                .into(),
            None => Space::new().height(Length::Fixed(0.0)).into(),
        };

        let video: Element<'_, DownloadMessage> = match &self.video {
            Some(source) => container(text(format!("Playable stream: {}", source)).size(12))
                .padding(10)
                .into(),
            None => Space::new().height(Length::Fixed(0.0)).into(),
        };

        let spinner: Element<'_, DownloadMessage> = if self.spinner_visible {
            text("Loading preview...").size(14).into()
        } else {
            Space::new().height(Length::Fixed(0.0)).into()
        };

        let title: Element<'_, DownloadMessage> = match &self.preview_title {
            Some(title) => text(title).size(18).into(),
            None => Space::new().height(Length::Fixed(0.0)).into(),
        };

        column![spinner, title, thumbnail, video].spacing(10).into()
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let can_preview = !self.video_url.trim().is_empty();

        let preview: Element<'_, DownloadMessage> = if self.preview_section_visible {
            self.preview_section()
        } else {
            Space::new().height(Length::Fixed(0.0)).into()
        };

        column![
            text("TikTok Downloader").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("Video URL:").size(16),
            text_input("Paste TikTok URL here...", &self.video_url)
                .on_input(DownloadMessage::UrlChanged)
                .on_submit_maybe(can_preview.then_some(DownloadMessage::PreviewPressed))
                .padding(10),
            row![
                button("Preview")
                    .on_press_maybe(can_preview.then_some(DownloadMessage::PreviewPressed))
                    .padding([10, 20]),
                button("Switch Theme")
                    .on_press(DownloadMessage::ThemeToggled)
                    .padding([10, 20]),
            ]
            .spacing(10),
            preview,
            Space::new().height(Length::Fixed(10.0)),
            text(&self.status_message).size(14),
            Space::new().height(Length::Fixed(20.0)),
            button("Download MP4")
                .on_press_maybe(
                    self.download_enabled
                        .then_some(DownloadMessage::DownloadPressed)
                )
                .padding([10, 20]),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
