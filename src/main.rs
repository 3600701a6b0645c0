mod api;
mod app;
mod application;
mod domain;
mod logging;
mod ui;
mod utils;

fn main() -> iced::Result {
    logging::init_logging();

    iced::application(app::DownloadApp::default, app::update, app::view)
        .title("TikTok Downloader")
        .theme(app::theme)
        .run()
}
