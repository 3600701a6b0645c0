pub mod file_saver;
pub mod request_orchestrator;

pub use file_saver::{DialogSaver, FileSaver};
pub use request_orchestrator::{
    DownloadOutcome, PreviewCompletion, PreviewOutcome, RequestOrchestrator,
};
