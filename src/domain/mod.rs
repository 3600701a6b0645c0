pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{DownloadPayload, Preview, SaveOutcome, SessionPhase, SessionState};
