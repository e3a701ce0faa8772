//! CTB agent engine: multipart upload pipeline and effect execution.
mod engine;
mod response;
mod types;
mod upload;

pub use engine::EngineHandle;
pub use response::render_json;
pub use types::{EngineEvent, FailureKind, RequestId, UploadError, UploadReply};
pub use upload::{ReqwestUploader, UploadSettings, Uploader, DEFAULT_ENDPOINT, DEFAULT_FIELD_NAME};
