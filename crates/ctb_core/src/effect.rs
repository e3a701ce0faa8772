use std::path::PathBuf;

use crate::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Upload the file at `path` as a single multipart POST.
    Upload { request_id: RequestId, path: PathBuf },
    /// A newer submit superseded this request; its result will be ignored.
    CancelUpload { request_id: RequestId },
}
