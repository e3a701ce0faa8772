use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file; `None` clears the selection.
    FileSelected(Option<PathBuf>),
    /// User clicked the submit button.
    SubmitClicked,
    /// Engine finished a request, successfully or not.
    UploadDone {
        request_id: crate::RequestId,
        result: UploadResult,
    },
    /// UI/render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

/// Outcome of one upload as seen by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    /// Response body rendered as compact JSON text.
    Success { body: String },
    /// Human readable failure reason.
    Failed { reason: String },
}
