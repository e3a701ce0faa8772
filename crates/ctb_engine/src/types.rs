use std::fmt;

use thiserror::Error;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Emitted exactly once per enqueued upload.
    UploadCompleted {
        request_id: RequestId,
        result: Result<UploadReply, UploadError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReply {
    pub status: u16,
    /// Response body re-serialized as compact JSON.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct UploadError {
    pub kind: FailureKind,
    pub message: String,
}

impl UploadError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    ReadFile,
    Network,
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    InvalidJson,
    Cancelled,
    EngineStopped,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::ReadFile => write!(f, "could not read file"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => match actual {
                Some(actual) => write!(
                    f,
                    "response too large ({actual} bytes, max {max_bytes} bytes)"
                ),
                None => write!(f, "response too large (max {max_bytes} bytes)"),
            },
            FailureKind::InvalidJson => write!(f, "invalid json"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::EngineStopped => write!(f, "upload engine stopped"),
        }
    }
}
