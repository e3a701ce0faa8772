use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use ctb_logging::{ctb_debug, ctb_error, ctb_info};
use tokio_util::sync::CancellationToken;

use crate::upload::{ReqwestUploader, Uploader};
use crate::{EngineEvent, FailureKind, RequestId, UploadError};

enum EngineCommand {
    Upload { request_id: RequestId, path: PathBuf },
    Cancel { request_id: RequestId },
}

type InFlight = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Handle to the background upload runtime.
///
/// Commands are processed on a dedicated thread that owns a tokio runtime;
/// results come back through [`EngineHandle::try_recv`] or
/// [`EngineHandle::recv_timeout`]. Dropping the handle stops the thread.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(uploader: ReqwestUploader) -> io::Result<Self> {
        Self::with_uploader(Arc::new(uploader))
    }

    pub fn with_uploader(uploader: Arc<dyn Uploader>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let engine_event_tx = event_tx.clone();

        thread::spawn(move || {
            let in_flight: InFlight = Arc::default();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Upload { request_id, path } => {
                        let token = CancellationToken::new();
                        lock(&in_flight).insert(request_id, token.clone());
                        let uploader = uploader.clone();
                        let event_tx = engine_event_tx.clone();
                        let in_flight = in_flight.clone();
                        runtime.spawn(async move {
                            run_upload(uploader.as_ref(), request_id, path, token, event_tx).await;
                            lock(&in_flight).remove(&request_id);
                        });
                    }
                    EngineCommand::Cancel { request_id } => {
                        if let Some(token) = lock(&in_flight).get(&request_id) {
                            ctb_debug!("Cancelling upload request_id={}", request_id);
                            token.cancel();
                        }
                    }
                }
            }
            ctb_info!("Engine command channel closed; shutting down");
        });

        Ok(Self {
            cmd_tx,
            event_tx,
            event_rx: Mutex::new(event_rx),
        })
    }

    /// Starts an upload. If the engine thread is gone the upload completes
    /// immediately with [`FailureKind::EngineStopped`].
    pub fn upload(&self, request_id: RequestId, path: impl Into<PathBuf>) {
        let command = EngineCommand::Upload {
            request_id,
            path: path.into(),
        };
        if self.cmd_tx.send(command).is_err() {
            ctb_error!("Engine thread stopped; failing upload request_id={}", request_id);
            let _ = self.event_tx.send(EngineEvent::UploadCompleted {
                request_id,
                result: Err(UploadError::new(
                    FailureKind::EngineStopped,
                    "engine thread is not running",
                )),
            });
        }
    }

    /// Aborts an in-flight upload. Unknown or finished ids are ignored.
    pub fn cancel(&self, request_id: RequestId) {
        if self
            .cmd_tx
            .send(EngineCommand::Cancel { request_id })
            .is_err()
        {
            ctb_error!("Engine thread stopped; cannot cancel request_id={}", request_id);
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn run_upload(
    uploader: &dyn Uploader,
    request_id: RequestId,
    path: PathBuf,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let result = tokio::select! {
        _ = token.cancelled() => Err(UploadError::new(
            FailureKind::Cancelled,
            "superseded by a newer upload",
        )),
        result = uploader.upload(request_id, &path) => result,
    };
    let _ = event_tx.send(EngineEvent::UploadCompleted { request_id, result });
}

fn lock(
    in_flight: &InFlight,
) -> std::sync::MutexGuard<'_, HashMap<RequestId, CancellationToken>> {
    in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stopped_engine() -> EngineHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        drop(cmd_rx);
        let (event_tx, event_rx) = mpsc::channel();
        EngineHandle {
            cmd_tx,
            event_tx,
            event_rx: Mutex::new(event_rx),
        }
    }

    #[test]
    fn upload_on_stopped_engine_fails_immediately() {
        let engine = stopped_engine();
        engine.upload(3, "ctb.xlsx");

        match engine.try_recv() {
            Some(EngineEvent::UploadCompleted { request_id, result }) => {
                assert_eq!(request_id, 3);
                assert_eq!(result.unwrap_err().kind, FailureKind::EngineStopped);
            }
            None => panic!("expected a completion event"),
        }
    }

    #[test]
    fn cancel_on_stopped_engine_emits_nothing() {
        let engine = stopped_engine();
        engine.cancel(3);
        assert!(engine.try_recv().is_none());
    }
}
