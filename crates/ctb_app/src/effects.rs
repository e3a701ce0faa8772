use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use ctb_core::{Effect, Msg, UploadResult};
use ctb_engine::{EngineEvent, EngineHandle, FailureKind};
use ctb_logging::{ctb_debug, ctb_info, ctb_warn};

use crate::app::AppEvent;

const EVENT_POLL: Duration = Duration::from_millis(75);

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: Arc<EngineHandle>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let runner = Self {
            engine: Arc::new(engine),
        };
        runner.spawn_event_loop(event_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Upload { request_id, path } => {
                    ctb_info!("Upload request_id={} path={}", request_id, path.display());
                    self.engine.upload(request_id, path);
                }
                Effect::CancelUpload { request_id } => {
                    ctb_info!("CancelUpload request_id={}", request_id);
                    self.engine.cancel(request_id);
                }
            }
        }
    }

    fn spawn_event_loop(&self, event_tx: mpsc::Sender<AppEvent>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            // Idle polls double as render ticks; a closed channel ends the loop.
            let msg = match engine.recv_timeout(EVENT_POLL) {
                Some(event) => map_event(event),
                None => Msg::Tick,
            };
            if event_tx.send(AppEvent::Ui(msg)).is_err() {
                break;
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadCompleted { request_id, result } => {
            let result = match result {
                Ok(reply) => UploadResult::Success { body: reply.body },
                Err(err) => {
                    if err.kind == FailureKind::Cancelled {
                        ctb_debug!("Upload {} cancelled", request_id);
                    } else {
                        ctb_warn!("Upload {} failed: {}", request_id, err);
                    }
                    UploadResult::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            Msg::UploadDone { request_id, result }
        }
    }
}
