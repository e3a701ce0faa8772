use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{bail, Context};
use ctb_core::{update, AppState, AppViewModel, Msg};
use ctb_engine::{EngineHandle, ReqwestUploader, UploadSettings};
use ctb_logging::{ctb_info, ctb_warn};

use crate::effects::EffectRunner;
use crate::input::{parse_command, Command, HELP};
use crate::render::render;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Ui(Msg),
    Show,
    Help,
    Invalid(String),
    Quit,
}

pub fn run(settings: UploadSettings, file: Option<PathBuf>) -> anyhow::Result<()> {
    ctb_info!(
        "Starting with endpoint={} field={}",
        settings.endpoint,
        settings.field_name
    );
    let uploader = ReqwestUploader::new(settings).context("invalid upload settings")?;
    let engine = EngineHandle::new(uploader).context("failed to start upload runtime")?;

    let (event_tx, event_rx) = mpsc::channel();
    let controller = Controller::new(EffectRunner::new(engine, event_tx.clone()));

    match file {
        Some(path) => run_once(controller, &event_rx, path),
        None => {
            spawn_stdin_reader(event_tx);
            run_interactive(controller, &event_rx);
            Ok(())
        }
    }
}

/// Selects `path`, submits it and waits for the request to settle.
fn run_once(
    mut controller: Controller,
    event_rx: &mpsc::Receiver<AppEvent>,
    path: PathBuf,
) -> anyhow::Result<()> {
    controller.dispatch(Msg::FileSelected(Some(path)));
    controller.dispatch(Msg::SubmitClicked);

    while controller.view().submitting {
        match event_rx.recv() {
            Ok(AppEvent::Ui(msg)) => {
                controller.dispatch(msg);
            }
            Ok(_) => {}
            Err(_) => bail!("event channel closed before the upload finished"),
        }
    }

    let view = controller.view();
    println!("{}", render(&view));
    match view.error {
        Some(error) => bail!("upload failed: {error}"),
        None => Ok(()),
    }
}

fn run_interactive(mut controller: Controller, event_rx: &mpsc::Receiver<AppEvent>) {
    println!("{HELP}\n");
    println!("{}", render(&controller.view()));

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Ui(msg) => {
                if let Some(view) = controller.dispatch(msg) {
                    println!("{}", render(&view));
                }
            }
            AppEvent::Show => println!("{}", render(&controller.view())),
            AppEvent::Help => println!("{HELP}"),
            AppEvent::Invalid(message) => println!("{message}"),
            AppEvent::Quit => break,
        }
    }
    ctb_info!("Interactive session ended");
}

fn spawn_stdin_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    ctb_warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            let event = match parse_command(&line) {
                Ok(Some(Command::Ui(msg))) => AppEvent::Ui(msg),
                Ok(Some(Command::Show)) => AppEvent::Show,
                Ok(Some(Command::Help)) => AppEvent::Help,
                Ok(Some(Command::Quit)) => AppEvent::Quit,
                Ok(None) => continue,
                Err(message) => AppEvent::Invalid(message),
            };
            if event_tx.send(event).is_err() {
                return;
            }
        }
        let _ = event_tx.send(AppEvent::Quit);
    });
}

/// Owns the form state and routes its effects to the engine.
pub struct Controller {
    state: AppState,
    effects: EffectRunner,
}

impl Controller {
    pub fn new(effects: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            effects,
        }
    }

    /// Applies `msg`; returns the new view when something visible changed.
    pub fn dispatch(&mut self, msg: Msg) -> Option<AppViewModel> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.effects.enqueue(effects);
        let was_dirty = state.consume_dirty();
        self.state = state;
        was_dirty.then(|| self.state.view())
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use ctb_core::PLACEHOLDER;
    use ctb_engine::{UploadError, UploadReply, Uploader};

    use super::*;

    /// Echoes the uploaded file name; files named `slow*` answer late and
    /// files named `broken*` fail like a non-JSON reply.
    struct FakeBackend;

    #[async_trait::async_trait]
    impl Uploader for FakeBackend {
        async fn upload(
            &self,
            _request_id: u64,
            path: &Path,
        ) -> Result<UploadReply, UploadError> {
            let name = path.display().to_string();
            let delay = if name.starts_with("slow") { 300 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if name.starts_with("broken") {
                ctb_engine::render_json(b"<html>oops</html>")?;
            }
            Ok(UploadReply {
                status: 200,
                body: format!(r#"{{"file":"{name}"}}"#),
            })
        }
    }

    fn controller() -> (Controller, mpsc::Receiver<AppEvent>) {
        let engine = EngineHandle::with_uploader(Arc::new(FakeBackend)).unwrap();
        let (event_tx, event_rx) = mpsc::channel();
        (Controller::new(EffectRunner::new(engine, event_tx)), event_rx)
    }

    fn settle(controller: &mut Controller, event_rx: &mpsc::Receiver<AppEvent>) {
        while controller.view().submitting {
            match event_rx.recv_timeout(Duration::from_secs(5)) {
                Ok(AppEvent::Ui(msg)) => {
                    controller.dispatch(msg);
                }
                Ok(_) => {}
                Err(err) => panic!("no engine event: {err}"),
            }
        }
    }

    #[test]
    fn submit_without_file_changes_nothing() {
        let (mut controller, _event_rx) = controller();
        assert_eq!(controller.dispatch(Msg::SubmitClicked), None);
        assert_eq!(controller.view().output, PLACEHOLDER);
        assert!(!controller.view().submitting);
    }

    #[test]
    fn upload_result_is_rendered() {
        let (mut controller, event_rx) = controller();
        controller.dispatch(Msg::FileSelected(Some(PathBuf::from("ctb.xlsx"))));
        let view = controller.dispatch(Msg::SubmitClicked).expect("dirty");
        assert!(view.submitting);

        settle(&mut controller, &event_rx);
        assert_eq!(controller.view().output, r#"{"file":"ctb.xlsx"}"#);
    }

    #[test]
    fn newer_submit_wins_over_slower_older_one() {
        let (mut controller, event_rx) = controller();
        controller.dispatch(Msg::FileSelected(Some(PathBuf::from("slow.xlsx"))));
        controller.dispatch(Msg::SubmitClicked);
        controller.dispatch(Msg::FileSelected(Some(PathBuf::from("fast.xlsx"))));
        controller.dispatch(Msg::SubmitClicked);

        settle(&mut controller, &event_rx);
        // Give the cancelled request time to report before checking again.
        thread::sleep(Duration::from_millis(400));
        while let Ok(AppEvent::Ui(msg)) = event_rx.try_recv() {
            controller.dispatch(msg);
        }

        let view = controller.view();
        assert_eq!(view.output, r#"{"file":"fast.xlsx"}"#);
        assert_eq!(view.error, None);
    }

    #[test]
    fn failed_upload_keeps_output_and_shows_error() {
        let (mut controller, event_rx) = controller();
        controller.dispatch(Msg::FileSelected(Some(PathBuf::from("ctb.xlsx"))));
        controller.dispatch(Msg::SubmitClicked);
        settle(&mut controller, &event_rx);

        controller.dispatch(Msg::FileSelected(Some(PathBuf::from("broken.xlsx"))));
        controller.dispatch(Msg::SubmitClicked);
        settle(&mut controller, &event_rx);

        let view = controller.view();
        assert_eq!(view.output, r#"{"file":"ctb.xlsx"}"#);
        assert!(view
            .error
            .as_deref()
            .is_some_and(|error| error.starts_with("invalid json")));
    }
}
