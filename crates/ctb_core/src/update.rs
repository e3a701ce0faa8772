use crate::{AppState, Effect, Msg, UploadResult};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(path) => {
            state.select_file(path);
            Vec::new()
        }
        Msg::SubmitClicked => {
            // Without a selection the click is silently ignored.
            let Some((request_id, superseded, path)) = state.begin_request() else {
                return (state, Vec::new());
            };
            let mut effects = Vec::with_capacity(1 + usize::from(superseded.is_some()));
            if let Some(request_id) = superseded {
                effects.push(Effect::CancelUpload { request_id });
            }
            effects.push(Effect::Upload { request_id, path });
            effects
        }
        Msg::UploadDone { request_id, result } => {
            let body = match result {
                UploadResult::Success { body } => Ok(body),
                UploadResult::Failed { reason } => Err(reason),
            };
            state.finish_request(request_id, body);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
