//! CTB agent core: pure upload-form state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{Msg, UploadResult};
pub use state::{AppState, RequestId, SelectedFile};
pub use update::update;
pub use view_model::{AppViewModel, HEADING, PLACEHOLDER, SUBMIT_LABEL, TITLE};
