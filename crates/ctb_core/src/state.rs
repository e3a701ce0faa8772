use std::path::{Path, PathBuf};

use crate::view_model::{AppViewModel, HEADING, PLACEHOLDER, SUBMIT_LABEL, TITLE};

pub type RequestId = u64;

/// File chosen by the user. Only the path is kept; the bytes are read at upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

impl SelectedFile {
    pub fn new(path: PathBuf) -> Self {
        let name = display_name(&path);
        Self { path, name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    selected_file: Option<SelectedFile>,
    last_response: String,
    last_error: Option<String>,
    in_flight: Option<RequestId>,
    next_request_id: RequestId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selected_file: None,
            last_response: String::new(),
            last_error: None,
            in_flight: None,
            next_request_id: 1,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let output = if self.last_response.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            self.last_response.clone()
        };

        AppViewModel {
            title: TITLE,
            heading: HEADING,
            submit_label: SUBMIT_LABEL,
            selected_file: self.selected_file.as_ref().map(|file| file.name.clone()),
            submitting: self.in_flight.is_some(),
            output,
            error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Returns whether the state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn select_file(&mut self, path: Option<PathBuf>) {
        self.selected_file = path.map(SelectedFile::new);
        self.dirty = true;
    }

    /// Starts a new request for the selected file.
    ///
    /// Returns the new id, the id it supersedes (if any) and the path to upload.
    pub(crate) fn begin_request(&mut self) -> Option<(RequestId, Option<RequestId>, PathBuf)> {
        let path = self.selected_file.as_ref()?.path.clone();
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let superseded = self.in_flight.replace(request_id);
        self.last_error = None;
        self.dirty = true;
        Some((request_id, superseded, path))
    }

    /// Applies a finished request. Results for anything but the current
    /// in-flight request are dropped; returns whether the result was accepted.
    pub(crate) fn finish_request(&mut self, request_id: RequestId, body: Result<String, String>) -> bool {
        if self.in_flight != Some(request_id) {
            return false;
        }
        self.in_flight = None;
        match body {
            Ok(body) => {
                self.last_response = body;
                self.last_error = None;
            }
            Err(reason) => {
                self.last_error = Some(reason);
            }
        }
        self.dirty = true;
        true
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
