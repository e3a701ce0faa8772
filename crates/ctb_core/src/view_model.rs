/// Window title.
pub const TITLE: &str = "Supply Chain Agent";
/// Heading shown above the file picker.
pub const HEADING: &str = "Upload CTB Excel File";
/// Label of the submit button.
pub const SUBMIT_LABEL: &str = "Run Agent";
/// Output text shown until the first response is accepted.
pub const PLACEHOLDER: &str = "Results will show here...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub title: &'static str,
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub selected_file: Option<String>,
    pub submitting: bool,
    /// Last accepted response, or [`PLACEHOLDER`].
    pub output: String,
    pub error: Option<String>,
    pub dirty: bool,
}
