use ctb_core::AppViewModel;

const RULE: &str = "----------------------------------------";

/// Renders the view model as a block of terminal text.
pub(crate) fn render(view: &AppViewModel) -> String {
    let mut lines = Vec::with_capacity(8);
    lines.push(format!("== {} ==", view.title));
    lines.push(view.heading.to_string());

    let file = view.selected_file.as_deref().unwrap_or("(no file selected)");
    lines.push(format!("File: {file}"));

    let button = if view.submitting {
        format!("[{}] running...", view.submit_label)
    } else {
        format!("[{}]", view.submit_label)
    };
    lines.push(button);

    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }

    lines.push(RULE.to_string());
    lines.push(view.output.clone());
    lines.push(RULE.to_string());
    lines.join("\n")
}
