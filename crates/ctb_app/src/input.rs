use std::path::PathBuf;

use ctb_core::Msg;

pub(crate) const HELP: &str = "\
Commands:
  open <path>   select the workbook to upload
  clear         clear the selection
  run           upload the selected workbook
  show          print the current view
  help          print this help
  quit          exit";

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Ui(Msg),
    Show,
    Help,
    Quit,
}

pub(crate) fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "open" | "select" => {
            if rest.is_empty() {
                return Err("open needs a path".to_string());
            }
            Command::Ui(Msg::FileSelected(Some(PathBuf::from(unquote(rest)))))
        }
        "clear" => Command::Ui(Msg::FileSelected(None)),
        "run" | "submit" => Command::Ui(Msg::SubmitClicked),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_selects_path_with_spaces() {
        assert_eq!(
            parse_command("open \"CTB week 42.xlsx\"\n"),
            Ok(Some(Command::Ui(Msg::FileSelected(Some(PathBuf::from(
                "CTB week 42.xlsx"
            ))))))
        );
        assert_eq!(
            parse_command("open data/ctb.xlsx"),
            Ok(Some(Command::Ui(Msg::FileSelected(Some(PathBuf::from(
                "data/ctb.xlsx"
            ))))))
        );
    }

    #[test]
    fn maps_buttons_to_messages() {
        assert_eq!(
            parse_command("run"),
            Ok(Some(Command::Ui(Msg::SubmitClicked)))
        );
        assert_eq!(
            parse_command("CLEAR"),
            Ok(Some(Command::Ui(Msg::FileSelected(None))))
        );
        assert_eq!(parse_command("quit"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn rejects_unknown_and_incomplete_commands() {
        assert!(parse_command("open").is_err());
        assert!(parse_command("upload ctb.xlsx").is_err());
    }
}
