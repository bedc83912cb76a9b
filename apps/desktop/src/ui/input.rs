use shared::domain::TodoId;

pub const HELP: &str = "commands: add | edit <id> | delete <id> | type <text> | save | cancel | reload | help | quit";

/// One user gesture typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    OpenAdd,
    OpenEdit(TodoId),
    OpenDelete(TodoId),
    Type(String),
    Confirm,
    Cancel,
    Reload,
    Help,
    Quit,
}

pub fn parse_intent(line: &str) -> Result<Intent, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (trimmed, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "add" | "new" => Ok(Intent::OpenAdd),
        "edit" => parse_id(rest).map(Intent::OpenEdit),
        "delete" | "del" | "rm" => parse_id(rest).map(Intent::OpenDelete),
        // Text is kept verbatim, surrounding spaces included; validation happens on save.
        "type" | "text" => Ok(Intent::Type(rest.to_string())),
        "save" | "confirm" | "yes" | "y" => Ok(Intent::Confirm),
        "cancel" | "no" | "n" => Ok(Intent::Cancel),
        "reload" | "refresh" => Ok(Intent::Reload),
        "help" | "?" => Ok(Intent::Help),
        "quit" | "exit" | "q" => Ok(Intent::Quit),
        "" => Err(HELP.to_string()),
        other => Err(format!("unknown command '{other}'; {HELP}")),
    }
}

fn parse_id(raw: &str) -> Result<TodoId, String> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .map(TodoId)
        .map_err(|_| format!("expected a numeric todo id, got '{raw}'"))
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
