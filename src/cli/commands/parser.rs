use super::types::ChatCommand;
use crate::conversation::Mode;
use std::str::FromStr;

/// Parse a chat line. `None` means the line is a message, not a command.
pub fn parse_command(input: &str) -> Option<Result<ChatCommand, String>> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let arg = parts.next();

    let command = match (name.as_str(), arg) {
        ("mode", Some(mode)) => Mode::from_str(&mode.to_ascii_lowercase())
            .map(ChatCommand::Mode)
            .map_err(|_| format!("unknown mode '{mode}' (expected coach or mentor)")),
        ("mode", None) => Err("usage: /mode coach|mentor".to_string()),
        ("coach", None) => Ok(ChatCommand::Mode(Mode::Coach)),
        ("mentor", None) => Ok(ChatCommand::Mode(Mode::Mentor)),
        ("history", None) => Ok(ChatCommand::History),
        ("signout" | "logout", None) => Ok(ChatCommand::SignOut),
        ("quit" | "exit" | "q", None) => Ok(ChatCommand::Quit),
        ("help" | "?", None) => Ok(ChatCommand::Help),
        _ => Err(format!("unknown command '{input}', try /help")),
    };
    Some(command)
}
