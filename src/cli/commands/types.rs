use crate::conversation::Mode;

/// Slash commands understood by the terminal chat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    Mode(Mode),
    History,
    SignOut,
    Quit,
    Help,
}

pub const HELP_TEXT: &str = "/mode coach|mentor -- Switch conversation mode\n\
     /history           -- Show the current conversation\n\
     /signout           -- Sign out and exit\n\
     /quit              -- Exit (conversation is already saved)\n\
     /help              -- Show this help message";
