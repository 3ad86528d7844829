use super::signin::SignIn;
use super::style;
use crate::bridge::BridgeState;
use crate::cli::commands::types::HELP_TEXT;
use crate::cli::{ChatCommand, parse_command};
use crate::config::Config;
use crate::conversation::{
    ChatController, ConversationStore, Message, Mode, RemoteConversationStore, Role, SendOutcome,
};
use crate::relay::{Relay, RelayClient};
use anyhow::Result;
use dialoguer::Input;
use std::sync::Arc;

fn print_message(message: &Message, mode: Mode) {
    let label = match message.role {
        Role::User => style::user_label("you"),
        Role::Assistant => style::assistant_label(mode),
    };
    println!("{label}: {}", message.content);
}

fn print_history(controller: &ChatController) {
    println!();
    println!("{}", style::header(format!("── {} ──", controller.mode())));
    for message in controller.messages() {
        print_message(message, controller.mode());
    }
    println!();
}

async fn open_controller(
    config: &Config,
    relay: &Arc<dyn Relay>,
    user_id: &str,
    bearer: &str,
    mode: Mode,
) -> ChatController {
    let store: Arc<dyn ConversationStore> = Arc::new(RemoteConversationStore::new(
        config.relay.conversations_url(),
        bearer,
    ));
    ChatController::open(
        user_id,
        mode,
        Arc::clone(relay),
        store,
        Some(bearer.to_string()),
    )
    .await
}

fn session_credentials(state: &BridgeState) -> Option<(String, String)> {
    match state {
        BridgeState::Ready(session) => {
            Some((session.user_id().to_string(), session.bearer().to_string()))
        }
        _ => None,
    }
}

/// What the chat loop does with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum LineAction {
    /// Blank input; nothing is refreshed or sent.
    Skip,
    Command(Result<ChatCommand, String>),
    Send,
}

fn classify_line(line: &str) -> LineAction {
    if line.trim().is_empty() {
        return LineAction::Skip;
    }
    match parse_command(line) {
        Some(command) => LineAction::Command(command),
        None => LineAction::Send,
    }
}

/// Sign in, then run the terminal chat loop until `/quit` or `/signout`.
pub async fn run(config: &Config, mode: Mode, redirect: bool) -> Result<()> {
    let mut signin = SignIn::from_config(config, redirect)?;
    if !signin.run_interactive().await? {
        return Ok(());
    }
    signin.persist(config)?;

    let Some((user_id, mut bearer)) = session_credentials(signin.bridge.state()) else {
        anyhow::bail!("signed in without a session");
    };

    let relay: Arc<dyn Relay> = Arc::new(RelayClient::new(config.relay.chat_url()));
    let mut controller = open_controller(config, &relay, &user_id, &bearer, mode).await;
    print_history(&controller);
    println!("{}", style::dim("Type a message, or /help for commands."));

    loop {
        let line: String = Input::new()
            .with_prompt(style::user_label("you"))
            .allow_empty(true)
            .interact_text()?;

        match classify_line(&line) {
            LineAction::Skip => continue,
            LineAction::Command(Ok(ChatCommand::Mode(next))) => {
                controller.switch_mode(next).await;
                print_history(&controller);
                continue;
            }
            LineAction::Command(Ok(ChatCommand::History)) => {
                print_history(&controller);
                continue;
            }
            LineAction::Command(Ok(ChatCommand::Help)) => {
                println!("{HELP_TEXT}");
                continue;
            }
            LineAction::Command(Ok(ChatCommand::Quit)) => return Ok(()),
            LineAction::Command(Ok(ChatCommand::SignOut)) => {
                signin.bridge.sign_out().await;
                signin.persist(config)?;
                println!("{} Signed out", style::success("✓"));
                return Ok(());
            }
            LineAction::Command(Err(message)) => {
                println!("{}", style::error(message));
                continue;
            }
            LineAction::Send => {}
        }

        signin.bridge.ensure_fresh().await;
        match session_credentials(signin.bridge.state()) {
            Some((_, fresh)) if fresh != bearer => {
                bearer = fresh;
                signin.persist(config)?;
                controller =
                    open_controller(config, &relay, &user_id, &bearer, controller.mode()).await;
            }
            Some(_) => {}
            None => {
                signin.persist(config)?;
                println!(
                    "{} Your session ended. Run `mentorbridge chat` to sign in again.",
                    style::error("!")
                );
                return Ok(());
            }
        }

        match controller.send(&line).await {
            SendOutcome::Skipped => {}
            SendOutcome::Replied | SendOutcome::Failed => {
                if let Some(reply) = controller.messages().last() {
                    print_message(reply, controller.mode());
                }
            }
        }
    }
}
