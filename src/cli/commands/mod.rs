use crate::conversation::Mode;
use clap::{Parser, Subcommand};

pub mod parser;
pub mod types;

pub use parser::parse_command;
pub use types::ChatCommand;

/// `mentorbridge` - AI coach & mentor chat with a minimal generation relay.
#[derive(Parser, Debug)]
#[command(name = "mentorbridge")]
#[command(version)]
#[command(about = "AI coach & mentor chat: sign in, then talk to a coach or a mentor.", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the relay gateway (chat relay, conversation table, realtime feed)
    Serve {
        /// Port to listen on (use 0 for random available port; default: gateway.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default: gateway.host)
        #[arg(long)]
        host: Option<String>,
    },

    /// Sign in and exchange the identity for a backend session
    Signin {
        /// Skip the browser popup and complete sign-in by pasting the callback URL
        #[arg(long)]
        redirect: bool,
    },

    /// Sign in, then chat in the terminal
    Chat {
        /// Conversation mode
        #[arg(short, long, default_value = "coach")]
        mode: Mode,

        /// Skip the browser popup and complete sign-in by pasting the callback URL
        #[arg(long)]
        redirect: bool,
    },

    /// Show configuration status
    Status,
}
