use crate::cli::{Cli, Commands};
use crate::config::Config;
use anyhow::{Context, Result};
use tracing::info;

use super::signin::SignIn;
use super::status::render_status;
use super::style;

async fn run_signin(config: &Config, redirect: bool) -> Result<()> {
    let mut signin = SignIn::from_config(config, redirect)?;
    let signed_in = signin.run_interactive().await?;
    signin.persist(config)?;
    if signed_in {
        println!(
            "  {}",
            style::dim("`mentorbridge chat` will reuse this sign-in silently.")
        );
    }
    Ok(())
}

/// Route a parsed command line to its flow.
pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            info!(%host, port, "starting gateway");
            crate::gateway::run_gateway(&host, port, config)
                .await
                .context("gateway stopped")
        }

        Commands::Signin { redirect } => run_signin(&config, redirect).await,

        Commands::Chat { mode, redirect } => super::chat::run(&config, mode, redirect).await,

        Commands::Status => {
            println!("{}", render_status(&config));
            Ok(())
        }
    }
}
