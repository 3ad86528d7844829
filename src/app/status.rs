use super::credentials;
use crate::config::Config;

fn configured(value: Option<&str>) -> &'static str {
    if value.is_some_and(|v| !v.trim().is_empty()) {
        "configured"
    } else {
        "missing"
    }
}

pub fn render_status(config: &Config) -> String {
    let endpoints = match config.identity.endpoints() {
        Ok((authorize, _)) => authorize,
        Err(e) => format!("invalid ({e})"),
    };

    let mut lines = vec![
        format!("◆ mentorbridge {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        format!("Config      {}", config.config_path.display()),
        format!("Database    {}", config.database_path().display()),
        String::new(),
        "Identity".to_string(),
        format!("  provider      {}", config.identity.provider),
        format!(
            "  client id     {}",
            configured(Some(config.identity.client_id.as_str()))
        ),
        format!("  authorize     {endpoints}"),
        format!("  redirect      {}", config.identity.redirect_uri),
        format!(
            "  cached login  {}",
            if credentials::load_refresh_token(config).is_some() {
                "yes"
            } else {
                "no"
            }
        ),
        String::new(),
        "Backend".to_string(),
        format!("  url           {}", config.backend.url),
        format!(
            "  anon key      {}",
            configured(Some(config.backend.anon_key.as_str()))
        ),
        format!(
            "  provider      {}",
            config.identity.backend_provider_name()
        ),
        String::new(),
        "Gateway".to_string(),
        format!(
            "  listen        {}:{}",
            config.gateway.host, config.gateway.port
        ),
        format!("  require auth  {}", config.gateway.require_auth),
        format!("  relay url     {}", config.relay.chat_url()),
        String::new(),
        "Generation".to_string(),
        format!("  backend       {:?}", config.generation.kind),
        format!("  model         {}", config.generation.model),
        format!(
            "  api key       {}",
            configured(config.generation.api_key.as_deref())
        ),
    ];

    if let Err(e) = config.validate() {
        lines.push(String::new());
        lines.push(format!("! config problem: {e}"));
    }

    lines.join("\n")
}
