use super::Config;

fn non_empty_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_env(&["MENTORBRIDGE_API_KEY", "GEMINI_API_KEY"]) {
            self.generation.api_key = Some(key);
        }

        if let Some(model) = non_empty_env(&["MENTORBRIDGE_MODEL"]) {
            self.generation.model = model;
        }

        if let Some(url) = non_empty_env(&["MENTORBRIDGE_BACKEND_URL"]) {
            self.backend.url = url;
        }

        if let Some(key) = non_empty_env(&["MENTORBRIDGE_BACKEND_ANON_KEY"]) {
            self.backend.anon_key = key;
        }

        if let Some(client_id) = non_empty_env(&["MENTORBRIDGE_CLIENT_ID"]) {
            self.identity.client_id = client_id;
        }

        if let Some(url) = non_empty_env(&["MENTORBRIDGE_RELAY_URL"]) {
            self.relay.base_url = url;
        }

        if let Some(port) = non_empty_env(&["MENTORBRIDGE_GATEWAY_PORT", "PORT"])
            .and_then(|p| p.parse::<u16>().ok())
        {
            self.gateway.port = port;
        }

        if let Some(host) = non_empty_env(&["MENTORBRIDGE_GATEWAY_HOST", "HOST"]) {
            self.gateway.host = host;
        }

        if let Some(temp) = non_empty_env(&["MENTORBRIDGE_TEMPERATURE"])
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|t| (0.0..=2.0).contains(t))
        {
            self.generation.temperature = temp;
        }
    }
}
