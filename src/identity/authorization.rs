use crate::error::IdentityError;
use crate::security::{PkcePair, random_token, state_matches};
use url::Url;

/// An authorization-code request in flight (popup or redirect).
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub url: Url,
    pub state: String,
    pub code_verifier: String,
    pub nonce: String,
    pub redirect_uri: String,
}

pub struct AuthorizationRequest<'a> {
    pub authorize_url: &'a str,
    pub client_id: &'a str,
    pub redirect_uri: &'a str,
    pub scope: &'a str,
}

impl PendingAuthorization {
    /// Build a PKCE (S256) authorization URL with fresh state and nonce.
    pub fn begin(request: &AuthorizationRequest<'_>) -> Result<Self, IdentityError> {
        let pkce = PkcePair::generate();
        let state = random_token(16);
        let nonce = random_token(16);

        let mut url = Url::parse(request.authorize_url).map_err(|e| {
            IdentityError::Provider(format!(
                "invalid authorize url {}: {e}",
                request.authorize_url
            ))
        })?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", request.client_id)
            .append_pair("redirect_uri", request.redirect_uri)
            .append_pair("scope", request.scope)
            .append_pair("state", &state)
            .append_pair("nonce", &nonce)
            .append_pair("code_challenge", &pkce.challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(Self {
            url,
            state,
            code_verifier: pkce.verifier,
            nonce,
            redirect_uri: request.redirect_uri.to_string(),
        })
    }
}

/// Parameters the identity provider sent back to the redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCallback {
    pub code: String,
    pub state: String,
}

impl AuthorizationCallback {
    /// Parse a full callback URL (or bare `?query`) into code + state.
    pub fn parse(callback: &str) -> Result<Self, IdentityError> {
        let callback = callback.trim();
        let url = if callback.starts_with('?') {
            Url::parse(&format!("http://callback.invalid/{callback}"))
        } else {
            Url::parse(callback)
        }
        .map_err(|e| IdentityError::Callback(format!("not a URL: {e}")))?;

        let mut code = None;
        let mut state = None;
        let mut error = None;
        let mut error_description = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                "error_description" => error_description = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            let detail = error_description.map_or_else(|| error.clone(), |d| format!("{error}: {d}"));
            return Err(IdentityError::Provider(detail));
        }

        match (code, state) {
            (Some(code), Some(state)) if !code.is_empty() => Ok(Self { code, state }),
            (None | Some(_), Some(_)) => Err(IdentityError::Callback("missing code".into())),
            (_, None) => Err(IdentityError::Callback("missing state".into())),
        }
    }

    /// Reject callbacks that do not belong to `pending`.
    pub fn verify(&self, pending: &PendingAuthorization) -> Result<(), IdentityError> {
        if state_matches(&pending.state, &self.state) {
            Ok(())
        } else {
            Err(IdentityError::Callback("state mismatch".into()))
        }
    }
}
