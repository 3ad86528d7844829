use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Prefixes that begin a credential; the prefix itself is redacted too.
const SECRET_PREFIXES: [&str; 6] = ["sk-", "ya29.", "AIza", "eyJ", "sbp_", "ghp_"];

/// Markers followed by a credential value.
const SECRET_MARKERS: [&str; 13] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "\"authorization\":\"Bearer ",
    "key=",
    "apikey=",
    "api_key=",
    "access_token=",
    "refresh_token=",
    "id_token=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"refresh_token\":\"",
    "\"id_token\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

/// Redact every `marker<secret>` run in `text`. Bare markers are left alone.
fn redact_after(text: &mut String, marker: &str) {
    let mut from = 0;
    while let Some(offset) = text[from..].find(marker) {
        let start = from + offset;
        let value_start = start + marker.len();
        let value_len: usize = text[value_start..]
            .chars()
            .take_while(|c| is_secret_char(*c))
            .map(char::len_utf8)
            .sum();

        if value_len == 0 {
            from = value_start;
            continue;
        }

        text.replace_range(start..value_start + value_len, REDACTED);
        from = start + REDACTED.len();
    }
}

/// Scrub credential-looking substrings (API keys, bearer and id tokens) from
/// text that came back from an upstream API.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let hit = SECRET_PREFIXES
        .iter()
        .chain(SECRET_MARKERS.iter())
        .any(|needle| input.contains(needle));
    if !hit {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for needle in SECRET_PREFIXES.iter().chain(SECRET_MARKERS.iter()) {
        redact_after(&mut scrubbed, needle);
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets and cap the length of an upstream error body.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    match scrubbed.char_indices().nth(MAX_API_ERROR_CHARS) {
        Some((cut, _)) => format!("{}...", &scrubbed[..cut]),
        None => scrubbed.into_owned(),
    }
}

/// Build a sanitized error from a failed upstream HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    anyhow::anyhow!("{provider} API error ({status}): {}", sanitize_api_error(&body))
}
