//! Identity refresh token kept between CLI runs so `chat` can sign in silently.

use crate::config::Config;
use crate::security::SecretStore;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

const REFRESH_TOKEN_FILE: &str = "identity_refresh_token";

fn token_path(config: &Config) -> PathBuf {
    config.config_dir().join(REFRESH_TOKEN_FILE)
}

fn store(config: &Config) -> SecretStore {
    SecretStore::new(config.config_dir(), config.secrets.encrypt)
}

/// Cached refresh token, if one was saved and still decrypts.
pub fn load_refresh_token(config: &Config) -> Option<String> {
    let raw = std::fs::read_to_string(token_path(config)).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match store(config).decrypt(raw) {
        Ok(token) => Some(token),
        Err(e) => {
            tracing::warn!("ignoring unreadable cached sign-in: {e}");
            None
        }
    }
}

/// Persist (or with `None`, remove) the cached refresh token.
pub fn save_refresh_token(config: &Config, token: Option<&str>) -> Result<()> {
    let path = token_path(config);
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("remove {}", path.display()))
            }
            _ => Ok(()),
        };
    };

    let sealed = store(config).encrypt(token)?;
    write_private(&path, sealed.as_bytes()).with_context(|| format!("write {}", path.display()))
}

/// Write `contents` to a file that is `0600` from the moment it exists.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // `mode` only applies on creation; tighten a file left by an older run.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    file.sync_all()
}
