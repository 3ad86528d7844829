use anyhow::{Context, Result, bail};
use chacha20poly1305::{
    ChaCha20Poly1305, KeyInit, Nonce,
    aead::{Aead, OsRng, rand_core::RngCore},
};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

const KEY_FILE: &str = ".secret_key";
const ENC_PREFIX: &str = "ENC:";
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Encrypts config secrets (generation API key, OAuth client secret) at rest.
///
/// Values are stored as `ENC:<hex(nonce || ciphertext)>`; the key lives next
/// to `config.toml` with owner-only permissions.
pub struct SecretStore {
    root: PathBuf,
    encrypt: bool,
}

impl SecretStore {
    pub fn new(root: &Path, encrypt: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            encrypt,
        }
    }

    #[must_use]
    pub fn is_encrypted(value: &str) -> bool {
        value.starts_with(ENC_PREFIX)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if !self.encrypt || plaintext.is_empty() || Self::is_encrypted(plaintext) {
            return Ok(plaintext.to_string());
        }

        let cipher = self.cipher()?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("encryption failed: {e}"))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(format!("{ENC_PREFIX}{}", hex::encode(combined)))
    }

    /// Decrypt an `ENC:` value; plaintext passes through unchanged.
    pub fn decrypt(&self, value: &str) -> Result<String> {
        let Some(hex_str) = value.strip_prefix(ENC_PREFIX) else {
            return Ok(value.to_string());
        };

        let combined = hex::decode(hex_str).context("invalid hex in encrypted value")?;
        if combined.len() < NONCE_LEN {
            bail!("encrypted value too short");
        }
        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);

        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| anyhow::anyhow!("decryption failed: {e}"))?;

        String::from_utf8(plaintext).context("decrypted value is not valid UTF-8")
    }

    fn cipher(&self) -> Result<ChaCha20Poly1305> {
        let key = self.load_or_create_key()?;
        ChaCha20Poly1305::new_from_slice(&key).context("invalid key length")
    }

    fn key_path(&self) -> PathBuf {
        self.root.join(KEY_FILE)
    }

    fn read_key_file(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
        let hex_key = Zeroizing::new(fs::read_to_string(path).context("failed to read key file")?);
        let key = Zeroizing::new(hex::decode(hex_key.trim()).context("invalid hex in key file")?);
        if key.len() != KEY_LEN {
            bail!("key file has invalid length (expected {KEY_LEN} bytes)");
        }
        Ok(key)
    }

    fn write_new_key_file(path: &Path, key: &[u8]) -> std::io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        file.write_all(hex::encode(key).as_bytes())?;
        file.sync_all()
    }

    fn enforce_key_permissions(path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .context("failed to set key file permissions")?;
        }
        #[cfg(not(unix))]
        let _ = path;
        Ok(())
    }

    fn load_or_create_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        let path = self.key_path();
        if path.exists() {
            Self::enforce_key_permissions(&path)?;
            return Self::read_key_file(&path);
        }

        let mut key = Zeroizing::new(vec![0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut key);
        match Self::write_new_key_file(&path, &key) {
            Ok(()) => Ok(key),
            // Another process created it first; use theirs.
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                Self::enforce_key_permissions(&path)?;
                Self::read_key_file(&path)
            }
            Err(error) => Err(error).context("failed to create key file"),
        }
    }
}
