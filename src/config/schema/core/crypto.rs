use super::Config;
use crate::security::SecretStore;
use anyhow::Result;

fn decrypt_secret_option(
    value: &mut Option<String>,
    store: &SecretStore,
    encrypt_enabled: bool,
) -> Result<bool> {
    let Some(current) = value.as_deref() else {
        return Ok(false);
    };

    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Ok(false);
    }

    let needs_encrypt_persist = encrypt_enabled && !SecretStore::is_encrypted(trimmed);
    *value = Some(store.decrypt(trimmed)?);

    Ok(needs_encrypt_persist)
}

fn encrypt_secret_option(value: &mut Option<String>, store: &SecretStore) -> Result<()> {
    let Some(current) = value.as_deref() else {
        return Ok(());
    };

    let trimmed = current.trim();
    if trimmed.is_empty() || SecretStore::is_encrypted(trimmed) {
        if trimmed != current {
            *value = Some(trimmed.to_string());
        }
        return Ok(());
    }

    *value = Some(store.encrypt(trimmed)?);
    Ok(())
}

impl Config {
    fn secret_store(&self) -> SecretStore {
        SecretStore::new(self.config_dir(), self.secrets.encrypt)
    }

    /// Decrypt `ENC:` values; returns true when plaintext secrets should be re-saved encrypted.
    pub(super) fn decrypt_config_secrets_in_place(&mut self) -> Result<bool> {
        let store = self.secret_store();
        let mut needs_persist = false;

        needs_persist |=
            decrypt_secret_option(&mut self.generation.api_key, &store, self.secrets.encrypt)?;
        needs_persist |= decrypt_secret_option(
            &mut self.identity.client_secret,
            &store,
            self.secrets.encrypt,
        )?;

        Ok(needs_persist)
    }

    pub(super) fn encrypt_config_secrets_in_place(&mut self) -> Result<()> {
        if !self.secrets.encrypt {
            return Ok(());
        }

        let store = self.secret_store();
        encrypt_secret_option(&mut self.generation.api_key, &store)?;
        encrypt_secret_option(&mut self.identity.client_secret, &store)?;
        Ok(())
    }

    pub(super) fn config_for_persistence(&self) -> Result<Self> {
        let mut persisted = self.clone();
        persisted.encrypt_config_secrets_in_place()?;
        Ok(persisted)
    }
}
