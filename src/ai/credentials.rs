//! Gateway key storage
//!
//! Keys live in the OS keychain. Debug builds fall back to a base64 file
//! under the user config dir when the keychain is unreachable or does not
//! hand the key back (CI, containers, headless sessions).

use base64::{engine::general_purpose::STANDARD, Engine};
use keyring::Entry;
use std::path::PathBuf;

const SERVICE_NAME: &str = "com.deckgen.cli";

/// Keychain account holding the AI gateway key
pub const GATEWAY_PROVIDER: &str = "ai-gateway";

/// Somewhere a secret can be put and later read back
pub trait SecretBackend: Send + Sync {
    fn set(&self, provider: &str, secret: &str) -> Result<(), String>;
    fn get(&self, provider: &str) -> Option<String>;
    fn delete(&self, provider: &str);
}

/// OS keychain through `keyring`
pub struct Keychain;

impl Keychain {
    fn entry(provider: &str) -> Option<Entry> {
        Entry::new(SERVICE_NAME, provider)
            .inspect_err(|e| tracing::debug!("[Credentials] Keychain unavailable: {}", e))
            .ok()
    }
}

impl SecretBackend for Keychain {
    fn set(&self, provider: &str, secret: &str) -> Result<(), String> {
        Self::entry(provider)
            .ok_or_else(|| "Keychain unavailable".to_string())?
            .set_password(secret)
            .map_err(|e| format!("Keychain write failed: {}", e))
    }

    fn get(&self, provider: &str) -> Option<String> {
        Self::entry(provider)?.get_password().ok()
    }

    fn delete(&self, provider: &str) {
        if let Some(entry) = Self::entry(provider) {
            let _ = entry.delete_credential();
        }
    }
}

/// A keychain backend plus an optional plain-file fallback directory
pub struct CredentialVault {
    backend: Box<dyn SecretBackend>,
    fallback_dir: Option<PathBuf>,
}

impl CredentialVault {
    pub fn new(backend: impl SecretBackend + 'static, fallback_dir: Option<PathBuf>) -> Self {
        Self {
            backend: Box::new(backend),
            fallback_dir,
        }
    }

    /// Keychain, with the dev file fallback in debug builds only
    pub fn system() -> Self {
        let fallback_dir = if cfg!(debug_assertions) {
            dirs::config_dir().map(|dir| dir.join("deckgen"))
        } else {
            None
        };
        Self::new(Keychain, fallback_dir)
    }

    fn fallback_path(&self, provider: &str) -> Option<PathBuf> {
        self.fallback_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}_key", provider)))
    }

    /// Store a key; a keychain write only counts once the key reads back
    pub fn store(&self, provider: &str, secret: &str) -> Result<(), String> {
        match self.backend.set(provider, secret) {
            Ok(()) if self.backend.get(provider).as_deref() == Some(secret) => {
                tracing::debug!("[Credentials] Key for '{}' saved to keychain", provider);
                return Ok(());
            }
            Ok(()) => tracing::warn!("[Credentials] Keychain did not retain key for '{}'", provider),
            Err(e) => tracing::debug!("[Credentials] {}", e),
        }

        let path = self
            .fallback_path(provider)
            .ok_or_else(|| "Secure credential storage (Keychain) unavailable".to_string())?;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }
        // Base64 is obfuscation only
        std::fs::write(&path, STANDARD.encode(secret))
            .map_err(|e| format!("Failed to write API key: {}", e))?;

        tracing::warn!("[Credentials] DEV MODE: key written to {}", path.display());
        Ok(())
    }

    pub fn get(&self, provider: &str) -> Result<String, String> {
        if let Some(secret) = self.backend.get(provider) {
            return Ok(secret);
        }

        let path = self
            .fallback_path(provider)
            .filter(|p| p.exists())
            .ok_or_else(|| "API key not found".to_string())?;

        let raw = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read API key: {}", e))?;
        let bytes = STANDARD
            .decode(raw.trim())
            .map_err(|e| format!("Invalid stored API key: {}", e))?;
        String::from_utf8(bytes).map_err(|e| format!("Invalid UTF-8: {}", e))
    }

    /// Remove the key from every place it may have been stored
    pub fn delete(&self, provider: &str) -> Result<(), String> {
        self.backend.delete(provider);

        match self.fallback_path(provider).filter(|p| p.exists()) {
            Some(path) => std::fs::remove_file(path)
                .map_err(|e| format!("Failed to delete API key file: {}", e)),
            None => Ok(()),
        }
    }
}

/// Per-provider API keys in the system vault
pub struct CredentialManager;

impl CredentialManager {
    pub fn store_api_key(provider: &str, api_key: &str) -> Result<(), String> {
        CredentialVault::system().store(provider, api_key)
    }

    pub fn get_api_key(provider: &str) -> Result<String, String> {
        CredentialVault::system().get(provider)
    }

    pub fn delete_api_key(provider: &str) -> Result<(), String> {
        CredentialVault::system().delete(provider)
    }

    pub fn has_api_key(provider: &str) -> bool {
        Self::get_api_key(provider).is_ok()
    }
}
