use crate::ai::credentials::{CredentialManager, GATEWAY_PROVIDER};

/// Store the gateway key
pub fn set_key(key: &str) -> Result<(), String> {
    let key = key.trim();
    validate_api_key(key)?;

    CredentialManager::store_api_key(GATEWAY_PROVIDER, key)?;

    if !CredentialManager::has_api_key(GATEWAY_PROVIDER) {
        return Err("API key was stored but could not be read back".to_string());
    }

    tracing::info!("[Credentials] Gateway key stored");
    eprintln!("Gateway key stored.");
    Ok(())
}

pub fn delete_key() -> Result<(), String> {
    CredentialManager::delete_api_key(GATEWAY_PROVIDER)?;
    eprintln!("Gateway key removed.");
    Ok(())
}

fn validate_api_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("API key must not be empty".to_string());
    }
    if key.chars().any(char::is_whitespace) {
        return Err("API key must not contain whitespace".to_string());
    }
    Ok(())
}
