use ethers::core::k256::ecdsa::SigningKey;
use ethers::signers::{LocalWallet, Signer};
use std::env;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const AGENT_FID: &str = "AGENT_FID";
    pub const AGENT_HANDLE: &str = "AGENT_HANDLE";
    pub const NEYNAR_API_KEY: &str = "NEYNAR_API_KEY";
    pub const NEYNAR_API_BASE: &str = "NEYNAR_API_BASE";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_ENDPOINT: &str = "OPENAI_ENDPOINT";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    // Prompts are kept out of the repo and supplied by the deployment
    pub const SYSTEM_PROMPT: &str = "SYSTEM_PROMPT";
    pub const FOLLOW_EVAL_PROMPT: &str = "FOLLOW_EVAL_PROMPT";
    pub const CUSTODY_PRIVATE_KEY: &str = "CUSTODY_PRIVATE_KEY";
    pub const SIGNER_PRIVATE_KEY: &str = "SIGNER_PRIVATE_KEY";
    pub const FARCASTER_HUB_URL: &str = "FARCASTER_HUB_URL";
    pub const FOLLOW_API_TOKEN: &str = "FOLLOW_API_TOKEN";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const AGENT_FID: u64 = 2634873;
    pub const AGENT_HANDLE: &str = "@claudeagent";
    pub const NEYNAR_API_BASE: &str = "https://api.neynar.com";
    pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
    pub const OPENAI_MODEL: &str = "gpt-5.2";
    pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
    pub const FOLLOW_EVAL_PROMPT: &str = "Evaluate if this user is worth following. Respond with JSON: {\"shouldFollow\": true/false, \"reason\": \"explanation\", \"confidence\": \"high/medium/low\"}";
    pub const FARCASTER_HUB_URL: &str = "https://hub-api.neynar.com";
}

/// Read an env var, treating empty values as unset
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a numeric env var, falling back to the default (with a warning) when malformed
fn parse_var<T: std::str::FromStr + std::fmt::Display + Copy>(name: &str, default: T) -> T {
    match non_empty_var(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{} is not a valid number ({:?}), using default {}", name, raw, default);
            default
        }),
        None => default,
    }
}

/// Derive the public address from a private key
pub fn derive_address_from_private_key(private_key: &str) -> Result<String, String> {
    let key_hex = private_key.strip_prefix("0x").unwrap_or(private_key);
    let key_bytes = hex::decode(key_hex)
        .map_err(|e| format!("Invalid private key hex: {}", e))?;
    if key_bytes.len() != 32 {
        return Err(format!("Invalid private key length: {} bytes", key_bytes.len()));
    }

    let signing_key = SigningKey::from_bytes(key_bytes.as_slice().into())
        .map_err(|e| format!("Invalid private key: {}", e))?;

    let wallet = LocalWallet::from(signing_key);
    Ok(format!("{:?}", wallet.address()).to_lowercase())
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub agent_fid: u64,
    pub agent_handle: String,
    pub neynar_api_key: String,
    pub neynar_api_base: String,
    pub openai_api_key: String,
    pub openai_endpoint: String,
    pub openai_model: String,
    pub system_prompt: String,
    pub follow_eval_prompt: String,
    pub custody_private_key: Option<String>,
    pub signer_private_key: Option<String>,
    /// Derived from the custody key at startup, for status reporting only
    pub custody_address: Option<String>,
    pub hub_url: String,
    pub follow_api_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let custody_private_key = non_empty_var(env_vars::CUSTODY_PRIVATE_KEY);

        // No panic when the key is malformed; posting does not depend on it
        let custody_address = custody_private_key.as_ref().and_then(|pk| {
            derive_address_from_private_key(pk)
                .map_err(|e| log::warn!("Failed to derive custody address: {}", e))
                .ok()
        });

        Self {
            port: parse_var(env_vars::PORT, defaults::PORT),
            agent_fid: parse_var(env_vars::AGENT_FID, defaults::AGENT_FID),
            agent_handle: non_empty_var(env_vars::AGENT_HANDLE)
                .unwrap_or_else(|| defaults::AGENT_HANDLE.to_string()),
            neynar_api_key: env::var(env_vars::NEYNAR_API_KEY).unwrap_or_default(),
            neynar_api_base: non_empty_var(env_vars::NEYNAR_API_BASE)
                .unwrap_or_else(|| defaults::NEYNAR_API_BASE.to_string()),
            openai_api_key: env::var(env_vars::OPENAI_API_KEY).unwrap_or_default(),
            openai_endpoint: non_empty_var(env_vars::OPENAI_ENDPOINT)
                .unwrap_or_else(|| defaults::OPENAI_ENDPOINT.to_string()),
            openai_model: non_empty_var(env_vars::OPENAI_MODEL)
                .unwrap_or_else(|| defaults::OPENAI_MODEL.to_string()),
            system_prompt: non_empty_var(env_vars::SYSTEM_PROMPT)
                .unwrap_or_else(|| defaults::SYSTEM_PROMPT.to_string()),
            follow_eval_prompt: non_empty_var(env_vars::FOLLOW_EVAL_PROMPT)
                .unwrap_or_else(|| defaults::FOLLOW_EVAL_PROMPT.to_string()),
            custody_private_key,
            signer_private_key: non_empty_var(env_vars::SIGNER_PRIVATE_KEY),
            custody_address,
            hub_url: non_empty_var(env_vars::FARCASTER_HUB_URL)
                .unwrap_or_else(|| defaults::FARCASTER_HUB_URL.to_string()),
            follow_api_token: non_empty_var(env_vars::FOLLOW_API_TOKEN),
        }
    }

    /// Config for tests: defaults everywhere, nothing read from the environment
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            port: defaults::PORT,
            agent_fid: defaults::AGENT_FID,
            agent_handle: defaults::AGENT_HANDLE.to_string(),
            neynar_api_key: String::new(),
            neynar_api_base: defaults::NEYNAR_API_BASE.to_string(),
            openai_api_key: String::new(),
            openai_endpoint: defaults::OPENAI_ENDPOINT.to_string(),
            openai_model: defaults::OPENAI_MODEL.to_string(),
            system_prompt: defaults::SYSTEM_PROMPT.to_string(),
            follow_eval_prompt: defaults::FOLLOW_EVAL_PROMPT.to_string(),
            custody_private_key: None,
            signer_private_key: None,
            custody_address: None,
            hub_url: defaults::FARCASTER_HUB_URL.to_string(),
            follow_api_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_address_from_known_key() {
        // Hardhat account #0
        let addr = derive_address_from_private_key(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        assert_eq!(addr, "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    }

    #[test]
    fn test_derive_address_rejects_garbage() {
        assert!(derive_address_from_private_key("not-hex").is_err());
        assert!(derive_address_from_private_key("0x1234").is_err());
    }
}
