//! Runner configuration: where to connect and which credential to present.
//!
//! Precedence for every setting: explicit value (CLI), then environment, then
//! default. The credential additionally falls back to the OS keyring.

use keyring::Entry;
use std::env;

use crate::client::{Credential, DEFAULT_BASE_URL};
use crate::{Error, ErrorContext, Result};

pub const ENV_BASE_URL: &str = "PLAYPASS_BASE_URL";
pub const ENV_PROXY_URL: &str = "PLAYPASS_PROXY_URL";
pub const ENV_TOKEN: &str = "PLAYPASS_TOKEN";

const KEYRING_SERVICE: &str = "playpass";
const KEYRING_USER: &str = "default";

/// Explicit settings, usually straight from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub proxy_url: Option<String>,
    pub max_games: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub base_url: String,
    pub proxy_url: Option<String>,
    pub credential: Credential,
    pub max_games: Option<u32>,
}

impl RunnerConfig {
    /// Resolve against the process environment and keyring.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| env::var(key).ok(), keyring_token)
    }

    /// Resolution with injectable lookups.
    pub fn resolve_with(
        overrides: Overrides,
        env_lookup: impl Fn(&str) -> Option<String>,
        keyring_lookup: impl FnOnce() -> Option<String>,
    ) -> Result<Self> {
        let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let base_url = non_empty(overrides.base_url)
            .or_else(|| non_empty(env_lookup(ENV_BASE_URL)))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_url(&base_url, ENV_BASE_URL)?;

        let proxy_url = non_empty(overrides.proxy_url).or_else(|| non_empty(env_lookup(ENV_PROXY_URL)));
        if let Some(proxy) = &proxy_url {
            validate_url(proxy, ENV_PROXY_URL)?;
        }

        let token = non_empty(overrides.token)
            .or_else(|| non_empty(env_lookup(ENV_TOKEN)))
            .or_else(|| non_empty(keyring_lookup()))
            .ok_or_else(|| {
                Error::configuration(
                    "no session token: pass --token, set PLAYPASS_TOKEN, or store one in the keyring",
                    ErrorContext::for_setting(ENV_TOKEN).origin("credential_resolver"),
                )
            })?;

        Ok(Self {
            base_url,
            proxy_url,
            credential: Credential::new(token),
            max_games: overrides.max_games,
        })
    }
}

fn validate_url(value: &str, field: &str) -> Result<()> {
    url::Url::parse(value).map(|_| ()).map_err(|e| {
        Error::configuration(
            format!("invalid URL: {}", e),
            ErrorContext::for_setting(field)
                .value(value)
                .origin("runner_config"),
        )
    })
}

fn keyring_token() -> Option<String> {
    let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
    entry.get_password().ok()
}
