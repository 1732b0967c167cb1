//! Startup configuration.
//!
//! Everything the client needs from its deployment is resolved once here
//! and handed to the components; nothing re-reads the environment later.

use std::env;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

pub mod env_vars {
    pub const API_URL: &str = "ECHOVAULT_API_URL";
    pub const VAPID_PUBLIC_KEY: &str = "VAPID_PUBLIC_KEY";
    pub const WORKER_PATH: &str = "ECHOVAULT_WORKER_PATH";
    pub const WORKER_SCOPE: &str = "ECHOVAULT_WORKER_SCOPE";
}

pub mod defaults {
    pub const API_URL: &str = "http://localhost:8000";
    pub const WORKER_PATH: &str = "/sw.js";
    pub const WORKER_SCOPE: &str = "/";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend origin, without trailing slash.
    pub backend_base_url: String,
    /// Base64url VAPID public key passed to the push service.
    pub vapid_public_key: Option<String>,
    pub worker_script: String,
    pub worker_scope: String,
}

impl Config {
    pub fn new(backend_base_url: &str) -> Self {
        Self {
            backend_base_url: backend_base_url.trim_end_matches('/').to_string(),
            vapid_public_key: None,
            worker_script: defaults::WORKER_PATH.to_string(),
            worker_scope: defaults::WORKER_SCOPE.to_string(),
        }
    }

    pub fn with_vapid_public_key(mut self, key: impl Into<String>) -> Self {
        self.vapid_public_key = Some(key.into());
        self
    }

    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let base_url =
            env::var(env_vars::API_URL).unwrap_or_else(|_| defaults::API_URL.to_string());
        reqwest::Url::parse(&base_url)
            .with_context(|| format!("{} is not a valid URL: {}", env_vars::API_URL, base_url))?;

        let mut config = Config::new(&base_url);
        config.vapid_public_key = env::var(env_vars::VAPID_PUBLIC_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if let Ok(path) = env::var(env_vars::WORKER_PATH) {
            config.worker_script = path;
        }
        if let Ok(scope) = env::var(env_vars::WORKER_SCOPE) {
            config.worker_scope = scope;
        }

        log::debug!("[Config] backend at {}", config.backend_base_url);
        Ok(config)
    }

    /// Decoded application server key, as the push service expects it.
    pub fn application_server_key(&self) -> Result<Vec<u8>> {
        let encoded = self
            .vapid_public_key
            .as_deref()
            .with_context(|| format!("{} is not set", env_vars::VAPID_PUBLIC_KEY))?;
        decode_server_key(encoded)
    }
}

/// Accepts base64url with or without padding, and tolerates standard-alphabet input.
pub fn decode_server_key(encoded: &str) -> Result<Vec<u8>> {
    let normalized: String = encoded
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .context("application server key is not valid base64url")
}
