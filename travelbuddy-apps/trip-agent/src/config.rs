//!  Travel Buddy Trip Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Gateway configuration
//!
//! Provider credentials and search defaults, read from the environment.

use anyhow::{Context, Result, ensure};
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";
pub const TOKEN_PATH: &str = "/v1/security/oauth2/token";
pub const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";

pub const ENV_CLIENT_ID: &str = "AMADEUS_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AMADEUS_CLIENT_SECRET";
pub const ENV_BASE_URL: &str = "AMADEUS_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "AMADEUS_TIMEOUT_SECS";

#[derive(Clone)]
pub struct GatewayConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub adults: u32,
    pub max_results: u32,
    /// Refresh the token this long before the provider says it expires.
    pub token_margin_secs: u64,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("adults", &self.adults)
            .field("max_results", &self.max_results)
            .field("token_margin_secs", &self.token_margin_secs)
            .finish()
    }
}

impl GatewayConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 20,
            adults: 1,
            max_results: 5,
            token_margin_secs: 60,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; `from_env` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} not set", key))
        };

        let mut config = Self::new(required(ENV_CLIENT_ID)?, required(ENV_CLIENT_SECRET)?);
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_TIMEOUT_SECS, secs))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.client_id.is_empty(), "Client id is required");
        ensure!(!self.client_secret.is_empty(), "Client secret is required");
        ensure!(
            self.base_url.starts_with("http://") || self.base_url.starts_with("https://"),
            "Base URL must be http(s): {}",
            self.base_url
        );
        ensure!(self.timeout_secs > 0, "Timeout must be positive");
        ensure!(self.adults > 0, "At least one adult is required");
        ensure!(self.max_results > 0, "max_results must be positive");
        Ok(())
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, TOKEN_PATH)
    }

    pub fn flight_offers_url(&self) -> String {
        format!("{}{}", self.base_url, FLIGHT_OFFERS_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.adults, 1);
        assert_eq!(config.max_results, 5);
        assert_eq!(
            config.token_url(),
            "https://test.api.amadeus.com/v1/security/oauth2/token"
        );
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_BASE_URL, "http://127.0.0.1:9000/"),
            (ENV_TIMEOUT_SECS, "3"),
        ]))
        .unwrap();
        assert_eq!(
            config.flight_offers_url(),
            "http://127.0.0.1:9000/v2/shopping/flight-offers"
        );
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_missing_secret_names_variable() {
        let err = GatewayConfig::from_lookup(lookup(&[(ENV_CLIENT_ID, "id")])).unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_SECRET), "{}", err);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = GatewayConfig::new("id", "hunter2");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
