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

//! # Amadeus Client
//!
//! Effectful (network) calls to the OAuth token and flight-offers endpoints.
//! No retries happen here: a failed call fails once.

use crate::config::GatewayConfig;
use crate::flights_query_builder::SearchRequest;
use crate::flights_results_parser::parse_offers_response;
use crate::token_cache::AccessGrant;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Transport seam of the gateway: token grant and raw offer search.
pub trait FlightProvider: Send + Sync {
    fn request_token(&self) -> impl Future<Output = Result<AccessGrant>> + Send;

    fn search_offers(
        &self,
        token: &str,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Vec<Value>>> + Send;
}

#[derive(Clone)]
pub struct AmadeusClient {
    client: Arc<wreq::Client>,
    config: Arc<GatewayConfig>,
}

impl AmadeusClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate().context("Invalid gateway configuration")?;
        let client = wreq::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Body of a successful response, or an `HTTP error` with a body preview.
    async fn read_body(response: wreq::Response, what: &str) -> Result<String> {
        let status = response.status();
        tracing::debug!(
            "[{}] HTTP Status: {} {}",
            what,
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );

        let body = response.text().await.context("Read body")?;
        if !status.is_success() {
            let body_preview = body.chars().take(500).collect::<String>();
            bail!("HTTP error {}: {}", status, body_preview);
        }
        Ok(body)
    }
}

impl FlightProvider for AmadeusClient {
    async fn request_token(&self) -> Result<AccessGrant> {
        let url = self.config.token_url();
        let form = format!(
            "grant_type=client_credentials&client_id={}&client_secret={}",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.client_secret)
        );

        let http_start = std::time::Instant::now();
        tracing::debug!("[request_token] POST {}", url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(form)
            .send()
            .await
            .with_context(|| format!("Token request to {} failed", url))?;
        let body = Self::read_body(response, "request_token").await?;
        tracing::debug!(
            "[request_token] completed in {:?}",
            http_start.elapsed()
        );

        serde_json::from_str::<AccessGrant>(&body).context("Decode token response")
    }

    async fn search_offers(&self, token: &str, request: &SearchRequest) -> Result<Vec<Value>> {
        request.validate().context("Invalid search request")?;
        let url = request.get_search_url(&self.config.base_url);

        let http_start = std::time::Instant::now();
        tracing::info!("🔗 Flight offers URL: {}", url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Request failed")?;
        let body = Self::read_body(response, "search_offers").await?;
        tracing::info!(
            "HTTP fetch completed in {:?}, got {} KB",
            http_start.elapsed(),
            body.len() / 1024
        );

        parse_offers_response(&body).context("Parse failed")
    }
}
