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

//! # Flight Search Gateway
//!
//! Repairs caller supplied dates and location codes, keeps the provider's
//! bearer token cached, and turns every search failure into data.
//!
//! Only a failed token grant is returned as an error: without a token no
//! search can be attempted.

use crate::amadeus_client::{AmadeusClient, FlightProvider};
use crate::config::GatewayConfig;
use crate::flights_query_builder::SearchRequest;
use crate::flights_results_parser::{FlightOffer, OfferResult, SearchError};
use crate::token_cache::TokenCache;
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use travelbuddy_date_range::{
    Clock, DATE_FORMAT, DEFAULT_LEAD_DAYS, DEFAULT_STAY_DAYS, DateRange, SystemClock, add_days,
    advance_to_future,
};

pub struct FlightSearchGateway<P, C = SystemClock> {
    provider: P,
    clock: C,
    tokens: Arc<TokenCache>,
    adults: u32,
    max_results: u32,
}

impl FlightSearchGateway<AmadeusClient> {
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let tokens = Arc::new(TokenCache::new(config.token_margin_secs));
        let (adults, max_results) = (config.adults, config.max_results);
        let provider = AmadeusClient::new(config)?;
        Ok(Self::new(provider, SystemClock)
            .with_token_cache(tokens)
            .adults(adults)
            .max_results(max_results))
    }
}

impl<P: FlightProvider, C: Clock> FlightSearchGateway<P, C> {
    pub fn new(provider: P, clock: C) -> Self {
        Self {
            provider,
            clock,
            tokens: Arc::new(TokenCache::default()),
            adults: 1,
            max_results: 5,
        }
    }

    /// Share one token cache between gateways talking to the same provider.
    pub fn with_token_cache(mut self, tokens: Arc<TokenCache>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn adults(mut self, adults: u32) -> Self {
        self.adults = adults.max(1);
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Bearer token for the provider, cached until shortly before expiry.
    pub async fn access_token(&self) -> Result<String> {
        self.tokens
            .get_or_refresh(&self.clock, || self.provider.request_token())
            .await
    }

    /// Validate and repair search inputs without touching the network.
    pub fn sanitize(
        &self,
        origin_code: &str,
        dest_code: &str,
        depart_date: &str,
        return_date: Option<&str>,
    ) -> Result<SearchRequest, SearchError> {
        let depart = NaiveDate::parse_from_str(depart_date.trim(), DATE_FORMAT).map_err(|_| {
            SearchError::InvalidDepartDate {
                input: depart_date.to_string(),
            }
        })?;

        let mut ret = match return_date.map(|r| NaiveDate::parse_from_str(r.trim(), DATE_FORMAT)) {
            Some(Ok(r)) => r,
            Some(Err(_)) => {
                tracing::debug!(
                    "Unparsable return date {:?}, using a one week stay",
                    return_date
                );
                add_days(depart, DEFAULT_STAY_DAYS)
            }
            None => add_days(depart, DEFAULT_STAY_DAYS),
        };

        if ret < depart {
            tracing::debug!("Return {} precedes depart {}, resetting", ret, depart);
            ret = add_days(depart, DEFAULT_STAY_DAYS);
        }

        let today = self.clock.today();
        let (depart, ret) = if depart < today {
            let delta = (ret - depart).num_days();
            let stay = if delta > 0 {
                delta as u64
            } else {
                DEFAULT_STAY_DAYS
            };
            let moved = advance_to_future(depart, today, DEFAULT_LEAD_DAYS);
            tracing::debug!("Depart {} is in the past, moved to {}", depart, moved);
            (moved, add_days(moved, stay))
        } else {
            (depart, ret)
        };

        let origin_code = origin_code.trim().to_uppercase();
        let dest_code = dest_code.trim().to_uppercase();
        if origin_code.is_empty() || dest_code.is_empty() {
            return Err(SearchError::MissingCode {
                origin_code,
                dest_code,
            });
        }

        SearchRequest::builder(origin_code, dest_code, depart)
            .return_date(ret)
            .adults(self.adults)
            .max_results(self.max_results)
            .build()
            .map_err(|e| SearchError::Provider(format!("{:#}", e)))
    }

    /// Search offers after repairing the inputs.
    ///
    /// The outer error is a failed token grant; every other failure is the
    /// inner [`SearchError`].
    pub async fn safe_search(
        &self,
        origin_code: &str,
        dest_code: &str,
        depart_date: &str,
        return_date: Option<&str>,
    ) -> Result<OfferResult> {
        match self.sanitize(origin_code, dest_code, depart_date, return_date) {
            Ok(request) => self.search(&request).await,
            Err(e) => {
                tracing::warn!("Search rejected before calling the provider: {}", e);
                Ok(Err(e))
            }
        }
    }

    /// [`safe_search`](Self::safe_search) over an extracted date range.
    pub async fn search_range(
        &self,
        origin_code: &str,
        dest_code: &str,
        range: &DateRange,
    ) -> Result<OfferResult> {
        self.safe_search(
            origin_code,
            dest_code,
            &range.depart_str(),
            Some(&range.return_str()),
        )
        .await
    }

    /// Search with an already sanitized request.
    pub async fn search(&self, request: &SearchRequest) -> Result<OfferResult> {
        let token = self.access_token().await?;

        let search_start = std::time::Instant::now();
        match self.provider.search_offers(&token, request).await {
            Ok(raw) => {
                let offers: Vec<FlightOffer> = raw.into_iter().map(FlightOffer::from_raw).collect();
                tracing::info!(
                    "{} → {}: {} offers in {:?}",
                    request.origin_code,
                    request.dest_code,
                    offers.len(),
                    search_start.elapsed()
                );
                Ok(Ok(offers))
            }
            Err(e) => {
                tracing::warn!("Flight offers search failed: {:#}", e);
                Ok(Err(SearchError::Provider(format!("{:#}", e))))
            }
        }
    }
}
