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

//! # Access Token Cache
//!
//! Holds the bearer token of a client-credentials grant and refreshes it a
//! safety margin before the provider's expiry.
//!
//! State: `Empty -> Valid -> Expired -> Valid`, driven by the clock only.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::future::Future;
use tokio::sync::Mutex;
use travelbuddy_date_range::Clock;

/// Lifetime assumed when the provider omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 1800;
pub const DEFAULT_MARGIN_SECS: u64 = 60;
const MAX_LIFETIME_SECS: u64 = 366 * 24 * 3600;

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessGrant {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Empty,
    Valid { expires_at: DateTime<Utc> },
    Expired { expired_at: DateTime<Utc> },
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Shared token slot. The lock is held across a refresh so concurrent
/// callers wait for one grant instead of each requesting their own.
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
    margin: Duration,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN_SECS)
    }
}

impl TokenCache {
    pub fn new(margin_secs: u64) -> Self {
        Self {
            slot: Mutex::new(None),
            margin: Duration::seconds(margin_secs.min(MAX_LIFETIME_SECS) as i64),
        }
    }

    pub async fn status<C: Clock + ?Sized>(&self, clock: &C) -> TokenStatus {
        match self.slot.lock().await.as_ref() {
            None => TokenStatus::Empty,
            Some(t) if clock.now() < t.expires_at => TokenStatus::Valid {
                expires_at: t.expires_at,
            },
            Some(t) => TokenStatus::Expired {
                expired_at: t.expires_at,
            },
        }
    }

    /// The cached token while it is valid, otherwise the result of `fetch`.
    ///
    /// A failed fetch leaves the previous state untouched and is returned as
    /// the error.
    pub async fn get_or_refresh<C, F, Fut>(&self, clock: &C, fetch: F) -> Result<String>
    where
        C: Clock + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessGrant>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            if clock.now() < cached.expires_at {
                tracing::trace!("Using cached access token until {}", cached.expires_at);
                return Ok(cached.token.clone());
            }
            tracing::debug!("Access token expired at {}, refreshing", cached.expires_at);
        }

        let fetch_start = std::time::Instant::now();
        let grant = fetch().await.context("Failed to obtain access token")?;
        let expires_in = grant
            .expires_in
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS)
            .min(MAX_LIFETIME_SECS);
        let expires_at = clock.now() + Duration::seconds(expires_in as i64) - self.margin;
        tracing::info!(
            "Obtained access token in {:?}, valid until {}",
            fetch_start.elapsed(),
            expires_at
        );

        *slot = Some(CachedToken {
            token: grant.access_token.clone(),
            expires_at,
        });
        Ok(grant.access_token)
    }
}
