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

//! # Flight Offers Results Parser
//!
//! Side-effect free decoding of flight-offers responses, and the tagged
//! result type handed back to callers of the gateway.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// One priced offer, provider order preserved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightOffer {
    /// `price.grandTotal` as the provider sent it
    pub price: Option<String>,
    pub itineraries: Value,
    pub raw: Value,
}

impl FlightOffer {
    pub fn from_raw(raw: Value) -> Self {
        let price = raw
            .pointer("/price/grandTotal")
            .and_then(|p| match p {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        let itineraries = raw
            .get("itineraries")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        Self {
            price,
            itineraries,
            raw,
        }
    }

    pub fn itinerary_count(&self) -> usize {
        self.itineraries.as_array().map_or(0, |a| a.len())
    }
}

/// Why a search produced no offers. Reported in-band, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("invalid depart date: {input:?}, expected YYYY-MM-DD")]
    InvalidDepartDate { input: String },
    #[error("missing code for origin or destination")]
    MissingCode {
        origin_code: String,
        dest_code: String,
    },
    #[error("provider call failed: {0}")]
    Provider(String),
}

impl SearchError {
    /// `{error, ...context}` record for callers expecting a list of maps.
    pub fn to_record(&self) -> Value {
        let error = self.to_string();
        match self {
            SearchError::InvalidDepartDate { input } => json!({
                "error": error,
                "depart_date": input,
            }),
            SearchError::MissingCode {
                origin_code,
                dest_code,
            } => json!({
                "error": error,
                "origin_code": origin_code,
                "dest_code": dest_code,
            }),
            SearchError::Provider(_) => json!({ "error": error }),
        }
    }
}

pub type OfferResult = std::result::Result<Vec<FlightOffer>, SearchError>;

/// Flatten a result into the list-of-records shape: offers, or a single
/// error record.
pub fn to_records(result: &OfferResult) -> Value {
    match result {
        Ok(offers) => Value::Array(
            offers
                .iter()
                .map(|o| {
                    json!({
                        "price": o.price,
                        "itineraries": o.itineraries,
                        "raw": o.raw,
                    })
                })
                .collect(),
        ),
        Err(e) => Value::Array(vec![e.to_record()]),
    }
}

/// Raw offer objects from a response body. Accepts the `{"data": [...]}`
/// envelope or a bare array.
pub fn parse_offers_response(body: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(body).context("Response is not JSON")?;
    match value {
        Value::Array(offers) => Ok(offers),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(offers)) => Ok(offers),
            Some(other) => bail!("Unexpected `data` type in response: {}", type_name(&other)),
            None if map.contains_key("errors") => {
                bail!("Provider returned errors: {}", Value::Object(map))
            }
            // no offers for the route
            None => Ok(Vec::new()),
        },
        other => bail!("Unexpected response type: {}", type_name(&other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
