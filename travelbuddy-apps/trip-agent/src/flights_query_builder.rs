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

//! # Flight Offers Query Builder
//!
//! Side-effect free construction of flight-offers search requests and their
//! query strings.

use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use serde::Serialize;
use travelbuddy_date_range::DATE_FORMAT;

use crate::config::FLIGHT_OFFERS_PATH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub origin_code: String,
    pub dest_code: String,
    pub depart_date: String,
    pub return_date: Option<String>,
    pub adults: u32,
    pub max_results: u32,
}

impl SearchRequest {
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(!self.origin_code.is_empty(), "Origin code is required");
        ensure!(!self.dest_code.is_empty(), "Destination code is required");
        ensure!(self.adults > 0, "At least one adult is required");
        ensure!(self.max_results > 0, "max_results must be positive");

        let depart = NaiveDate::parse_from_str(&self.depart_date, DATE_FORMAT)
            .context("Invalid depart date")?;
        if let Some(rd) = &self.return_date {
            let ret = NaiveDate::parse_from_str(rd, DATE_FORMAT).context("Invalid return date")?;
            ensure!(
                ret >= depart,
                "Return date {} is before depart date {}",
                rd,
                self.depart_date
            );
        }
        Ok(())
    }

    /// Query parameters in the order the provider documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("originLocationCode", self.origin_code.clone()),
            ("destinationLocationCode", self.dest_code.clone()),
            ("departureDate", self.depart_date.clone()),
        ];
        if let Some(rd) = &self.return_date {
            pairs.push(("returnDate", rd.clone()));
        }
        pairs.push(("adults", self.adults.to_string()));
        pairs.push(("max", self.max_results.to_string()));
        pairs
    }

    pub fn query_string(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn get_search_url(&self, base_url: &str) -> String {
        format!(
            "{}{}?{}",
            base_url.trim_end_matches('/'),
            FLIGHT_OFFERS_PATH,
            self.query_string()
        )
    }

    pub fn builder(
        origin_code: impl Into<String>,
        dest_code: impl Into<String>,
        depart_date: NaiveDate,
    ) -> SearchRequestBuilder {
        SearchRequestBuilder {
            origin_code: origin_code.into(),
            dest_code: dest_code.into(),
            depart_date,
            return_date: None,
            adults: 1,
            max_results: 5,
        }
    }
}

#[derive(Clone)]
pub struct SearchRequestBuilder {
    origin_code: String,
    dest_code: String,
    depart_date: NaiveDate,
    return_date: Option<NaiveDate>,
    adults: u32,
    max_results: u32,
}

impl SearchRequestBuilder {
    pub fn return_date(mut self, return_date: NaiveDate) -> Self {
        self.return_date = Some(return_date);
        self
    }

    pub fn adults(mut self, adults: u32) -> Self {
        self.adults = adults;
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn build(self) -> Result<SearchRequest> {
        let request = SearchRequest {
            origin_code: self.origin_code.trim().to_uppercase(),
            dest_code: self.dest_code.trim().to_uppercase(),
            depart_date: self.depart_date.format(DATE_FORMAT).to_string(),
            return_date: self.return_date.map(|d| d.format(DATE_FORMAT).to_string()),
            adults: self.adults,
            max_results: self.max_results,
        };
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_query_string_roundtrip() {
        let request = SearchRequest::builder("par", " BER ", d(2027, 2, 5))
            .return_date(d(2027, 2, 12))
            .build()
            .unwrap();

        assert_eq!(request.origin_code, "PAR");
        assert_eq!(request.dest_code, "BER");
        assert_eq!(
            request.query_string(),
            "originLocationCode=PAR&destinationLocationCode=BER&departureDate=2027-02-05&returnDate=2027-02-12&adults=1&max=5"
        );
    }

    #[test]
    fn test_get_search_url_one_way() {
        let request = SearchRequest::builder("LAX", "CDG", d(2027, 8, 1))
            .adults(2)
            .max_results(10)
            .build()
            .unwrap();

        let url = request.get_search_url("https://test.api.amadeus.com/");
        assert_eq!(
            url,
            "https://test.api.amadeus.com/v2/shopping/flight-offers?originLocationCode=LAX&destinationLocationCode=CDG&departureDate=2027-08-01&adults=2&max=10"
        );
    }

    #[test]
    fn test_builder_validation() {
        assert!(
            SearchRequest::builder("", "JFK", d(2027, 7, 15))
                .build()
                .is_err(),
            "empty origin should fail"
        );
        assert!(
            SearchRequest::builder("SFO", "JFK", d(2027, 7, 15))
                .adults(0)
                .build()
                .is_err(),
            "zero adults should fail"
        );
        assert!(
            SearchRequest::builder("SFO", "JFK", d(2027, 7, 15))
                .return_date(d(2027, 7, 1))
                .build()
                .is_err(),
            "inverted range should fail"
        );
    }
}
