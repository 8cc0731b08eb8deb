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

// Library for travelbuddy-trip-agent
// Date range extraction re-exports and the flight offers gateway

mod amadeus_client;
mod config;
mod flights_query_builder;
mod flights_results_parser;
mod flights_search;
mod token_cache;

pub use amadeus_client::{AmadeusClient, FlightProvider};
pub use config::*;
pub use flights_query_builder::{SearchRequest, SearchRequestBuilder};
pub use flights_results_parser::{
    FlightOffer, OfferResult, SearchError, parse_offers_response, to_records,
};
pub use flights_search::FlightSearchGateway;
pub use token_cache::{AccessGrant, DEFAULT_EXPIRES_IN_SECS, TokenCache, TokenStatus};

// Re-export the date side so binaries depend on one crate
pub use travelbuddy_date_range::{
    Clock, DATE_FORMAT, DateLocator, DateRange, DateRangeExtractor, ManualClock, PhraseLocator,
    Source, SystemClock, advance_to_future,
};
