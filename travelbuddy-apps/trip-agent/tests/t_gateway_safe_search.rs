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

//! Input repair and in-band error reporting of the flight search gateway.
//!
//! All tests run against a fake provider with the clock pinned to 2026-10-16.
//!
//! Run with:
//!     cargo test --test t_gateway_safe_search


use anyhow::Result;
use chrono::NaiveDate;
use provider_helpers::{FakeProvider, gateway, offer, today};
use travelbuddy_trip_agent::{DATE_FORMAT, FlightSearchGateway, SearchError, to_records};

#[tokio::test]
async fn test_invalid_depart_makes_no_network_call() -> Result<()> {
    let gw = gateway(FakeProvider::with_offers(vec![offer("1", "100.00")]));

    let result = gw.safe_search("PAR", "BER", "not-a-date", Some("2027-02-12")).await?;

    assert_eq!(
        result,
        Err(SearchError::InvalidDepartDate {
            input: "not-a-date".into()
        })
    );
    let records = to_records(&result);
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert!(records[0].get("error").is_some());
    assert_eq!(gw.provider().token_calls(), 0);
    assert_eq!(gw.provider().search_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_code_makes_no_network_call() -> Result<()> {
    let gw = gateway(FakeProvider::with_offers(vec![offer("1", "100.00")]));

    let result = gw.safe_search("", "BER", "2027-02-05", None).await?;
    match &result {
        Err(SearchError::MissingCode {
            origin_code,
            dest_code,
        }) => {
            assert_eq!(origin_code, "");
            assert_eq!(dest_code, "BER");
        }
        other => panic!("expected missing code, got {:?}", other),
    }

    let result = gw.safe_search("PAR", "   ", "2027-02-05", None).await?;
    assert!(matches!(result, Err(SearchError::MissingCode { .. })));

    assert_eq!(gw.provider().token_calls(), 0);
    assert_eq!(gw.provider().search_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_inverted_return_is_discarded() -> Result<()> {
    let gw = gateway(FakeProvider::default());

    gw.safe_search("PAR", "BER", "2027-02-05", Some("2027-01-30")).await?.unwrap();

    let request = gw.provider().last_request().expect("search should be called");
    assert_eq!(request.depart_date, "2027-02-05");
    assert_eq!(request.return_date.as_deref(), Some("2027-02-12"));
    Ok(())
}

#[tokio::test]
async fn test_past_depart_is_advanced_with_stay_kept() -> Result<()> {
    let gw = gateway(FakeProvider::default());

    gw.safe_search("par", "ber", "2025-12-20", Some("2025-12-24")).await?.unwrap();

    let request = gw.provider().last_request().unwrap();
    assert_eq!(request.origin_code, "PAR");
    assert_eq!(request.dest_code, "BER");
    assert_eq!(request.depart_date, "2026-12-20");
    assert_eq!(request.return_date.as_deref(), Some("2026-12-24"));
    Ok(())
}

#[tokio::test]
async fn test_request_carries_configured_counts() -> Result<()> {
    let gw = gateway(FakeProvider::default()).adults(2).max_results(10);

    gw.safe_search("PAR", "BER", "2027-02-05", None).await?.unwrap();

    let request = gw.provider().last_request().unwrap();
    assert_eq!(request.adults, 2);
    assert_eq!(request.max_results, 10);
    assert_eq!(gw.provider().last_token().as_deref(), Some("token-1"));
    Ok(())
}

#[tokio::test]
async fn test_offers_keep_provider_order() -> Result<()> {
    let gw = gateway(FakeProvider::with_offers(vec![
        offer("b", "310.20"),
        offer("a", "99.99"),
        offer("c", "150.00"),
    ]));

    let offers = gw.safe_search("PAR", "BER", "2027-02-05", None).await?.unwrap();

    let ids: Vec<&str> = offers.iter().map(|o| o.raw["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["b", "a", "c"]);
    assert_eq!(offers[0].price.as_deref(), Some("310.20"));
    assert_eq!(offers[0].itinerary_count(), 1);

    let records = to_records(&Ok(offers));
    assert_eq!(records[1]["price"], "99.99");
    assert!(records[1]["itineraries"].is_array());
    Ok(())
}

#[tokio::test]
async fn test_empty_provider_result_is_not_an_error() -> Result<()> {
    let gw = gateway(FakeProvider::default());
    let result = gw.safe_search("PAR", "BER", "2027-02-05", None).await?;
    assert_eq!(result, Ok(Vec::new()));
    Ok(())
}

#[tokio::test]
async fn test_provider_failure_is_reported_in_band() -> Result<()> {
    let gw = gateway(FakeProvider::failing_search("HTTP error 500: upstream timeout"));

    let result = gw.safe_search("PAR", "BER", "2027-02-05", None).await?;

    match result {
        Err(SearchError::Provider(msg)) => assert!(msg.contains("upstream timeout"), "{}", msg),
        other => panic!("expected provider error, got {:?}", other),
    }
    assert_eq!(gw.provider().search_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_token_failure_is_a_hard_error() {
    let provider = FakeProvider {
        fail_token: true,
        ..Default::default()
    };
    let gw = gateway(provider);

    let err = gw
        .safe_search("PAR", "BER", "2027-02-05", None)
        .await
        .expect_err("token failure must propagate");
    assert!(format!("{:#}", err).contains("401"), "{:#}", err);
    assert_eq!(gw.provider().search_calls(), 0);
}

#[tokio::test]
async fn test_search_range_and_dates_round_trip() -> Result<()> {
    let gw = gateway(FakeProvider::default());
    let extractor = travelbuddy_trip_agent::DateRangeExtractor::new(
        travelbuddy_trip_agent::PhraseLocator,
        travelbuddy_trip_agent::ManualClock::at_date(today()),
    );

    for text in ["Feb 5 to Feb 12", "", "in March", "Jan 20, back Jan 3"] {
        let range = extractor.extract(text);
        gw.search_range("PAR", "BER", &range).await?.unwrap();

        let request = gw.provider().last_request().unwrap();
        let depart = NaiveDate::parse_from_str(&request.depart_date, DATE_FORMAT)?;
        let ret = NaiveDate::parse_from_str(request.return_date.as_deref().unwrap(), DATE_FORMAT)?;
        assert_eq!(depart, range.depart, "{}", text);
        assert_eq!(ret, range.return_date, "{}", text);
        assert!(depart >= today());
    }
    Ok(())
}

#[test]
fn test_sanitize_is_pure() {
    let gw: FlightSearchGateway<FakeProvider, _> = gateway(FakeProvider::default());
    let request = gw.sanitize("PAR", "BER", "2026-10-16", None).unwrap();
    assert_eq!(request.depart_date, "2026-10-16");
    assert_eq!(request.return_date.as_deref(), Some("2026-10-23"));
    assert_eq!(gw.provider().search_calls(), 0);
}
