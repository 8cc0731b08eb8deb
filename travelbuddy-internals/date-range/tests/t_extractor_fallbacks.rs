//! Travel Buddy Date Range
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Fallback chain and correction passes of the date range extractor.
//!
//! Every test pins the clock to Friday 2026-10-16.
//!
//! Run with:
//!     cargo test -p travelbuddy-date-range --test t_extractor_fallbacks

use chrono::NaiveDate;
use travelbuddy_date_range::{
    DateLocator, DateRange, DateRangeExtractor, ManualClock, PhraseLocator, Source, DATE_FORMAT,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn today() -> NaiveDate {
    d(2026, 10, 16)
}

fn extractor() -> DateRangeExtractor<PhraseLocator, ManualClock> {
    DateRangeExtractor::new(PhraseLocator, ManualClock::at_date(today()))
}

/// Locator returning canned answers, to reach parser artifacts the regex
/// locator never produces.
struct CannedLocator {
    found: Vec<NaiveDate>,
    loose: Option<NaiveDate>,
}

impl DateLocator for CannedLocator {
    fn search_dates(&self, _text: &str, _today: NaiveDate) -> Vec<NaiveDate> {
        self.found.clone()
    }

    fn parse_loose(&self, _text: &str, _today: NaiveDate) -> Option<NaiveDate> {
        self.loose
    }
}

fn canned(found: Vec<NaiveDate>, loose: Option<NaiveDate>) -> DateRangeExtractor<CannedLocator, ManualClock> {
    DateRangeExtractor::new(CannedLocator { found, loose }, ManualClock::at_date(today()))
}

fn assert_well_formed(range: &DateRange) {
    for s in [range.depart_str(), range.return_str()] {
        let parsed = NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .unwrap_or_else(|e| panic!("{} does not parse back: {}", s, e));
        assert_eq!(parsed.format(DATE_FORMAT).to_string(), s);
    }
    assert!(range.return_date >= range.depart, "inverted range {}", range);
    assert!(range.depart >= today(), "elapsed depart {}", range);
}

#[test]
fn test_empty_text_uses_default_window() {
    let (range, source) = extractor().extract_with_source("");
    assert_eq!(source, Source::EmptyInput);
    assert_eq!(range.depart, d(2026, 10, 30));
    assert_eq!(range.return_date, d(2026, 11, 6));
}

#[test]
fn test_two_dates_in_order() {
    let (range, source) = extractor().extract_with_source("Paris, Feb 5 to Feb 12, two adults");
    assert_eq!(source, Source::TwoOrMoreDates);
    assert_eq!(range.depart, d(2027, 2, 5));
    assert_eq!(range.return_date, d(2027, 2, 12));
}

#[test]
fn test_extra_dates_are_ignored() {
    let range = extractor().extract("Nov 2, Nov 9 or maybe Nov 20");
    assert_eq!(range.depart, d(2026, 11, 2));
    assert_eq!(range.return_date, d(2026, 11, 9));
}

#[test]
fn test_inverted_dates_reset_return() {
    let range = extractor().extract("leave Jan 20, come back Jan 3");
    assert_eq!(range.depart, d(2027, 1, 20));
    // discarded, not swapped
    assert_eq!(range.return_date, d(2027, 1, 27));
}

#[test]
fn test_single_date_gets_one_week() {
    let (range, source) = extractor().extract_with_source("Flying out on March 3rd");
    assert_eq!(source, Source::SingleDate);
    assert_eq!(range.depart, d(2027, 3, 3));
    assert_eq!(range.return_date, d(2027, 3, 10));
}

#[test]
fn test_month_only_uses_loose_parse() {
    let (range, source) = extractor().extract_with_source("Tokyo in February");
    assert_eq!(source, Source::LooseParse);
    assert_eq!(range.depart, d(2027, 2, 1));
    assert_eq!(range.return_date, d(2027, 2, 8));
}

#[test]
fn test_may_as_verb_does_not_hide_the_named_month() {
    for text in [
        "Tickets for 2 may be cheaper in February",
        "Rome in February, 4 may join",
    ] {
        let (range, source) = extractor().extract_with_source(text);
        assert_eq!(source, Source::LooseParse, "{}", text);
        assert_eq!(range.depart, d(2027, 2, 1), "{}", text);
        assert_eq!(range.return_date, d(2027, 2, 8), "{}", text);
    }
}

#[test]
fn test_may_after_a_cue_word_is_the_month() {
    for text in ["Lisbon early May", "Lisbon in  May"] {
        let (range, source) = extractor().extract_with_source(text);
        assert_eq!(source, Source::LooseParse, "{}", text);
        assert_eq!(range.depart, d(2027, 5, 1), "{}", text);
    }
}

#[test]
fn test_nothing_found_uses_default_window() {
    let (range, source) = extractor().extract_with_source("somewhere sunny with good food");
    assert_eq!(source, Source::Default);
    assert_eq!(range.depart, d(2026, 10, 30));
    assert_eq!(range.return_date, d(2026, 11, 6));
}

#[test]
fn test_elapsed_explicit_date_moves_forward() {
    let range = extractor().extract("back to Oslo on 2026-03-01");
    assert_eq!(range.depart, d(2027, 3, 1));
    assert_eq!(range.return_date, d(2027, 3, 8));

    let range = extractor().extract("Oslo on October 3, 2026");
    assert_eq!(range.depart, d(2027, 10, 3));
}

#[test]
fn test_ancient_year_is_repaired() {
    let range = extractor().extract("Nov 2, 1200 to Nov 9, 1200");
    assert_eq!(range.depart, d(2026, 11, 2));
    assert_eq!(range.return_date, d(2026, 11, 9));
}

#[test]
fn test_year_repair_and_future_floor_together() {
    // depart is last year (plausible but elapsed), return is an artifact
    let range = canned(vec![d(2025, 12, 1), d(1200, 12, 8)], None).extract("x");
    assert_eq!(range.depart, d(2026, 12, 1));
    assert_eq!(range.return_date, d(2026, 12, 8));
}

#[test]
fn test_loose_artifact_year_is_repaired() {
    let (range, source) = canned(vec![], Some(d(1, 2, 1))).extract_with_source("in February");
    assert_eq!(source, Source::LooseParse);
    assert_eq!(range.depart, d(2027, 2, 1));
    assert_eq!(range.return_date, d(2027, 2, 8));
}

#[test]
fn test_leap_day_artifact_falls_back_one_year_out() {
    let range = canned(vec![d(2024, 2, 29), d(2024, 3, 7)], None).extract("x");
    assert_eq!(range.depart, d(2027, 10, 16));
    assert_eq!(range.return_date, d(2027, 10, 23));
}

#[test]
fn test_outputs_are_calendar_dates() {
    let inputs = [
        "",
        "Feb 5 to Feb 12",
        "Dec 20 until Jan 3",
        "March 3-10",
        "12/24/2026",
        "in 3 weeks",
        "next month for a week",
        "Lisbon in May",
        "friday",
        "June 1999",
        "31 December 1850 to 2 January 1851",
        "no dates here",
    ];
    for input in inputs {
        let range = extractor().extract(input);
        assert_well_formed(&range);
    }
}
