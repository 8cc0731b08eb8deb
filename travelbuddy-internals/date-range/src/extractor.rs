//! Travel Buddy Date Range
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! # Date range extraction
//!
//! Turns a traveller's free text into a bookable `(depart, return)` pair.
//! The extractor never fails: when nothing usable is found it falls back to a
//! departure two weeks out and a one week stay.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::future::{
    add_days, advance_to_future, repair_year, DEFAULT_LEAD_DAYS, DEFAULT_STAY_DAYS, ONE_YEAR_DAYS,
};
use crate::locator::{DateLocator, PhraseLocator};

/// Calendar date wire format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A departure and return day with `return_date >= depart`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub depart: NaiveDate,
    #[serde(rename = "return")]
    pub return_date: NaiveDate,
}

impl DateRange {
    pub fn depart_str(&self) -> String {
        self.depart.format(DATE_FORMAT).to_string()
    }

    pub fn return_str(&self) -> String {
        self.return_date.format(DATE_FORMAT).to_string()
    }

    pub fn nights(&self) -> i64 {
        (self.return_date - self.depart).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.depart_str(), self.return_str())
    }
}

/// Which step of the fallback chain produced the raw dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    EmptyInput,
    TwoOrMoreDates,
    SingleDate,
    LooseParse,
    Default,
}

pub struct DateRangeExtractor<L = PhraseLocator, C = SystemClock> {
    locator: L,
    clock: C,
}

impl Default for DateRangeExtractor {
    fn default() -> Self {
        Self::new(PhraseLocator, SystemClock)
    }
}

impl<L: DateLocator, C: Clock> DateRangeExtractor<L, C> {
    pub fn new(locator: L, clock: C) -> Self {
        Self { locator, clock }
    }

    /// Extract a future date range from `text`.
    pub fn extract(&self, text: &str) -> DateRange {
        self.extract_with_source(text).0
    }

    /// Like [`extract`](Self::extract), also reporting which step matched.
    pub fn extract_with_source(&self, text: &str) -> (DateRange, Source) {
        let today = self.clock.today();
        let default_depart = add_days(today, DEFAULT_LEAD_DAYS);

        if text.is_empty() {
            let range = DateRange {
                depart: default_depart,
                return_date: add_days(default_depart, DEFAULT_STAY_DAYS),
            };
            return (range, Source::EmptyInput);
        }

        let found = self.locator.search_dates(text, today);
        let (depart, return_date, source) = match found.as_slice() {
            [first, second, ..] => (*first, *second, Source::TwoOrMoreDates),
            [only] => (*only, add_days(*only, DEFAULT_STAY_DAYS), Source::SingleDate),
            [] => match self.locator.parse_loose(text, today) {
                Some(d) => (d, add_days(d, DEFAULT_STAY_DAYS), Source::LooseParse),
                None => (
                    default_depart,
                    add_days(default_depart, DEFAULT_STAY_DAYS),
                    Source::Default,
                ),
            },
        };
        tracing::debug!(
            "Raw dates from {:?}: depart={} return={}",
            source,
            depart,
            return_date
        );

        let depart = repair_year(depart, today);
        let return_date = repair_year(return_date, today);

        let depart = advance_to_future(depart, today, ONE_YEAR_DAYS);

        let return_date = if return_date < depart {
            tracing::debug!(
                "Return {} precedes depart {}, resetting to a one week stay",
                return_date,
                depart
            );
            add_days(depart, DEFAULT_STAY_DAYS)
        } else {
            return_date
        };

        (
            DateRange {
                depart,
                return_date,
            },
            source,
        )
    }
}
