//! Travel Buddy Date Range
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Pure calendar repairs shared by the extractor and the flight gateway.

use chrono::{Datelike, Days, NaiveDate};

/// Lead time used when nothing usable was found: depart two weeks out.
pub const DEFAULT_LEAD_DAYS: u64 = 14;
/// Default trip length when no return date is known.
pub const DEFAULT_STAY_DAYS: u64 = 7;
/// Fallback used by the extractor when a year cannot be replaced.
pub const ONE_YEAR_DAYS: u64 = 365;

/// Earliest year a parser artifact is trusted with.
const MIN_PLAUSIBLE_YEAR: i32 = 1900;

/// `date + days`, saturating at the end of the calendar.
pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

/// Move a past date to its next occurrence on or after `today`.
///
/// The year becomes the current one when the month has not passed yet,
/// otherwise the next one. A date whose day already elapsed in the current
/// month moves one more year. When the day does not exist in the target year
/// (29 February), the result is `today + fallback_days`.
///
/// Dates on or after `today` are returned unchanged.
pub fn advance_to_future(date: NaiveDate, today: NaiveDate, fallback_days: u64) -> NaiveDate {
    if date >= today {
        return date;
    }

    let year = if date.month() >= today.month() {
        today.year()
    } else {
        today.year() + 1
    };

    let advanced = match date.with_year(year) {
        Some(d) if d >= today => Some(d),
        Some(d) => d.with_year(year + 1),
        None => None,
    };

    match advanced {
        Some(d) => {
            tracing::debug!("Advanced past date {} to {}", date, d);
            d
        }
        None => {
            let fallback = add_days(today, fallback_days);
            tracing::debug!(
                "Could not move {} to year {}, falling back to {}",
                date,
                year,
                fallback
            );
            fallback
        }
    }
}

/// True when the year looks like a parser artifact rather than a real trip.
pub fn is_implausible_year(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() < MIN_PLAUSIBLE_YEAR || date.year() < today.year() - 1
}

/// Replace an implausible year with the current one, or the next one when the
/// result would still be in the past. Plausible dates are returned unchanged.
pub fn repair_year(date: NaiveDate, today: NaiveDate) -> NaiveDate {
    if !is_implausible_year(date, today) {
        return date;
    }

    let repaired = date.with_year(today.year()).and_then(|d| {
        if d < today {
            d.with_year(today.year() + 1)
        } else {
            Some(d)
        }
    });

    match repaired {
        Some(d) => {
            tracing::debug!("Repaired implausible year: {} -> {}", date, d);
            d
        }
        None => add_days(today, ONE_YEAR_DAYS),
    }
}
