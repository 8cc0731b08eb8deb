//! Travel Buddy Date Range
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! # Date phrase locator
//!
//! Finds calendar dates mentioned in free text. Dates without a year are
//! resolved to their next occurrence on or after `today` (future bias).

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Match, Regex};

/// Capability the extractor needs from a text-to-date library.
pub trait DateLocator: Send + Sync {
    /// All date mentions found in `text`, in the order they appear.
    fn search_dates(&self, text: &str, today: NaiveDate) -> Vec<NaiveDate>;

    /// A single date for the whole text, accepting vaguer input such as a
    /// bare month name or a weekday.
    fn parse_loose(&self, text: &str, today: NaiveDate) -> Option<NaiveDate>;
}

const MONTHS: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static SEARCH_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = r"(?ix)
        \b(?P<iso_y>\d{4})[-/](?P<iso_m>\d{1,2})[-/](?P<iso_d>\d{1,2})\b
      | \b(?P<num_a>\d{1,2})[/.](?P<num_b>\d{1,2})[/.](?P<num_y>\d{4})\b
      | \b(?P<rng_mon>MONTHS)\.?\s+(?P<rng_a>\d{1,2})(?:st|nd|rd|th)?\s*(?:-|–|\bto\b|\buntil\b|\bthrough\b)\s*(?P<rng_b>\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(?P<rng_year>\d{4})\b)?
      | \b(?P<md_mon>MONTHS)\.?\s+(?P<md_day>\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(?P<md_year>\d{4})\b)?
      | \b(?P<dm_day>\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(?P<dm_mon>MONTHS)\b\.?(?:,?\s+(?P<dm_year>\d{4})\b)?
      | \b(?P<kw>today|tomorrow)\b
      | \bin\s+(?P<rel_n>\d{1,3})\s+(?P<rel_unit>day|week|month)s?\b
      | \bnext\s+(?P<next_unit>week|month)\b
    ";
    Regex::new(&pattern.replace("MONTHS", MONTHS)).unwrap()
});

static LOOSE_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = r"(?ix)
        \b(?P<mon>MONTHS)\b\.?(?:\s+(?P<year>\d{4})\b)?
      | \b(?P<wd>mon|tues|wednes|thurs|fri|satur|sun)day\b
    ";
    Regex::new(&pattern.replace("MONTHS", MONTHS)).unwrap()
});

/// Regex based [`DateLocator`] for English date phrases.
///
/// Recognized in running text:
/// - `2027-02-05`, `2027/02/05`, `02/05/2027` (month first, day first when
///   that is the only valid reading)
/// - `Feb 5`, `February 5th, 2027`, `5 Feb`, `5th of February 2027`
/// - `Feb 5-12` (two dates)
/// - `today`, `tomorrow`, `in 3 weeks`, `next month`
///
/// The loose parse additionally accepts `February`, `in May 2027`, `friday`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhraseLocator;

impl DateLocator for PhraseLocator {
    fn search_dates(&self, text: &str, today: NaiveDate) -> Vec<NaiveDate> {
        let mut found = Vec::new();
        for caps in SEARCH_RE.captures_iter(text) {
            if is_may_verb(text, &caps) {
                tracing::trace!("Reading {:?} as the verb \"may\"", &caps[0]);
                continue;
            }
            let before = found.len();
            collect_match(&caps, today, &mut found);
            if found.len() == before {
                tracing::trace!("Ignoring non-calendar date phrase: {:?}", &caps[0]);
            }
        }
        found
    }

    fn parse_loose(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        for caps in LOOSE_RE.captures_iter(text) {
            if let Some(mon) = caps.name("mon") {
                let year = caps.name("year").and_then(|y| y.as_str().parse().ok());
                if !may_is_month(text, mon, year.is_some(), false) {
                    continue;
                }
                let month = month_number(mon.as_str())?;
                return month_start(month, year, today);
            }
            if let Some(wd) = caps.name("wd") {
                return weekday_from_prefix(wd.as_str()).map(|w| next_weekday(w, today));
            }
        }
        None
    }
}

/// Words after which a bare "may" names the month.
const MONTH_CUES: &[&str] = &[
    "in", "of", "early", "mid", "late", "during", "until", "till", "by", "since", "before",
    "after", "through", "end", "beginning",
];

/// Whether a matched "may" is the month rather than the verb.
///
/// Other month names always are. "may" is the month when a year follows, when
/// a cue word such as "in" or "early" precedes it, or when it is capitalized
/// and either carries a day or does not open a sentence.
fn may_is_month(text: &str, mon: Match<'_>, has_year: bool, with_day: bool) -> bool {
    if !mon.as_str().eq_ignore_ascii_case("may") || has_year {
        return true;
    }

    let head = text[..mon.start()].trim_end();
    let prev = head
        .split_whitespace()
        .next_back()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_ascii_lowercase());
    if prev.as_deref().is_some_and(|w| MONTH_CUES.contains(&w)) {
        return true;
    }

    if !mon.as_str().starts_with('M') {
        return false;
    }
    let opens_sentence = head.is_empty() || head.ends_with(['.', '!', '?']);
    with_day || !opens_sentence
}

fn is_may_verb(text: &str, caps: &Captures<'_>) -> bool {
    let (mon, year) = if let Some(mon) = caps.name("md_mon") {
        (mon, caps.name("md_year"))
    } else if let Some(mon) = caps.name("dm_mon") {
        (mon, caps.name("dm_year"))
    } else if let Some(mon) = caps.name("rng_mon") {
        (mon, caps.name("rng_year"))
    } else {
        return false;
    };
    !may_is_month(text, mon, year.is_some(), true)
}

fn collect_match(caps: &Captures<'_>, today: NaiveDate, out: &mut Vec<NaiveDate>) {
    let num = |name: &str| -> Option<u32> { caps.name(name)?.as_str().parse().ok() };
    let year = |name: &str| -> Option<i32> { caps.name(name)?.as_str().parse().ok() };
    let month = |name: &str| -> Option<u32> { month_number(caps.name(name)?.as_str()) };

    if caps.name("iso_y").is_some() {
        out.extend(year("iso_y").and_then(|y| {
            NaiveDate::from_ymd_opt(y, num("iso_m")?, num("iso_d")?)
        }));
    } else if caps.name("num_y").is_some() {
        out.extend(year("num_y").and_then(|y| {
            let (a, b) = (num("num_a")?, num("num_b")?);
            NaiveDate::from_ymd_opt(y, a, b).or_else(|| NaiveDate::from_ymd_opt(y, b, a))
        }));
    } else if caps.name("rng_mon").is_some() {
        let (Some(m), Some(a), Some(b)) = (month("rng_mon"), num("rng_a"), num("rng_b")) else {
            return;
        };
        let first = day_in_month(m, a, year("rng_year"), today);
        let second = first.and_then(|f| {
            NaiveDate::from_ymd_opt(f.year(), m, b)
                .or_else(|| day_in_month(m, b, year("rng_year"), today))
        });
        out.extend(first);
        out.extend(second);
    } else if caps.name("md_mon").is_some() {
        out.extend(
            month("md_mon")
                .zip(num("md_day"))
                .and_then(|(m, d)| day_in_month(m, d, year("md_year"), today)),
        );
    } else if caps.name("dm_mon").is_some() {
        out.extend(
            month("dm_mon")
                .zip(num("dm_day"))
                .and_then(|(m, d)| day_in_month(m, d, year("dm_year"), today)),
        );
    } else if let Some(kw) = caps.name("kw") {
        let offset = if kw.as_str().eq_ignore_ascii_case("tomorrow") { 1 } else { 0 };
        out.extend(today.checked_add_days(Days::new(offset)));
    } else if let Some(unit) = caps.name("rel_unit") {
        let Some(n) = num("rel_n") else {
            return;
        };
        out.extend(shift(today, n, unit.as_str()));
    } else if let Some(unit) = caps.name("next_unit") {
        out.extend(shift(today, 1, unit.as_str()));
    }
}

fn shift(today: NaiveDate, n: u32, unit: &str) -> Option<NaiveDate> {
    match unit.to_ascii_lowercase().as_str() {
        "day" => today.checked_add_days(Days::new(n as u64)),
        "week" => today.checked_add_days(Days::new(7 * n as u64)),
        "month" => today.checked_add_months(Months::new(n)),
        _ => None,
    }
}

/// `month/day` in the given year, or its next occurrence on or after `today`.
fn day_in_month(month: u32, day: u32, year: Option<i32>, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(y) => NaiveDate::from_ymd_opt(y, month, day),
        // 8 years always covers the next 29 February
        None => (0..=8)
            .filter_map(|k| NaiveDate::from_ymd_opt(today.year() + k, month, day))
            .find(|d| *d >= today),
    }
}

/// First day of the month, or today when that month is the current one.
fn month_start(month: u32, year: Option<i32>, today: NaiveDate) -> Option<NaiveDate> {
    let current = month == today.month();
    match year {
        Some(y) if current && y == today.year() => Some(today),
        Some(y) => NaiveDate::from_ymd_opt(y, month, 1),
        None if current => Some(today),
        None => {
            let this_year = NaiveDate::from_ymd_opt(today.year(), month, 1)?;
            if this_year >= today {
                Some(this_year)
            } else {
                NaiveDate::from_ymd_opt(today.year() + 1, month, 1)
            }
        }
    }
}

/// Strictly after `today`: "friday" said on a Friday means next week.
fn next_weekday(target: Weekday, today: NaiveDate) -> NaiveDate {
    let ahead = (7 + target.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + Days::new(ahead as u64)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let n = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}

fn weekday_from_prefix(prefix: &str) -> Option<Weekday> {
    match prefix.to_ascii_lowercase().as_str() {
        "mon" => Some(Weekday::Mon),
        "tues" => Some(Weekday::Tue),
        "wednes" => Some(Weekday::Wed),
        "thurs" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "satur" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}
