//! Travel Buddy Date Range
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! travelbuddy-internals/date-range
//! Best-effort extraction of a future travel date range from free text

mod clock;
mod extractor;
mod future;
mod locator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use extractor::{DateRange, DateRangeExtractor, Source, DATE_FORMAT};
pub use future::{
    add_days, advance_to_future, is_implausible_year, repair_year, DEFAULT_LEAD_DAYS,
    DEFAULT_STAY_DAYS, ONE_YEAR_DAYS,
};
pub use locator::{DateLocator, PhraseLocator};
