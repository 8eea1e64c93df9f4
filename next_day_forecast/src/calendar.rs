//! Trading calendar helpers

use chrono::{Datelike, NaiveDate, Weekday};

/// The next valid trading day after `last`.
///
/// Business-day policy: advance one calendar day, then skip over
/// Saturday and Sunday, so a Friday resolves to the following Monday.
/// Exchange holidays are not modeled.
pub fn next_trading_day(last: NaiveDate) -> NaiveDate {
    let mut next = last.succ_opt().expect("date overflow");
    while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next = next.succ_opt().expect("date overflow");
    }
    next
}
