//! Calendar date and Julian day number conversion functions
//!
//! Dates on or after 1582-10-15 are read in the Gregorian calendar, earlier
//! dates in the Julian calendar. Both directions work on plain integers and
//! accept any year, including negative (astronomical) years. Month and day
//! values are not validated: 2021-13-01 is accepted and lands on 2022-01-01.

use super::{Result, TimeError};
use crate::constants::{CALENDAR_EPOCH_OFFSET, GREGORIAN_REFORM, GREGORIAN_START};
use log::{debug, trace};

/// Convert (year, month, day) to the Julian day number of that date
///
/// The returned day is the one starting at midnight of the given date, so
/// 2000-01-01 gives 2451545 and 1970-01-01 gives 2440588. The astronomical
/// Julian date of that midnight is the day number minus one half.
///
/// The result is `floor(JD + 0.5)` rather than `trunc(JD)` on purpose: days
/// roll over at midnight, so calendar dates agree with clock time points.
///
/// Fails only when an intermediate term overflows a 64-bit integer.
pub fn julian_day_number(year: i64, month: i64, day: i64) -> Result<i64> {
    // January and February count as months 13 and 14 of the previous year.
    let (y, m) = if month <= 2 {
        (year.checked_sub(1).ok_or_else(|| overflow(year, month, day))?, month + 12)
    } else {
        (year, month)
    };

    let gregorian = (year, month, day) >= GREGORIAN_REFORM;
    let b = if gregorian {
        let a = y.div_euclid(100);
        2 - a + a.div_euclid(4)
    } else {
        0
    };
    trace!(
        "{}-{}-{} uses the {} calendar",
        year,
        month,
        day,
        if gregorian { "Gregorian" } else { "Julian" }
    );

    let c = year_term(y).ok_or_else(|| overflow(year, month, day))?;
    let d = month_term(m).ok_or_else(|| overflow(year, month, day))?;

    [c, d, day, CALENDAR_EPOCH_OFFSET]
        .into_iter()
        .try_fold(b, |acc, term| acc.checked_add(term))
        .ok_or_else(|| overflow(year, month, day))
}

/// `floor(365.25 * y)` for `y >= 0`, `trunc(365.25 * y - 0.75)` otherwise
fn year_term(y: i64) -> Option<i64> {
    let quarter_days = y.checked_mul(1461)?;
    if y >= 0 {
        Some(quarter_days / 4)
    } else {
        // Integer division truncates toward zero, as the -0.75 expects.
        Some(quarter_days.checked_sub(3)? / 4)
    }
}

/// `floor(30.6001 * (m + 1))`
fn month_term(m: i64) -> Option<i64> {
    Some(m.checked_add(1)?.checked_mul(306_001)?.div_euclid(10_000))
}

fn overflow(year: i64, month: i64, day: i64) -> TimeError {
    debug!("calendar conversion of {}-{}-{} overflowed", year, month, day);
    TimeError::Overflow(format!(
        "Julian day number of {}-{}-{} does not fit in 64 bits",
        year, month, day
    ))
}

/// Convert a Julian day number to calendar date (year, month, day)
///
/// Days before [`GREGORIAN_START`] come out in the Julian calendar, later
/// days in the Gregorian calendar, matching [`julian_day_number`].
pub fn calendar_date(jdn: i64) -> (i64, i64, i64) {
    // See the Explanatory Supplement to the Astronomical Almanac 15.11.
    let j = i128::from(jdn);
    let f = j + 1401;
    let f = if jdn >= GREGORIAN_START {
        f + ((4 * j + 274_277).div_euclid(146_097) * 3).div_euclid(4) - 38
    } else {
        f
    };

    let e = 4 * f + 3;
    let g = e.rem_euclid(1461).div_euclid(4);
    let h = 5 * g + 2;
    let day = h.rem_euclid(153).div_euclid(5) + 1;
    let month = (h.div_euclid(153) + 2).rem_euclid(12) + 1;
    let year = e.div_euclid(1461) - 4716 + (12 + 2 - month).div_euclid(12);

    // |year| is bounded by |jdn| / 365 plus a few thousand.
    (year as i64, month as i64, day as i64)
}
