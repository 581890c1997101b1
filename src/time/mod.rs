//! Time module for exact astronomical dates
//!
//! A [`JulianDate`] pairs a whole Julian day number with a nanosecond count
//! since the start of that day. All arithmetic is exact integer arithmetic:
//! durations are converted to nanoseconds and folded into the day with floor
//! division, so the time of day always stays in `0..NANOSECONDS_PER_DAY`
//! however large or negative the duration is.
//!
//! Days start at midnight. The astronomical (noon based) Julian date of a
//! value is `day - 0.5 + time_of_day / NANOSECONDS_PER_DAY`, which is what
//! [`JulianDate::to_julian_date`] returns.

pub mod calendar;

use crate::constants::{NANOSECONDS_PER_DAY, NANOSECONDS_PER_SECOND, UNIX_EPOCH_JULIAN_DAY};
use chrono::{DateTime, Duration, Utc};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::time::SystemTime;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

const NANOS_PER_DAY: i128 = NANOSECONDS_PER_DAY as i128;
const NANOS_PER_SECOND: i128 = NANOSECONDS_PER_SECOND as i128;

/// A Julian date with nanosecond resolution
///
/// Values are plain `Copy` data. Every operation that "changes" a date
/// produces a new value; the `&mut self` helpers simply overwrite `self`
/// with that new value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawJulianDate", into = "RawJulianDate")]
pub struct JulianDate {
    day: i64,
    /// Nanoseconds since the start of `day`, always `< NANOSECONDS_PER_DAY`
    time_of_day: i64,
}

/// Serialized form of a [`JulianDate`]; normalized again when read back
#[derive(Serialize, Deserialize)]
struct RawJulianDate {
    day: i64,
    time_of_day: i64,
}

impl From<JulianDate> for RawJulianDate {
    fn from(date: JulianDate) -> Self {
        Self {
            day: date.day,
            time_of_day: date.time_of_day,
        }
    }
}

impl TryFrom<RawJulianDate> for JulianDate {
    type Error = TimeError;

    fn try_from(raw: RawJulianDate) -> Result<Self> {
        Self::normalize(raw.day, i128::from(raw.time_of_day))
    }
}

/// Exact nanosecond count of a chrono duration
fn duration_nanos(duration: Duration) -> i128 {
    i128::from(duration.num_seconds()) * NANOS_PER_SECOND + i128::from(duration.subsec_nanos())
}

/// Build a chrono duration from an exact nanosecond count
fn nanos_duration(nanos: i128) -> Result<Duration> {
    let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND)).ok();
    let subsec = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
    secs.and_then(|secs| Duration::new(secs, subsec))
        .ok_or_else(|| TimeError::OutOfRange(format!("{} ns does not fit in a duration", nanos)))
}

impl JulianDate {
    /// The day starting at 1970-01-01T00:00:00
    pub const UNIX_EPOCH: JulianDate = JulianDate {
        day: UNIX_EPOCH_JULIAN_DAY,
        time_of_day: 0,
    };

    /// Create a date from a day number and a time since the start of that day
    ///
    /// The time may be negative or longer than a day; it is carried into the
    /// day number.
    ///
    /// # Panics
    ///
    /// Panics if the resulting day number overflows. See
    /// [`JulianDate::try_new`] for a panic-free version.
    pub fn new(day: i64, time_of_day: Duration) -> Self {
        Self::try_new(day, time_of_day).expect("overflow when constructing Julian date")
    }

    /// Create a date from a day number and a time since the start of that day
    pub fn try_new(day: i64, time_of_day: Duration) -> Result<Self> {
        Self::normalize(day, duration_nanos(time_of_day))
    }

    /// Carry a signed nanosecond offset from the start of `day` into a
    /// (day, time of day) pair using floor division.
    fn normalize(day: i64, nanos: i128) -> Result<Self> {
        let carry = nanos.div_euclid(NANOS_PER_DAY);
        let time_of_day = nanos.rem_euclid(NANOS_PER_DAY) as i64;

        i64::try_from(carry)
            .ok()
            .and_then(|carry| day.checked_add(carry))
            .map(|day| Self { day, time_of_day })
            .ok_or_else(|| {
                debug!("day {} plus {} ns overflowed the day counter", day, nanos);
                TimeError::Overflow(format!("day {} plus {} ns", day, nanos))
            })
    }

    /// Create a date from a calendar date and a time of day
    ///
    /// The date is read in the Julian calendar before 1582-10-15 and in the
    /// Gregorian calendar from then on. Nothing is validated: month 13 or
    /// day 32 simply roll over.
    ///
    /// # Panics
    ///
    /// Panics on overflow. See [`JulianDate::try_from_calendar`].
    pub fn from_calendar(year: i64, month: i64, day: i64, time_of_day: Duration) -> Self {
        Self::try_from_calendar(year, month, day, time_of_day)
            .expect("overflow when converting calendar date to Julian date")
    }

    /// Create a date from a calendar date and a time of day
    pub fn try_from_calendar(
        year: i64,
        month: i64,
        day: i64,
        time_of_day: Duration,
    ) -> Result<Self> {
        let jdn = calendar::julian_day_number(year, month, day)?;
        Self::try_new(jdn, time_of_day)
    }

    /// Create a date from the time elapsed since 1970-01-01T00:00:00
    ///
    /// Negative durations give dates before the epoch.
    pub fn from_unix_duration(elapsed: Duration) -> Result<Self> {
        trace!("converting {} since the Unix epoch", elapsed);
        Self::normalize(UNIX_EPOCH_JULIAN_DAY, duration_nanos(elapsed))
    }

    /// Create a date from a floating point Julian date
    ///
    /// The fraction is rounded to the nearest nanosecond. Precision is
    /// limited by the `f64` input, tens of microseconds for present-day
    /// dates.
    pub fn from_julian_date(jd: f64) -> Result<Self> {
        // Shift from noon-based to midnight-based days.
        let shifted = jd + 0.5;
        let whole = shifted.floor();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range.
        if !shifted.is_finite() || whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
            return Err(TimeError::OutOfRange(format!(
                "Julian date {} is not representable",
                jd
            )));
        }

        let nanos = ((shifted - whole) * NANOSECONDS_PER_DAY as f64).round() as i128;
        Self::normalize(whole as i64, nanos)
    }

    /// The current system time
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// The whole Julian day number
    pub fn day(&self) -> i64 {
        self.day
    }

    /// Time elapsed since the start of the day
    pub fn time_of_day(&self) -> Duration {
        Duration::nanoseconds(self.time_of_day)
    }

    /// Nanoseconds elapsed since the start of the day
    pub fn time_of_day_nanos(&self) -> i64 {
        self.time_of_day
    }

    /// The astronomical Julian date as a floating point number
    ///
    /// Lossy: a `f64` cannot hold nanoseconds on top of a present-day day
    /// number. Use it for display or interoperation only.
    pub fn to_julian_date(&self) -> f64 {
        (self.day as f64 - 0.5) + self.time_of_day as f64 / NANOSECONDS_PER_DAY as f64
    }

    /// Calendar date (year, month, day) of this day
    ///
    /// Julian calendar before 1582-10-15, Gregorian from then on.
    pub fn calendar_date(&self) -> (i64, i64, i64) {
        calendar::calendar_date(self.day)
    }

    /// Time elapsed since 1970-01-01T00:00:00
    pub fn to_unix_duration(&self) -> Result<Duration> {
        self.checked_duration_since(Self::UNIX_EPOCH)
    }

    /// Add a duration, failing instead of overflowing
    pub fn checked_add(self, duration: Duration) -> Result<Self> {
        Self::normalize(self.day, i128::from(self.time_of_day) + duration_nanos(duration))
    }

    /// Subtract a duration, failing instead of overflowing
    pub fn checked_sub(self, duration: Duration) -> Result<Self> {
        Self::normalize(self.day, i128::from(self.time_of_day) - duration_nanos(duration))
    }

    /// Signed time from `earlier` to `self`
    pub fn checked_duration_since(self, earlier: JulianDate) -> Result<Duration> {
        let days = i128::from(self.day) - i128::from(earlier.day);
        let nanos = i128::from(self.time_of_day) - i128::from(earlier.time_of_day);
        nanos_duration(days * NANOS_PER_DAY + nanos)
    }

    /// The same time of day on the following day
    pub fn checked_next_day(self) -> Result<Self> {
        self.day
            .checked_add(1)
            .map(|day| Self { day, ..self })
            .ok_or_else(|| TimeError::Overflow(format!("day after {}", self.day)))
    }

    /// The same time of day on the preceding day
    pub fn checked_previous_day(self) -> Result<Self> {
        self.day
            .checked_sub(1)
            .map(|day| Self { day, ..self })
            .ok_or_else(|| TimeError::Overflow(format!("day before {}", self.day)))
    }

    /// The same time of day on the following day
    ///
    /// # Panics
    ///
    /// Panics if the day number overflows.
    pub fn next_day(self) -> Self {
        self.checked_next_day().expect("overflow when incrementing Julian day")
    }

    /// The same time of day on the preceding day
    ///
    /// # Panics
    ///
    /// Panics if the day number overflows.
    pub fn previous_day(self) -> Self {
        self.checked_previous_day().expect("overflow when decrementing Julian day")
    }

    /// Advance by one day and return the new value
    pub fn increment(&mut self) -> Self {
        *self = self.next_day();
        *self
    }

    /// Advance by one day and return the value from before the change
    pub fn post_increment(&mut self) -> Self {
        let original = *self;
        self.increment();
        original
    }

    /// Go back one day and return the new value
    pub fn decrement(&mut self) -> Self {
        *self = self.previous_day();
        *self
    }

    /// Go back one day and return the value from before the change
    pub fn post_decrement(&mut self) -> Self {
        let original = *self;
        self.decrement();
        original
    }
}

impl Ord for JulianDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day
            .cmp(&other.day)
            .then_with(|| self.time_of_day.cmp(&other.time_of_day))
    }
}

impl PartialOrd for JulianDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Addition and subtraction operations for JulianDate

impl Add<Duration> for JulianDate {
    type Output = JulianDate;

    /// # Panics
    ///
    /// Panics on overflow. See [`JulianDate::checked_add`].
    fn add(self, duration: Duration) -> Self::Output {
        self.checked_add(duration)
            .expect("overflow when adding duration to Julian date")
    }
}

impl Add<JulianDate> for Duration {
    type Output = JulianDate;

    fn add(self, date: JulianDate) -> Self::Output {
        date + self
    }
}

impl Sub<Duration> for JulianDate {
    type Output = JulianDate;

    /// # Panics
    ///
    /// Panics on overflow. See [`JulianDate::checked_sub`].
    fn sub(self, duration: Duration) -> Self::Output {
        self.checked_sub(duration)
            .expect("overflow when subtracting duration from Julian date")
    }
}

impl Sub<JulianDate> for JulianDate {
    type Output = Duration;

    /// # Panics
    ///
    /// Panics if the difference does not fit in a [`Duration`].
    fn sub(self, other: JulianDate) -> Self::Output {
        self.checked_duration_since(other)
            .expect("difference of Julian dates does not fit in a duration")
    }
}

impl AddAssign<Duration> for JulianDate {
    fn add_assign(&mut self, duration: Duration) {
        *self = *self + duration;
    }
}

impl SubAssign<Duration> for JulianDate {
    fn sub_assign(&mut self, duration: Duration) {
        *self = *self - duration;
    }
}

// Conversions from clock time points

impl From<DateTime<Utc>> for JulianDate {
    fn from(dt: DateTime<Utc>) -> Self {
        // chrono only spans about 262,000 years around the epoch, far inside
        // the day counter, so only the carry rule is needed here.
        let nanos = i128::from(dt.timestamp()) * NANOS_PER_SECOND
            + i128::from(dt.timestamp_subsec_nanos());
        let carry = nanos.div_euclid(NANOS_PER_DAY) as i64;
        Self {
            day: UNIX_EPOCH_JULIAN_DAY + carry,
            time_of_day: nanos.rem_euclid(NANOS_PER_DAY) as i64,
        }
    }
}

impl TryFrom<SystemTime> for JulianDate {
    type Error = TimeError;

    fn try_from(time: SystemTime) -> Result<Self> {
        let nanos = match time.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(after) => i128::try_from(after.as_nanos()),
            Err(before) => i128::try_from(before.duration().as_nanos()).map(|n| -n),
        }
        .map_err(|_| TimeError::OutOfRange(format!("{:?} is too far from the epoch", time)))?;
        Self::normalize(UNIX_EPOCH_JULIAN_DAY, nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_default_is_day_zero() {
        let jd = JulianDate::default();
        assert_eq!(jd.day(), 0);
        assert_eq!(jd.time_of_day(), Duration::zero());
    }

    #[test]
    fn test_new_normalizes() {
        let jd = JulianDate::new(245, Duration::hours(36));
        assert_eq!(jd.day(), 246);
        assert_eq!(jd.time_of_day(), Duration::hours(12));

        let jd = JulianDate::new(245, Duration::milliseconds(-2));
        assert_eq!(jd.day(), 244);
        assert_eq!(jd.time_of_day_nanos(), NANOSECONDS_PER_DAY - 2_000_000);
    }

    #[test]
    fn test_normalize_overflow() {
        assert!(matches!(
            JulianDate::try_new(i64::MAX, Duration::days(1)),
            Err(TimeError::Overflow(_))
        ));
        assert!(matches!(
            JulianDate::try_new(i64::MIN, Duration::nanoseconds(-1)),
            Err(TimeError::Overflow(_))
        ));
        // The last nanosecond of the last day is still representable
        let last = JulianDate::try_new(i64::MAX, Duration::nanoseconds(NANOSECONDS_PER_DAY - 1));
        assert!(last.is_ok());
    }

    #[test]
    fn test_duration_nanos_sign() {
        assert_eq!(duration_nanos(Duration::nanoseconds(-1_500_000_001)), -1_500_000_001);
        assert_eq!(duration_nanos(Duration::nanoseconds(1_500_000_001)), 1_500_000_001);
        assert_eq!(nanos_duration(-1_500_000_001).unwrap(), Duration::nanoseconds(-1_500_000_001));
    }

    #[test]
    fn test_julian_date_view() {
        let j2000 = JulianDate::from_calendar(2000, 1, 1, Duration::hours(12));
        assert_eq!(j2000.to_julian_date(), 2_451_545.0);

        let epoch = JulianDate::UNIX_EPOCH;
        assert_eq!(epoch.to_julian_date(), 2_440_587.5);
    }

    #[test]
    fn test_from_julian_date() {
        let jd = JulianDate::from_julian_date(2_451_545.0).unwrap();
        assert_eq!(jd.day(), 2_451_545);
        assert_eq!(jd.time_of_day(), Duration::hours(12));

        let jd = JulianDate::from_julian_date(45.234).unwrap();
        assert_relative_eq!(jd.to_julian_date(), 45.234, epsilon = 1e-9);

        let jd = JulianDate::from_julian_date(-0.75).unwrap();
        assert_eq!(jd.day(), -1);
        assert_eq!(jd.time_of_day(), Duration::hours(18));

        assert!(JulianDate::from_julian_date(f64::NAN).is_err());
        assert!(JulianDate::from_julian_date(f64::INFINITY).is_err());
        assert!(JulianDate::from_julian_date(1e300).is_err());
    }

    #[test]
    fn test_datetime_conversion() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let jd = JulianDate::from(dt);
        assert_eq!(jd, JulianDate::from_calendar(2000, 1, 1, Duration::hours(12)));

        let before = Utc.with_ymd_and_hms(1969, 12, 31, 23, 0, 0).unwrap();
        let jd: JulianDate = before.into();
        assert_eq!(jd.day(), UNIX_EPOCH_JULIAN_DAY - 1);
        assert_eq!(jd.time_of_day(), Duration::hours(23));
    }

    #[test]
    fn test_system_time_conversion() {
        let later = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(86_400 + 1);
        let jd = JulianDate::try_from(later).unwrap();
        assert_eq!(jd.day(), UNIX_EPOCH_JULIAN_DAY + 1);
        assert_eq!(jd.time_of_day(), Duration::seconds(1));

        let earlier = SystemTime::UNIX_EPOCH - std::time::Duration::from_secs(1);
        let jd = JulianDate::try_from(earlier).unwrap();
        assert_eq!(jd.day(), UNIX_EPOCH_JULIAN_DAY - 1);
        assert_eq!(jd.time_of_day(), Duration::seconds(86_399));
    }

    #[test]
    fn test_unix_duration_round_trip() {
        let elapsed = Duration::seconds(1_622_678_400) + Duration::nanoseconds(123);
        let jd = JulianDate::from_unix_duration(elapsed).unwrap();
        assert_eq!(jd.calendar_date(), (2021, 6, 3));
        assert_eq!(jd.to_unix_duration().unwrap(), elapsed);
    }

    #[test]
    fn test_checked_day_steps_overflow() {
        let last = JulianDate::new(i64::MAX, Duration::zero());
        assert!(last.checked_next_day().is_err());
        let first = JulianDate::new(i64::MIN, Duration::zero());
        assert!(first.checked_previous_day().is_err());
    }

    #[test]
    #[should_panic(expected = "overflow when adding duration")]
    fn test_add_overflow_panics() {
        let _ = JulianDate::new(i64::MAX, Duration::hours(23)) + Duration::hours(2);
    }

    #[test]
    fn test_duration_since_out_of_range() {
        let low = JulianDate::new(i64::MIN, Duration::zero());
        let high = JulianDate::new(i64::MAX, Duration::zero());
        assert!(matches!(
            high.checked_duration_since(low),
            Err(TimeError::OutOfRange(_))
        ));
    }
}
