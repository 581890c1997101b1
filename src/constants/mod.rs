//! Constants module for astronomical time keeping

// Time constants
/// Seconds in a day
pub const SECONDS_PER_DAY: i64 = 86_400;
/// Nanoseconds in a second
pub const NANOSECONDS_PER_SECOND: i64 = 1_000_000_000;
/// Nanoseconds in a day
pub const NANOSECONDS_PER_DAY: i64 = SECONDS_PER_DAY * NANOSECONDS_PER_SECOND;

/// Julian date of 1970-01-01T00:00:00 (the Unix epoch)
pub const UNIX_EPOCH_JULIAN_DATE: f64 = 2_440_587.5;
/// Julian day number of the day starting at the Unix epoch
pub const UNIX_EPOCH_JULIAN_DAY: i64 = 2_440_588;

// Calendar constants
/// First day of the Gregorian calendar as (year, month, day)
pub const GREGORIAN_REFORM: (i64, i64, i64) = (1582, 10, 15);
/// First day of Gregorian calendar in Julian day number (1582-10-15)
pub const GREGORIAN_START: i64 = 2_299_161;
/// Constant term of the calendar conversion formula.
///
/// The astronomical formula adds 1720994.5; one half day more moves the
/// result from noon onto the day that starts at midnight.
pub const CALENDAR_EPOCH_OFFSET: i64 = 1_720_995;

// Physics
/// Speed of light in m/s
pub const C: f64 = 299_792_458.0;
