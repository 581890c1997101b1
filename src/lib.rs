//! Supernovas: exact Julian dates for astronomical time keeping
//!
//! This crate provides a Julian date value type with nanosecond resolution
//! over the full 64-bit range of day numbers. Dates convert from proleptic
//! Julian/Gregorian calendar dates, from clock time points and from raw
//! (day, time of day) pairs, and support exact duration arithmetic.
//!
//! ```
//! use chrono::Duration;
//! use supernovas::JulianDate;
//!
//! let date = JulianDate::from_calendar(2000, 1, 1, Duration::hours(12));
//! assert_eq!(date.day(), 2_451_545);
//! assert_eq!(date.to_julian_date(), 2_451_545.0);
//!
//! let earlier = date - Duration::hours(13);
//! assert_eq!(earlier.day(), 2_451_544);
//! assert_eq!(earlier.time_of_day(), Duration::hours(23));
//! ```

pub mod constants;
pub mod time;

// Re-export commonly used types
pub use time::{JulianDate, Result, TimeError};
