//! Julian Date Tool
//!
//! Converts a calendar date, a Unix timestamp, or the current time into a
//! Julian day number and time of day.
//!
//! Usage:
//!   cargo run --bin julian_date -- --year 2021 --month 6 --day 3 --hour 18
//!   cargo run --bin julian_date -- --unix-seconds 1622678400
//!   cargo run --bin julian_date -- --now

use chrono::Duration;
use clap::{ArgAction, ArgGroup, Parser};
use supernovas::JulianDate;

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Julian Date Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Converts calendar dates and clock times to Julian dates",
    long_about = None
)]
#[command(group(ArgGroup::new("source").required(true).args(["year", "unix_seconds", "now"])))]
struct Args {
    /// Calendar year (astronomical numbering, 0 is 1 BC)
    #[arg(long, allow_hyphen_values = true, requires_all = ["month", "day"])]
    year: Option<i64>,

    /// Calendar month (1-12)
    #[arg(long)]
    month: Option<i64>,

    /// Day of month
    #[arg(long)]
    day: Option<i64>,

    /// Hour of day
    #[arg(long, default_value_t = 0)]
    hour: i64,

    /// Minute of hour
    #[arg(long, default_value_t = 0)]
    minute: i64,

    /// Second of minute
    #[arg(long, default_value_t = 0)]
    second: i64,

    /// Nanosecond of second
    #[arg(long, default_value_t = 0)]
    nanosecond: i64,

    /// Seconds since 1970-01-01T00:00:00
    #[arg(long, allow_hyphen_values = true)]
    unix_seconds: Option<i64>,

    /// Use the current system time
    #[arg(long, action = ArgAction::SetTrue)]
    now: bool,
}

impl Args {
    fn time_of_day(&self) -> Result<Duration> {
        [
            Duration::try_hours(self.hour),
            Duration::try_minutes(self.minute),
            Duration::try_seconds(self.second),
            Some(Duration::nanoseconds(self.nanosecond)),
        ]
        .into_iter()
        .try_fold(Duration::zero(), |acc, part| acc.checked_add(&part?))
        .ok_or_else(|| "time of day is out of range".into())
    }

    fn julian_date(&self) -> Result<JulianDate> {
        if self.now {
            return Ok(JulianDate::now());
        }
        if let Some(secs) = self.unix_seconds {
            let elapsed = Duration::try_seconds(secs).ok_or("timestamp is out of range")?;
            return Ok(JulianDate::from_unix_duration(elapsed)?);
        }

        match (self.year, self.month, self.day) {
            (Some(year), Some(month), Some(day)) => Ok(JulianDate::try_from_calendar(
                year,
                month,
                day,
                self.time_of_day()?,
            )?),
            _ => Err("--year, --month and --day must be given together".into()),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let date = args.julian_date()?;

    println!("day: {}", date.day());
    println!("time_of_day_ns: {}", date.time_of_day_nanos());
    println!("julian_date: {}", date.to_julian_date());

    Ok(())
}
