use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::schedule::error::ScheduleError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Minutes since midnight. `1440` is only meaningful as the exclusive end of
/// an interval that runs until midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TimePoint(u32);

impl TimePoint {
    pub const MIDNIGHT: TimePoint = TimePoint(0);
    pub const END_OF_DAY: TimePoint = TimePoint(MINUTES_PER_DAY);

    pub fn new(minutes: u32) -> Result<Self, ScheduleError> {
        if minutes > MINUTES_PER_DAY {
            return Err(ScheduleError::InvalidFormat(format!(
                "{} minutes is past the end of the day",
                minutes
            )));
        }
        Ok(Self(minutes))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour == 24 && minute == 0 {
            return Ok(Self::END_OF_DAY);
        }
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidFormat(format!("{}:{:02}", hour, minute)));
        }
        Ok(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }

    pub fn minutes_until(self, later: TimePoint) -> u32 {
        later.0.saturating_sub(self.0)
    }

    pub fn saturating_add(self, minutes: u32) -> TimePoint {
        Self(self.0.saturating_add(minutes).min(MINUTES_PER_DAY))
    }
}

impl TryFrom<u32> for TimePoint {
    type Error = ScheduleError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<TimePoint> for u32 {
    fn from(point: TimePoint) -> Self {
        point.0
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&from_minutes(*self))
    }
}

impl FromStr for TimePoint {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_minutes(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeInput<'a> {
    Clock(&'a str),
    Hours(f64),
}

impl<'a> From<&'a str> for TimeInput<'a> {
    fn from(value: &'a str) -> Self {
        TimeInput::Clock(value)
    }
}

impl From<u32> for TimeInput<'_> {
    fn from(hours: u32) -> Self {
        TimeInput::Hours(f64::from(hours))
    }
}

impl From<f64> for TimeInput<'_> {
    fn from(hours: f64) -> Self {
        TimeInput::Hours(hours)
    }
}

fn clock_pattern() -> &'static Regex {
    static CLOCK_RE: OnceLock<Regex> = OnceLock::new();
    CLOCK_RE.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("invalid clock regex"))
}

pub fn to_minutes<'a>(value: impl Into<TimeInput<'a>>) -> Result<TimePoint, ScheduleError> {
    match value.into() {
        TimeInput::Clock(text) => parse_clock(text),
        TimeInput::Hours(hours) => {
            if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
                return Err(ScheduleError::InvalidFormat(format!("{} hours", hours)));
            }
            TimePoint::new((hours * 60.0).round() as u32)
        }
    }
}

fn parse_clock(text: &str) -> Result<TimePoint, ScheduleError> {
    let invalid = || ScheduleError::InvalidFormat(text.to_string());
    let captures = clock_pattern().captures(text).ok_or_else(invalid)?;
    let hour: u32 = captures[1].parse().map_err(|_| invalid())?;
    let minute: u32 = captures[2].parse().map_err(|_| invalid())?;
    TimePoint::from_hm(hour, minute).map_err(|_| invalid())
}

/// Parses a time column as stored remotely. PostgreSQL `time` columns come
/// back as `HH:MM:SS`; only whole minutes are accepted.
pub fn parse_store_time(value: &str) -> Result<TimePoint, ScheduleError> {
    let trimmed = value.trim();
    let clock = if trimmed.matches(':').count() == 2 {
        match trimmed.rsplit_once(':') {
            Some((clock, "00")) => clock,
            _ => return Err(ScheduleError::InvalidFormat(value.to_string())),
        }
    } else {
        trimmed
    };
    to_minutes(clock)
}

pub fn from_minutes(point: TimePoint) -> String {
    format!("{:02}:{:02}", point.hour(), point.minute())
}

pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours == 0 {
        format!("{} {}", mins, plural(mins, "minute"))
    } else if mins == 0 {
        format!("{} {}", hours, plural(hours, "hour"))
    } else {
        format!("{}h {}m", hours, mins)
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count <= 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_zero_padded_clock_text() {
        assert_eq!(to_minutes("07:30").unwrap().minutes(), 450);
    }

    #[test]
    fn parses_single_digit_hour() {
        assert_eq!(to_minutes("9:05").unwrap().minutes(), 545);
    }

    #[test]
    fn twenty_four_hundred_is_end_of_day() {
        assert_eq!(to_minutes("24:00").unwrap(), TimePoint::END_OF_DAY);
    }

    #[test]
    fn rejects_out_of_range_clock_text() {
        assert!(matches!(to_minutes("25:00"), Err(ScheduleError::InvalidFormat(_))));
        assert!(matches!(to_minutes("12:60"), Err(ScheduleError::InvalidFormat(_))));
        assert!(matches!(to_minutes("24:30"), Err(ScheduleError::InvalidFormat(_))));
    }

    #[test]
    fn rejects_malformed_clock_text() {
        for text in ["", "7", "07:3", "07-30", "007:30", " 07:30", "ab:cd"] {
            assert!(
                matches!(to_minutes(text), Err(ScheduleError::InvalidFormat(_))),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn hour_counts_convert_to_minutes() {
        assert_eq!(to_minutes(9u32).unwrap().minutes(), 540);
        assert_eq!(to_minutes(24u32).unwrap(), TimePoint::END_OF_DAY);
        assert_eq!(to_minutes(7.5).unwrap().minutes(), 450);
    }

    #[test]
    fn rejects_hour_counts_outside_the_day() {
        assert!(to_minutes(25u32).is_err());
        assert!(to_minutes(-1.0).is_err());
        assert!(to_minutes(f64::NAN).is_err());
    }

    #[test]
    fn store_time_accepts_seconds_suffix() {
        assert_eq!(parse_store_time("08:15:00").unwrap().minutes(), 495);
        assert_eq!(parse_store_time("08:15").unwrap().minutes(), 495);
    }

    #[test]
    fn store_time_rejects_partial_minutes() {
        assert!(parse_store_time("08:15:30").is_err());
    }

    #[test]
    fn formats_minutes_as_padded_clock() {
        assert_eq!(from_minutes(TimePoint::new(5).unwrap()), "00:05");
        assert_eq!(from_minutes(TimePoint::new(1439).unwrap()), "23:59");
        assert_eq!(from_minutes(TimePoint::END_OF_DAY), "24:00");
    }

    #[test]
    fn rejects_minutes_past_end_of_day() {
        assert!(TimePoint::new(1441).is_err());
    }

    #[test]
    fn duration_with_minutes_only() {
        assert_eq!(format_duration(45), "45 minutes");
        assert_eq!(format_duration(1), "1 minute");
        assert_eq!(format_duration(0), "0 minute");
    }

    #[test]
    fn duration_with_hours_only() {
        assert_eq!(format_duration(60), "1 hour");
        assert_eq!(format_duration(180), "3 hours");
    }

    #[test]
    fn duration_with_hours_and_minutes() {
        assert_eq!(format_duration(90), "1h 30m");
    }

    proptest! {
        #[test]
        fn clock_text_round_trips(m in 0u32..MINUTES_PER_DAY) {
            let point = TimePoint::new(m).unwrap();
            prop_assert_eq!(to_minutes(from_minutes(point).as_str()).unwrap().minutes(), m);
        }
    }
}
