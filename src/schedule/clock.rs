use chrono::{Datelike, Local, Timelike};

use crate::schedule::day::DayOfWeek;
use crate::schedule::time::TimePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub day: DayOfWeek,
    pub time: TimePoint,
}

pub trait Clock {
    fn now(&self) -> ClockReading;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> ClockReading {
        let now = Local::now();
        ClockReading {
            day: DayOfWeek::from(now.weekday()),
            time: TimePoint::MIDNIGHT.saturating_add(now.hour() * 60 + now.minute()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub ClockReading);

impl Clock for FixedClock {
    fn now(&self) -> ClockReading {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_reads_a_point_inside_the_day() {
        let reading = SystemClock.now();

        assert!(reading.time < TimePoint::END_OF_DAY);
    }

    #[test]
    fn system_clock_matches_local_weekday() {
        let expected = DayOfWeek::from(Local::now().weekday());

        let reading = SystemClock.now();

        // may straddle midnight; the two reads are a few microseconds apart
        assert!(reading.day == expected || reading.time.minutes() == 0);
    }

    #[test]
    fn fixed_clock_returns_its_reading() {
        let reading = ClockReading {
            day: DayOfWeek::Tuesday,
            time: TimePoint::from_hm(14, 5).unwrap(),
        };

        assert_eq!(FixedClock(reading).now(), reading);
    }
}
