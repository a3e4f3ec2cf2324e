use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::interval::Interval;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("Unknown day of week: {0}")]
pub struct UnknownDay(pub String);

/// Day keys as stored remotely. Labels are the store's `day_of_week` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    #[serde(rename = "Domingo")]
    Sunday,
    #[serde(rename = "Lunes")]
    Monday,
    #[serde(rename = "Martes")]
    Tuesday,
    #[serde(rename = "Miércoles")]
    Wednesday,
    #[serde(rename = "Jueves")]
    Thursday,
    #[serde(rename = "Viernes")]
    Friday,
    #[serde(rename = "Sábado")]
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Domingo",
            DayOfWeek::Monday => "Lunes",
            DayOfWeek::Tuesday => "Martes",
            DayOfWeek::Wednesday => "Miércoles",
            DayOfWeek::Thursday => "Jueves",
            DayOfWeek::Friday => "Viernes",
            DayOfWeek::Saturday => "Sábado",
        }
    }

    fn english_name(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.label() == label)
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DayOfWeek {
    type Err = UnknownDay;

    /// Accepts the store label or the English day name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.label().to_lowercase() == wanted || day.english_name() == wanted)
            .ok_or_else(|| UnknownDay(s.to_string()))
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Sun => DayOfWeek::Sunday,
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

/// Raw intervals per weekday, each day sorted by start. Never holds free time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySchedule {
    days: HashMap<DayOfWeek, Vec<Interval>>,
}

impl DaySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_days<I>(days: I) -> Self
    where
        I: IntoIterator<Item = (DayOfWeek, Vec<Interval>)>,
    {
        let mut schedule = Self::new();
        for (day, intervals) in days {
            for interval in intervals {
                schedule.push(day, interval);
            }
        }
        schedule.sort();
        schedule
    }

    pub(crate) fn push(&mut self, day: DayOfWeek, interval: Interval) {
        if interval.is_synthetic {
            return;
        }
        self.days.entry(day).or_default().push(interval);
    }

    pub(crate) fn sort(&mut self) {
        for intervals in self.days.values_mut() {
            intervals.sort_by_key(|i| (i.start, i.end));
        }
    }

    pub fn day(&self, day: DayOfWeek) -> &[Interval] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn activity_count(&self, day: DayOfWeek) -> usize {
        self.day(day).len()
    }

    pub fn total_activities(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_activities() == 0
    }

    pub fn find(&self, id: &str) -> Option<(DayOfWeek, &Interval)> {
        DayOfWeek::ALL.into_iter().find_map(|day| {
            self.day(day)
                .iter()
                .find(|i| i.id.as_deref() == Some(id))
                .map(|i| (day, i))
        })
    }
}
