use serde::{Deserialize, Serialize};

use crate::schedule::error::ScheduleError;
use crate::schedule::time::TimePoint;

pub const FREE_TITLE: &str = "free";
pub const FREE_DESCRIPTION: &str = "Free time";
pub const FREE_COLOR: &str = "#e5e7eb";
pub const DEFAULT_COLOR: &str = "#7c5cff";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub id: Option<String>,
    pub start: TimePoint,
    pub end: TimePoint,
    pub title: String,
    pub description: String,
    pub color: String,
    pub is_synthetic: bool,
}

impl Interval {
    pub fn new(start: TimePoint, end: TimePoint, title: impl Into<String>) -> Result<Self, ScheduleError> {
        if end <= start {
            return Err(ScheduleError::InvalidRange { start, end });
        }
        Ok(Self {
            id: None,
            start,
            end,
            title: title.into(),
            description: String::new(),
            color: DEFAULT_COLOR.to_string(),
            is_synthetic: false,
        })
    }

    pub(crate) fn free(start: TimePoint, end: TimePoint) -> Self {
        Self {
            id: None,
            start,
            end,
            title: FREE_TITLE.to_string(),
            description: FREE_DESCRIPTION.to_string(),
            color: FREE_COLOR.to_string(),
            is_synthetic: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn duration_minutes(&self) -> u32 {
        self.start.minutes_until(self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.start >= self.end
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, point: TimePoint) -> bool {
        point >= self.start && point < self.end
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn time_range(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }

    pub(crate) fn describe(&self) -> String {
        format!("{} {}", self.time_range(), self.title)
    }
}
