use crate::schedule::day::DayOfWeek;
use crate::schedule::error::ScheduleError;
use crate::schedule::interval::{DEFAULT_COLOR, Interval};
use crate::schedule::time::TimePoint;
use crate::session::mutation::MutationRequest;
use crate::sync::store::ActivityRecord;

const DEFAULT_START_HOUR: u32 = 9;
const DEFAULT_SPAN_MINUTES: u32 = 60;

/// Unsaved form state for creating or editing one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub day: DayOfWeek,
    pub start: TimePoint,
    pub end: TimePoint,
    pub title: String,
    pub description: String,
    pub color: String,
    pub original: Option<Interval>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftPatch {
    pub day: Option<DayOfWeek>,
    pub start: Option<TimePoint>,
    pub end: Option<TimePoint>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl DraftPatch {
    pub fn day(mut self, day: DayOfWeek) -> Self {
        self.day = Some(day);
        self
    }

    pub fn start(mut self, start: TimePoint) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: TimePoint) -> Self {
        self.end = Some(end);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl EditDraft {
    pub fn new(day: DayOfWeek) -> Self {
        let start = TimePoint::MIDNIGHT.saturating_add(DEFAULT_START_HOUR * 60);
        Self {
            day,
            start,
            end: start.saturating_add(DEFAULT_SPAN_MINUTES),
            title: String::new(),
            description: String::new(),
            color: DEFAULT_COLOR.to_string(),
            original: None,
        }
    }

    pub fn for_interval(day: DayOfWeek, interval: &Interval) -> Self {
        Self {
            day,
            start: interval.start,
            end: interval.end,
            title: interval.title.clone(),
            description: interval.description.clone(),
            color: if interval.color.is_empty() {
                DEFAULT_COLOR.to_string()
            } else {
                interval.color.clone()
            },
            original: Some(interval.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.original.is_some()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.start.minutes_until(self.end)
    }

    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(day) = patch.day {
            self.day = day;
        }
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(end) = patch.end {
            self.end = end;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }

    /// The interval this draft would save. Overlaps with other activities
    /// are not checked here; the store is the authority.
    pub fn validate(&self) -> Result<Interval, ScheduleError> {
        if self.end <= self.start {
            return Err(ScheduleError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }

        let title = self.title.trim();
        if title.is_empty() {
            return Err(ScheduleError::MissingTitle);
        }

        let mut interval = Interval::new(self.start, self.end, title)?
            .with_description(self.description.clone())
            .with_color(self.color.clone());
        interval.id = self.original.as_ref().and_then(|o| o.id.clone());
        Ok(interval)
    }

    pub fn to_request(&self, user_id: &str) -> Result<MutationRequest, ScheduleError> {
        let interval = self.validate()?;
        let record = ActivityRecord::from_interval(self.day, &interval, user_id);

        Ok(match interval.id {
            Some(id) => MutationRequest::Update { id, record },
            None => MutationRequest::Insert(record),
        })
    }
}
