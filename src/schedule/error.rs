use thiserror::Error;

use crate::schedule::time::TimePoint;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
    #[error("Overlapping activities: {first} and {second}")]
    Overlap { first: String, second: String },
    #[error("Degenerate segment {start}-{end}")]
    DegenerateSegment { start: TimePoint, end: TimePoint },
    #[error("Wheel angles drifted: ended at {actual} instead of {expected}")]
    AngleDrift { expected: f64, actual: f64 },
    #[error("End time {end} must be after start time {start}")]
    InvalidRange { start: TimePoint, end: TimePoint },
    #[error("Activity title is required")]
    MissingTitle,
    #[error("Remote store failure: {0}")]
    RemoteFailure(String),
}
