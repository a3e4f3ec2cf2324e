use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::day::{DayOfWeek, DaySchedule};
use crate::schedule::error::ScheduleError;
use crate::schedule::interval::{DEFAULT_COLOR, Interval};
use crate::schedule::time::{from_minutes, parse_store_time};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("{0}")]
    Rejected(String),
    #[error("Activity not found: {0}")]
    NotFound(String),
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One activity row as the store keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ActivityRecord {
    pub fn from_interval(day: DayOfWeek, interval: &Interval, user_id: &str) -> Self {
        Self {
            id: None,
            user_id: Some(user_id.to_string()),
            day_of_week: day,
            start_time: from_minutes(interval.start),
            end_time: from_minutes(interval.end),
            title: interval.title.trim().to_string(),
            description: Some(interval.description.clone()),
            color: Some(interval.color.clone()),
        }
    }

    pub fn to_interval(&self) -> Result<Interval, ScheduleError> {
        let start = parse_store_time(&self.start_time)?;
        let end = parse_store_time(&self.end_time)?;
        let mut interval = Interval::new(start, end, self.title.clone())?
            .with_description(self.description.clone().unwrap_or_default())
            .with_color(
                self.color
                    .clone()
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            );
        interval.id = self.id.clone();
        Ok(interval)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn list_activities(&self, user_id: &str) -> Result<Vec<ActivityRecord>, StoreError>;

    async fn insert_activity(&self, record: &ActivityRecord) -> Result<(), StoreError>;

    async fn update_activity(&self, id: &str, record: &ActivityRecord) -> Result<(), StoreError>;

    async fn delete_activity(&self, id: &str) -> Result<(), StoreError>;
}

/// Converts a full record list into a schedule. One bad record fails the
/// whole conversion so a half-converted week is never observed.
pub fn group_by_day(records: &[ActivityRecord]) -> Result<DaySchedule, ScheduleError> {
    let mut schedule = DaySchedule::new();
    for record in records {
        schedule.push(record.day_of_week, record.to_interval()?);
    }
    schedule.sort();
    Ok(schedule)
}

pub async fn load_schedule<S>(store: &S, user_id: &str) -> Result<DaySchedule, LoadError>
where
    S: ActivityStore + ?Sized,
{
    let records = store.list_activities(user_id).await?;
    let schedule = group_by_day(&records)?;
    tracing::info!("Loaded {} activities for user {}", records.len(), user_id);
    Ok(schedule)
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
