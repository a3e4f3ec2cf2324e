use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::schedule::day::DayOfWeek;
use crate::sync::store::{ActivityRecord, ActivityStore, StoreError};

/// SQLite-backed activity store for running without a remote service.
pub struct LocalActivityStore {
    conn: Mutex<Connection>,
}

impl LocalActivityStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Rejected(e.to_string()))?;
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self::new(Connection::open_in_memory()?);
        store.initialize()?;
        Ok(store)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Rejected("local store lock poisoned".to_string()))
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.connection()?.execute(
            "CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                day_of_week TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                color TEXT
            )",
            [],
        )?;
        Ok(())
    }

    fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(ActivityRecord, String)> {
        let day_label: String = row.get(2)?;
        let record = ActivityRecord {
            id: Some(row.get(0)?),
            user_id: Some(row.get(1)?),
            day_of_week: DayOfWeek::Sunday,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            title: row.get(5)?,
            description: row.get(6)?,
            color: row.get(7)?,
        };
        Ok((record, day_label))
    }
}

#[async_trait]
impl ActivityStore for LocalActivityStore {
    async fn list_activities(&self, user_id: &str) -> Result<Vec<ActivityRecord>, StoreError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, day_of_week, start_time, end_time, title, description, color
             FROM activities WHERE user_id = ?1 ORDER BY start_time",
        )?;
        let rows = stmt.query_map([user_id], Self::read_record)?;

        let mut records = Vec::new();
        for row in rows {
            let (mut record, day_label) = row?;
            record.day_of_week = DayOfWeek::from_label(&day_label)
                .ok_or_else(|| StoreError::Parse(format!("Unknown day of week: {}", day_label)))?;
            records.push(record);
        }

        tracing::debug!("Local store returned {} activities for {}", records.len(), user_id);
        Ok(records)
    }

    async fn insert_activity(&self, record: &ActivityRecord) -> Result<(), StoreError> {
        let user_id = record
            .user_id
            .as_deref()
            .ok_or_else(|| StoreError::Rejected("user_id is required".to_string()))?;
        let id = Uuid::new_v4().to_string();

        self.connection()?.execute(
            "INSERT INTO activities (id, user_id, day_of_week, start_time, end_time, title, description, color)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                &id,
                user_id,
                record.day_of_week.label(),
                &record.start_time,
                &record.end_time,
                &record.title,
                &record.description,
                &record.color,
            ],
        )?;

        tracing::info!("Inserted local activity {}: {}", id, record.title);
        Ok(())
    }

    async fn update_activity(&self, id: &str, record: &ActivityRecord) -> Result<(), StoreError> {
        let conn = self.connection()?;
        let existing: Option<String> = conn
            .query_row("SELECT id FROM activities WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        if existing.is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        conn.execute(
            "UPDATE activities
             SET day_of_week = ?2, start_time = ?3, end_time = ?4, title = ?5, description = ?6, color = ?7
             WHERE id = ?1",
            rusqlite::params![
                id,
                record.day_of_week.label(),
                &record.start_time,
                &record.end_time,
                &record.title,
                &record.description,
                &record.color,
            ],
        )?;

        tracing::info!("Updated local activity {}", id);
        Ok(())
    }

    async fn delete_activity(&self, id: &str) -> Result<(), StoreError> {
        let deleted = self
            .connection()?
            .execute("DELETE FROM activities WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tracing::info!("Deleted local activity {}", id);
        Ok(())
    }
}
