use std::future::Future;
use std::time::Duration;

use crate::sync::store::{ActivityRecord, ActivityStore, StoreError};

/// A single change the session asks the store to make.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationRequest {
    Insert(ActivityRecord),
    Update { id: String, record: ActivityRecord },
    Delete { id: String },
}

impl MutationRequest {
    pub async fn send<S>(&self, store: &S) -> Result<(), StoreError>
    where
        S: ActivityStore + ?Sized,
    {
        match self {
            MutationRequest::Insert(record) => store.insert_activity(record).await,
            MutationRequest::Update { id, record } => store.update_activity(id, record).await,
            MutationRequest::Delete { id } => store.delete_activity(id).await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            MutationRequest::Insert(record) => format!("insert {}", record.title),
            MutationRequest::Update { id, record } => format!("update {} ({})", id, record.title),
            MutationRequest::Delete { id } => format!("delete {}", id),
        }
    }
}

pub(crate) async fn with_timeout<T, E, F>(limit: Option<Duration>, call: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<StoreError>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| E::from(StoreError::Timeout(limit)))?,
        None => call.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::day::DayOfWeek;
    use crate::sync::store::MockActivityStore;

    fn record() -> ActivityRecord {
        ActivityRecord {
            id: None,
            user_id: Some("user-1".to_string()),
            day_of_week: DayOfWeek::Monday,
            start_time: "07:00".to_string(),
            end_time: "08:00".to_string(),
            title: "Breakfast".to_string(),
            description: None,
            color: None,
        }
    }

    #[tokio::test]
    async fn insert_goes_to_insert_activity() {
        let mut store = MockActivityStore::new();
        store.expect_insert_activity().times(1).returning(|_| Ok(()));
        store.expect_update_activity().never();

        MutationRequest::Insert(record()).send(&store).await.unwrap();
    }

    #[tokio::test]
    async fn update_is_keyed_by_id() {
        let mut store = MockActivityStore::new();
        store
            .expect_update_activity()
            .withf(|id, _| id == "42")
            .times(1)
            .returning(|_, _| Ok(()));

        MutationRequest::Update { id: "42".to_string(), record: record() }
            .send(&store)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_is_keyed_by_id() {
        let mut store = MockActivityStore::new();
        store
            .expect_delete_activity()
            .withf(|id| id == "42")
            .times(1)
            .returning(|_| Ok(()));

        MutationRequest::Delete { id: "42".to_string() }.send(&store).await.unwrap();
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let result: Result<(), StoreError> = with_timeout(Some(Duration::from_millis(10)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }

    #[test]
    fn no_limit_waits_for_the_call() {
        let result: Result<u32, StoreError> = tokio_test::block_on(with_timeout(None, async { Ok(7) }));

        assert_eq!(result.unwrap(), 7);
    }
}
