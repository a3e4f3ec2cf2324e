use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::sync::store::{ActivityRecord, ActivityStore, StoreError};

const ACTIVITIES_TABLE: &str = "activities";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Activity store speaking PostgREST, as served by Supabase.
pub struct RestActivityStore {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl RestActivityStore {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            access_token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_access_token(mut self, access_token: String) -> Self {
        self.access_token = Some(access_token);
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, ACTIVITIES_TABLE)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.api_key);
        request.header("apikey", self.api_key.as_str()).bearer_auth(token)
    }

    fn row_url(&self, id: &str) -> String {
        format!("{}?id=eq.{}", self.table_url(), urlencoding::encode(id))
    }

    async fn check(response: Response, subject: &str) -> Result<Response, StoreError> {
        let status = response.status();
        tracing::info!("{} response status: {}", subject, status);

        if status == StatusCode::UNAUTHORIZED {
            tracing::error!("Authentication failed for {}", subject);
            return Err(StoreError::AuthenticationFailed);
        }

        if status == StatusCode::NOT_FOUND {
            tracing::error!("Not found: {}", subject);
            return Err(StoreError::NotFound(subject.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("{} failed. Status: {}, Body: {}", subject, status, body);
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            return Err(StoreError::Rejected(message));
        }

        Ok(response)
    }

    /// A filtered PATCH/DELETE that matches nothing still succeeds, with an
    /// empty representation.
    async fn require_match(response: Response, id: &str) -> Result<(), StoreError> {
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        if rows.is_empty() {
            tracing::error!("No activity matched id {}", id);
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityStore for RestActivityStore {
    async fn list_activities(&self, user_id: &str) -> Result<Vec<ActivityRecord>, StoreError> {
        let user_filter = format!("eq.{}", user_id);
        tracing::info!("Fetching activities for user {}", user_id);

        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "start_time.asc"),
            ])
            .send()
            .await?;

        let response = Self::check(response, "list activities").await?;
        let records: Vec<ActivityRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        tracing::info!("Fetched {} activities", records.len());
        Ok(records)
    }

    async fn insert_activity(&self, record: &ActivityRecord) -> Result<(), StoreError> {
        tracing::info!(
            "Inserting activity {} on {} {}-{}",
            record.title,
            record.day_of_week,
            record.start_time,
            record.end_time
        );
        tracing::debug!("POST {} with payload: {:?}", self.table_url(), record);

        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await?;

        Self::check(response, "insert activity").await?;
        Ok(())
    }

    async fn update_activity(&self, id: &str, record: &ActivityRecord) -> Result<(), StoreError> {
        tracing::info!("Updating activity {}: {}", id, record.title);
        tracing::debug!("PATCH {} with payload: {:?}", self.row_url(id), record);

        let response = self
            .authorized(self.client.patch(self.row_url(id)))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;

        let response = Self::check(response, &format!("activity {}", id)).await?;
        Self::require_match(response, id).await
    }

    async fn delete_activity(&self, id: &str) -> Result<(), StoreError> {
        tracing::info!("Deleting activity {}", id);

        let response = self
            .authorized(self.client.delete(self.row_url(id)))
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let response = Self::check(response, &format!("activity {}", id)).await?;
        Self::require_match(response, id).await
    }
}
