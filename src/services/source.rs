// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity data source.
//!
//! Activities are owned by the backend; this module only reads them. The
//! backend may lag behind a just-recorded activity, which is why the focus
//! controller retries.

use crate::error::AppError;
use crate::models::ActivityRecord;
use std::future::Future;
use std::time::Duration;

const ACTIVITY_COLUMNS: &str =
    "id,name,activity_type,strava_activity_id,polyline,polygon,created_at";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can list a user's activities.
pub trait ActivitySource: Send + Sync + 'static {
    fn fetch_activities(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ActivityRecord>, AppError>> + Send;
}

/// Reads activities from the backend's REST interface.
#[derive(Clone)]
pub struct BackendSource {
    http: Option<reqwest::Client>,
    base_url: String,
    api_key: String,
}

impl BackendSource {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client error: {}", e)))?;

        Ok(Self {
            http: Some(http),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create an offline source for testing.
    ///
    /// Every fetch returns an error.
    pub fn new_mock() -> Self {
        Self {
            http: None,
            base_url: String::new(),
            api_key: String::new(),
        }
    }

    fn get_client(&self) -> Result<&reqwest::Client, AppError> {
        self.http
            .as_ref()
            .ok_or_else(|| AppError::DataSource("Backend not connected (offline mode)".to_string()))
    }

    async fn list_activities(&self, user_id: &str) -> Result<Vec<ActivityRecord>, AppError> {
        let url = format!("{}/rest/v1/user_activities", self.base_url);
        let user_filter = format!("eq.{}", user_id);

        let response = self
            .get_client()?
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[
                ("select", ACTIVITY_COLUMNS),
                ("user_id", user_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await
            .map_err(|e| AppError::DataSource(e.to_string()))?;

        check_response_json(response).await
    }
}

impl ActivitySource for BackendSource {
    async fn fetch_activities(&self, user_id: &str) -> Result<Vec<ActivityRecord>, AppError> {
        let activities = self.list_activities(user_id).await?;
        tracing::debug!(user_id, count = activities.len(), "Fetched activities");
        Ok(activities)
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> serde::Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Backend rate limit hit (429)");
            return Err(AppError::DataSource(AppError::BACKEND_RATE_LIMIT.to_string()));
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::DataSource(AppError::BACKEND_AUTH_ERROR.to_string()));
        }

        return Err(AppError::DataSource(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::DataSource(format!("JSON parse error: {}", e)))
}
