use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use tracing::instrument;
use url::Url;

use crate::contract::{
    client::RecordStoreApi,
    error::RecordStoreError,
    model::{RecordId, UserPayload, UserRecord},
};
use crate::infra::http::traced_client::TracedClient;

/// [`RecordStoreApi`] over the users REST endpoints below `base`.
pub struct HttpRecordStore {
    client: TracedClient,
    base: Url,
}

impl HttpRecordStore {
    pub fn new(client: TracedClient, base: Url) -> Self {
        Self { client, base }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `base` + `api/users` + `segments`; segments are percent-encoded.
    fn users_url(&self, segments: &[&str]) -> Result<Url, RecordStoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RecordStoreError::transport(format!("invalid base URL '{}'", self.base)))?
            .pop_if_empty()
            .extend(["api", "users"])
            .extend(segments);
        Ok(url)
    }

    async fn call(
        &self,
        method: Method,
        url: Url,
        body: Option<&UserPayload>,
    ) -> Result<Response, RecordStoreError> {
        let what = format!("{} {}", method, url.path());
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = self
            .client
            .send(builder)
            .await
            .with_context(|| what.clone())
            .map_err(|e| RecordStoreError::transport(format!("{e:#}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| format!("HTTP {status}"));
        if status == StatusCode::BAD_REQUEST {
            Err(RecordStoreError::conflict(message))
        } else {
            Err(RecordStoreError::transport(format!("{what}: {message}")))
        }
    }
}

/// Best-effort human message from an error body: `{"message": ..}`,
/// `{"error": ..}` or the raw text.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    Some(body.to_string())
}

#[async_trait]
impl RecordStoreApi for HttpRecordStore {
    #[instrument(name = "user_records.http.list_genders", skip_all, fields(base = %self.base))]
    async fn list_genders(&self) -> Result<Vec<String>, RecordStoreError> {
        let url = self.users_url(&["genders"])?;
        self.call(Method::GET, url, None)
            .await?
            .json::<Vec<String>>()
            .await
            .context("decoding gender options")
            .map_err(|e| RecordStoreError::transport(format!("{e:#}")))
    }

    #[instrument(name = "user_records.http.list_records", skip_all, fields(base = %self.base))]
    async fn list_records(&self) -> Result<Vec<UserRecord>, RecordStoreError> {
        let url = self.users_url(&[""])?;
        self.call(Method::GET, url, None)
            .await?
            .json::<Vec<UserRecord>>()
            .await
            .context("decoding user list")
            .map_err(|e| RecordStoreError::transport(format!("{e:#}")))
    }

    #[instrument(name = "user_records.http.create_record", skip_all, fields(base = %self.base))]
    async fn create_record(&self, payload: &UserPayload) -> Result<(), RecordStoreError> {
        let url = self.users_url(&[""])?;
        self.call(Method::POST, url, Some(payload)).await?;
        Ok(())
    }

    #[instrument(
        name = "user_records.http.update_record",
        skip_all,
        fields(base = %self.base, record_id = %id)
    )]
    async fn update_record(
        &self,
        id: &RecordId,
        payload: &UserPayload,
    ) -> Result<(), RecordStoreError> {
        let url = self.users_url(&[id.as_str()])?;
        self.call(Method::PUT, url, Some(payload)).await?;
        Ok(())
    }

    #[instrument(
        name = "user_records.http.delete_record",
        skip_all,
        fields(base = %self.base, record_id = %id)
    )]
    async fn delete_record(&self, id: &RecordId) -> Result<(), RecordStoreError> {
        let url = self.users_url(&[id.as_str()])?;
        self.call(Method::DELETE, url, None).await?;
        Ok(())
    }
}
