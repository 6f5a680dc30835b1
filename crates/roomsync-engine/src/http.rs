//! reqwest-backed record fetcher.

use crate::transport::RecordFetcher;
use async_trait::async_trait;
use roomsync_core::{Result, RoomsyncError, SessionRecord};

/// Fetches session records over HTTPS with an optional bearer token.
#[derive(Debug, Clone)]
pub struct HttpRecordFetcher {
    client: reqwest::Client,
    auth_token: Option<String>,
}

impl HttpRecordFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            auth_token: None,
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth_token: Some(token.into()),
        }
    }

    fn fetch_error(err: reqwest::Error) -> RoomsyncError {
        let code = err.status().map(|status| status.as_u16());
        RoomsyncError::fetch(err.to_string(), code)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(Self::fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoomsyncError::fetch(
                format!("GET {url} returned {status}"),
                Some(status.as_u16()),
            ));
        }
        Ok(response)
    }
}

impl Default for HttpRecordFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordFetcher for HttpRecordFetcher {
    async fn fetch_full(&self, url: &str) -> Result<SessionRecord> {
        let response = self.get(url).await?;
        let record = response
            .json::<SessionRecord>()
            .await
            .map_err(Self::fetch_error)?;
        Ok(record)
    }

    async fn fetch_delta_catch_up(&self, sync_url: &str) -> Result<Option<SessionRecord>> {
        let response = self.get(sync_url).await?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.text().await.map_err(Self::fetch_error)?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let record = serde_json::from_str::<SessionRecord>(&body)?;
        Ok(Some(record))
    }
}
