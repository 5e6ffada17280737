//! Compute session service HTTP client

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};
use crate::events::SseEventSource;
use crate::{EventSource, SessionService};
use gantry_core::dto::session::{CreateSessionRequest, SessionHandle, SessionStatus};

/// HTTP client for the compute session API
#[derive(Debug, Clone)]
pub struct ComputeClient {
    /// Base URL of the session service (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ComputeClient {
    /// Create a new session service client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the session service API
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a new session service client with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the session service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[async_trait]
impl SessionService for ComputeClient {
    async fn create_session(&self, req: &CreateSessionRequest) -> Result<SessionHandle> {
        let url = format!("{}/sessions", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionStatus> {
        let url = format!("{}/sessions/{}", self.base_url, session_id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ClientError::NotFound(session_id.to_string()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    async fn destroy_session(&self, session_id: &str) -> Result<()> {
        let url = format!("{}/sessions/{}", self.base_url, session_id);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }

    async fn task_logs(&self, kernel_id: &str) -> Result<String> {
        let url = format!("{}/kernels/{}/logs", self.base_url, kernel_id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }

    async fn subscribe(&self, session_name: &str) -> Result<Box<dyn EventSource>> {
        let url = format!("{}/sessions/{}/events", self.base_url, session_name);
        let response = self
            .client
            .get(&url)
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(Box::new(SseEventSource::new(response)))
    }
}
