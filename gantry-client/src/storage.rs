//! Storage service ("virtual folder") HTTP client

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};
use crate::StorageService;
use gantry_core::dto::session::FolderEntry;

/// HTTP client for the virtual folder API
#[derive(Debug, Clone)]
pub struct FolderClient {
    /// Base URL of the storage service (e.g., "http://localhost:8081")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl FolderClient {
    /// Create a new storage client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the storage service API
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a new storage client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the storage service
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
impl StorageService for FolderClient {
    async fn create_folder(&self, name: &str) -> Result<()> {
        let url = format!("{}/folders", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    async fn delete_folder(&self, name: &str) -> Result<()> {
        let url = format!("{}/folders/{}", self.base_url, name);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }

    async fn list_folders(&self) -> Result<Vec<String>> {
        let url = format!("{}/folders", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    async fn mkdir(&self, folder: &str, path: &str) -> Result<()> {
        let url = format!("{}/folders/{}/mkdir", self.base_url, folder);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    async fn list_entries(&self, folder: &str, path: &str) -> Result<Vec<FolderEntry>> {
        let url = format!("{}/folders/{}/files", self.base_url, folder);
        let response = self
            .client
            .get(&url)
            .query(&[("path", path)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn upload(&self, folder: &str, path: &str, bytes: &[u8]) -> Result<()> {
        let url = format!("{}/folders/{}/upload", self.base_url, folder);
        let response = self
            .client
            .post(&url)
            .query(&[("path", path)])
            .body(bytes.to_vec())
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    async fn download(&self, folder: &str, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/folders/{}/download", self.base_url, folder);
        let response = self
            .client
            .get(&url)
            .query(&[("path", path)])
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 404 {
            return Err(ClientError::NotFound(format!("{}/{}", folder, path)));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
