//! Configuration module
//!
//! Handles CLI configuration including service endpoints and the compute
//! domain/group, plus construction of the engine wiring.

use anyhow::Result;
use std::sync::Arc;

use crate::notify::ConsoleNotifier;
use gantry_client::{ComputeClient, FolderClient};
use gantry_engine::{ExecutorConfig, PipelineExecutor, PipelineStore};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the storage ("virtual folder") service
    pub storage_url: String,
    /// URL of the compute session service
    pub session_url: String,
    /// Compute domain sessions are created in
    pub domain: String,
    /// Compute group sessions are created in
    pub group: String,
}

impl Config {
    /// Pipeline store backed by the configured storage service
    pub fn store(&self) -> PipelineStore {
        PipelineStore::new(Arc::new(FolderClient::new(&self.storage_url)))
    }

    /// Open an executor for one pipeline with console notifications
    pub async fn open_executor(&self, folder: &str) -> Result<PipelineExecutor> {
        let executor = PipelineExecutor::open(
            folder,
            self.store(),
            Arc::new(ComputeClient::new(&self.session_url)),
            Arc::new(ConsoleNotifier),
            self.executor_config(),
        )
        .await?;
        Ok(executor)
    }

    fn executor_config(&self) -> ExecutorConfig {
        let mut config = ExecutorConfig::from_env();
        config.domain = self.domain.clone();
        config.group = self.group.clone();
        config
    }
}
