//! Pipeline store
//!
//! Reads and writes the two JSON artifacts that make a pipeline durable:
//! the definition (`config.json`) and the component graph
//! (`components.json`), both living at fixed paths inside the pipeline's
//! storage folder. Every write is a full overwrite; the storage service
//! guarantees a failed upload leaves the previous version intact.

use std::sync::Arc;

use crate::error::{EngineError, Result};
use gantry_client::StorageService;
use gantry_core::domain::graph::PipelineGraph;
use gantry_core::domain::pipeline::PipelineDefinition;

/// Relative path of the pipeline definition artifact
pub const CONFIG_FILE: &str = "config.json";

/// Relative path of the component graph artifact
pub const GRAPH_FILE: &str = "components.json";

/// Persistence layer for pipeline artifacts
#[derive(Clone)]
pub struct PipelineStore {
    storage: Arc<dyn StorageService>,
}

impl PipelineStore {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    /// The storage handle this store writes through
    pub fn storage(&self) -> &Arc<dyn StorageService> {
        &self.storage
    }

    /// Load a pipeline's definition
    ///
    /// Fails with `DefinitionNotFound` when the artifact is absent and
    /// `Malformed` when it does not parse.
    pub async fn load_definition(&self, folder: &str) -> Result<PipelineDefinition> {
        let bytes = match self.storage.download(folder, CONFIG_FILE).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                return Err(EngineError::DefinitionNotFound(folder.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|source| EngineError::Malformed {
            path: format!("{}/{}", folder, CONFIG_FILE),
            source,
        })
    }

    /// Persist a pipeline's definition, overwriting the previous version
    pub async fn save_definition(&self, folder: &str, def: &PipelineDefinition) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(def).map_err(|source| EngineError::Malformed {
            path: format!("{}/{}", folder, CONFIG_FILE),
            source,
        })?;
        self.storage.upload(folder, CONFIG_FILE, &bytes).await?;
        Ok(())
    }

    /// Load a pipeline's component graph
    ///
    /// Defaults to an empty graph when the artifact has never been written.
    pub async fn load_graph(&self, folder: &str) -> Result<PipelineGraph> {
        let bytes = match self.storage.download(folder, GRAPH_FILE).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(PipelineGraph::default()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|source| EngineError::Malformed {
            path: format!("{}/{}", folder, GRAPH_FILE),
            source,
        })
    }

    /// Persist a pipeline's component graph, overwriting the previous version
    pub async fn save_graph(&self, folder: &str, graph: &PipelineGraph) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(graph).map_err(|source| EngineError::Malformed {
            path: format!("{}/{}", folder, GRAPH_FILE),
            source,
        })?;
        self.storage.upload(folder, GRAPH_FILE, &bytes).await?;
        Ok(())
    }

    /// Create a pipeline: its folder, definition and an empty graph
    pub async fn create_pipeline(&self, folder: &str, def: &PipelineDefinition) -> Result<()> {
        self.storage.create_folder(folder).await?;
        self.save_definition(folder, def).await?;
        self.save_graph(folder, &PipelineGraph::default()).await?;
        tracing::info!("Pipeline created: {} ({})", def.title, folder);
        Ok(())
    }

    /// Delete a pipeline and every artifact inside its folder
    pub async fn delete_pipeline(&self, folder: &str) -> Result<()> {
        self.storage.delete_folder(folder).await?;
        tracing::info!("Pipeline deleted: {}", folder);
        Ok(())
    }

    /// List the storage folders that may hold pipelines
    pub async fn list_pipelines(&self) -> Result<Vec<String>> {
        Ok(self.storage.list_folders().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_client::MemoryFolderService;
    use gantry_core::domain::graph::{ComponentNode, DependencyEdge, ResourceRequest};
    use uuid::Uuid;

    async fn store_with_folder(folder: &str) -> PipelineStore {
        let storage = MemoryFolderService::new();
        let store = PipelineStore::new(Arc::new(storage));
        store.create_pipeline(folder, &definition()).await.unwrap();
        store
    }

    fn definition() -> PipelineDefinition {
        PipelineDefinition {
            title: "demo".to_string(),
            description: None,
            environment: "python".to_string(),
            version: "3.11".to_string(),
            scaling_group: "default".to_string(),
            storage_host: "local:volume1".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    fn node(title: &str) -> ComponentNode {
        ComponentNode {
            id: Uuid::new_v4(),
            title: title.to_string(),
            label: title.to_string(),
            description: None,
            path: title.to_string(),
            resources: ResourceRequest {
                cpu: 1,
                mem: 0.5,
                gpu: 0.0,
            },
            executed: false,
        }
    }

    #[tokio::test]
    async fn test_definition_round_trip() {
        let storage = Arc::new(MemoryFolderService::new());
        let store = PipelineStore::new(storage);
        let def = definition();

        store.create_pipeline("demo", &def).await.unwrap();
        let loaded = store.load_definition("demo").await.unwrap();
        assert_eq!(loaded, def);
    }

    #[tokio::test]
    async fn test_missing_definition_is_not_found() {
        let storage = Arc::new(MemoryFolderService::new());
        let store = PipelineStore::new(storage.clone());
        storage.create_folder("demo").await.unwrap();

        let err = store.load_definition("demo").await.unwrap_err();
        assert!(matches!(err, EngineError::DefinitionNotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_definition() {
        let storage = Arc::new(MemoryFolderService::new());
        let store = PipelineStore::new(storage.clone());
        storage.create_folder("demo").await.unwrap();
        storage.upload("demo", CONFIG_FILE, b"not json").await.unwrap();

        let err = store.load_definition("demo").await.unwrap_err();
        assert!(matches!(err, EngineError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_unwritten_graph_defaults_to_empty() {
        let storage = Arc::new(MemoryFolderService::new());
        let store = PipelineStore::new(storage.clone());
        storage.create_folder("demo").await.unwrap();

        let graph = store.load_graph("demo").await.unwrap();
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[tokio::test]
    async fn test_graph_round_trip_empty_single_and_many() {
        let store = store_with_folder("demo").await;

        for count in [0usize, 1, 4] {
            let mut graph = PipelineGraph::default();
            for i in 0..count {
                graph.nodes.push(node(&format!("n{}", i)));
            }
            if count > 1 {
                graph.edges.push(DependencyEdge {
                    from: graph.nodes[0].id,
                    to: graph.nodes[1].id,
                });
            }

            store.save_graph("demo", &graph).await.unwrap();
            let loaded = store.load_graph("demo").await.unwrap();
            assert_eq!(loaded, graph);
        }
    }
}
