//! Pipeline definition types

use serde::{Deserialize, Serialize};

/// Pipeline definition
///
/// Shared execution metadata for one pipeline: which compute image its
/// components run on, which resource pool schedules them and which storage
/// volume backs the pipeline folder.
///
/// Persisted as a single JSON document (`config.json`) inside the pipeline's
/// storage folder and only ever rewritten as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub title: String,
    pub description: Option<String>,
    /// Compute image reference (e.g. "python")
    pub environment: String,
    /// Compute image tag (e.g. "3.11-ubuntu22.04")
    pub version: String,
    pub scaling_group: String,
    /// Backing volume identifier, stored under the service's `folder_host` key
    #[serde(rename = "folder_host")]
    pub storage_host: String,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PipelineDefinition {
    /// Full image reference passed to the session service
    pub fn image(&self) -> String {
        format!("{}:{}", self.environment, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_reference() {
        let def = PipelineDefinition {
            title: "demo".to_string(),
            description: None,
            environment: "python".to_string(),
            version: "3.11-ubuntu22.04".to_string(),
            scaling_group: "default".to_string(),
            storage_host: "local:volume1".to_string(),
            created_at: chrono::Utc::now(),
        };

        assert_eq!(def.image(), "python:3.11-ubuntu22.04");
    }

    #[test]
    fn test_storage_host_wire_key() {
        let def = PipelineDefinition {
            title: "demo".to_string(),
            description: Some("a pipeline".to_string()),
            environment: "python".to_string(),
            version: "latest".to_string(),
            scaling_group: "default".to_string(),
            storage_host: "local:volume1".to_string(),
            created_at: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["folder_host"], "local:volume1");
        assert!(json.get("storage_host").is_none());
    }
}
