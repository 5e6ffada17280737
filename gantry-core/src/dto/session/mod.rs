//! Session service DTOs

use serde::{Deserialize, Serialize};

/// Request to create a batch compute session
///
/// Field names follow the session service's wire contract, which mixes
/// snake_case and camelCase keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Full container image reference (environment:version)
    pub image: String,
    /// Client-chosen session name
    pub name: String,
    pub domain: String,
    pub group_name: String,
    /// Always "batch" for pipeline components
    #[serde(rename = "type")]
    pub session_type: String,
    /// The service must not block the caller while the session boots
    #[serde(rename = "enqueueOnly")]
    pub enqueue_only: bool,
    #[serde(rename = "startupCommand")]
    pub startup_command: String,
    #[serde(rename = "maxWaitSeconds")]
    pub max_wait_seconds: u64,
    /// Storage folders mounted into the session
    pub mounts: Vec<String>,
    pub scaling_group: String,
    pub cpu: u32,
    /// Memory with unit suffix, e.g. "0.5g"
    pub mem: String,
    pub fgpu: f64,
}

/// Handle returned by create-session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHandle {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "sessionName")]
    pub session_name: String,
}

/// Snapshot returned by get-session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub name: String,
    pub status: String,
    /// Session-internal kernel id; present once the service has assigned one
    #[serde(rename = "kernelId")]
    pub kernel_id: Option<String>,
}

/// One row of a storage folder listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    #[serde(default)]
    pub is_dir: bool,
}
