//! Artifact helpers
//!
//! Idempotent storage operations the orchestrator runs before and after a
//! session: making sure a component's working directory and main source
//! file exist, and archiving the captured task logs.

use crate::error::{EngineError, Result};
use gantry_client::StorageService;
use gantry_core::domain::graph::ComponentNode;

/// File name of a component's executable source
pub const MAIN_FILE: &str = "main.py";

/// File name of a component's archived run logs
pub const LOG_FILE: &str = "execution_logs.txt";

/// Relative path of a component's main source file
pub fn main_path(node: &ComponentNode) -> String {
    format!("{}/{}", node.path, MAIN_FILE)
}

/// Relative path of a component's log artifact
pub fn log_path(node: &ComponentNode) -> String {
    format!("{}/{}", node.path, LOG_FILE)
}

/// Make sure the component's working directory exists
///
/// An "already exists" response counts as success; anything else surfaces
/// as an artifact error.
pub async fn ensure_component_folder(
    storage: &dyn StorageService,
    folder: &str,
    node: &ComponentNode,
) -> Result<()> {
    match storage.mkdir(folder, &node.path).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_already_exists() => Ok(()),
        Err(e) => Err(EngineError::Artifact(e)),
    }
}

/// Make sure the component's main source file exists and return its content
///
/// When the file has never been written, an empty placeholder is uploaded
/// and empty content returned; the caller may then run or edit it.
pub async fn ensure_main_source(
    storage: &dyn StorageService,
    folder: &str,
    node: &ComponentNode,
) -> Result<String> {
    match storage.download(folder, &main_path(node)).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.is_not_found() => {
            storage
                .upload(folder, &main_path(node), b"")
                .await
                .map_err(EngineError::Artifact)?;
            Ok(String::new())
        }
        Err(e) => Err(EngineError::Artifact(e)),
    }
}

/// Archive a run's captured logs, overwriting any previous log
pub async fn upload_logs(
    storage: &dyn StorageService,
    folder: &str,
    node: &ComponentNode,
    text: &str,
) -> Result<()> {
    storage
        .upload(folder, &log_path(node), text.as_bytes())
        .await
        .map_err(EngineError::Artifact)
}
