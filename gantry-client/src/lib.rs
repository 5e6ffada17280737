//! Gantry Service Clients
//!
//! Type-safe clients for the two external collaborators of the pipeline
//! engine: the blob storage service ("virtual folder") and the compute
//! session service, plus the per-session event stream subscription.
//!
//! The engine only ever sees the `StorageService`, `SessionService` and
//! `EventSource` traits defined here, so it can be exercised in tests with
//! the bundled `MemoryFolderService` and scripted session doubles instead of
//! a network.
//!
//! # Example
//!
//! ```no_run
//! use gantry_client::{FolderClient, StorageService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = FolderClient::new("http://localhost:8081");
//!     storage.create_folder("my-pipeline").await?;
//!     storage.upload("my-pipeline", "config.json", b"{}").await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod events;
mod memory;
mod session;
mod storage;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use events::SseEventSource;
pub use memory::MemoryFolderService;
pub use session::ComputeClient;
pub use storage::FolderClient;

use async_trait::async_trait;
use gantry_core::domain::session::SessionEvent;
use gantry_core::dto::session::{
    CreateSessionRequest, FolderEntry, SessionHandle, SessionStatus,
};

/// Blob storage service ("virtual folder") operations
///
/// Paths are always relative to a named folder. Uploads overwrite; the
/// service itself guarantees that a failed upload leaves the previous
/// version of the artifact intact.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Create a new top-level folder
    async fn create_folder(&self, name: &str) -> Result<()>;

    /// Delete a folder and everything inside it
    async fn delete_folder(&self, name: &str) -> Result<()>;

    /// List all top-level folders
    async fn list_folders(&self) -> Result<Vec<String>>;

    /// Create a directory inside a folder
    async fn mkdir(&self, folder: &str, path: &str) -> Result<()>;

    /// List the entries under a path inside a folder
    async fn list_entries(&self, folder: &str, path: &str) -> Result<Vec<FolderEntry>>;

    /// Upload a byte blob to a path, overwriting any previous content
    async fn upload(&self, folder: &str, path: &str, bytes: &[u8]) -> Result<()>;

    /// Download a path as bytes
    async fn download(&self, folder: &str, path: &str) -> Result<Vec<u8>>;
}

/// Compute session service operations
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Create a new compute session
    async fn create_session(&self, req: &CreateSessionRequest) -> Result<SessionHandle>;

    /// Fetch the current status of a session by id
    async fn get_session(&self, session_id: &str) -> Result<SessionStatus>;

    /// Destroy a session
    async fn destroy_session(&self, session_id: &str) -> Result<()>;

    /// Fetch the captured task logs of a kernel
    async fn task_logs(&self, kernel_id: &str) -> Result<String>;

    /// Open the lifecycle event stream for a session
    async fn subscribe(&self, session_name: &str) -> Result<Box<dyn EventSource>>;
}

/// One session's lifecycle event stream
///
/// `Ok(None)` means the stream closed; a transport failure surfaces as
/// `ClientError::Stream`.
#[async_trait]
pub trait EventSource: Send {
    /// Wait for the next lifecycle event the engine consumes
    async fn next_event(&mut self) -> Result<Option<SessionEvent>>;
}
