//! Engine error taxonomy
//!
//! Nothing here is fatal to the process: every failure path in the engine
//! resets its queue and indicator state before returning, so the caller is
//! always back at idle and free to retry.

use thiserror::Error;
use uuid::Uuid;

use gantry_client::ClientError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the pipeline engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed component draft, rejected before any mutation or I/O
    #[error("invalid component field '{field}': {reason}")]
    Validation {
        /// The offending draft field
        field: &'static str,
        reason: String,
    },

    /// Edge toggling needs exactly two distinct components
    #[error("select exactly two distinct components to connect")]
    InvalidSelection,

    /// A component was launched before its predecessors completed
    #[error("component '{title}' has not finished yet")]
    PrerequisiteNotMet {
        /// Title of the first unfinished predecessor
        title: String,
    },

    /// The pipeline folder has no saved definition artifact
    #[error("pipeline '{0}' has no saved definition")]
    DefinitionNotFound(String),

    /// A persisted artifact could not be parsed
    #[error("stored artifact '{path}' is malformed: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Storage failed for a reason other than "not found" while preparing
    /// a component's files
    #[error("storage operation failed: {0}")]
    Artifact(#[source] ClientError),

    /// The session service never reported a kernel id within the poll bound
    #[error("session '{0}' did not become ready in time")]
    SessionNotReady(String),

    /// Transport-level failure of the event subscription
    #[error("event stream failed: {0}")]
    Stream(#[source] ClientError),

    /// A run was requested while another subscription is still open, or a
    /// termination was requested for a session already being torn down
    #[error("a run is already in progress")]
    AlreadyInProgress,

    /// A termination was requested while nothing is running
    #[error("no run is currently in progress")]
    NotRunning,

    /// No component with the given id exists in the graph
    #[error("component {0} not found")]
    UnknownComponent(Uuid),

    /// No component at the given array index
    #[error("no component at index {0}")]
    UnknownIndex(usize),

    /// Any other service client failure
    #[error(transparent)]
    Client(#[from] ClientError),
}
