//! Component DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input for creating or updating a component
///
/// Validation (non-empty title/path, resource minimums) happens in the
/// engine's registry, not here; a draft is inert data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDraft {
    pub title: String,
    pub description: Option<String>,
    /// Relative directory for the component's files; defaults to the
    /// slugified title when omitted
    pub path: Option<String>,
    pub cpu: u32,
    /// Memory in GiB
    pub mem: f64,
    pub gpu: Option<f64>,
    /// Existing components to draw an edge from, creation only
    #[serde(default)]
    pub parents: Vec<Uuid>,
}

impl ComponentDraft {
    /// Minimal draft with the given title and resource floor
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            path: None,
            cpu: 1,
            mem: 0.5,
            gpu: None,
            parents: Vec::new(),
        }
    }
}
