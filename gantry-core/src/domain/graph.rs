//! Pipeline graph domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource request attached to one component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// CPU cores, at least 1
    pub cpu: u32,
    /// Memory in GiB, at least 0.1
    pub mem: f64,
    /// Fractional GPU share, 0 when the component runs CPU-only
    #[serde(default)]
    pub gpu: f64,
}

/// One executable unit within a pipeline
///
/// Backed by a source file (`<path>/main.py`) and a resource request. The
/// `id` is assigned once at creation time and never changes; `executed`
/// flips to true only after the node's most recent session terminated
/// successfully and is reset whenever the node's code changes or a
/// whole-pipeline run restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: Uuid,
    pub title: String,
    /// Display label, mirrors `title`
    pub label: String,
    pub description: Option<String>,
    /// Slugified relative directory holding the node's code and log files
    pub path: String,
    pub resources: ResourceRequest,
    #[serde(default)]
    pub executed: bool,
}

/// Descriptive adjacency between two components in the visual graph
///
/// Edges are not consulted by the execution engine; run order is strictly
/// the array order of `PipelineGraph::nodes`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: Uuid,
    pub to: Uuid,
}

impl DependencyEdge {
    /// Whether this edge connects the two ids, in either direction
    pub fn connects(&self, a: Uuid, b: Uuid) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    /// Whether this edge touches the given node at all
    pub fn touches(&self, id: Uuid) -> bool {
        self.from == id || self.to == id
    }
}

/// The full pipeline graph, persisted as `components.json`
///
/// This is the sole source of truth for a pipeline's structure; any
/// in-memory copy is a cache that must be re-synchronized by a full
/// re-download after an external-looking failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineGraph {
    #[serde(default)]
    pub nodes: Vec<ComponentNode>,
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
}

impl PipelineGraph {
    /// Find the array index of a node by id
    pub fn node_index(&self, id: Uuid) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Find a node by id
    pub fn node(&self, id: Uuid) -> Option<&ComponentNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Whether an edge between the two ids exists, in either direction
    pub fn connected(&self, a: Uuid, b: Uuid) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }
}
