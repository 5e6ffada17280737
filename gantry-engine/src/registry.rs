//! Component registry
//!
//! Structural edits to one in-memory `PipelineGraph`. The registry holds no
//! storage handle; callers persist through the pipeline store after each
//! successful edit, which keeps these operations independently testable.
//! A failed validation never mutates the graph.

use uuid::Uuid;

use crate::error::{EngineError, Result};
use gantry_core::domain::graph::{ComponentNode, DependencyEdge, PipelineGraph};
use gantry_core::dto::component::ComponentDraft;
use gantry_core::slug::slugify;

/// What `toggle_edge` did to the edge set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeToggle {
    Added,
    Removed,
}

/// Validated fields extracted from a draft
struct CheckedDraft {
    title: String,
    description: Option<String>,
    path: String,
    resources: gantry_core::domain::graph::ResourceRequest,
}

fn validate(draft: &ComponentDraft) -> Result<CheckedDraft> {
    let title = draft.title.trim().to_string();
    if title.is_empty() {
        return Err(EngineError::Validation {
            field: "title",
            reason: "title cannot be empty".to_string(),
        });
    }

    let path = match &draft.path {
        Some(path) => path.trim().to_string(),
        None => slugify(&title),
    };
    if path.is_empty() {
        return Err(EngineError::Validation {
            field: "path",
            reason: "path cannot be empty".to_string(),
        });
    }

    if draft.cpu < 1 {
        return Err(EngineError::Validation {
            field: "cpu",
            reason: "at least 1 CPU core is required".to_string(),
        });
    }

    if draft.mem < 0.1 {
        return Err(EngineError::Validation {
            field: "mem",
            reason: "at least 0.1 GiB of memory is required".to_string(),
        });
    }

    let gpu = draft.gpu.unwrap_or(0.0);
    if gpu < 0.0 {
        return Err(EngineError::Validation {
            field: "gpu",
            reason: "gpu share cannot be negative".to_string(),
        });
    }

    Ok(CheckedDraft {
        title,
        description: draft.description.clone(),
        path,
        resources: gantry_core::domain::graph::ResourceRequest {
            cpu: draft.cpu,
            mem: draft.mem,
            gpu,
        },
    })
}

/// Add a new component to the graph
///
/// Assigns a fresh id, appends the node and one edge per supplied parent.
/// Fails without touching the graph when validation fails or a parent id
/// is unknown.
pub fn add_node(graph: &mut PipelineGraph, draft: &ComponentDraft) -> Result<ComponentNode> {
    let checked = validate(draft)?;

    for parent in &draft.parents {
        if graph.node_index(*parent).is_none() {
            return Err(EngineError::UnknownComponent(*parent));
        }
    }

    let node = ComponentNode {
        id: Uuid::new_v4(),
        label: checked.title.clone(),
        title: checked.title,
        description: checked.description,
        path: checked.path,
        resources: checked.resources,
        executed: false,
    };

    for parent in &draft.parents {
        graph.edges.push(DependencyEdge {
            from: *parent,
            to: node.id,
        });
    }
    graph.nodes.push(node.clone());

    Ok(node)
}

/// Replace an existing component's fields in place
///
/// The id is immutable and the `executed` flag is left untouched; callers
/// reset it explicitly when the node's code changes.
pub fn update_node(
    graph: &mut PipelineGraph,
    id: Uuid,
    draft: &ComponentDraft,
) -> Result<ComponentNode> {
    let checked = validate(draft)?;

    let index = graph
        .node_index(id)
        .ok_or(EngineError::UnknownComponent(id))?;

    let node = &mut graph.nodes[index];
    node.label = checked.title.clone();
    node.title = checked.title;
    node.description = checked.description;
    node.path = checked.path;
    node.resources = checked.resources;

    Ok(node.clone())
}

/// Remove components and every edge touching them
pub fn delete_nodes(graph: &mut PipelineGraph, ids: &[Uuid]) {
    graph.nodes.retain(|n| !ids.contains(&n.id));
    graph
        .edges
        .retain(|e| !ids.iter().any(|id| e.touches(*id)));
}

/// Toggle the edge between two components
///
/// Removes the edge if one exists in either direction, otherwise appends
/// `a -> b`. Pure over the edge set, so a pair of toggles is the identity.
pub fn toggle_edge(graph: &mut PipelineGraph, a: Uuid, b: Uuid) -> Result<EdgeToggle> {
    if a == b {
        return Err(EngineError::InvalidSelection);
    }
    if graph.node_index(a).is_none() || graph.node_index(b).is_none() {
        return Err(EngineError::InvalidSelection);
    }

    match graph.edges.iter().position(|e| e.connects(a, b)) {
        Some(index) => {
            graph.edges.remove(index);
            Ok(EdgeToggle::Removed)
        }
        None => {
            graph.edges.push(DependencyEdge { from: a, to: b });
            Ok(EdgeToggle::Added)
        }
    }
}
