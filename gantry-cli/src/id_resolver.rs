//! Component id resolution
//!
//! Resolves a user-supplied selector (full id, id prefix, title or path)
//! against the loaded pipeline graph.

use anyhow::{Result, bail};
use uuid::Uuid;

use crate::types::IdOrPrefix;
use gantry_core::domain::graph::PipelineGraph;

/// Resolve a selector to a component id
///
/// Fails when nothing matches or when a prefix matches more than one
/// component.
pub fn resolve_component(graph: &PipelineGraph, selector: &IdOrPrefix) -> Result<Uuid> {
    if let Some(uuid) = selector.as_uuid() {
        if graph.node(uuid).is_some() {
            return Ok(uuid);
        }
        bail!("No component with id {}", uuid);
    }

    let needle = selector.as_str();
    let matches: Vec<Uuid> = graph
        .nodes
        .iter()
        .filter(|n| {
            n.id.to_string().starts_with(&needle) || n.title == needle || n.path == needle
        })
        .map(|n| n.id)
        .collect();

    match matches.len() {
        0 => bail!("No component matches '{}'", needle),
        1 => Ok(matches[0]),
        n => bail!("'{}' is ambiguous: {} components match", needle, n),
    }
}
