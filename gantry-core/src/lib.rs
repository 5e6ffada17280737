//! Gantry Core
//!
//! Core types and abstractions for the Gantry pipeline system.
//!
//! This crate contains:
//! - Domain types: Core business entities (PipelineDefinition, ComponentNode, etc.)
//! - DTOs: Data transfer objects for talking to the storage and session services
//! - The folder-name slug helper shared by every other crate

pub mod domain;
pub mod dto;
pub mod slug;
