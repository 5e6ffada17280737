//! Run and save command handlers

use anyhow::{Context, Result};
use colored::*;

use crate::commands::pipeline::print_graph;
use crate::config::Config;
use crate::id_resolver::resolve_component;
use crate::types::IdOrPrefix;
use gantry_core::slug::slugify;

/// Run a whole pipeline, or a single component of it, and wait for the
/// terminal event of every launched session
pub async fn handle_run(pipeline: &str, component: Option<String>, config: &Config) -> Result<()> {
    let mut executor = config.open_executor(&slugify(pipeline)).await?;

    match component {
        Some(selector) => {
            let id = resolve_component(executor.graph(), &IdOrPrefix::parse(&selector))?;
            let index = executor
                .graph()
                .node_index(id)
                .context("Component disappeared from the graph")?;
            executor.run_component(index).await?;
        }
        None => {
            executor.run_pipeline().await?;
        }
    }

    if let Err(e) = executor.drive().await {
        // The persisted artifacts are the source of truth after a failure
        executor.reload().await.ok();
        return Err(e.into());
    }

    println!();
    print_graph(executor.graph());

    if executor.graph().nodes.iter().all(|n| n.executed) {
        println!("{}", "✓ Run finished".green().bold());
    } else {
        println!("{}", "Run did not complete every component".yellow());
    }
    Ok(())
}

/// Persist a pipeline's graph without running anything
pub async fn handle_save(pipeline: &str, config: &Config) -> Result<()> {
    let executor = config.open_executor(&slugify(pipeline)).await?;
    executor.save_pipeline().await?;

    println!("{}", "✓ Pipeline saved".green().bold());
    Ok(())
}
