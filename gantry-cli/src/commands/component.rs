//! Component command handlers
//!
//! Handles component creation, editing, removal, edge toggling, source
//! uploads and log retrieval. Every structural edit is persisted by the
//! engine before the command returns.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use crate::config::Config;
use crate::id_resolver::resolve_component;
use crate::types::IdOrPrefix;
use gantry_core::dto::component::ComponentDraft;
use gantry_core::slug::slugify;
use gantry_engine::registry::EdgeToggle;

/// Component subcommands
#[derive(Subcommand)]
pub enum ComponentCommands {
    /// Add a component to a pipeline
    Add {
        /// Pipeline name
        pipeline: String,

        /// Component title
        #[arg(short, long)]
        title: String,

        /// Description
        #[arg(short, long)]
        description: Option<String>,

        /// Relative directory, defaults to the slugified title
        #[arg(long)]
        path: Option<String>,

        /// CPU cores
        #[arg(long, default_value = "1")]
        cpu: u32,

        /// Memory in GiB
        #[arg(long, default_value = "0.5")]
        mem: f64,

        /// Fractional GPU share
        #[arg(long)]
        gpu: Option<f64>,

        /// Components to draw an edge from (id, prefix, title or path)
        #[arg(short, long)]
        parent: Vec<String>,
    },
    /// Update a component in place
    Update {
        /// Pipeline name
        pipeline: String,

        /// Component selector (id, prefix, title or path)
        id: String,

        /// Component title
        #[arg(short, long)]
        title: String,

        /// Description
        #[arg(short, long)]
        description: Option<String>,

        /// Relative directory, defaults to the slugified title
        #[arg(long)]
        path: Option<String>,

        /// CPU cores
        #[arg(long, default_value = "1")]
        cpu: u32,

        /// Memory in GiB
        #[arg(long, default_value = "0.5")]
        mem: f64,

        /// Fractional GPU share
        #[arg(long)]
        gpu: Option<f64>,
    },
    /// Remove components and every edge touching them
    Remove {
        /// Pipeline name
        pipeline: String,

        /// Component selectors
        ids: Vec<String>,
    },
    /// Toggle the dependency edge between two components
    Link {
        /// Pipeline name
        pipeline: String,

        /// First component selector
        a: String,

        /// Second component selector
        b: String,
    },
    /// Upload a component's source file
    Push {
        /// Pipeline name
        pipeline: String,

        /// Component selector
        id: String,

        /// Local file to upload as the component's main source
        #[arg(short, long)]
        file: String,
    },
    /// Show the archived logs of a component's last run
    Logs {
        /// Pipeline name
        pipeline: String,

        /// Component selector
        id: String,
    },
}

/// Handle component commands
pub async fn handle_component_command(command: ComponentCommands, config: &Config) -> Result<()> {
    match command {
        ComponentCommands::Add {
            pipeline,
            title,
            description,
            path,
            cpu,
            mem,
            gpu,
            parent,
        } => {
            let mut executor = config.open_executor(&slugify(&pipeline)).await?;

            let parents = parent
                .iter()
                .map(|p| resolve_component(executor.graph(), &IdOrPrefix::parse(p)))
                .collect::<Result<Vec<_>>>()?;

            let draft = ComponentDraft {
                title,
                description,
                path,
                cpu,
                mem,
                gpu,
                parents,
            };
            let node = executor.add_component(&draft).await?;

            println!("{}", "✓ Component added!".green().bold());
            println!("  ID:    {}", node.id.to_string().cyan());
            println!("  Title: {}", node.title.bold());
            println!("  Path:  {}", node.path.dimmed());
            Ok(())
        }
        ComponentCommands::Update {
            pipeline,
            id,
            title,
            description,
            path,
            cpu,
            mem,
            gpu,
        } => {
            let mut executor = config.open_executor(&slugify(&pipeline)).await?;
            let id = resolve_component(executor.graph(), &IdOrPrefix::parse(&id))?;

            let draft = ComponentDraft {
                title,
                description,
                path,
                cpu,
                mem,
                gpu,
                parents: Vec::new(),
            };
            let node = executor.update_component(id, &draft).await?;

            println!("{}", "✓ Component updated!".green().bold());
            println!("  Title: {}", node.title.bold());
            Ok(())
        }
        ComponentCommands::Remove { pipeline, ids } => {
            let mut executor = config.open_executor(&slugify(&pipeline)).await?;

            let ids = ids
                .iter()
                .map(|i| resolve_component(executor.graph(), &IdOrPrefix::parse(i)))
                .collect::<Result<Vec<_>>>()?;

            executor.remove_components(&ids).await?;

            println!(
                "{}",
                format!("✓ Removed {} component(s)", ids.len()).green().bold()
            );
            Ok(())
        }
        ComponentCommands::Link { pipeline, a, b } => {
            let mut executor = config.open_executor(&slugify(&pipeline)).await?;
            let a = resolve_component(executor.graph(), &IdOrPrefix::parse(&a))?;
            let b = resolve_component(executor.graph(), &IdOrPrefix::parse(&b))?;

            match executor.toggle_dependency(a, b).await? {
                EdgeToggle::Added => println!("{}", "✓ Edge added".green().bold()),
                EdgeToggle::Removed => println!("{}", "✓ Edge removed".green().bold()),
            }
            Ok(())
        }
        ComponentCommands::Push { pipeline, id, file } => {
            let mut executor = config.open_executor(&slugify(&pipeline)).await?;
            let id = resolve_component(executor.graph(), &IdOrPrefix::parse(&id))?;

            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read source file: {}", file))?;

            executor.push_source(id, &code).await?;

            println!("{}", "✓ Source uploaded".green().bold());
            Ok(())
        }
        ComponentCommands::Logs { pipeline, id } => {
            let executor = config.open_executor(&slugify(&pipeline)).await?;
            let id = resolve_component(executor.graph(), &IdOrPrefix::parse(&id))?;

            let logs = executor.component_logs(id).await?;
            print!("{}", logs);
            Ok(())
        }
    }
}
