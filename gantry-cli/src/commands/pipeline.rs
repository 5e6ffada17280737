//! Pipeline command handlers
//!
//! Handles pipeline creation, listing, inspection and deletion.

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::Config;
use gantry_core::domain::graph::PipelineGraph;
use gantry_core::domain::pipeline::PipelineDefinition;
use gantry_core::slug::slugify;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Create a new pipeline
    Create {
        /// Pipeline name; its slug becomes the storage folder
        name: String,

        /// Display title, defaults to the name
        #[arg(short, long)]
        title: Option<String>,

        /// Description
        #[arg(short, long)]
        description: Option<String>,

        /// Compute image the components run on
        #[arg(short, long, default_value = "python")]
        environment: String,

        /// Compute image tag
        #[arg(short = 'V', long, default_value = "latest")]
        version: String,

        /// Resource pool for the components' sessions
        #[arg(long, default_value = "default")]
        scaling_group: String,

        /// Backing storage volume
        #[arg(long, default_value = "local:volume1")]
        storage_host: String,
    },
    /// List all pipelines
    List,
    /// Show a pipeline's definition and components
    Info {
        /// Pipeline name
        name: String,
    },
    /// Delete a pipeline and every artifact in its folder
    Delete {
        /// Pipeline name
        name: String,
    },
}

/// Handle pipeline commands
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    match command {
        PipelineCommands::Create {
            name,
            title,
            description,
            environment,
            version,
            scaling_group,
            storage_host,
        } => {
            let folder = slugify(&name);
            if folder.is_empty() {
                anyhow::bail!("Pipeline name must contain at least one letter or digit");
            }

            let def = PipelineDefinition {
                title: title.unwrap_or(name),
                description,
                environment,
                version,
                scaling_group,
                storage_host,
                created_at: chrono::Utc::now(),
            };

            config.store().create_pipeline(&folder, &def).await?;

            println!("{}", "✓ Pipeline created successfully!".green().bold());
            println!("  Folder: {}", folder.cyan());
            println!("  Title:  {}", def.title.bold());
            println!("  Image:  {}", def.image().dimmed());
            Ok(())
        }
        PipelineCommands::List => {
            let folders = config.store().list_pipelines().await?;

            if folders.is_empty() {
                println!("{}", "No pipelines found.".yellow());
            } else {
                println!("{}", format!("Found {} pipeline(s):", folders.len()).bold());
                for folder in folders {
                    println!("  {}", folder.cyan());
                }
            }
            Ok(())
        }
        PipelineCommands::Info { name } => {
            let store = config.store();
            let folder = slugify(&name);
            let def = store.load_definition(&folder).await?;
            let graph = store.load_graph(&folder).await?;

            println!("{}", def.title.bold());
            if let Some(description) = &def.description {
                println!("  {}", description.dimmed());
            }
            println!("  Image:         {}", def.image());
            println!("  Scaling group: {}", def.scaling_group);
            println!("  Storage host:  {}", def.storage_host);
            println!();
            print_graph(&graph);
            Ok(())
        }
        PipelineCommands::Delete { name } => {
            let folder = slugify(&name);
            config.store().delete_pipeline(&folder).await?;

            println!(
                "{}",
                format!("✓ Pipeline {} deleted successfully!", folder)
                    .green()
                    .bold()
            );
            Ok(())
        }
    }
}

/// Print the components and edges of a graph
pub fn print_graph(graph: &PipelineGraph) {
    if graph.nodes.is_empty() {
        println!("{}", "No components yet.".yellow());
        return;
    }

    println!("{}", format!("{} component(s):", graph.nodes.len()).bold());
    for (index, node) in graph.nodes.iter().enumerate() {
        let marker = if node.executed {
            "✓".green()
        } else {
            "·".dimmed()
        };
        println!(
            "  {} [{}] {} {}",
            marker,
            index,
            node.title.bold(),
            format!(
                "({}, cpu {}, mem {}g, gpu {})",
                node.path, node.resources.cpu, node.resources.mem, node.resources.gpu
            )
            .dimmed()
        );
        println!("      {}", node.id.to_string().dimmed());
    }

    if !graph.edges.is_empty() {
        println!("{}", format!("{} edge(s):", graph.edges.len()).bold());
        for edge in &graph.edges {
            let from = graph.node(edge.from).map(|n| n.title.as_str()).unwrap_or("?");
            let to = graph.node(edge.to).map(|n| n.title.as_str()).unwrap_or("?");
            println!("  {} -> {}", from, to);
        }
    }
}
