//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod component;
mod pipeline;
mod run;

pub use component::ComponentCommands;
pub use pipeline::PipelineCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pipeline management
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Component management
    Component {
        #[command(subcommand)]
        command: ComponentCommands,
    },
    /// Run a whole pipeline, or a single component of it
    Run {
        /// Pipeline name
        pipeline: String,

        /// Run only this component (id, prefix, title or path)
        #[arg(short, long)]
        component: Option<String>,
    },
    /// Persist a pipeline's graph without running anything
    Save {
        /// Pipeline name
        pipeline: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::Component { command } => {
            component::handle_component_command(command, config).await
        }
        Commands::Run {
            pipeline,
            component,
        } => run::handle_run(&pipeline, component, config).await,
        Commands::Save { pipeline } => run::handle_save(&pipeline, config).await,
    }
}
