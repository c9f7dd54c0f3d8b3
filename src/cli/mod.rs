//! CLI command parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::Config;

/// rootbound - let a model edit and run code inside one directory.
#[derive(Parser)]
#[command(name = "rootbound")]
#[command(about = "Tool-calling coding agent confined to a working directory")]
#[command(version)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Instruction for the agent. Multiple words are joined with spaces.
    pub prompt: Vec<String>,

    /// Increase verbosity: show tool arguments, results and token counts.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory the agent is confined to.
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Maximum number of model rounds.
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// Model to use.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Provider to use (key in [agent.providers]).
    #[arg(short, long)]
    pub provider: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The instruction, or `None` if no words were given.
    #[must_use]
    pub fn instruction(&self) -> Option<String> {
        let joined = self.prompt.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Apply command-line overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.sandbox.root.clone_from(root);
        }
        if let Some(max_rounds) = self.max_rounds {
            config.agent.max_rounds = max_rounds;
        }
        if let Some(model) = &self.model {
            config.agent.model.clone_from(model);
        }
        if let Some(provider) = &self.provider {
            config.agent.provider.clone_from(provider);
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration.
    Show,

    /// Show the configuration file path.
    Path,
}
