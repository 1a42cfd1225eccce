//! CLI definition and command handling

pub mod commands;
pub mod output;
pub mod prompt;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use shipit_core::config::{load_config, load_config_or_default, Config};

use commands::{DiffCommand, InitCommand, RunCommand, StatusCommand, StepsCommand};

/// Shipit - prepare every release step, confirm, then run them
#[derive(Debug, Parser)]
#[command(name = "shipit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: search upward for shipit.toml / shipit.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prepare, confirm and run the release pipeline
    Run(RunCommand),

    /// Prepare every step without running any
    Prepare(RunCommand),

    /// Prepare, then run every step against recording capabilities
    Rehearse(RunCommand),

    /// List step kinds and the configured pipeline
    Steps(StepsCommand),

    /// Show configuration and working-copy status
    Status(StatusCommand),

    /// Show local changes to a file
    Diff(DiffCommand),

    /// Write a starter configuration file
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Run(cmd) => cmd.execute(self, cmd.mode()),
            Commands::Prepare(cmd) => cmd.execute(self, shipit_pipeline::RunMode::PrepareOnly),
            Commands::Rehearse(cmd) => cmd.execute(self, shipit_pipeline::RunMode::Rehearsal),
            Commands::Steps(cmd) => cmd.execute(self),
            Commands::Status(cmd) => cmd.execute(self),
            Commands::Diff(cmd) => cmd.execute(self),
            Commands::Init(cmd) => cmd.execute(self),
        }
    }

    /// Project root: `-C` or the current directory
    pub fn project_dir(&self) -> anyhow::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(match &self.directory {
            Some(dir) => cwd.join(dir),
            None => cwd,
        })
    }

    /// Load `-c` or the nearest configuration file; defaults when none exists
    pub fn load_config(&self, root: &Path) -> anyhow::Result<(Config, Option<PathBuf>)> {
        match &self.config {
            Some(path) => {
                let path = root.join(path);
                Ok((load_config(&path)?, Some(path)))
            }
            None => Ok(load_config_or_default(root)?),
        }
    }
}
