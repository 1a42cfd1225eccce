//! Diff command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use shipit_vc::VcResolver;

use crate::cli::{Cli, OutputFormat};

/// Show uncommitted changes to a file
#[derive(Debug, Args)]
pub struct DiffCommand {
    /// File to diff, relative to the project root
    pub file: PathBuf,
}

impl DiffCommand {
    /// Execute the diff command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(file = %self.file.display(), "executing diff command");
        let root = cli.project_dir()?;
        let (config, _) = cli.load_config(&root)?;
        let backend = VcResolver::from_config(&config.vc).resolve(&root)?;
        let diff = backend.local_diff(&root.join(&self.file))?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "backend": backend.name(),
                    "file": self.file.to_string_lossy(),
                    "diff": diff,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => print!("{}", diff),
        }
        Ok(())
    }
}
