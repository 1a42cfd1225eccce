//! Steps command

use clap::Args;
use console::style;
use tracing::info;

use shipit_pipeline::{Pipeline, StepRegistry};

use crate::cli::{Cli, OutputFormat};

/// List the available step kinds and the configured pipeline
#[derive(Debug, Args)]
pub struct StepsCommand {
    /// Only list the available step kinds
    #[arg(long)]
    pub kinds: bool,
}

impl StepsCommand {
    /// Execute the steps command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(kinds = self.kinds, "executing steps command");
        let registry = StepRegistry::builtin();

        let configured = if self.kinds {
            None
        } else {
            let root = cli.project_dir()?;
            let (config, _) = cli.load_config(&root)?;
            Some(Pipeline::from_config(&registry, &config)?)
        };

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "kinds": registry.kinds().iter().map(|k| serde_json::json!({
                        "name": k.name,
                        "summary": k.summary,
                    })).collect::<Vec<_>>(),
                    "pipeline": configured.as_ref().map(|p| p.labels()),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!("{}", style("Step kinds").underlined());
                for kind in registry.kinds() {
                    println!("  {:<16} {}", style(kind.name).cyan(), kind.summary);
                }

                if let Some(pipeline) = configured {
                    println!();
                    println!("{}", style("Configured pipeline").underlined());
                    if pipeline.is_empty() {
                        println!("  {}", style("no steps").dim());
                    }
                    for (i, label) in pipeline.labels().iter().enumerate() {
                        println!("  {}. {}", i + 1, label);
                    }
                }
            }
        }
        Ok(())
    }
}
