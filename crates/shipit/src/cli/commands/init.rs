//! Init command

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Args;
use console::style;
use dialoguer::Confirm;
use tracing::info;

use shipit_core::config::{
    default_config_yaml, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML,
};
use shipit_core::ConfigError;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Configuration file syntax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigSyntax {
    /// shipit.toml
    #[default]
    Toml,
    /// shipit.yaml
    Yaml,
}

/// Write a starter configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Overwrite an existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Configuration syntax
    #[arg(long, default_value = "toml")]
    pub syntax: ConfigSyntax,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, syntax = ?self.syntax, "executing init command");
        let root = cli.project_dir()?;
        let config_path = match &self.output {
            Some(path) => root.join(path),
            None => root.join(match self.syntax {
                ConfigSyntax::Toml => DEFAULT_CONFIG_TOML,
                ConfigSyntax::Yaml => DEFAULT_CONFIG_YAML,
            }),
        };

        if config_path.exists() && !self.force {
            if !std::io::stdin().is_terminal() || cli.format == OutputFormat::Json {
                return Err(ConfigError::AlreadyExists(config_path).into());
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        let content = match self.syntax {
            ConfigSyntax::Toml => DEFAULT_CONFIG_TEMPLATE.to_string(),
            ConfigSyntax::Yaml => default_config_yaml(),
        };
        std::fs::write(&config_path, &content)?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "path": config_path.to_string_lossy(),
                    "syntax": format!("{:?}", self.syntax).to_lowercase(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text if !cli.quiet => {
                output::success(&format!(
                    "Created {}",
                    output::path_style().apply_to(config_path.display())
                ));
                println!();
                println!("Next steps:");
                println!("  1. Edit {} for your project", config_path.display());
                println!("  2. Run {} to check the pipeline", style("shipit prepare").cyan());
                println!("  3. Run {} to release", style("shipit run").cyan());
            }
            OutputFormat::Text => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use shipit_core::config::load_config;

    #[test]
    fn test_init_writes_loadable_config() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();

        for (syntax, file) in [("toml", "shipit.toml"), ("yaml", "shipit.yaml")] {
            let cli = Cli::try_parse_from(["shipit", "-q", "-C", &dir, "init", "--syntax", syntax]).unwrap();
            cli.execute().unwrap();

            let config = load_config(&temp.path().join(file)).unwrap();
            assert_eq!(
                config.steps.iter().map(|s| s.kind()).collect::<Vec<_>>(),
                vec!["change_version", "commit", "tag"]
            );
        }
    }

    #[test]
    fn test_init_refuses_existing_without_force() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("shipit.toml"), "steps = []\n").unwrap();
        let dir = temp.path().to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["shipit", "--format", "json", "-C", &dir, "init"]).unwrap();
        let err = cli.execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<shipit_core::ShipitError>(),
            Some(shipit_core::ShipitError::Config(ConfigError::AlreadyExists(_)))
        ));

        let cli = Cli::try_parse_from(["shipit", "-q", "-C", &dir, "init", "--force"]).unwrap();
        cli.execute().unwrap();
        assert!(std::fs::read_to_string(temp.path().join("shipit.toml"))
            .unwrap()
            .contains("change_version"));
    }
}
