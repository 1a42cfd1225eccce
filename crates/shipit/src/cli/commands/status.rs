//! Status command

use clap::Args;
use console::style;
use tracing::info;

use shipit_core::VcError;
use shipit_vc::{TreeStatus, VcResolver};

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Show configuration and working-copy status
#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    /// Execute the status command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing status command");
        let root = cli.project_dir()?;
        let (config, config_path) = cli.load_config(&root)?;
        let version = config.package.version.as_str();

        let resolver = VcResolver::from_config(&config.vc);
        let detected = resolver.detect(&root);
        let backend = resolver.resolve(&root)?;
        let (tree, untracked) = match backend.precommit() {
            Ok(TreeStatus::Changes) => ("modified", Vec::new()),
            Ok(TreeStatus::NoChanges) => ("clean", Vec::new()),
            Err(shipit_core::ShipitError::Vc(VcError::DirtyOrUntrackedTree(files))) => {
                ("untracked files", files)
            }
            Err(e) => return Err(e.into()),
        };
        let tagged = if version.is_empty() {
            None
        } else {
            Some(backend.exists_tagged_version(version)?)
        };
        let changed_since_tag = match tagged {
            Some(true) => Some(backend.are_local_diffs(version)?),
            _ => None,
        };

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "config_found": config_path.is_some(),
                    "config_path": config_path.map(|p| p.to_string_lossy().to_string()),
                    "package": &config.package,
                    "steps": config.steps.len(),
                    "vc": {
                        "backend": backend.name(),
                        "detected": detected,
                        "root": backend.root().to_string_lossy(),
                        "tree": tree,
                        "untracked": untracked,
                        "version_tagged": tagged,
                        "changed_since_tag": changed_since_tag,
                    },
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!("{}", style("Shipit Status").bold());
                println!();

                println!("{}", style("Configuration").underlined());
                match &config_path {
                    Some(path) => println!(
                        "{}",
                        output::key_value("Config file", &output::path_style().apply_to(path.display()).to_string())
                    ),
                    None => println!(
                        "{}",
                        output::key_value("Config file", &format!("{} (using defaults)", style("not found").yellow()))
                    ),
                }
                println!("{}", output::key_value("Package", &config.package.name));
                if !version.is_empty() {
                    println!(
                        "{}",
                        output::key_value("Version", &output::version_style().apply_to(version).to_string())
                    );
                }
                println!("{}", output::key_value("Steps", &config.steps.len().to_string()));
                println!();

                println!("{}", style("Version control").underlined());
                println!("{}", output::key_value("Backend", backend.name()));
                if detected.len() > 1 || !detected.contains(&backend.name()) {
                    println!("{}", output::key_value("Detected", &detected.join(", ")));
                }
                let tree_status = match tree {
                    "clean" => style(tree).green(),
                    _ => style(tree).yellow(),
                };
                println!("{}", output::key_value("Working copy", &tree_status.to_string()));
                for file in &untracked {
                    println!("    {}", style(file).red());
                }
                match (tagged, changed_since_tag) {
                    (Some(true), Some(true)) => output::info(&format!("Tag {} exists; changes since", version)),
                    (Some(true), _) => output::info(&format!("Tag {} exists; no changes since", version)),
                    (Some(false), _) => output::info(&format!("Version {} is not tagged yet", version)),
                    (None, _) => {}
                }
            }
        }
        Ok(())
    }
}
