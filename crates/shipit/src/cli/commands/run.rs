//! Run, prepare and rehearse commands

use std::io::IsTerminal;
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::info;

use shipit_pipeline::{
    AssumeYes, ExecutionReport, Executor, LinePrompt, Pipeline, RunMode, StepContext,
    StepRegistry,
};

use crate::cli::output::{self, ConsoleReporter};
use crate::cli::prompt::TerminalPrompt;
use crate::cli::{Cli, OutputFormat};

/// Execute the configured release pipeline
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Prepare every step, then stop
    #[arg(long, conflicts_with = "rehearsal")]
    pub prepare_only: bool,

    /// Run every step against recording capabilities; nothing is changed
    #[arg(long)]
    pub rehearsal: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl RunCommand {
    /// Mode selected by the flags
    pub fn mode(&self) -> RunMode {
        if self.prepare_only {
            RunMode::PrepareOnly
        } else if self.rehearsal {
            RunMode::Rehearsal
        } else {
            RunMode::Full
        }
    }

    /// Execute the pipeline in `mode`
    pub fn execute(&self, cli: &Cli, mode: RunMode) -> anyhow::Result<()> {
        info!(mode = ?mode, yes = self.yes, "executing run command");
        let root = cli.project_dir()?;
        let (mut config, config_path) = cli.load_config(&root)?;

        if config_path.is_none() && !cli.quiet && cli.format == OutputFormat::Text {
            output::warning(&format!(
                "No configuration found, using defaults. Run {} to create one.",
                style("shipit init").cyan()
            ));
        }
        if self.yes {
            config.confirm.assume_yes = true;
        }

        let registry = StepRegistry::builtin();
        let mut pipeline = Pipeline::from_config(&registry, &config)?;
        if pipeline.is_empty() {
            if cli.format == OutputFormat::Text && !cli.quiet {
                output::warning("No steps configured; nothing to do");
            }
            return Ok(());
        }

        let assume_yes = config.confirm.assume_yes;
        let ctx = StepContext::new(&root, config);
        let mut ctx = if assume_yes {
            ctx.with_prompt(AssumeYes)
        } else if std::io::stdin().is_terminal() && console::Term::stderr().is_term() {
            ctx.with_prompt(TerminalPrompt)
        } else {
            ctx.with_prompt(LinePrompt::stdio())
        };

        // stdout carries the JSON document; the step list still reaches the operator on stderr
        let quiet = cli.quiet || cli.format == OutputFormat::Json;
        let mut executor =
            Executor::new(mode).with_reporter(Arc::new(ConsoleReporter::new(quiet)));

        let result = executor.execute(&mut pipeline, &mut ctx);
        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "release": &ctx.release,
                    "report": executor.report(),
                    "error": result.as_ref().err().map(|e| output::error_chain(e)),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text if !cli.quiet => {
                if let Ok(report) = &result {
                    print_summary(report, ctx.release.version());
                }
            }
            OutputFormat::Text => {}
        }

        let report = result?;
        if !report.rehearsal_succeeded() {
            let failed = report.rehearsal.iter().filter(|o| !o.succeeded()).count();
            anyhow::bail!("{} step(s) failed during rehearsal", failed);
        }
        Ok(())
    }
}

fn print_summary(report: &ExecutionReport, version: &str) {
    match report.mode {
        RunMode::PrepareOnly => {
            output::success(&format!(
                "{} step(s) prepared for version {}",
                report.prepared.len(),
                output::version_style().apply_to(version)
            ));
        }
        RunMode::Rehearsal => {
            println!();
            println!("{}", output::header("Rehearsal"));
            for outcome in &report.rehearsal {
                match &outcome.error {
                    None => println!("  {} {}", style("✓").green(), outcome.label),
                    Some(error) => println!("  {} {}: {}", style("✗").red(), outcome.label, error),
                }
            }
            if !report.actions.is_empty() {
                println!();
                println!("{}", output::header("Would perform"));
                for action in &report.actions {
                    println!("  {} {}", style("→").blue(), action);
                }
            }
        }
        RunMode::Full => {
            output::success(&format!(
                "Released version {}",
                output::version_style().apply_to(version)
            ));
        }
    }
}
