//! Output formatting utilities

use console::{style, Style};

use shipit_pipeline::{Phase, PipelineEvent, PipelineReporter};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Style for version numbers
pub fn version_style() -> Style {
    Style::new().green().bold()
}

/// `error: cause: cause` along the source chain
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    std::iter::successors(Some(error), |e| e.source())
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Reporter printing pipeline progress to the terminal.
///
/// Progress goes to stderr so the confirmation list stays next to the prompt.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    /// Reporter; `quiet` keeps only failures and the confirmation list
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ConsoleReporter {
    /// Lines printed for `event`
    fn render(&self, event: &PipelineEvent) -> Vec<String> {
        match event {
            PipelineEvent::PhaseStarted { phase, steps } if !self.quiet => {
                let title = match phase {
                    Phase::Prepare => "Preparing",
                    Phase::Run => "Running",
                    Phase::Rehearsal => "Rehearsing",
                };
                vec![format!("{} {} step(s)", style(title).bold(), steps)]
            }
            PipelineEvent::StepFinished { label, .. } if !self.quiet => {
                vec![format!("  {} {}", style("✓").green(), label)]
            }
            PipelineEvent::StepFailed { label, error, .. } => {
                vec![format!("  {} {}: {}", style("✗").red(), label, error)]
            }
            PipelineEvent::AwaitingConfirmation { labels } => {
                let mut lines = vec![String::new(), header("The following steps will run:")];
                lines.extend(
                    labels
                        .iter()
                        .enumerate()
                        .map(|(i, label)| format!("  {}. {}", i + 1, label)),
                );
                lines.push(String::new());
                lines
            }
            _ => Vec::new(),
        }
    }
}

impl PipelineReporter for ConsoleReporter {
    fn report(&self, event: &PipelineEvent) {
        for line in self.render(event) {
            eprintln!("{}", line);
        }
    }
}
