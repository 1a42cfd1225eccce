//! Pipeline execution reporting

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

/// Execution phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Validation pass
    Prepare,
    /// Mutating pass
    Run,
    /// Run pass against recording capabilities
    Rehearsal,
}

impl Phase {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Run => "run",
            Self::Rehearsal => "rehearsal",
        }
    }
}

/// Events emitted during pipeline execution
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A phase is starting
    PhaseStarted { phase: Phase, steps: usize },
    /// A step is starting
    StepStarted {
        phase: Phase,
        index: usize,
        label: String,
    },
    /// A step completed
    StepFinished {
        phase: Phase,
        index: usize,
        label: String,
        duration: Duration,
    },
    /// A step failed
    StepFailed {
        phase: Phase,
        index: usize,
        label: String,
        error: String,
    },
    /// Every step prepared; waiting for the operator
    AwaitingConfirmation { labels: Vec<String> },
    /// Execution stopped before completing
    Aborted { reason: String },
    /// Execution completed
    Done { steps: usize, duration: Duration },
}

/// Trait for reporting pipeline progress
pub trait PipelineReporter: Send + Sync {
    /// Handle a pipeline event
    fn report(&self, event: &PipelineEvent);
}

/// Simple reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl PipelineReporter for TracingReporter {
    fn report(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::PhaseStarted { phase, steps } => {
                tracing::info!("Starting {} phase ({} steps)", phase.as_str(), steps);
            }
            PipelineEvent::StepStarted { phase, index, label } => {
                tracing::debug!("[{}] {} {}", phase.as_str(), index + 1, label);
            }
            PipelineEvent::StepFinished {
                phase,
                label,
                duration,
                ..
            } => {
                tracing::info!(
                    "[{}] {} done in {:.1}s",
                    phase.as_str(),
                    label,
                    duration.as_secs_f64()
                );
            }
            PipelineEvent::StepFailed {
                phase, label, error, ..
            } => {
                tracing::error!("[{}] {} failed: {}", phase.as_str(), label, error);
            }
            PipelineEvent::AwaitingConfirmation { labels } => {
                tracing::info!("Awaiting confirmation for {} steps", labels.len());
            }
            PipelineEvent::Aborted { reason } => {
                tracing::warn!("Pipeline aborted: {}", reason);
            }
            PipelineEvent::Done { steps, duration } => {
                tracing::info!(
                    "Pipeline complete: {} steps in {:.1}s",
                    steps,
                    duration.as_secs_f64()
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<PipelineEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl PipelineReporter for CollectingReporter {
    fn report(&self, event: &PipelineEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
