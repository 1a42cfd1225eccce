//! Two-phase pipeline execution

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use shipit_core::{PipelineError, Result};

use crate::builder::Pipeline;
use crate::context::StepContext;
use crate::reporter::{Phase, PipelineEvent, PipelineReporter, TracingReporter};
use crate::sandbox::{RecordedAction, Recorder};

/// How far execution goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Prepare, confirm, run
    #[default]
    Full,
    /// Prepare and stop
    PrepareOnly,
    /// Prepare, then run against recording capabilities without confirmation
    Rehearsal,
}

/// Executor lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// Nothing executed yet
    #[default]
    Built,
    /// Prepare phase in progress
    Preparing,
    /// Every step prepared, waiting for the operator
    AwaitingConfirmation,
    /// Run phase in progress
    Running,
    /// Finished successfully
    Done,
    /// Stopped before anything ran
    Aborted,
    /// A run-phase step failed
    Failed,
}

/// Result of rehearsing one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Step label
    pub label: String,
    /// Error or panic message, if the step failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    /// Whether the step completed
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// What an execution did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// Requested mode
    pub mode: RunMode,
    /// Final state
    pub state: ExecutionState,
    /// Labels of the prepared steps
    pub prepared: Vec<String>,
    /// Labels of the steps that ran
    pub ran: Vec<String>,
    /// Per-step rehearsal outcomes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rehearsal: Vec<StepOutcome>,
    /// Side effects recorded during a rehearsal
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<RecordedAction>,
    /// Label of the step that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<String>,
}

impl ExecutionReport {
    /// Whether every rehearsed step completed
    pub fn rehearsal_succeeded(&self) -> bool {
        self.rehearsal.iter().all(StepOutcome::succeeded)
    }
}

/// Drives a [`Pipeline`] through prepare, confirmation and run
pub struct Executor {
    mode: RunMode,
    reporter: Arc<dyn PipelineReporter>,
    report: ExecutionReport,
}

impl Executor {
    /// Executor for `mode`, reporting through tracing
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            reporter: Arc::new(TracingReporter),
            report: ExecutionReport {
                mode,
                ..Default::default()
            },
        }
    }

    /// Report events to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn PipelineReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Current state
    pub fn state(&self) -> ExecutionState {
        self.report.state
    }

    /// Report of the last execution, also available after a failure
    pub fn report(&self) -> &ExecutionReport {
        &self.report
    }

    /// Execute `pipeline` against `ctx`.
    ///
    /// A prepare failure is returned unchanged and nothing runs. A run failure
    /// is returned as [`PipelineError::StepFailed`] naming the step.
    #[instrument(skip_all, fields(mode = ?self.mode, steps = pipeline.len()))]
    pub fn execute(
        &mut self,
        pipeline: &mut Pipeline,
        ctx: &mut StepContext,
    ) -> Result<ExecutionReport> {
        let started = Instant::now();
        self.report = ExecutionReport {
            mode: self.mode,
            ..Default::default()
        };

        self.prepare(pipeline, ctx)?;

        match self.mode {
            RunMode::PrepareOnly => {}
            RunMode::Rehearsal => self.rehearse(pipeline, ctx),
            RunMode::Full => {
                self.confirm(ctx)?;
                self.run(pipeline, ctx)?;
            }
        }

        self.report.state = ExecutionState::Done;
        self.reporter.report(&PipelineEvent::Done {
            steps: pipeline.len(),
            duration: started.elapsed(),
        });
        Ok(self.report.clone())
    }

    fn prepare(&mut self, pipeline: &mut Pipeline, ctx: &mut StepContext) -> Result<()> {
        self.report.state = ExecutionState::Preparing;
        self.reporter.report(&PipelineEvent::PhaseStarted {
            phase: Phase::Prepare,
            steps: pipeline.len(),
        });

        for (index, step) in pipeline.steps_mut().iter_mut().enumerate() {
            let label = step.describe();
            self.reporter.report(&PipelineEvent::StepStarted {
                phase: Phase::Prepare,
                index,
                label: label.clone(),
            });

            let step_started = Instant::now();
            if let Err(e) = step.prepare(ctx) {
                self.reporter.report(&PipelineEvent::StepFailed {
                    phase: Phase::Prepare,
                    index,
                    label,
                    error: e.to_string(),
                });
                self.abort(e.to_string());
                return Err(e);
            }

            let label = step.describe();
            self.reporter.report(&PipelineEvent::StepFinished {
                phase: Phase::Prepare,
                index,
                label: label.clone(),
                duration: step_started.elapsed(),
            });
            self.report.prepared.push(label);
        }
        Ok(())
    }

    fn confirm(&mut self, ctx: &mut StepContext) -> Result<()> {
        self.report.state = ExecutionState::AwaitingConfirmation;
        self.reporter.report(&PipelineEvent::AwaitingConfirmation {
            labels: self.report.prepared.clone(),
        });

        let question = match ctx.release.version() {
            "" => format!("Release {}?", ctx.release.name()),
            version => format!("Release {} {}?", ctx.release.name(), version),
        };
        if ctx.confirm(&question)? {
            Ok(())
        } else {
            self.abort("declined at confirmation".to_string());
            Err(PipelineError::Cancelled.into())
        }
    }

    fn run(&mut self, pipeline: &mut Pipeline, ctx: &mut StepContext) -> Result<()> {
        self.report.state = ExecutionState::Running;
        self.reporter.report(&PipelineEvent::PhaseStarted {
            phase: Phase::Run,
            steps: pipeline.len(),
        });

        for (index, step) in pipeline.steps_mut().iter_mut().enumerate() {
            let label = step.describe();
            self.reporter.report(&PipelineEvent::StepStarted {
                phase: Phase::Run,
                index,
                label: label.clone(),
            });

            let step_started = Instant::now();
            if let Err(e) = step.run(ctx) {
                self.reporter.report(&PipelineEvent::StepFailed {
                    phase: Phase::Run,
                    index,
                    label: label.clone(),
                    error: e.to_string(),
                });
                if !self.report.ran.is_empty() {
                    warn!(completed = ?self.report.ran, "steps already completed are not undone");
                }
                self.report.state = ExecutionState::Failed;
                self.report.failed_step = Some(label.clone());
                return Err(PipelineError::StepFailed {
                    step: label,
                    source: Box::new(e),
                }
                .into());
            }

            self.reporter.report(&PipelineEvent::StepFinished {
                phase: Phase::Run,
                index,
                label: label.clone(),
                duration: step_started.elapsed(),
            });
            self.report.ran.push(label);
        }
        Ok(())
    }

    fn rehearse(&mut self, pipeline: &mut Pipeline, ctx: &mut StepContext) {
        self.report.state = ExecutionState::Running;
        self.reporter.report(&PipelineEvent::PhaseStarted {
            phase: Phase::Rehearsal,
            steps: pipeline.len(),
        });

        let recorder = Arc::new(Recorder::default());
        ctx.enter_sandbox(Arc::clone(&recorder));

        for (index, step) in pipeline.steps_mut().iter_mut().enumerate() {
            let label = step.describe();
            self.reporter.report(&PipelineEvent::StepStarted {
                phase: Phase::Rehearsal,
                index,
                label: label.clone(),
            });

            let step_started = Instant::now();
            let joined = std::thread::scope(|scope| {
                let worker = scope.spawn(|| step.run(&mut *ctx));
                worker.join()
            });
            let error = match joined {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(panic) => Some(format!("panicked: {}", panic_message(&*panic))),
            };

            match &error {
                Some(error) => self.reporter.report(&PipelineEvent::StepFailed {
                    phase: Phase::Rehearsal,
                    index,
                    label: label.clone(),
                    error: error.clone(),
                }),
                None => {
                    self.reporter.report(&PipelineEvent::StepFinished {
                        phase: Phase::Rehearsal,
                        index,
                        label: label.clone(),
                        duration: step_started.elapsed(),
                    });
                    self.report.ran.push(label.clone());
                }
            }
            self.report.rehearsal.push(StepOutcome { label, error });
        }

        ctx.leave_sandbox();
        self.report.actions = recorder.take();
        info!(
            actions = self.report.actions.len(),
            failed = self.report.rehearsal.iter().filter(|o| !o.succeeded()).count(),
            "rehearsal complete"
        );
    }

    fn abort(&mut self, reason: String) {
        self.report.state = ExecutionState::Aborted;
        self.reporter.report(&PipelineEvent::Aborted { reason });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use crate::registry::StepRegistry;
    use crate::reporter::CollectingReporter;
    use crate::steps::test_support::{config, context};
    use shipit_core::ShipitError;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn logged(log: &Log, entry: &str) -> impl FnMut(&mut StepContext) -> Result<()> + Send + 'static {
        let log = Arc::clone(log);
        let entry = entry.to_string();
        move |_| {
            log.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    fn two_steps(log: &Log) -> Pipeline {
        Pipeline::build(&StepRegistry::builtin(), |p| {
            p.inline("first", logged(log, "prepare first"), logged(log, "run first"));
            p.inline("second", logged(log, "prepare second"), logged(log, "run second"));
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn test_prepares_everything_before_running() {
        let log = Log::default();
        let mut pipeline = two_steps(&log);
        let mut ctx = context("/tmp", config("1.0.0"), Arc::default())
            .with_prompt(ScriptedPrompt::new(["yes"]));

        let report = Executor::new(RunMode::Full)
            .execute(&mut pipeline, &mut ctx)
            .unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["prepare first", "prepare second", "run first", "run second"]
        );
        assert_eq!(report.state, ExecutionState::Done);
        assert_eq!(report.prepared, vec!["first", "second"]);
        assert_eq!(report.ran, vec!["first", "second"]);
    }

    #[test]
    fn test_prepare_failure_runs_nothing() {
        let log = Log::default();
        let mut pipeline = Pipeline::build(&StepRegistry::builtin(), |p| {
            p.inline("first", logged(&log, "prepare first"), logged(&log, "run first"));
            p.inline(
                "broken",
                |_| Err(PipelineError::MissingVersion.into()),
                logged(&log, "run broken"),
            );
            p.inline("third", logged(&log, "prepare third"), logged(&log, "run third"));
            Ok(())
        })
        .unwrap();
        let prompt = ScriptedPrompt::new(["y"]);
        let asked = prompt.questions();
        let mut ctx = context("/tmp", config("1.0.0"), Arc::default()).with_prompt(prompt);

        let mut executor = Executor::new(RunMode::Full);
        let err = executor.execute(&mut pipeline, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            shipit_core::ShipitError::Pipeline(PipelineError::MissingVersion)
        ));
        assert_eq!(*log.lock().unwrap(), vec!["prepare first"]);
        assert_eq!(executor.state(), ExecutionState::Aborted);
        assert!(asked.lock().unwrap().is_empty());
    }

    #[test]
    fn test_declined_confirmation() {
        let log = Log::default();
        let mut pipeline = two_steps(&log);
        let prompt = ScriptedPrompt::new(["n"]);
        let asked = prompt.questions();
        let mut ctx = context("/tmp", config("1.0.0"), Arc::default()).with_prompt(prompt);

        let mut executor = Executor::new(RunMode::Full);
        let err = executor.execute(&mut pipeline, &mut ctx).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(executor.state(), ExecutionState::Aborted);
        assert_eq!(*log.lock().unwrap(), vec!["prepare first", "prepare second"]);
        assert_eq!(*asked.lock().unwrap(), vec!["Release demo 1.0.0?"]);
    }

    #[test]
    fn test_prepare_only() {
        let log = Log::default();
        let mut pipeline = two_steps(&log);
        let mut ctx = context("/tmp", config("1.0.0"), Arc::default());

        let report = Executor::new(RunMode::PrepareOnly)
            .execute(&mut pipeline, &mut ctx)
            .unwrap();
        assert_eq!(report.state, ExecutionState::Done);
        assert!(report.ran.is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["prepare first", "prepare second"]);
    }

    #[test]
    fn test_run_failure_names_step() {
        let log = Log::default();
        let mut pipeline = Pipeline::build(&StepRegistry::builtin(), |p| {
            p.inline("first", |_| Ok(()), logged(&log, "run first"));
            p.inline("broken", |_| Ok(()), |_| Err(shipit_core::ShipitError::other("boom")));
            p.inline("third", |_| Ok(()), logged(&log, "run third"));
            Ok(())
        })
        .unwrap();
        let mut ctx = context("/tmp", config("1.0.0"), Arc::default())
            .with_prompt(ScriptedPrompt::new(["y"]));

        let mut executor = Executor::new(RunMode::Full);
        let err = executor.execute(&mut pipeline, &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "Step 'broken' failed");
        match &err {
            ShipitError::Pipeline(PipelineError::StepFailed { step, source }) => {
                assert_eq!(step, "broken");
                assert!(matches!(**source, ShipitError::Other(ref m) if m == "boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()).as_deref(),
            Some("boom")
        );
        assert_eq!(executor.state(), ExecutionState::Failed);
        assert_eq!(executor.report().ran, vec!["first"]);
        assert_eq!(executor.report().failed_step.as_deref(), Some("broken"));
        assert_eq!(*log.lock().unwrap(), vec!["run first"]);
    }

    #[test]
    fn test_rehearsal_survives_errors_and_panics() {
        let mut pipeline = Pipeline::build(&StepRegistry::builtin(), |p| {
            p.inline("fails", |_| Ok(()), |_| Err(shipit_core::ShipitError::other("nope")));
            p.inline("panics", |_| Ok(()), |_| panic!("kaboom"));
            p.inline("writes", |_| Ok(()), |ctx| ctx.write_file("VERSION", "VERS = '1.0.1'"));
            Ok(())
        })
        .unwrap();
        let temp = tempfile::TempDir::new().unwrap();
        let prompt = ScriptedPrompt::default();
        let asked = prompt.questions();
        let mut ctx = context(temp.path(), config("1.0.0"), Arc::default()).with_prompt(prompt);
        let reporter = Arc::new(CollectingReporter::default());

        let report = Executor::new(RunMode::Rehearsal)
            .with_reporter(reporter.clone())
            .execute(&mut pipeline, &mut ctx)
            .unwrap();

        assert!(asked.lock().unwrap().is_empty());
        assert!(!ctx.is_rehearsal());
        assert!(!temp.path().join("VERSION").exists());
        assert_eq!(report.rehearsal.len(), 3);
        assert_eq!(report.rehearsal[0].error.as_deref(), Some("nope"));
        assert_eq!(report.rehearsal[1].error.as_deref(), Some("panicked: kaboom"));
        assert!(report.rehearsal[2].succeeded());
        assert!(!report.rehearsal_succeeded());
        assert_eq!(report.actions.len(), 1);
        assert!(reporter
            .events()
            .iter()
            .any(|e| matches!(e, PipelineEvent::PhaseStarted { phase: Phase::Rehearsal, .. })));
    }

    #[test]
    fn test_report_serializes() {
        let report = ExecutionReport {
            mode: RunMode::PrepareOnly,
            state: ExecutionState::Done,
            prepared: vec!["commit".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "prepare_only");
        assert_eq!(json["state"], "done");
        assert!(json.get("actions").is_none());
    }
}
