//! Shipit Pipeline - Two-phase release pipeline engine
//!
//! A [`Pipeline`] is an ordered list of [`Step`]s declared through a
//! [`PipelineBuilder`]. The [`Executor`] prepares every step first; only when
//! all of them validated, and the operator confirmed, does it run them in the
//! same order. Steps reach the outside world through their [`StepContext`],
//! which a rehearsal swaps for recording capabilities.

pub mod builder;
pub mod context;
pub mod executor;
pub mod prompt;
pub mod registry;
pub mod reporter;
pub mod sandbox;
pub mod step;
pub mod steps;

pub use builder::{Pipeline, PipelineBuilder, StepHandle};
pub use context::StepContext;
pub use executor::{ExecutionReport, ExecutionState, Executor, RunMode, StepOutcome};
pub use prompt::{is_affirmative, AssumeYes, LinePrompt, Prompt, ScriptedPrompt};
pub use registry::{StepFactory, StepKind, StepRegistry};
pub use reporter::{CollectingReporter, Phase, PipelineEvent, PipelineReporter, TracingReporter};
pub use sandbox::{RecordedAction, Recorder};
pub use step::{AsAny, Step, StepArgs};
