//! Exit codes for the CLI

use shipit_core::{CommandError, PipelineError, ShipitError};

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Version-control error
pub const VC_ERROR: i32 = 3;

/// Version error
pub const VERSION_ERROR: i32 = 4;

/// Pipeline declaration error
pub const VALIDATION_ERROR: i32 = 5;

/// External tool failed
pub const TOOL_ERROR: i32 = 6;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// Exit code for an error returned by a command
pub fn for_error(error: &anyhow::Error) -> i32 {
    error.downcast_ref::<ShipitError>().map_or(ERROR, for_shipit_error)
}

/// A failed step exits with the code of the error it wraps
fn for_shipit_error(error: &ShipitError) -> i32 {
    match error {
        ShipitError::Config(_) => CONFIG_ERROR,
        ShipitError::Vc(_) => VC_ERROR,
        ShipitError::Version(_) => VERSION_ERROR,
        ShipitError::Command(CommandError::ExternalToolFailure { .. }) => TOOL_ERROR,
        ShipitError::Pipeline(PipelineError::Cancelled) => CANCELLED,
        ShipitError::Pipeline(PipelineError::StepFailed { source, .. }) => for_shipit_error(source),
        ShipitError::Pipeline(
            PipelineError::UnknownStepKind(_)
            | PipelineError::InvalidStepArguments { .. }
            | PipelineError::UnknownTaskReference(_),
        ) => VALIDATION_ERROR,
        _ => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipit_core::{ConfigError, VcError, VersionError};
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        let code = |e: ShipitError| for_error(&anyhow::Error::from(e));

        assert_eq!(code(ConfigError::NotFound(PathBuf::from(".")).into()), CONFIG_ERROR);
        assert_eq!(code(VcError::TagAlreadyExists("1.0.0".into()).into()), VC_ERROR);
        assert_eq!(
            code(VersionError::VersionStringNotFound(PathBuf::from("VERSION")).into()),
            VERSION_ERROR
        );
        assert_eq!(code(PipelineError::Cancelled.into()), CANCELLED);
        assert_eq!(code(PipelineError::UnknownStepKind("x".into()).into()), VALIDATION_ERROR);
        assert_eq!(code(ShipitError::other("boom")), ERROR);
        assert_eq!(for_error(&anyhow::anyhow!("plain")), ERROR);
    }

    #[test]
    fn test_step_failure_uses_wrapped_code() {
        let code = |e: ShipitError| for_error(&anyhow::Error::from(e));
        let failed = |source: ShipitError| -> ShipitError {
            PipelineError::StepFailed {
                step: "commit".into(),
                source: Box::new(source),
            }
            .into()
        };

        let tool = CommandError::ExternalToolFailure {
            command: "git commit".into(),
            code: Some(1),
            output: "nothing to commit".into(),
        };
        assert_eq!(code(failed(tool.into())), TOOL_ERROR);
        assert_eq!(code(failed(VcError::TagAlreadyExists("1.0.0".into()).into())), VC_ERROR);
        assert_eq!(code(failed(ShipitError::other("boom"))), ERROR);
    }
}
