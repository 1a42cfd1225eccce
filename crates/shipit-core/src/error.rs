//! Error types for shipit

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ShipitError
pub type Result<T> = std::result::Result<T, ShipitError>;

/// Main error type for shipit operations
#[derive(Debug, Error)]
pub enum ShipitError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Version-control errors
    #[error(transparent)]
    Vc(#[from] VcError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Pipeline declaration and execution errors
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// External command errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Publish integration errors
    #[error(transparent)]
    Publish(#[from] shipit_publish::PublishError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Configuration file already exists
    #[error("Configuration file already exists at {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Version-control errors
#[derive(Debug, Error)]
pub enum VcError {
    /// No backend marker found
    #[error("No version control backend detected in {0}")]
    NoBackendDetected(PathBuf),

    /// More than one backend marker found
    #[error("Ambiguous version control backend in {root}: {} all match", .backends.join(", "))]
    AmbiguousBackend { root: PathBuf, backends: Vec<String> },

    /// Backend forced by configuration is not registered
    #[error("Unknown version control backend: {0}")]
    UnknownBackend(String),

    /// Untracked, non-ignored files in the working tree
    #[error("Working tree has untracked files: {}", .0.join(", "))]
    DirtyOrUntrackedTree(Vec<String>),

    /// Tag already exists
    #[error("Tag already exists: {0}")]
    TagAlreadyExists(String),

    /// Subversion working copy is not a trunk checkout
    #[error("Working copy is not at trunk: {0}")]
    NotAtTrunk(String),

    /// Subversion repository has no tags directory
    #[error("Tags directory does not exist: {0}")]
    TagsDirectoryMissing(String),

    /// Tool output could not be interpreted
    #[error("Unexpected output from {command}: {reason}")]
    UnexpectedOutput { command: String, reason: String },
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// No version token in the file
    #[error("Can't find version string in {0}")]
    VersionStringNotFound(PathBuf),

    /// Package version in configuration disagrees with the file
    #[error("Configured package version {configured} does not match {found} found in {path}")]
    VersionMismatch {
        path: PathBuf,
        configured: String,
        found: String,
    },

    /// Release version was already advanced in this run
    #[error("Version was already advanced to {current}; refusing to advance again to {attempted}")]
    AlreadyAdvanced { current: String, attempted: String },

    /// File contents differ from what prepare read
    #[error("{0} changed since it was prepared")]
    FileChangedSincePrepare(PathBuf),

    /// Invalid version format
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),
}

/// Pipeline declaration and execution errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Step kind not in the registry
    #[error("Unknown step kind: {0}")]
    UnknownStepKind(String),

    /// Positional arguments rejected by a step factory
    #[error("Invalid arguments for step '{kind}': {reason}")]
    InvalidStepArguments { kind: String, reason: String },

    /// Task name not declared in configuration
    #[error("Unknown task: {0}")]
    UnknownTaskReference(String),

    /// Operator declined
    #[error("Operation cancelled by user")]
    Cancelled,

    /// A run-phase step failed
    #[error("Step '{step}' failed")]
    StepFailed {
        step: String,
        #[source]
        source: Box<ShipitError>,
    },

    /// Steps need a release version but none is set
    #[error("No release version set; configure [package] version or add a change_version step")]
    MissingVersion,
}

/// External command errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// Executable not on PATH
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    /// Process could not be started
    #[error("Failed to run {command}: {reason}")]
    SpawnFailed { command: String, reason: String },

    /// Process exited non-zero
    #[error("Command `{command}` failed ({}): {output}", .code.map(|c| format!("exit code {}", c)).unwrap_or_else(|| "terminated by signal".to_string()))]
    ExternalToolFailure {
        command: String,
        code: Option<i32>,
        /// Trimmed stderr, or stdout when stderr is empty
        output: String,
    },
}

impl ShipitError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this error is the operator declining to continue
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Pipeline(PipelineError::Cancelled))
    }
}
