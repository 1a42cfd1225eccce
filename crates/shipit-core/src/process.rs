//! External process runner
//!
//! Version-control backends and task steps talk to the outside world only
//! through [`ToolCommand`]: stdout text and the exit status are the whole
//! interface.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, instrument};

use crate::error::{CommandError, Result};

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Standard output (lossy UTF-8)
    pub stdout: String,
    /// Standard error (lossy UTF-8)
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl ToolOutput {
    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stderr, or stdout when the tool reported nothing on stderr
    pub fn failure_text(&self) -> String {
        match self.stderr.trim() {
            "" => self.stdout.trim().to_string(),
            stderr => stderr.to_string(),
        }
    }
}

/// A command line for an external tool
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl ToolCommand {
    /// Start building a command for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// `sh -c <script>`
    pub fn shell(script: impl AsRef<OsStr>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Run inside `dir`
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set an environment variable for the child
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Human-readable command line
    pub fn display(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().to_string()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run and capture output regardless of exit status
    #[instrument(skip(self), fields(command = %self.display()))]
    pub fn output_unchecked(&self) -> Result<ToolOutput> {
        which::which(&self.program)
            .map_err(|_| CommandError::ToolNotFound(self.program.clone()))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        for (k, v) in &self.env {
            cmd.env(k, v);
        }

        let output = cmd.output().map_err(|e| CommandError::SpawnFailed {
            command: self.display(),
            reason: e.to_string(),
        })?;

        let result = ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        };
        debug!(code = ?result.code, stdout_len = result.stdout.len(), "command finished");
        Ok(result)
    }

    /// Run and fail on non-zero exit
    pub fn output(&self) -> Result<ToolOutput> {
        let output = self.output_unchecked()?;
        if output.success() {
            Ok(output)
        } else {
            Err(CommandError::ExternalToolFailure {
                command: self.display(),
                code: output.code,
                output: output.failure_text(),
            }
            .into())
        }
    }

    /// Run, fail on non-zero exit, and return stdout
    pub fn run(&self) -> Result<String> {
        Ok(self.output()?.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ShipitError;
    use tempfile::TempDir;

    #[test]
    fn test_shell_captures_stdout() {
        let out = ToolCommand::shell("echo hello").run().unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_env_and_cwd() {
        let temp = TempDir::new().unwrap();
        let out = ToolCommand::shell("echo \"$GREETING\" && pwd")
            .env("GREETING", "hi")
            .current_dir(temp.path())
            .run()
            .unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("hi"));
        let cwd = PathBuf::from(lines.next().unwrap());
        assert_eq!(
            cwd.canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_non_zero_exit_is_tool_failure() {
        let err = ToolCommand::shell("echo oops >&2; exit 3").run().unwrap_err();
        match err {
            ShipitError::Command(CommandError::ExternalToolFailure { code, output, .. }) => {
                assert_eq!(code, Some(3));
                assert_eq!(output, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failure_falls_back_to_stdout() {
        let err = ToolCommand::shell("echo 'nothing to commit'; exit 1")
            .run()
            .unwrap_err();
        assert!(err.to_string().ends_with("(exit code 1): nothing to commit"));
    }

    #[test]
    fn test_unchecked_returns_failed_output() {
        let out = ToolCommand::shell("exit 1").output_unchecked().unwrap();
        assert!(!out.success());
    }

    #[test]
    fn test_missing_tool() {
        let err = ToolCommand::new("shipit-no-such-tool-xyz").run().unwrap_err();
        assert!(matches!(
            err,
            ShipitError::Command(CommandError::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_display() {
        let cmd = ToolCommand::new("git").args(["tag", "-l", "1.0.0"]);
        assert_eq!(cmd.display(), "git tag -l 1.0.0");
        assert_eq!(cmd.program(), "git");
    }
}
