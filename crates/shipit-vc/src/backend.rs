//! Backend contract shared by every version-control tool

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use shipit_core::Result;

/// Outcome of precommit validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeStatus {
    /// Tracked files are modified
    Changes,
    /// Nothing tracked is modified
    NoChanges,
}

/// Uniform version-control operations over one working copy
pub trait VcBackend: Send + Sync {
    /// Backend name (`git`, `svn`)
    fn name(&self) -> &'static str;

    /// Working copy root
    fn root(&self) -> &Path;

    /// Fail on untracked, non-ignored files; report whether anything is modified
    fn precommit(&self) -> Result<TreeStatus>;

    /// Commit every tracked modification. `None` uses [`commit_message`].
    fn commit(&self, message: Option<&str>, version: &str) -> Result<()>;

    /// Whether a tag named exactly `version` exists
    fn exists_tagged_version(&self, version: &str) -> Result<bool>;

    /// Create the tag `version`. `None` uses [`tag_message`].
    fn tag_version(&self, version: &str, message: Option<&str>) -> Result<()>;

    /// Uncommitted diff of one file
    fn local_diff(&self, file: &Path) -> Result<String>;

    /// Whether the working copy differs from `version`
    fn are_local_diffs(&self, version: &str) -> Result<bool>;
}

/// Commit message, defaulting to `Release <version>`
pub fn commit_message(message: Option<&str>, version: &str) -> String {
    message
        .map(str::to_string)
        .unwrap_or_else(|| format!("Release {}", version))
}

/// Tag message, defaulting to `Tagging version <version>.`
pub fn tag_message(message: Option<&str>, version: &str) -> String {
    message
        .map(str::to_string)
        .unwrap_or_else(|| format!("Tagging version {}.", version))
}

/// Write a message to a temporary file handed to the tool with `-F`/`--file`
pub(crate) fn message_file(message: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("shipit-message")
        .tempfile()?;
    file.write_all(message.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Whether tool output contains anything besides whitespace
pub(crate) fn has_content(output: &str) -> bool {
    output.chars().any(|c| !c.is_whitespace())
}
