//! Git backend (shells out to `git`)

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use shipit_core::{Result, ToolCommand, VcError};

use crate::backend::{commit_message, has_content, message_file, tag_message, TreeStatus, VcBackend};

/// Marker that identifies a git working copy
pub const MARKER: &str = ".git";

/// Git working copy
#[derive(Debug, Clone)]
pub struct GitBackend {
    root: PathBuf,
}

impl GitBackend {
    /// Backend for the working copy at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Whether `root` holds a git marker
    pub fn detect(root: &Path) -> bool {
        root.join(MARKER).exists()
    }

    fn git(&self) -> ToolCommand {
        ToolCommand::new("git").current_dir(&self.root)
    }

    /// Untracked files that are not ignored
    pub fn untracked_files(&self) -> Result<Vec<String>> {
        let out = self
            .git()
            .args(["ls-files", "-z", "--others", "--exclude-standard"])
            .run()?;
        Ok(parse_nul_separated(&out))
    }
}

impl VcBackend for GitBackend {
    fn name(&self) -> &'static str {
        "git"
    }

    fn root(&self) -> &Path {
        &self.root
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn precommit(&self) -> Result<TreeStatus> {
        let untracked = self.untracked_files()?;
        if !untracked.is_empty() {
            return Err(VcError::DirtyOrUntrackedTree(untracked).into());
        }

        let status = self
            .git()
            .args(["status", "--porcelain", "--untracked-files=no"])
            .run()?;
        let tree = if has_content(&status) {
            TreeStatus::Changes
        } else {
            TreeStatus::NoChanges
        };
        debug!(?tree, "precommit check passed");
        Ok(tree)
    }

    #[instrument(skip(self, message), fields(root = %self.root.display()))]
    fn commit(&self, message: Option<&str>, version: &str) -> Result<()> {
        let message = commit_message(message, version);
        let file = message_file(&message)?;
        self.git()
            .args(["commit", "-a", "-F"])
            .arg(file.path())
            .run()?;
        info!(%message, "committed");
        Ok(())
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn exists_tagged_version(&self, version: &str) -> Result<bool> {
        let out = self.git().args(["tag", "-l", version]).run()?;
        let exists = out.lines().any(|l| l.trim() == version);
        debug!(version, exists, "checked tag");
        Ok(exists)
    }

    #[instrument(skip(self, message), fields(root = %self.root.display()))]
    fn tag_version(&self, version: &str, message: Option<&str>) -> Result<()> {
        let message = tag_message(message, version);
        let file = message_file(&message)?;
        self.git()
            .args(["tag", "-a", "-F"])
            .arg(file.path())
            .arg(version)
            .run()?;
        info!(tag = version, "created tag");
        Ok(())
    }

    fn local_diff(&self, file: &Path) -> Result<String> {
        self.git()
            .args(["diff", "--no-color", "HEAD", "--"])
            .arg(file)
            .run()
    }

    fn are_local_diffs(&self, version: &str) -> Result<bool> {
        let out = self.git().args(["diff", "--no-color", version]).run()?;
        Ok(has_content(&out))
    }
}

/// Split `-z` output into paths
pub fn parse_nul_separated(output: &str) -> Vec<String> {
    output
        .split('\0')
        .map(str::trim_end)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
