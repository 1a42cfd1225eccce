//! Subversion backend (shells out to `svn`)
//!
//! Releases are cut from a trunk checkout. Tags live in the `tags` directory
//! next to `trunk`, so tagging `1.2.4` copies `<repo>/trunk` to
//! `<repo>/tags/1.2.4`.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, instrument};
use url::Url;

use shipit_core::{Result, ToolCommand, VcError};

use crate::backend::{commit_message, has_content, message_file, tag_message, TreeStatus, VcBackend};

/// Marker that identifies a subversion working copy
pub const MARKER: &str = ".svn";

/// Subversion working copy
#[derive(Debug)]
pub struct SvnBackend {
    root: PathBuf,
    program: String,
    trunk: OnceLock<Url>,
}

impl SvnBackend {
    /// Backend for the working copy at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            program: "svn".to_string(),
            trunk: OnceLock::new(),
        }
    }

    /// Use a specific `svn` executable instead of the one on `PATH`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Whether `root` holds a subversion marker
    pub fn detect(root: &Path) -> bool {
        root.join(MARKER).exists()
    }

    fn svn(&self) -> ToolCommand {
        ToolCommand::new(&self.program)
            .current_dir(&self.root)
            .env("LANG", "C")
    }

    /// URL of the trunk checkout, cached after the first lookup
    pub fn trunk_url(&self) -> Result<Url> {
        if let Some(url) = self.trunk.get() {
            return Ok(url.clone());
        }

        let info = self.svn().arg("info").run()?;
        let raw = parse_info_url(&info).ok_or_else(|| VcError::UnexpectedOutput {
            command: "svn info".to_string(),
            reason: "no URL line".to_string(),
        })?;
        if !raw.trim_end_matches('/').ends_with("trunk") {
            return Err(VcError::NotAtTrunk(raw).into());
        }

        let url = parse_url(raw.trim_end_matches('/'))?;
        debug!(%url, "resolved trunk url");
        Ok(self.trunk.get_or_init(|| url).clone())
    }

    /// URL of the `tags` directory next to trunk; it must exist
    pub fn tags_url(&self) -> Result<Url> {
        let tags = join_url(&self.trunk_url()?, "./tags")?;
        if !self.is_directory(&tags)? {
            return Err(VcError::TagsDirectoryMissing(tags.to_string()).into());
        }
        Ok(tags)
    }

    /// URL a tag named `version` lives at
    pub fn tag_url(&self, version: &str) -> Result<Url> {
        let tags = self.tags_url()?;
        join_url(&tags, &format!("tags/{}", version))
    }

    fn is_directory(&self, url: &Url) -> Result<bool> {
        let out = self.svn().arg("info").arg(url.as_str()).output_unchecked()?;
        Ok(out.success() && is_directory(&out.stdout))
    }
}

impl VcBackend for SvnBackend {
    fn name(&self) -> &'static str {
        "svn"
    }

    fn root(&self) -> &Path {
        &self.root
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn precommit(&self) -> Result<TreeStatus> {
        let status = parse_status(&self.svn().arg("status").run()?);
        if !status.untracked.is_empty() {
            return Err(VcError::DirtyOrUntrackedTree(status.untracked).into());
        }
        Ok(if status.changes {
            TreeStatus::Changes
        } else {
            TreeStatus::NoChanges
        })
    }

    #[instrument(skip(self, message), fields(root = %self.root.display()))]
    fn commit(&self, message: Option<&str>, version: &str) -> Result<()> {
        let message = commit_message(message, version);
        let file = message_file(&message)?;
        self.svn().args(["commit", "--file"]).arg(file.path()).run()?;
        info!(%message, "committed");
        Ok(())
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn exists_tagged_version(&self, version: &str) -> Result<bool> {
        let url = self.tag_url(version)?;
        self.is_directory(&url)
    }

    #[instrument(skip(self, message), fields(root = %self.root.display()))]
    fn tag_version(&self, version: &str, message: Option<&str>) -> Result<()> {
        let message = tag_message(message, version);
        let trunk = self.trunk_url()?;
        let tag = self.tag_url(version)?;
        let file = message_file(&message)?;
        self.svn()
            .args(["copy", "--file"])
            .arg(file.path())
            .arg(trunk.as_str())
            .arg(tag.as_str())
            .run()?;
        info!(%tag, "created tag");
        Ok(())
    }

    fn local_diff(&self, file: &Path) -> Result<String> {
        self.svn().arg("diff").arg(file).run()
    }

    fn are_local_diffs(&self, _version: &str) -> Result<bool> {
        let out = self.svn().arg("diff").run()?;
        Ok(has_content(&out))
    }
}

/// Facts extracted from `svn status`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SvnStatus {
    /// Paths marked `?`
    pub untracked: Vec<String>,
    /// Whether any entry was listed
    pub changes: bool,
}

/// Parse `svn status` output
pub fn parse_status(output: &str) -> SvnStatus {
    static UNTRACKED: OnceLock<Regex> = OnceLock::new();
    let untracked_re =
        UNTRACKED.get_or_init(|| Regex::new(r"^\?\s+(.+)$").expect("untracked pattern is valid"));

    let mut status = SvnStatus::default();
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        status.changes = true;
        if let Some(caps) = untracked_re.captures(line) {
            status.untracked.push(caps[1].trim_end().to_string());
        }
    }
    status
}

/// Value of the `URL: ` line of `svn info`
pub fn parse_info_url(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|l| l.strip_prefix("URL: "))
        .map(|u| u.trim().to_string())
}

/// Whether `svn info` describes a directory
pub fn is_directory(output: &str) -> bool {
    output.lines().any(|l| l.trim() == "Node Kind: directory")
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| {
        VcError::UnexpectedOutput {
            command: "svn info".to_string(),
            reason: format!("invalid URL '{}': {}", raw, e),
        }
        .into()
    })
}

fn join_url(base: &Url, path: &str) -> Result<Url> {
    base.join(path).map_err(|e| {
        VcError::UnexpectedOutput {
            command: "svn info".to_string(),
            reason: format!("cannot join '{}' onto {}: {}", path, base, e),
        }
        .into()
    })
}
