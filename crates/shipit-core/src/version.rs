//! Version tokens: succession and in-file location
//!
//! A version token is a `MAJOR.MINOR.PATCH` string assigned to an identifier
//! inside a text file, e.g. `VERS = "1.2.3"`. [`VersionSplice`] records the
//! byte range of the token once, so the replacement applied later never
//! re-matches against content that may have changed in between.

use std::ops::Range;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::error::{Result, VersionError};

/// Identifier pattern used when a change_version step names none.
/// Matches both `VERS` and `VERSION`.
pub const DEFAULT_VERSION_IDENT: &str = "VERS(?:ION)?";

/// Increment the rightmost numeric component of a version string.
///
/// The component is incremented as a decimal digit string, so it widens on
/// overflow and never carries into the component to its left:
/// `1.0.9` becomes `1.0.10`, `1.2.99` becomes `1.2.100`.
pub fn successor(version: &str) -> Result<String> {
    let bytes = version.as_bytes();
    let end = bytes
        .iter()
        .rposition(u8::is_ascii_digit)
        .map(|i| i + 1)
        .ok_or_else(|| VersionError::InvalidFormat(version.to_string()))?;
    let start = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);

    let mut digits = bytes[start..end].to_vec();
    let mut i = digits.len();
    loop {
        if i == 0 {
            digits.insert(0, b'1');
            break;
        }
        i -= 1;
        if digits[i] == b'9' {
            digits[i] = b'0';
        } else {
            digits[i] += 1;
            break;
        }
    }

    Ok(format!(
        "{}{}{}",
        &version[..start],
        String::from_utf8_lossy(&digits),
        &version[end..]
    ))
}

/// Whether `version` is a plain `MAJOR.MINOR.PATCH` release version
pub fn is_release_version(version: &str) -> bool {
    semver::Version::parse(version)
        .map(|v| v.pre.is_empty() && v.build.is_empty())
        .unwrap_or(false)
}

/// Build the token pattern for an identifier (`None` = [`DEFAULT_VERSION_IDENT`])
pub fn version_pattern(ident: Option<&str>) -> Result<Regex> {
    let ident = match ident {
        Some(name) => regex::escape(name),
        None => DEFAULT_VERSION_IDENT.to_string(),
    };
    let pattern = format!(r#"{}\s*=\s*['"](\d+\.\d+\.\d+)['"]"#, ident);
    Regex::new(&pattern).map_err(|e| VersionError::InvalidFormat(e.to_string()).into())
}

/// A located version token and its planned replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSplice {
    /// File containing the token
    pub path: PathBuf,
    /// Byte range of the numeric token in `original`
    pub range: Range<usize>,
    /// Version found in the file
    pub current: String,
    /// Successor that will replace it
    pub next: String,
    original: String,
}

impl VersionSplice {
    /// Locate the first version token in `content`
    pub fn locate(path: impl Into<PathBuf>, content: String, ident: Option<&str>) -> Result<Self> {
        let path = path.into();
        let pattern = version_pattern(ident)?;
        let token = pattern
            .captures(&content)
            .and_then(|c| c.get(1))
            .ok_or_else(|| VersionError::VersionStringNotFound(path.clone()))?;

        let range = token.range();
        let current = token.as_str().to_string();
        let next = successor(&current)?;
        debug!(path = %path.display(), %current, %next, start = range.start, "located version token");

        Ok(Self {
            path,
            range,
            current,
            next,
            original: content,
        })
    }

    /// Read `path` and locate its version token
    pub fn read(path: &Path, ident: Option<&str>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::locate(path, content, ident)
    }

    /// Content as read when the token was located
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Original content with the token replaced by its successor
    pub fn spliced(&self) -> String {
        let mut out = String::with_capacity(self.original.len() + self.next.len());
        out.push_str(&self.original[..self.range.start]);
        out.push_str(&self.next);
        out.push_str(&self.original[self.range.end..]);
        out
    }

    /// Fail unless `content` is still what was read
    pub fn verify_unchanged(&self, content: &str) -> Result<()> {
        if content == self.original {
            Ok(())
        } else {
            Err(VersionError::FileChangedSincePrepare(self.path.clone()).into())
        }
    }
}
