//! Publish types

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Status feed configuration (`[publish.feed]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base URL of the feed API
    pub url: String,

    /// Service name used for credential lookup
    pub service: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service: "feed".to_string(),
        }
    }
}

/// Package forge configuration (`[publish.forge]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Base URL of the forge API
    pub url: String,

    /// Service name used for credential lookup
    pub service: String,

    /// Default group to release into
    pub group: Option<String>,

    /// Groups the account may release into (empty = any)
    pub groups: Vec<String>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service: "forge".to_string(),
            group: None,
            groups: Vec::new(),
        }
    }
}

impl ForgeConfig {
    /// Whether releases may be made into `group`
    pub fn knows_group(&self, group: &str) -> bool {
        self.groups.is_empty() || self.groups.iter().any(|g| g == group)
    }
}

/// What is being released
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Package name
    pub name: String,
    /// Released version
    pub version: String,
    /// Package description
    pub description: String,
    /// When the release was made
    pub released_at: DateTime<Utc>,
}

impl ReleaseInfo {
    /// Create release info stamped with the current time
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            released_at: Utc::now(),
        }
    }

    /// Default announcement text
    pub fn announcement(&self) -> String {
        format!("Released {} {} ({})", self.name, self.version, self.description)
    }
}

/// A file prepared for upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactUpload {
    /// Path on disk
    pub path: PathBuf,
    /// File name sent to the forge
    pub file_name: String,
    /// Hex-encoded SHA-256 of the contents
    pub sha256: String,
    /// Size in bytes
    pub size: u64,
}

impl ArtifactUpload {
    /// Read a file and compute its digest
    pub fn from_path(path: &Path) -> Result<(Self, Vec<u8>)> {
        let bytes = std::fs::read(path)?;
        let sha256 = Sha256::digest(&bytes)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let upload = Self {
            path: path.to_path_buf(),
            file_name,
            sha256,
            size: bytes.len() as u64,
        };
        Ok((upload, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_announcement() {
        let info = ReleaseInfo::new("shipit", "1.2.4", "release tool");
        assert_eq!(info.announcement(), "Released shipit 1.2.4 (release tool)");
    }

    #[test]
    fn test_forge_groups() {
        let mut config = ForgeConfig::default();
        assert!(config.knows_group("anything"));

        config.groups = vec!["tools".to_string()];
        assert!(config.knows_group("tools"));
        assert!(!config.knows_group("games"));
    }

    #[test]
    fn test_artifact_digest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pkg-1.0.0.tgz");
        std::fs::write(&path, b"abc").unwrap();

        let (upload, bytes) = ArtifactUpload::from_path(&path).unwrap();
        assert_eq!(upload.file_name, "pkg-1.0.0.tgz");
        assert_eq!(upload.size, 3);
        assert_eq!(bytes, b"abc");
        assert_eq!(
            upload.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
