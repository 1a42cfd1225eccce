//! Publish collaborator traits

use std::path::PathBuf;

use crate::error::Result;
use crate::types::ReleaseInfo;

/// A feed that receives a short release announcement
pub trait FeedPoster: Send + Sync {
    /// Service name (used in errors and credential lookup)
    fn service(&self) -> &str;

    /// Check that the poster holds usable credentials
    fn authenticate(&self) -> Result<()>;

    /// Post a status message
    fn post_status(&self, message: &str) -> Result<()>;
}

/// A package forge that hosts release files and news
pub trait PackageForge: Send + Sync {
    /// Service name (used in errors and credential lookup)
    fn service(&self) -> &str;

    /// Check that the forge client holds usable credentials
    fn authenticate(&self) -> Result<()>;

    /// Whether the account may release into `group`
    fn knows_group(&self, group: &str) -> bool;

    /// Create the package inside the group when it does not exist yet
    fn ensure_package(&self, group: &str, package: &str) -> Result<()>;

    /// Register a release and upload its files
    fn add_release(&self, group: &str, release: &ReleaseInfo, files: &[PathBuf]) -> Result<()>;

    /// Post a news item for the group
    fn post_news(&self, group: &str, subject: &str, body: &str) -> Result<()>;
}
