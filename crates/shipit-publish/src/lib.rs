//! Shipit Publish - release announcements and package forge uploads
//!
//! This crate provides the external collaborators a release pipeline talks to
//! once everything has been validated: a status feed that receives a short
//! announcement, and a package forge that receives the release artifacts and a
//! news item. Authentication is delegated to [`CredentialProvider`].

pub mod credentials;
pub mod error;
pub mod feed;
pub mod forge;
pub mod traits;
pub mod types;

pub use credentials::{Credential, CredentialProvider};
pub use error::{PublishError, Result};
pub use feed::HttpFeed;
pub use forge::HttpForge;
pub use traits::{FeedPoster, PackageForge};
pub use types::{ArtifactUpload, FeedConfig, ForgeConfig, ReleaseInfo};

/// Run a future to completion on a private current-thread runtime.
///
/// Pipeline steps are synchronous, so every HTTP call made by this crate is
/// driven through here instead of requiring callers to own a runtime.
pub(crate) fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
