//! Package forge integration
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET  groups/{group}/packages/{package}` - package lookup
//! - `POST groups/{group}/packages` - package creation
//! - `POST groups/{group}/packages/{package}/releases` - multipart release upload
//! - `POST groups/{group}/news` - news item

use std::path::PathBuf;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};
use url::Url;

use crate::credentials::Credential;
use crate::error::{PublishError, Result};
use crate::feed::{base_url, check_response};
use crate::traits::PackageForge;
use crate::types::{ArtifactUpload, ForgeConfig, ReleaseInfo};

/// HTTP package forge client
pub struct HttpForge {
    config: ForgeConfig,
    base: Url,
    credential: Option<Credential>,
    client: Client,
}

impl HttpForge {
    /// Create a forge client from configuration and an optional credential
    pub fn new(config: &ForgeConfig, credential: Option<Credential>) -> Result<Self> {
        Ok(Self {
            base: base_url(&config.service, &config.url)?,
            config: config.clone(),
            credential,
            client: Client::new(),
        })
    }

    fn credential(&self) -> Result<&Credential> {
        self.credential
            .as_ref()
            .ok_or_else(|| PublishError::auth(&self.config.service, "no credentials configured"))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn check_group(&self, group: &str) -> Result<()> {
        if self.knows_group(group) {
            Ok(())
        } else {
            Err(PublishError::UnknownGroup {
                service: self.config.service.clone(),
                group: group.to_string(),
            })
        }
    }
}

impl PackageForge for HttpForge {
    fn service(&self) -> &str {
        &self.config.service
    }

    fn authenticate(&self) -> Result<()> {
        self.credential().map(|_| ())
    }

    fn knows_group(&self, group: &str) -> bool {
        self.config.knows_group(group)
    }

    #[instrument(skip(self), fields(service = %self.config.service))]
    fn ensure_package(&self, group: &str, package: &str) -> Result<()> {
        self.check_group(group)?;
        let credential = self.credential()?;
        let service = self.service();

        let lookup = self.endpoint(&format!("groups/{}/packages/{}", group, package))?;
        let create = self.endpoint(&format!("groups/{}/packages", group))?;
        let lookup = credential.apply(self.client.get(lookup));
        let create = credential
            .apply(self.client.post(create))
            .json(&serde_json::json!({ "name": package }));

        crate::block_on(async {
            let response = lookup.send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                info!(group, package, "creating package on forge");
                let response = create.send().await?;
                check_response(service, response).await?;
            } else {
                check_response(service, response).await?;
                debug!(group, package, "package already exists");
            }
            Ok::<_, PublishError>(())
        })?
    }

    #[instrument(skip(self, release, files), fields(service = %self.config.service, version = %release.version))]
    fn add_release(&self, group: &str, release: &ReleaseInfo, files: &[PathBuf]) -> Result<()> {
        self.check_group(group)?;
        if files.is_empty() {
            return Err(PublishError::MissingArtifact(format!(
                "{} {}",
                release.name, release.version
            )));
        }
        let credential = self.credential()?;

        let mut form = Form::new()
            .text("version", release.version.clone())
            .text("description", release.description.clone())
            .text("released_at", release.released_at.to_rfc3339());

        for path in files {
            let (upload, bytes) = ArtifactUpload::from_path(path)?;
            debug!(file = %upload.file_name, size = upload.size, "attaching artifact");
            form = form
                .text(format!("sha256[{}]", upload.file_name), upload.sha256.clone())
                .part("files", Part::bytes(bytes).file_name(upload.file_name));
        }

        let endpoint = self.endpoint(&format!(
            "groups/{}/packages/{}/releases",
            group, release.name
        ))?;
        let request = credential.apply(self.client.post(endpoint)).multipart(form);
        let service = self.service();

        crate::block_on(async {
            let response = request.send().await?;
            check_response(service, response).await
        })??;

        info!(
            group,
            package = %release.name,
            version = %release.version,
            files = files.len(),
            "release added to forge"
        );
        Ok(())
    }

    #[instrument(skip(self, body), fields(service = %self.config.service))]
    fn post_news(&self, group: &str, subject: &str, body: &str) -> Result<()> {
        self.check_group(group)?;
        let credential = self.credential()?;
        let endpoint = self.endpoint(&format!("groups/{}/news", group))?;
        let request = credential
            .apply(self.client.post(endpoint))
            .json(&serde_json::json!({ "subject": subject, "body": body }));
        let service = self.service();

        crate::block_on(async {
            let response = request.send().await?;
            check_response(service, response).await
        })??;

        info!(group, subject, "posted news item");
        Ok(())
    }
}
