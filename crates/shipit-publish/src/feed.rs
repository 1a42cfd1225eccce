//! Status feed integration
//!
//! Posts `{"status": "<message>"}` to `<url>/statuses` with the configured
//! credential attached.

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, instrument};
use url::Url;

use crate::credentials::Credential;
use crate::error::{PublishError, Result};
use crate::traits::FeedPoster;
use crate::types::FeedConfig;

/// HTTP status feed client
pub struct HttpFeed {
    service: String,
    base: Url,
    credential: Option<Credential>,
    client: Client,
}

impl HttpFeed {
    /// Create a feed client from configuration and an optional credential
    pub fn new(config: &FeedConfig, credential: Option<Credential>) -> Result<Self> {
        Ok(Self {
            service: config.service.clone(),
            base: base_url(&config.service, &config.url)?,
            credential,
            client: Client::new(),
        })
    }

    fn credential(&self) -> Result<&Credential> {
        self.credential
            .as_ref()
            .ok_or_else(|| PublishError::auth(&self.service, "no credentials configured"))
    }
}

impl FeedPoster for HttpFeed {
    fn service(&self) -> &str {
        &self.service
    }

    fn authenticate(&self) -> Result<()> {
        self.credential().map(|_| ())
    }

    #[instrument(skip(self, message), fields(service = %self.service))]
    fn post_status(&self, message: &str) -> Result<()> {
        let credential = self.credential()?;
        let endpoint = self.base.join("statuses")?;
        debug!(url = %endpoint, "posting status");

        let request = credential
            .apply(self.client.post(endpoint))
            .json(&serde_json::json!({ "status": message }));

        crate::block_on(async {
            let response = request.send().await?;
            check_response(&self.service, response).await
        })??;

        info!(service = %self.service, "posted release status");
        Ok(())
    }
}

/// Parse a configured base URL, making sure relative joins append to it.
pub(crate) fn base_url(service: &str, raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        return Err(PublishError::Configuration(format!(
            "no URL configured for {}",
            service
        )));
    }

    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Map a non-success response to a publish error.
pub(crate) async fn check_response(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PublishError::auth(
            service,
            format!("{} {}", status.as_u16(), message.trim()),
        ));
    }

    Err(PublishError::ApiError {
        service: service.to_string(),
        status: status.as_u16(),
        message,
    })
}
