//! Credential lookup for publish services

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{PublishError, Result};

/// Credential provider for publish service authentication
///
/// Lookup order for a service `feed`:
/// 1. `SHIPIT_FEED_TOKEN`
/// 2. `SHIPIT_FEED_USERNAME` + `SHIPIT_FEED_PASSWORD`
/// 3. the `[feed]` table of the credentials file
///    (`~/.config/shipit/credentials.toml` unless overridden)
pub struct CredentialProvider {
    env_prefix: String,
    file: Option<PathBuf>,
    cache: HashMap<String, Credential>,
}

impl CredentialProvider {
    /// Create a provider using the default prefix and credentials file
    pub fn new() -> Self {
        Self {
            env_prefix: "SHIPIT".to_string(),
            file: dirs::config_dir().map(|d| d.join("shipit").join("credentials.toml")),
            cache: HashMap::new(),
        }
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Read credentials from a specific file instead of the default location
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Get credentials for a service
    #[instrument(skip(self), fields(service))]
    pub fn get(&mut self, service: &str) -> Result<Option<Credential>> {
        if let Some(cred) = self.cache.get(service) {
            debug!(service, source = "cache", "credentials found");
            return Ok(Some(cred.clone()));
        }

        if let Some(cred) = self.from_env(service) {
            debug!(service, source = "environment", "credentials found");
            self.cache.insert(service.to_string(), cred.clone());
            return Ok(Some(cred));
        }

        if let Some(path) = self.file.clone() {
            if let Some(cred) = Self::from_file(&path, service)? {
                debug!(service, source = "credentials_file", "credentials found");
                self.cache.insert(service.to_string(), cred.clone());
                return Ok(Some(cred));
            }
        }

        debug!(service, "no credentials found");
        Ok(None)
    }

    /// Get credentials, failing when none are configured
    pub fn require(&mut self, service: &str) -> Result<Credential> {
        self.get(service)?.ok_or_else(|| {
            PublishError::auth(
                service,
                format!(
                    "no credentials configured (set {}_{}_TOKEN)",
                    self.env_prefix,
                    env_key(service)
                ),
            )
        })
    }

    fn from_env(&self, service: &str) -> Option<Credential> {
        let key = env_key(service);

        if let Ok(token) = env::var(format!("{}_{}_TOKEN", self.env_prefix, key)) {
            if !token.is_empty() {
                return Some(Credential::Token(token));
            }
        }

        let user = env::var(format!("{}_{}_USERNAME", self.env_prefix, key));
        let pass = env::var(format!("{}_{}_PASSWORD", self.env_prefix, key));
        match (user, pass) {
            (Ok(username), Ok(password)) => Some(Credential::UsernamePassword { username, password }),
            _ => None,
        }
    }

    fn from_file(path: &Path, service: &str) -> Result<Option<Credential>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PublishError::auth(service, format!("failed to read {}: {}", path.display(), e))
        })?;

        #[derive(Deserialize)]
        struct Entry {
            token: Option<String>,
            username: Option<String>,
            password: Option<String>,
        }

        let entries: HashMap<String, Entry> = toml::from_str(&content).map_err(|e| {
            PublishError::auth(service, format!("failed to parse {}: {}", path.display(), e))
        })?;

        let Some(entry) = entries.get(service) else {
            return Ok(None);
        };

        if let Some(token) = &entry.token {
            return Ok(Some(Credential::Token(token.clone())));
        }
        if let (Some(username), Some(password)) = (&entry.username, &entry.password) {
            return Ok(Some(Credential::UsernamePassword {
                username: username.clone(),
                password: password.clone(),
            }));
        }

        Ok(None)
    }
}

impl Default for CredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn env_key(service: &str) -> String {
    service.to_uppercase().replace(['.', '-', '/'], "_")
}

/// Credential types
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Bearer/API token
    Token(String),
    /// Username and password
    UsernamePassword { username: String, password: String },
}

impl Credential {
    /// Attach this credential to an outgoing request
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Token(token) => request.bearer_auth(token),
            Self::UsernamePassword { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }

    /// Get the credential as a token string (if applicable)
    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::Token(t) => Some(t),
            _ => None,
        }
    }

    /// Get username (if applicable)
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::UsernamePassword { username, .. } => Some(username),
            _ => None,
        }
    }
}

// Secrets never reach logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(***)"),
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}
