//! Default configuration values

use super::types::Config;

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "shipit.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "shipit.yaml";

/// File a change_version step edits when no file is given
pub const DEFAULT_VERSION_FILE: &str = "VERSION";

/// Artifact pattern used when `[publish] artifacts` is not set
pub const DEFAULT_ARTIFACT_PATTERN: &str = "pkg/{name}-{version}.tgz";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".shipit.toml",
        ".shipit.yaml",
    ]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    serde_yaml::to_string(&template_config()).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

fn template_config() -> Config {
    match toml::from_str(DEFAULT_CONFIG_TEMPLATE) {
        Ok(config) => config,
        Err(_) => Config::default(),
    }
}

/// Default configuration template (TOML)
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# shipit configuration
#
# Steps run in two phases: every step is prepared (validated) first, then,
# after confirmation, every step runs in the order listed here.
steps = [
    "change_version",
    "commit",
    "tag",
]

[package]
name = "my-package"
version = "0.1.0"
description = "A short description of the package"

[tasks]
# test = "make test"

[vc]
# backend = "git"

[publish]
artifacts = ["pkg/{name}-{version}.tgz"]

[publish.feed]
# url = "https://feed.example.com/api/"

[publish.forge]
# url = "https://forge.example.com/api/"
# group = "my-group"

[confirm]
assume_yes = false
"#;
