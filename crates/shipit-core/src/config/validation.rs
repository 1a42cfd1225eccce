//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::version::is_release_version;

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_package(config)?;
    validate_steps(config)?;
    validate_tasks(config)?;
    validate_publish(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_package(config: &Config) -> Result<()> {
    let version = &config.package.version;
    if !version.is_empty() && !is_release_version(version) {
        return Err(ConfigError::InvalidValue {
            field: "package.version".to_string(),
            message: format!("'{}' is not a MAJOR.MINOR.PATCH version", version),
        }
        .into());
    }
    Ok(())
}

fn validate_steps(config: &Config) -> Result<()> {
    for (i, step) in config.steps.iter().enumerate() {
        if step.kind().trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("steps[{}].kind", i),
                message: "step kind cannot be empty".to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn validate_tasks(config: &Config) -> Result<()> {
    for (name, task) in &config.tasks {
        if task.command().trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("tasks.{}", name),
                message: "task command cannot be empty".to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn validate_publish(config: &Config) -> Result<()> {
    let urls = [
        ("publish.feed.url", &config.publish.feed.url),
        ("publish.forge.url", &config.publish.forge.url),
    ];
    for (field, raw) in urls {
        if raw.is_empty() {
            continue;
        }
        if let Err(e) = url::Url::parse(raw) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("'{}' is not a valid URL: {}", raw, e),
            }
            .into());
        }
    }

    if config.publish.artifacts.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: "publish.artifacts".to_string(),
            message: "artifact patterns cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StepConfig, TaskConfig};

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_invalid_version() {
        let mut config = Config::default();
        config.package.version = "1.2".to_string();
        assert!(validate_config(&config).is_err());

        config.package.version = "1.2.3".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_task_command() {
        let mut config = Config::default();
        config
            .tasks
            .insert("build".to_string(), TaskConfig::Command("  ".to_string()));
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("tasks.build"));
    }

    #[test]
    fn test_validate_empty_step_kind() {
        let mut config = Config::default();
        config.steps.push(StepConfig::Kind(String::new()));
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_url() {
        let mut config = Config::default();
        config.publish.feed.url = "not a url".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("publish.feed.url"));
    }
}
