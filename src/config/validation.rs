use crate::config::types::{Config, OutputConfig, SourceConfig, WorkerConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on any single pool width
const MAX_POOL_WIDTH: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_worker_config(&config.workers)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the remote source configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.partitions.is_empty() {
        return Err(ConfigError::Validation(
            "partitions cannot be empty".to_string(),
        ));
    }

    if config.partitions.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "partitions cannot contain blank keys".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates pool widths
///
/// Items vastly outnumber collections, so the fetch pool must be strictly
/// wider than both other pools.
fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    for (name, width) in [
        ("discovery", config.discovery),
        ("resolution", config.resolution),
        ("fetch", config.fetch),
    ] {
        if width < 1 || width > MAX_POOL_WIDTH {
            return Err(ConfigError::Validation(format!(
                "workers.{} must be between 1 and {}, got {}",
                name, MAX_POOL_WIDTH, width
            )));
        }
    }

    if config.fetch <= config.discovery || config.fetch <= config.resolution {
        return Err(ConfigError::Validation(format!(
            "workers.fetch ({}) must be larger than workers.discovery ({}) and workers.resolution ({})",
            config.fetch, config.discovery, config.resolution
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root_dir.is_empty() {
        return Err(ConfigError::Validation(
            "root_dir cannot be empty".to_string(),
        ));
    }

    if config.extension.is_empty() || !config.extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "extension must be non-empty and alphanumeric, got '{}'",
            config.extension
        )));
    }

    Ok(())
}
