use crate::config::types::{AutomationConfig, BrowserConfig, Config, CrawlConfig};
use crate::ConfigError;
use tokio::sync::Semaphore;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_browser_config(&config.browser)?;
    validate_automation_config(&config.automation)?;
    Ok(())
}

/// Validates a crawl seed: it must be an absolute http(s) URL with a host
pub fn validate_start_url(start_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}' must use http or https, got {}",
            start_url,
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}' has no host",
            start_url
        )));
    }

    Ok(())
}

/// Validates crawl bounds
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }

    if config.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be >= 1, got {}",
            config.concurrency
        )));
    }

    if config.concurrency > Semaphore::MAX_PERMITS {
        return Err(ConfigError::Validation(format!(
            "concurrency must be <= {}, got {}",
            Semaphore::MAX_PERMITS,
            config.concurrency
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

/// Validates browser presentation settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport must be non-zero, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates automation selectors
fn validate_automation_config(config: &AutomationConfig) -> Result<(), ConfigError> {
    if let Some(selector) = &config.wait_selector {
        if selector.trim().is_empty() {
            return Err(ConfigError::Validation(
                "wait_selector cannot be empty".to_string(),
            ));
        }
    }

    if config.click_selectors.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "click selectors cannot be empty".to_string(),
        ));
    }

    Ok(())
}
