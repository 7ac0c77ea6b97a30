use crate::config::types::{
    Config, CrawlerConfig, ExtractionConfig, ProxyConfig, UserAgentConfig,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_proxy_config(&config.proxy)?;
    validate_extraction_config(&config.extraction)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_retries_per_url > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries_per_url must be <= 10, got {}",
            config.max_retries_per_url
        )));
    }

    if config.fetch_timeout_secs < 1 || config.fetch_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be between 1 and 300, got {}",
            config.fetch_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates proxy configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    for endpoint in &config.endpoints {
        if !endpoint.contains("{url}") {
            return Err(ConfigError::Validation(format!(
                "proxy endpoint must contain a {{url}} placeholder, got '{}'",
                endpoint
            )));
        }
    }

    if config.window_max_requests < 1 {
        return Err(ConfigError::Validation(format!(
            "window_max_requests must be >= 1, got {}",
            config.window_max_requests
        )));
    }

    if config.window_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "window_secs must be >= 1, got {}",
            config.window_secs
        )));
    }

    Ok(())
}

/// Validates extraction configuration
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.min_content_length < 1 {
        return Err(ConfigError::Validation(format!(
            "min_content_length must be >= 1, got {}",
            config.min_content_length
        )));
    }

    if config.min_distinct_line_ratio <= 0.0 || config.min_distinct_line_ratio > 1.0 {
        return Err(ConfigError::Validation(format!(
            "min_distinct_line_ratio must be in (0, 1], got {}",
            config.min_distinct_line_ratio
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = Config::default();
        config.crawler.max_pages = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_excessive_retries_rejected() {
        let mut config = Config::default();
        config.crawler.max_retries_per_url = 11;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_crawler_name_rejected() {
        let mut config = Config::default();
        config.user_agent.crawler_name = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_crawler_name_with_spaces_rejected() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "My Crawler".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_endpoint_without_placeholder_rejected() {
        let mut config = Config::default();
        config.proxy.endpoints = vec!["https://relay.example/fetch".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_endpoint_with_placeholder_accepted() {
        let mut config = Config::default();
        config.proxy.endpoints = vec!["https://relay.example/fetch?target={url}".to_string()];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_bad_distinct_ratio_rejected() {
        let mut config = Config::default();
        config.extraction.min_distinct_line_ratio = 0.0;
        assert!(validate(&config).is_err());

        config.extraction.min_distinct_line_ratio = 1.5;
        assert!(validate(&config).is_err());
    }
}
