use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog base URL is non-empty and uses http(s)
/// - Catalog timeout is not 0
/// - Retry policy allows at least one attempt
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.catalog.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.base_url cannot be empty".to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "catalog.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry.max_attempts must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_empty_base_url_fails() {
        let mut config = Config::default();
        config.catalog.base_url = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_non_http_base_url_fails() {
        let mut config = Config::default();
        config.catalog.base_url = "ftp://api.douban.com".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn test_validate_zero_attempts_fails() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.catalog.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
