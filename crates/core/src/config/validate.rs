use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Carrier section exists (enforced by serde)
/// - Server port is not 0
/// - Workflow tunables are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.carrier.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "carrier.base_url cannot be empty".to_string(),
        ));
    }

    if config.workflow.max_batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "workflow.max_batch_size must be at least 1".to_string(),
        ));
    }

    if config.workflow.poll_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "workflow.poll_attempts must be at least 1".to_string(),
        ));
    }

    if let Some(ref marketplace) = config.marketplace {
        if marketplace.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "marketplace.base_url cannot be empty".to_string(),
            ));
        }
        if marketplace.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "marketplace.page_size must be at least 1".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[carrier]
base_url = "https://api.example.com/v2"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        let config = valid_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_carrier_url_fails() {
        let mut config = valid_config();
        config.carrier.base_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_batch_size_fails() {
        let mut config = valid_config();
        config.workflow.max_batch_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_poll_attempts_fails() {
        let mut config = valid_config();
        config.workflow.poll_attempts = 0;
        assert!(validate_config(&config).is_err());
    }
}
