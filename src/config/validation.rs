use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("worker_count must be at least 1")]
    NoWorkers,

    #[error("Invalid proxy URL '{url}', expected an http://, https:// or socks5:// URL")]
    InvalidProxyUrl { url: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_workers(config)?;
    validate_proxy(config)?;
    Ok(())
}

/// The pool cannot start without at least one worker
fn validate_workers(config: &Config) -> Result<(), ValidationError> {
    if config.worker_count == 0 {
        return Err(ValidationError::NoWorkers);
    }

    Ok(())
}

/// Reject proxy URLs the engine cannot use, before any worker starts
fn validate_proxy(config: &Config) -> Result<(), ValidationError> {
    if let Some(proxy) = &config.proxy {
        let supported = ["http://", "https://", "socks5://"];
        if !supported.iter().any(|scheme| proxy.starts_with(scheme)) {
            return Err(ValidationError::InvalidProxyUrl { url: proxy.clone() });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_workers() {
        let config = Config {
            worker_count: 0,
            ..Config::default()
        };

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::NoWorkers)));
    }

    #[test]
    fn test_invalid_proxy_scheme() {
        let config = Config {
            proxy: Some("ftp://proxy:21".to_string()),
            ..Config::default()
        };

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidProxyUrl { .. })
        ));
    }

    #[test]
    fn test_socks_proxy_accepted() {
        let config = Config {
            proxy: Some("socks5://localhost:1080".to_string()),
            ..Config::default()
        };

        assert!(validate(&config).is_ok());
    }
}
