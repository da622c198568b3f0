use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Client endpoint is an http(s) URL and the token is set
/// - A required callback secret is actually configured
/// - The callback path is absolute
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let endpoint = config.client.endpoint.as_str();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "client.endpoint must be an http(s) URL, got '{}'",
            endpoint
        )));
    }

    if config.client.token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "client.token cannot be empty".to_string(),
        ));
    }

    if config.client.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "client.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.callback.require_secret
        && config.callback.secret.as_deref().unwrap_or_default().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "callback.secret must be set when callback.require_secret is true".to_string(),
        ));
    }

    if !config.callback.path.starts_with('/') {
        return Err(ConfigError::ValidationError(
            "callback.path must start with '/'".to_string(),
        ));
    }

    Ok(())
}
