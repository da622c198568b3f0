use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub client: ClientConfig,
    #[serde(default)]
    pub callback: CallbackConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Backend connection settings, shared by errand creation and attachment fetches.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "https://tickets.example.com")
    pub endpoint: String,
    /// Bearer token
    pub token: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Log outbound request and response bodies at debug level
    #[serde(default)]
    pub dump_wire: bool,
}

fn default_timeout() -> u64 {
    30
}

/// Callback listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackConfig {
    #[serde(default = "default_callback_path")]
    pub path: String,
    /// Shared secret expected in `meta.api_secret`
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub require_secret: bool,
    /// Only log incoming payloads without decoding them
    #[serde(default)]
    pub inspect_only: bool,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            path: default_callback_path(),
            secret: None,
            require_secret: false,
            inspect_only: false,
        }
    }
}

fn default_callback_path() -> String {
    "/callback".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub client: SanitizedClientConfig,
    pub callback: SanitizedCallbackConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedClientConfig {
    pub endpoint: String,
    pub token_configured: bool,
    pub timeout_secs: u64,
    pub dump_wire: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCallbackConfig {
    pub path: String,
    pub secret_configured: bool,
    pub require_secret: bool,
    pub inspect_only: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            client: SanitizedClientConfig {
                endpoint: config.client.endpoint.clone(),
                token_configured: !config.client.token.is_empty(),
                timeout_secs: config.client.timeout_secs,
                dump_wire: config.client.dump_wire,
            },
            callback: SanitizedCallbackConfig {
                path: config.callback.path.clone(),
                secret_configured: config
                    .callback
                    .secret
                    .as_ref()
                    .is_some_and(|s| !s.is_empty()),
                require_secret: config.callback.require_secret,
                inspect_only: config.callback.inspect_only,
            },
        }
    }
}
