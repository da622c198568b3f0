use std::sync::Arc;
use std::time::Duration;

use errandlink_core::{AttachmentSource, Config, SanitizedConfig, SecretPolicy};

/// Shared application state
pub struct AppState {
    config: Config,
    secret_policy: SecretPolicy,
    attachment_source: Arc<dyn AttachmentSource>,
}

impl AppState {
    pub fn new(config: Config, attachment_source: Arc<dyn AttachmentSource>) -> Self {
        let secret_policy = SecretPolicy::from_config(&config.callback);
        Self {
            config,
            secret_policy,
            attachment_source,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn secret_policy(&self) -> &SecretPolicy {
        &self.secret_policy
    }

    pub fn attachment_source(&self) -> Arc<dyn AttachmentSource> {
        Arc::clone(&self.attachment_source)
    }

    pub fn inspect_only(&self) -> bool {
        self.config.callback.inspect_only
    }

    pub fn callback_path(&self) -> &str {
        &self.config.callback.path
    }

    /// Upper bound for a single attachment fetch.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.config.client.timeout_secs)
    }
}
