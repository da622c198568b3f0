//! Errand creation over HTTP.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info};

use super::types::{
    CreateErrandAttributes, CreateErrandData, CreateErrandDocument, CreatedDocument,
};
use super::{Answer, CreatedErrand, ErrandError, Message};
use crate::config::ClientConfig;
use crate::observer::{NoopObserver, WireObserver};
use crate::protocol::{join_endpoint, ERRAND_PATH, ERRAND_TYPE, JSONAPI_MIME};

/// Client for the errand collection.
pub struct ErrandClient {
    client: Client,
    endpoint: String,
    token: String,
    observer: Arc<dyn WireObserver>,
}

impl ErrandClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ErrandError> {
        if config.endpoint.is_empty() || config.token.is_empty() {
            return Err(ErrandError::NotConfigured(
                "both endpoint and token are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            observer: Arc::new(NoopObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn WireObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Create an errand from `message`, optionally closing it with `answer`.
    ///
    /// Attachment ids are stripped; the backend assigns them.
    pub async fn create_errand(
        &self,
        message: &Message,
        answer: Option<&Answer>,
    ) -> Result<CreatedErrand, ErrandError> {
        let mut msg = message.clone();
        for attachment in &mut msg.attachments {
            attachment.id = None;
        }

        let document = CreateErrandDocument {
            data: CreateErrandData {
                resource_type: ERRAND_TYPE,
                attributes: CreateErrandAttributes { msg, answer },
            },
        };
        let payload = serde_json::to_vec(&document)
            .map_err(|e| ErrandError::Decode(format!("failed to encode errand: {}", e)))?;

        let url = join_endpoint(&self.endpoint, ERRAND_PATH);
        debug!(
            %url,
            message_id = %message.message_id,
            attachments = message.attachments.len(),
            closing = answer.is_some(),
            "creating errand"
        );

        self.observer.on_request("POST", &url, Some(&payload));
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSONAPI_MIME)
            .bearer_auth(&self.token)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        self.observer.on_response(status.as_u16(), &url, Some(&body));

        if !status.is_success() {
            return Err(ErrandError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let created: CreatedDocument = serde_json::from_slice(&body).map_err(|e| {
            ErrandError::Decode(format!("failed to parse errand creation response: {}", e))
        })?;

        info!(id = %created.data.id, "errand created");
        Ok(created.data)
    }
}
