//! reqwest-backed attachment source.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use super::{AttachmentDescriptor, AttachmentSource, BodyStream, FetchError};
use crate::config::ClientConfig;
use crate::observer::{NoopObserver, WireObserver};
use crate::protocol::{join_endpoint, JSONAPI_MIME};

/// Fetches attachments from the backend over HTTP.
///
/// Ordinary attachments and area archives share the same call shape and only
/// differ in the collection path, which comes from the descriptor kind. A
/// direct link on the descriptor is used verbatim instead.
pub struct HttpAttachmentSource {
    client: Client,
    endpoint: String,
    token: String,
    observer: Arc<dyn WireObserver>,
}

impl HttpAttachmentSource {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
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

    /// Location of the descriptor's full record.
    pub fn url_for(&self, descriptor: &AttachmentDescriptor) -> String {
        match &descriptor.link {
            Some(link) => link.clone(),
            None => format!(
                "{}/{}",
                join_endpoint(&self.endpoint, descriptor.kind.resource_path()),
                descriptor.id
            ),
        }
    }
}

#[async_trait]
impl AttachmentSource for HttpAttachmentSource {
    async fn fetch(&self, descriptor: &AttachmentDescriptor) -> Result<BodyStream, FetchError> {
        let url = self.url_for(descriptor);
        debug!(id = %descriptor.id, kind = ?descriptor.kind, %url, "fetching attachment");

        self.observer.on_request("GET", &url, None);
        let response = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, JSONAPI_MIME)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.observer
                .on_response(status.as_u16(), &url, Some(body.as_bytes()));
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        self.observer.on_response(status.as_u16(), &url, None);

        Ok(response.bytes_stream().map_err(FetchError::from).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::{read_body, AttachmentKind};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: &str) -> ClientConfig {
        ClientConfig {
            endpoint: endpoint.to_string(),
            token: "tok".to_string(),
            timeout_secs: 5,
            dump_wire: false,
        }
    }

    #[test]
    fn test_url_for_synthesises_from_kind() {
        let source = HttpAttachmentSource::new(&config("https://host/")).unwrap();
        assert_eq!(
            source.url_for(&AttachmentDescriptor::new("708", AttachmentKind::Ordinary)),
            "https://host/ng/api/json/c3_responseattachment/708"
        );
        assert_eq!(
            source.url_for(&AttachmentDescriptor::new("12", AttachmentKind::AreaArchive)),
            "https://host/ng/api/json/c3_areaarchive/12"
        );
    }

    #[test]
    fn test_url_for_prefers_direct_link() {
        let source = HttpAttachmentSource::new(&config("https://host")).unwrap();
        let d = AttachmentDescriptor::new("12", AttachmentKind::AreaArchive)
            .with_link("https://cdn/elsewhere/12");
        assert_eq!(source.url_for(&d), "https://cdn/elsewhere/12");
    }

    #[tokio::test]
    async fn test_fetch_sends_auth_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ng/api/json/c3_areaarchive/12"))
            .and(header("authorization", "Bearer tok"))
            .and(header("content-type", "application/vnd.api+json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpAttachmentSource::new(&config(&server.uri())).unwrap();
        let body = source
            .fetch(&AttachmentDescriptor::new("12", AttachmentKind::AreaArchive))
            .await
            .unwrap();
        assert_eq!(read_body(body).await.unwrap(), b"{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let source = HttpAttachmentSource::new(&config(&server.uri())).unwrap();
        let err = source
            .fetch(&AttachmentDescriptor::new("1", AttachmentKind::Ordinary))
            .await
            .err()
            .unwrap();
        assert_eq!(
            err,
            FetchError::Status {
                status: 404,
                body: "missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let source =
            HttpAttachmentSource::new(&config(&format!("http://127.0.0.1:{}", port))).unwrap();
        let err = source
            .fetch(&AttachmentDescriptor::new("1", AttachmentKind::Ordinary))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FetchError::Http(_)));
    }
}
