//! Common test utilities for in-process server testing.
//!
//! The fixture builds the real router around a [`MockAttachmentSource`], so
//! callbacks can be posted without a backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use errandlink_core::testing::MockAttachmentSource;
use errandlink_core::{AttachmentSource, CallbackConfig, ClientConfig, Config, ServerConfig};

/// Re-export fixtures for test convenience
pub use errandlink_core::testing::fixtures;

/// Secret configured by [`TestConfig::with_secret`].
pub const TEST_SECRET: &str = "123456";

/// Test fixture for callback handling with a mock attachment source.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock attachment source - configure attachment bodies
    pub source: Arc<MockAttachmentSource>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture without a callback secret.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let source = Arc::new(MockAttachmentSource::new());

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            client: ClientConfig {
                endpoint: "http://backend.test".to_string(),
                token: "test-token".to_string(),
                timeout_secs: 5,
                dump_wire: false,
            },
            callback: CallbackConfig {
                path: "/callback".to_string(),
                secret: test_config.require_secret.then(|| TEST_SECRET.to_string()),
                require_secret: test_config.require_secret,
                inspect_only: test_config.inspect_only,
            },
        };

        let state = Arc::new(errandlink_server::state::AppState::new(
            config,
            Arc::clone(&source) as Arc<dyn AttachmentSource>,
        ));
        let router = errandlink_server::api::create_router(state);

        Self { router, source }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.post_raw(path, &body.to_string()).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/vnd.api+json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Require [`TEST_SECRET`] on every callback
    pub require_secret: bool,
    /// Only log callbacks
    pub inspect_only: bool,
}

impl TestConfig {
    /// Create config that requires the test secret.
    pub fn with_secret() -> Self {
        Self {
            require_secret: true,
            inspect_only: false,
        }
    }

    /// Create config with inspect-only mode.
    pub fn inspect_only() -> Self {
        Self {
            require_secret: false,
            inspect_only: true,
        }
    }
}
