//! Mock attachment source for testing.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::attachment::{AttachmentDescriptor, AttachmentKind, AttachmentSource, BodyStream, FetchError};

/// Mock implementation of the AttachmentSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve canned response bodies per (kind, id)
/// - Fail specific fetches
/// - Delay every fetch
/// - Record fetches for assertions
///
/// # Example
///
/// ```rust,ignore
/// use errandlink_core::testing::{MockAttachmentSource, fixtures};
///
/// let source = MockAttachmentSource::new();
/// source
///     .add_body(AttachmentKind::Ordinary, "708", fixtures::attachment_document("708", "a.txt", b"hi"))
///     .await;
/// ```
#[derive(Debug, Default)]
pub struct MockAttachmentSource {
    /// Response bodies by (kind, id).
    bodies: Arc<RwLock<HashMap<(AttachmentKind, String), Vec<u8>>>>,
    /// Failures by (kind, id). Checked before bodies.
    failures: Arc<RwLock<HashMap<(AttachmentKind, String), FetchError>>>,
    /// Delay applied to every fetch.
    delay: Arc<RwLock<Option<Duration>>>,
    /// Recorded fetches, in call order.
    fetches: Arc<RwLock<Vec<(AttachmentKind, String)>>>,
}

impl MockAttachmentSource {
    /// Create a new mock that knows no attachments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for the given attachment.
    pub async fn add_body(&self, kind: AttachmentKind, id: &str, body: Vec<u8>) {
        self.bodies.write().await.insert((kind, id.to_string()), body);
    }

    /// Make fetches of the given attachment fail with `error`.
    pub async fn fail_fetch(&self, kind: AttachmentKind, id: &str, error: FetchError) {
        self.failures
            .write()
            .await
            .insert((kind, id.to_string()), error);
    }

    /// Delay every fetch by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Fetches performed so far.
    pub async fn fetches(&self) -> Vec<(AttachmentKind, String)> {
        self.fetches.read().await.clone()
    }

    /// Number of fetches performed so far.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }
}

#[async_trait]
impl AttachmentSource for MockAttachmentSource {
    async fn fetch(&self, descriptor: &AttachmentDescriptor) -> Result<BodyStream, FetchError> {
        let key = (descriptor.kind, descriptor.id.clone());
        self.fetches.write().await.push(key.clone());

        if let Some(delay) = *self.delay.read().await {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.read().await.get(&key) {
            return Err(error.clone());
        }

        let body = self.bodies.read().await.get(&key).cloned().ok_or_else(|| {
            FetchError::Status {
                status: 404,
                body: format!("no mock body for {:?} {}", key.0, key.1),
            }
        })?;

        // Two chunks, so readers cannot assume a single-chunk body.
        let split = body.len() / 2;
        let tail = body[split..].to_vec();
        let mut head = body;
        head.truncate(split);
        Ok(stream::iter(vec![Ok(Bytes::from(head)), Ok(Bytes::from(tail))]).boxed())
    }
}
