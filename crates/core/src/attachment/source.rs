//! Fetch strategies: how one descriptor becomes a response body.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::AttachmentDescriptor;

/// Lazily read response body.
pub type BodyStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// Errors retrieving an attachment from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid attachment URL: {0}")]
    InvalidUrl(String),

    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Fetch timed out")]
    Timeout,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_builder() {
            FetchError::InvalidUrl(e.to_string())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

/// Retrieves the raw body for one attachment descriptor.
///
/// Implementations are stateless: fetching the same descriptor twice issues
/// two independent requests.
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    async fn fetch(&self, descriptor: &AttachmentDescriptor) -> Result<BodyStream, FetchError>;
}

/// Cancellation and deadline for a single fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl FetchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every fetch run under this context.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Tie this context to an externally owned token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Drive `fut` until it completes, the token fires or the deadline passes.
    ///
    /// `fut` is dropped on cancellation or expiry, releasing anything it owns.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
                res = fut => res,
            }
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, guarded)
                .await
                .map_err(|_| FetchError::Timeout)?,
            None => guarded.await,
        }
    }
}

/// Read a body stream to the end.
pub(crate) async fn read_body(mut body: BodyStream) -> Result<Vec<u8>, FetchError> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf)
}
