//! Outbound errand creation.

mod client;
mod types;

pub use client::ErrandClient;
pub use types::{Answer, CreatedErrand, Message, AGENT_USER_TYPE};

use thiserror::Error;

/// Errors creating an errand.
#[derive(Debug, Error)]
pub enum ErrandError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode: {0}")]
    Decode(String),

    #[error("Client not configured: {0}")]
    NotConfigured(String),
}
