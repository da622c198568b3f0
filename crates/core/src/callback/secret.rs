//! Shared-secret verification for inbound callbacks.

use super::{CallbackError, Envelope};
use crate::config::CallbackConfig;

/// Check the envelope's `meta.api_secret` against `expected`.
///
/// When `required` is false this always succeeds. Otherwise the metadata
/// block must be present and its secret must equal `expected` byte for byte.
pub fn verify_secret(envelope: &Envelope, expected: &str, required: bool) -> Result<(), CallbackError> {
    if !required {
        return Ok(());
    }

    let provided = envelope
        .meta()
        .and_then(|m| m.api_secret.as_deref())
        .ok_or(CallbackError::Authentication)?;

    if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(CallbackError::Authentication)
    }
}

/// How callbacks are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretPolicy {
    /// Accept callbacks regardless of their secret.
    Disabled,
    /// Require `meta.api_secret` to match.
    Required(String),
}

impl SecretPolicy {
    pub fn from_config(config: &CallbackConfig) -> Self {
        match (&config.secret, config.require_secret) {
            (Some(secret), true) => Self::Required(secret.clone()),
            // Rejected by validation; only an empty provided secret matches.
            (None, true) => Self::Required(String::new()),
            (_, false) => Self::Disabled,
        }
    }

    pub fn verify(&self, envelope: &Envelope) -> Result<(), CallbackError> {
        match self {
            Self::Disabled => verify_secret(envelope, "", false),
            Self::Required(secret) => verify_secret(envelope, secret, true),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required(_))
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
