//! Inbound callback handling: decode, authenticate, extract.

mod envelope;
mod secret;
mod ticket;

pub use envelope::{Envelope, IncludedResource, Meta, PrimaryResource, ResourceKind, WireShape};
pub(crate) use envelope::value_to_id;
pub use secret::{verify_secret, SecretPolicy};
pub use ticket::{
    AnsweredTicket, Recipient, TicketAnswer, TicketResponse, TicketService, ANSWER_ERRAND_EVENT,
};

use thiserror::Error;
use tracing::debug;

/// Errors that reject a callback outright.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Callback secret check failed")]
    Authentication,

    #[error("Unsupported event: {}", describe_event(.0))]
    UnsupportedEvent(Option<i64>),
}

fn describe_event(code: &Option<i64>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "missing".to_string(),
    }
}

/// Decode a callback body, check its secret and extract the answered errand.
///
/// The secret is checked before anything else is looked at.
pub fn parse_callback(raw: &[u8], policy: &SecretPolicy) -> Result<AnsweredTicket, CallbackError> {
    let envelope = Envelope::decode(raw)?;
    policy.verify(&envelope)?;
    debug!(
        id = %envelope.data().id,
        resource_type = %envelope.data().resource_type,
        shape = ?envelope.shape(),
        "callback accepted"
    );
    AnsweredTicket::extract(&envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_parse_callback_with_secret() {
        let raw = fixtures::answered_callback(Some("123456")).to_string();
        let ticket =
            parse_callback(raw.as_bytes(), &SecretPolicy::Required("123456".into())).unwrap();
        assert_eq!(ticket.descriptors().len(), 3);
    }

    #[test]
    fn test_parse_callback_missing_secret_rejected_before_extraction() {
        // Broken errand resource: extraction would fail with MalformedPayload.
        let mut doc = fixtures::answered_callback(None);
        doc["included"][3]["attributes"] = serde_json::json!({});
        let err = parse_callback(
            doc.to_string().as_bytes(),
            &SecretPolicy::Required("123456".into()),
        )
        .unwrap_err();
        assert!(matches!(err, CallbackError::Authentication));
    }

    #[test]
    fn test_parse_callback_without_policy() {
        let raw = fixtures::answered_callback(Some("whatever")).to_string();
        assert!(parse_callback(raw.as_bytes(), &SecretPolicy::Disabled).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CallbackError::UnsupportedEvent(None).to_string(),
            "Unsupported event: missing"
        );
        assert_eq!(
            CallbackError::UnsupportedEvent(Some(3)).to_string(),
            "Unsupported event: 3"
        );
    }
}
