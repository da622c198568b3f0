//! The answered errand carried by an event-1 callback.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{CallbackError, Envelope, ResourceKind};
use crate::attachment::{build_descriptors, AttachmentDescriptor, AttachmentIter, AttachmentSource};

/// Event code of an answered errand.
pub const ANSWER_ERRAND_EVENT: i64 = 1;

/// An answered errand extracted from a callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredTicket {
    #[serde(rename = "c3_id")]
    pub id: u64,
    pub answer: TicketAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<TicketService>,
    #[serde(skip)]
    descriptors: Vec<AttachmentDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketAnswer {
    #[serde(rename = "c3_id")]
    pub id: u64,
    pub response: TicketResponse,
}

/// The outgoing response that answered the errand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketResponse {
    #[serde(rename = "c3_id")]
    pub id: u64,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "htmlBody", default)]
    pub html_body: String,
    #[serde(default)]
    pub subject: String,
    #[serde(rename = "to", default)]
    pub recipients: Vec<Recipient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "c3_id")]
    pub id: u64,
    #[serde(rename = "emailAddress", default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
}

/// Channel the errand arrived through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketService {
    #[serde(rename = "c3_id")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub service_type: i64,
}

impl AnsweredTicket {
    /// Extract the answered errand and its attachment descriptors.
    pub fn extract(envelope: &Envelope) -> Result<Self, CallbackError> {
        match envelope.event_code() {
            Some(ANSWER_ERRAND_EVENT) => {}
            other => return Err(CallbackError::UnsupportedEvent(other)),
        }

        let resources = envelope.resources()?;
        let mut errands = resources
            .iter()
            .filter(|r| r.kind == ResourceKind::AnsweredTicket);
        let resource = errands.next().ok_or_else(|| {
            CallbackError::MalformedPayload("no answered errand resource included".to_string())
        })?;
        if errands.next().is_some() {
            return Err(CallbackError::MalformedPayload(
                "more than one errand resource included".to_string(),
            ));
        }

        let mut ticket: AnsweredTicket =
            serde_json::from_value(Value::Object(resource.attributes.clone())).map_err(|e| {
                CallbackError::MalformedPayload(format!(
                    "invalid errand {}: {}",
                    resource.id, e
                ))
            })?;
        ticket.descriptors = build_descriptors(&resources);

        debug!(
            errand = ticket.id,
            answer = ticket.answer.id,
            attachments = ticket.descriptors.len(),
            "extracted answered errand"
        );
        Ok(ticket)
    }

    /// Attachment descriptors not yet handed to a cursor, in fetch order.
    pub fn descriptors(&self) -> &[AttachmentDescriptor] {
        &self.descriptors
    }

    /// Start iterating this ticket's attachments.
    ///
    /// The descriptor queue moves into the returned cursor, so a second call
    /// yields an already exhausted iterator.
    pub fn attachments(&mut self, source: Arc<dyn AttachmentSource>) -> AttachmentIter {
        AttachmentIter::new(std::mem::take(&mut self.descriptors), source)
    }
}
