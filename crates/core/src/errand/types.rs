use serde::{Deserialize, Serialize};

use crate::attachment::AttachmentRecord;

/// Inbound message that opens a new errand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    pub name: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    #[serde(rename = "htmlBody", default)]
    pub html_body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRecord>,
}

/// User type sent when an errand is closed by a named agent.
pub const AGENT_USER_TYPE: &str = "CENTION";

/// Answer that closes the errand on creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub subject: String,
    pub body: String,
    /// Closing user. Absent means the system closes the errand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
}

impl Answer {
    pub fn closed_by_system(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            user_id: None,
            user_type: None,
        }
    }

    pub fn closed_by_user(
        subject: impl Into<String>,
        body: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            user_type: Some(AGENT_USER_TYPE.to_string()),
            ..Self::closed_by_system(subject, body)
        }
    }
}

/// Identifier of a freshly created errand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedErrand {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

// ============================================================================
// Request/response documents
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CreateErrandDocument<'a> {
    pub data: CreateErrandData<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateErrandData<'a> {
    #[serde(rename = "type")]
    pub resource_type: &'static str,
    pub attributes: CreateErrandAttributes<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateErrandAttributes<'a> {
    pub msg: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<&'a Answer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedDocument {
    pub data: CreatedErrand,
}
