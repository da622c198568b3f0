//! Answered-errand callback handler.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use errandlink_core::{parse_callback, AnsweredTicket, FetchContext, Next};

use crate::state::AppState;

/// Body returned once a callback was processed
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub status: String,
}

/// Error response for rejected callbacks
#[derive(Debug, Serialize)]
pub struct CallbackErrorResponse {
    pub error: String,
}

/// Receive a callback from the backend.
///
/// Malformed, unauthenticated or unsupported callbacks are rejected with 400.
/// Attachment failures are logged only; the callback itself was valid.
pub async fn receive_callback(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CallbackResponse>, (StatusCode, Json<CallbackErrorResponse>)> {
    if state.inspect_only() {
        info!(payload = %String::from_utf8_lossy(&body), "callback received (inspect only)");
        return Ok(ok());
    }

    let mut ticket = match parse_callback(&body, state.secret_policy()) {
        Ok(ticket) => ticket,
        Err(e) => {
            warn!(error = %e, "callback rejected");
            return Err((
                StatusCode::BAD_REQUEST,
                Json(CallbackErrorResponse {
                    error: e.to_string(),
                }),
            ));
        }
    };

    info!(
        errand = ticket.id,
        answer = ticket.answer.id,
        subject = %ticket.answer.response.subject,
        recipients = ticket.answer.response.recipients.len(),
        attachments = ticket.descriptors().len(),
        "answered errand received"
    );

    drain_attachments(&state, &mut ticket).await;
    Ok(ok())
}

fn ok() -> Json<CallbackResponse> {
    Json(CallbackResponse {
        status: "ok".to_string(),
    })
}

/// Fetch every attachment of `ticket`, logging each one.
async fn drain_attachments(state: &AppState, ticket: &mut AnsweredTicket) {
    let ctx = FetchContext::new().with_timeout(state.fetch_timeout());
    let mut attachments = ticket.attachments(state.attachment_source());

    loop {
        match attachments.next(&ctx).await {
            Next::Attachment(record) => match record.content() {
                Ok(content) => info!(
                    errand = ticket.id,
                    id = ?record.id,
                    name = %record.name,
                    content_type = %record.content_type,
                    content_id = ?record.content_id,
                    size = content.len(),
                    "attachment retrieved"
                ),
                Err(e) => warn!(
                    errand = ticket.id,
                    name = %record.name,
                    error = %e,
                    "attachment content could not be decoded"
                ),
            },
            Next::Exhausted => break,
            Next::Errored(e) => {
                error!(
                    errand = ticket.id,
                    remaining = attachments.remaining(),
                    error = %e,
                    "attachment retrieval stopped"
                );
                break;
            }
        }
    }
}
