//! The attachment cursor.
//!
//! Ordinary attachments form the first page and area archives the second;
//! the cursor walks both in one pass and never rewinds. A descriptor only
//! leaves the queue once its record has been fetched and decoded. The first
//! failure is terminal and sticky: later calls hand back the same error
//! without touching the network.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, warn};

use super::record::decode_fetched;
use super::{
    read_body, AttachmentDescriptor, AttachmentError, AttachmentRecord, AttachmentSource,
    FetchContext,
};

/// Outcome of one [`AttachmentIter::next`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Attachment(AttachmentRecord),
    Exhausted,
    Errored(AttachmentError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorState {
    Active,
    Exhausted,
    Errored(AttachmentError),
}

/// Sequential, single-owner iterator over a ticket's attachments.
pub struct AttachmentIter {
    queue: VecDeque<AttachmentDescriptor>,
    state: CursorState,
    source: Arc<dyn AttachmentSource>,
}

impl AttachmentIter {
    pub fn new(descriptors: Vec<AttachmentDescriptor>, source: Arc<dyn AttachmentSource>) -> Self {
        Self {
            queue: descriptors.into(),
            state: CursorState::Active,
            source,
        }
    }

    /// Fetch the next attachment.
    pub async fn next(&mut self, ctx: &FetchContext) -> Next {
        match &self.state {
            CursorState::Errored(e) => return Next::Errored(e.clone()),
            CursorState::Exhausted => return Next::Exhausted,
            CursorState::Active => {}
        }

        let Some(head) = self.queue.front().cloned() else {
            debug!("attachment cursor exhausted");
            self.state = CursorState::Exhausted;
            return Next::Exhausted;
        };

        match fetch_record(self.source.as_ref(), &head, ctx).await {
            Ok(record) => {
                self.queue.pop_front();
                debug!(id = %head.id, kind = ?head.kind, name = %record.name, "attachment fetched");
                Next::Attachment(record)
            }
            Err(e) => {
                warn!(id = %head.id, kind = ?head.kind, error = %e, "attachment fetch failed");
                self.state = CursorState::Errored(e.clone());
                Next::Errored(e)
            }
        }
    }

    /// `next` flattened into a `Result`, `Ok(None)` meaning exhausted.
    pub async fn try_next(
        &mut self,
        ctx: &FetchContext,
    ) -> Result<Option<AttachmentRecord>, AttachmentError> {
        match self.next(ctx).await {
            Next::Attachment(record) => Ok(Some(record)),
            Next::Exhausted => Ok(None),
            Next::Errored(e) => Err(e),
        }
    }

    /// Descriptors not yet successfully fetched.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, CursorState::Active)
    }
}

async fn fetch_record(
    source: &dyn AttachmentSource,
    descriptor: &AttachmentDescriptor,
    ctx: &FetchContext,
) -> Result<AttachmentRecord, AttachmentError> {
    let body = ctx
        .run(async {
            let stream = source.fetch(descriptor).await?;
            read_body(stream).await
        })
        .await?;
    decode_fetched(&descriptor.id, &body)
}
