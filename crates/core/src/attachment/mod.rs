//! Attachment descriptors, fetch strategies, the cursor over them, and the
//! decoded records it yields.

mod descriptor;
mod http;
mod iter;
mod record;
mod source;

pub use descriptor::{build_descriptors, AttachmentDescriptor, AttachmentKind};
pub use http::HttpAttachmentSource;
pub use iter::{AttachmentIter, Next};
pub use record::{AttachmentRecord, ContentError};
pub use source::{AttachmentSource, BodyStream, FetchContext, FetchError};

pub(crate) use source::read_body;

use thiserror::Error;

/// Per-attachment failure. Cloneable so a stopped cursor can keep reporting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to decode attachment {id}: {message}")]
    Decode { id: String, message: String },
}
