//! Client-side integration with a JSON:API ticketing backend.
//!
//! Creates errands, and turns answered-errand callbacks into an
//! [`AnsweredTicket`] whose attachments are fetched lazily through an
//! [`AttachmentIter`].

pub mod attachment;
pub mod callback;
pub mod config;
pub mod errand;
pub mod observer;
pub mod protocol;
pub mod testing;

pub use attachment::{
    build_descriptors, AttachmentDescriptor, AttachmentError, AttachmentIter, AttachmentKind,
    AttachmentRecord, AttachmentSource, BodyStream, ContentError, FetchContext, FetchError,
    HttpAttachmentSource, Next,
};
pub use callback::{
    parse_callback, verify_secret, AnsweredTicket, CallbackError, Envelope, IncludedResource,
    Recipient, ResourceKind, SecretPolicy, TicketAnswer, TicketResponse, TicketService, WireShape,
};
pub use config::{
    load_config, load_config_from_str, validate_config, CallbackConfig, ClientConfig, Config,
    ConfigError, SanitizedConfig, ServerConfig,
};
pub use errand::{Answer, CreatedErrand, ErrandClient, ErrandError, Message};
pub use observer::{observer_for, NoopObserver, TracingObserver, WireObserver};
