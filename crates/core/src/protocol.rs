//! Wire constants shared by the callback parser and the outbound clients.

/// Media type used for every request and response body.
pub const JSONAPI_MIME: &str = "application/vnd.api+json";

/// Collection path for creating errands.
pub const ERRAND_PATH: &str = "/ng/api/json/c3_errand";

/// Collection path for ordinary response attachments.
pub const RESPONSE_ATTACHMENT_PATH: &str = "/ng/api/json/c3_responseattachment";

/// Collection path for area archive attachments.
pub const AREA_ARCHIVE_PATH: &str = "/ng/api/json/c3_areaarchive";

/// Type tag of the errand resource, both outbound and in callbacks.
pub const ERRAND_TYPE: &str = "c3_errand";

/// Type tag of an ordinary response attachment.
pub const RESPONSE_ATTACHMENT_TYPE: &str = "c3_responseattachment";

/// Type tag of an area archive attachment.
pub const AREA_ARCHIVE_TYPE: &str = "c3_areaarchive";

/// Join an endpoint and an absolute resource path, dropping trailing slashes
/// from the endpoint.
pub fn join_endpoint(endpoint: &str, path: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), path)
}
