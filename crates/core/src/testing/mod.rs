//! Testing utilities and mock implementations.
//!
//! This module provides a mock attachment source plus canned callback and
//! attachment payloads, so the callback pipeline can be exercised without a
//! running backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use errandlink_core::testing::{fixtures, MockAttachmentSource};
//!
//! let source = MockAttachmentSource::new();
//! let callback = fixtures::answered_callback(Some("123456"));
//! ```

mod mock_attachment_source;

pub use mock_attachment_source::MockAttachmentSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::attachment::AttachmentRecord;

    /// An answered-errand callback with two response attachments (708, 709)
    /// and one area archive (12), as the backend sends it.
    pub fn answered_callback(secret: Option<&str>) -> Value {
        let mut doc = json!({
            "data": {
                "type": "c3_callback_answer_errand",
                "id": "5",
                "attributes": { "event": 1 },
                "relationships": {
                    "errand": { "data": { "type": "c3_errand", "id": "2238" } }
                }
            },
            "included": [
                {
                    "type": "c3_responseattachment",
                    "id": "708",
                    "attributes": { "c3_id": 708 },
                    "links": { "self": "https://localhost/ng/api/json/c3_responseattachment/708" }
                },
                {
                    "type": "c3_responseattachment",
                    "id": "709",
                    "attributes": { "c3_id": 709 },
                    "links": { "self": "https://localhost/ng/api/json/c3_responseattachment/709" }
                },
                {
                    "type": "c3_areaarchive",
                    "id": "12",
                    "attributes": { "c3_id": 12 },
                    "links": { "self": "https://localhost/ng/api/json/c3_areaarchive/12" }
                },
                {
                    "type": "c3_errand",
                    "id": "2238",
                    "attributes": {
                        "answer": {
                            "c3_id": 1171,
                            "response": {
                                "body": "Plain text string",
                                "c3_id": 3267,
                                "htmlBody": "<div style=\"font-size:;font-family:;\"><div>HTML text string</div>",
                                "subject": "Creating test errand via API",
                                "to": [
                                    { "c3_id": 279, "emailAddress": "sany.liew@test.com.my", "name": "Sany Liew" }
                                ]
                            }
                        },
                        "c3_id": 2238,
                        "service": { "c3_id": 16, "name": "Form", "type": 19 }
                    },
                    "relationships": {
                        "attachments": { "data": [
                            { "type": "c3_responseattachment", "id": "708" },
                            { "type": "c3_responseattachment", "id": "709" }
                        ] },
                        "embedded_archives": { "data": [
                            { "type": "c3_areaarchive", "id": "12" }
                        ] }
                    }
                }
            ]
        });
        if let Some(secret) = secret {
            doc["meta"] = json!({ "api_secret": secret });
        }
        doc
    }

    /// Same callback with every `links.self` removed, so fetches go through
    /// the configured endpoint.
    pub fn answered_callback_without_links(secret: Option<&str>) -> Value {
        let mut doc = answered_callback(secret);
        if let Some(items) = doc["included"].as_array_mut() {
            for item in items {
                if let Some(obj) = item.as_object_mut() {
                    obj.remove("links");
                }
            }
        }
        doc
    }

    /// Body of a single-attachment GET wrapping a record for `content`.
    pub fn attachment_document(id: &str, name: &str, content: &[u8]) -> Vec<u8> {
        let mut record = AttachmentRecord::from_bytes(name, "text/plain", content);
        record.id = id.parse().ok();
        json!({
            "data": {
                "type": "c3_responseattachment",
                "id": id,
                "attributes": { "attachment": record }
            }
        })
        .to_string()
        .into_bytes()
    }
}
