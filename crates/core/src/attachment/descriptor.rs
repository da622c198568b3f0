//! Attachment descriptors and the pass that builds them from a callback.

use serde::Serialize;

use tracing::warn;

use crate::callback::{value_to_id, IncludedResource, ResourceKind};
use crate::protocol::{AREA_ARCHIVE_PATH, RESPONSE_ATTACHMENT_PATH};

/// Which backend collection an attachment lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Ordinary,
    AreaArchive,
}

impl AttachmentKind {
    /// Collection path used when the descriptor carries no direct link.
    pub fn resource_path(self) -> &'static str {
        match self {
            Self::Ordinary => RESPONSE_ATTACHMENT_PATH,
            Self::AreaArchive => AREA_ARCHIVE_PATH,
        }
    }

    fn from_resource_kind(kind: ResourceKind) -> Option<Self> {
        match kind {
            ResourceKind::OrdinaryAttachment => Some(Self::Ordinary),
            ResourceKind::AreaArchiveAttachment => Some(Self::AreaArchive),
            ResourceKind::AnsweredTicket | ResourceKind::Ignored => None,
        }
    }
}

/// A reference to one attachment that still has to be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentDescriptor {
    pub id: String,
    pub kind: AttachmentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl AttachmentDescriptor {
    pub fn new(id: impl Into<String>, kind: AttachmentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Build the ordered descriptor list for a callback's included resources.
///
/// Ordinary attachments come first, then area archives; each group keeps the
/// order in which it appeared. Every other resource, the answered errand
/// included, is skipped, as is an attachment with neither an id nor a
/// direct link.
pub fn build_descriptors(included: &[IncludedResource]) -> Vec<AttachmentDescriptor> {
    let (mut ordinary, archives): (Vec<_>, Vec<_>) = included
        .iter()
        .filter_map(|res| {
            let kind = AttachmentKind::from_resource_kind(res.kind)?;
            let link = res.link.clone().filter(|l| !l.trim().is_empty());
            let id = match (descriptor_id(res), &link) {
                (Some(id), _) => id,
                (None, Some(_)) => String::new(),
                (None, None) => {
                    warn!(resource_type = %res.resource_type, "attachment without id or link skipped");
                    return None;
                }
            };
            Some(AttachmentDescriptor { id, kind, link })
        })
        .partition(|d| d.kind == AttachmentKind::Ordinary);

    ordinary.extend(archives);
    ordinary
}

/// Resource id, falling back to the `c3_id` attribute when the id is blank.
fn descriptor_id(res: &IncludedResource) -> Option<String> {
    if !res.id.trim().is_empty() {
        return Some(res.id.clone());
    }
    res.attributes.get("c3_id").and_then(value_to_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn resource(tag: &str, id: &str, link: Option<&str>) -> IncludedResource {
        IncludedResource {
            resource_type: tag.to_string(),
            id: id.to_string(),
            kind: ResourceKind::from_type_tag(tag),
            attributes: Map::new(),
            link: link.map(str::to_string),
        }
    }

    #[test]
    fn test_ordinary_before_area_archive() {
        let included = vec![
            resource("c3_areaarchive", "12", None),
            resource("c3_responseattachment", "708", None),
            resource("c3_errand", "2238", None),
            resource("c3_areaarchive", "13", None),
            resource("c3_responseattachment", "709", None),
            resource("c3_service", "16", None),
        ];

        let ids: Vec<(AttachmentKind, String)> = build_descriptors(&included)
            .into_iter()
            .map(|d| (d.kind, d.id))
            .collect();

        assert_eq!(
            ids,
            vec![
                (AttachmentKind::Ordinary, "708".to_string()),
                (AttachmentKind::Ordinary, "709".to_string()),
                (AttachmentKind::AreaArchive, "12".to_string()),
                (AttachmentKind::AreaArchive, "13".to_string()),
            ]
        );
    }

    #[test]
    fn test_links_are_carried() {
        let included = vec![
            resource("c3_responseattachment", "708", Some("https://h/a/708")),
            resource("c3_responseattachment", "709", Some("")),
        ];
        let descriptors = build_descriptors(&included);
        assert_eq!(descriptors[0].link.as_deref(), Some("https://h/a/708"));
        assert_eq!(descriptors[1].link, None);
    }

    #[test]
    fn test_blank_id_falls_back_to_c3_id() {
        let mut res = resource("c3_areaarchive", "", None);
        res.attributes.insert("c3_id".to_string(), json!(44));
        assert_eq!(build_descriptors(&[res])[0].id, "44");
    }

    #[test]
    fn test_attachment_without_id_or_link_is_skipped() {
        let mut null_id = resource("c3_areaarchive", "", None);
        null_id.attributes.insert("c3_id".to_string(), serde_json::Value::Null);
        let included = vec![
            resource("c3_responseattachment", "", None),
            null_id,
            resource("c3_responseattachment", "709", None),
        ];
        assert_eq!(
            build_descriptors(&included),
            vec![AttachmentDescriptor::new("709", AttachmentKind::Ordinary)]
        );
    }

    #[test]
    fn test_attachment_without_id_kept_when_linked() {
        let included = vec![resource("c3_areaarchive", "", Some("https://h/a/12"))];
        let descriptors = build_descriptors(&included);
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].link.as_deref(), Some("https://h/a/12"));
    }

    #[test]
    fn test_no_attachments() {
        let included = vec![resource("c3_errand", "1", None)];
        assert!(build_descriptors(&included).is_empty());
        assert!(build_descriptors(&[]).is_empty());
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(
            AttachmentKind::Ordinary.resource_path(),
            "/ng/api/json/c3_responseattachment"
        );
        assert_eq!(
            AttachmentKind::AreaArchive.resource_path(),
            "/ng/api/json/c3_areaarchive"
        );
    }
}
