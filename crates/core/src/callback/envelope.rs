//! Callback envelope decoding.
//!
//! Two wire shapes are accepted and normalised into one [`Envelope`]:
//! the JSON:API document with an `included` list, and the older flat shape
//! that carries the errand under `data.attributes.event_data` and area
//! archives under `data.attributes.event_xdata`. Decoding never types the
//! legacy payload; [`Envelope::resources`] does that on demand.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::CallbackError;
use crate::protocol::{AREA_ARCHIVE_TYPE, ERRAND_TYPE, RESPONSE_ATTACHMENT_TYPE};

/// Which wire shape an envelope was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WireShape {
    JsonApi,
    Legacy,
}

/// Role of an included resource, decided once from its type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    AnsweredTicket,
    OrdinaryAttachment,
    AreaArchiveAttachment,
    Ignored,
}

impl ResourceKind {
    pub fn from_type_tag(tag: &str) -> Self {
        match tag {
            ERRAND_TYPE => Self::AnsweredTicket,
            RESPONSE_ATTACHMENT_TYPE => Self::OrdinaryAttachment,
            AREA_ARCHIVE_TYPE => Self::AreaArchiveAttachment,
            _ => Self::Ignored,
        }
    }
}

/// The primary resource of a callback.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryResource {
    pub resource_type: String,
    pub id: String,
    pub attributes: Map<String, Value>,
}

/// A secondary resource embedded in the callback.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludedResource {
    pub resource_type: String,
    pub id: String,
    pub kind: ResourceKind,
    pub attributes: Map<String, Value>,
    /// Direct link to the resource, if the sender supplied one.
    pub link: Option<String>,
}

/// Callback metadata block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub api_secret: Option<String>,
}

/// A decoded callback. Immutable once decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    data: PrimaryResource,
    included: Vec<IncludedResource>,
    meta: Option<Meta>,
    shape: WireShape,
}

impl Envelope {
    /// Decode a raw callback body.
    pub fn decode(raw: &[u8]) -> Result<Self, CallbackError> {
        let raw: RawEnvelope = serde_json::from_slice(raw)
            .map_err(|e| CallbackError::MalformedPayload(format!("invalid envelope: {}", e)))?;

        let data = PrimaryResource {
            resource_type: raw.data.resource_type,
            id: raw.data.id,
            attributes: raw.data.attributes,
        };

        let (included, shape) = match raw.included {
            Some(included) => (
                included.into_iter().map(IncludedResource::from).collect(),
                WireShape::JsonApi,
            ),
            None if data.attributes.contains_key("event_data") => (Vec::new(), WireShape::Legacy),
            None => (Vec::new(), WireShape::JsonApi),
        };

        Ok(Self {
            data,
            included,
            meta: raw.meta,
            shape,
        })
    }

    pub fn data(&self) -> &PrimaryResource {
        &self.data
    }

    /// Included resources exactly as sent. Always empty for the legacy shape.
    pub fn included(&self) -> &[IncludedResource] {
        &self.included
    }

    /// Included resources in the JSON:API model, whichever shape was decoded.
    ///
    /// For the legacy shape they are synthesised from `event_data` and
    /// `event_xdata`, which is where a malformed legacy payload is reported.
    pub fn resources(&self) -> Result<Cow<'_, [IncludedResource]>, CallbackError> {
        match self.shape {
            WireShape::JsonApi => Ok(Cow::Borrowed(self.included.as_slice())),
            WireShape::Legacy => legacy_included(&self.data).map(Cow::Owned),
        }
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    pub fn shape(&self) -> WireShape {
        self.shape
    }

    /// The numeric event code, if present and integral.
    pub fn event_code(&self) -> Option<i64> {
        self.data.attributes.get("event").and_then(Value::as_i64)
    }
}

/// Synthesise included resources from the legacy `event_data`/`event_xdata` pair.
fn legacy_included(data: &PrimaryResource) -> Result<Vec<IncludedResource>, CallbackError> {
    let event_data = match data.attributes.get("event_data") {
        Some(Value::Object(map)) => map.clone(),
        _ => {
            return Err(CallbackError::MalformedPayload(
                "event_data must be an object".to_string(),
            ))
        }
    };

    let errand_id = event_data
        .get("c3_id")
        .and_then(value_to_id)
        .unwrap_or_else(|| data.id.clone());

    let ordinary = event_data
        .get("answer")
        .and_then(|a| a.get("response"))
        .and_then(|r| r.get("attachments"));
    let ordinary = legacy_ids(ordinary, "attachments")?;

    let archives = match data.attributes.get("event_xdata") {
        Some(Value::Null) | None => Vec::new(),
        Some(xdata) => legacy_ids(xdata.get("embedded_archives"), "embedded_archives")?,
    };

    let mut included = Vec::with_capacity(1 + ordinary.len() + archives.len());
    included.push(IncludedResource {
        resource_type: ERRAND_TYPE.to_string(),
        id: errand_id,
        kind: ResourceKind::AnsweredTicket,
        attributes: event_data,
        link: None,
    });
    for (tag, ids) in [
        (RESPONSE_ATTACHMENT_TYPE, ordinary),
        (AREA_ARCHIVE_TYPE, archives),
    ] {
        included.extend(ids.into_iter().map(|id| IncludedResource {
            resource_type: tag.to_string(),
            kind: ResourceKind::from_type_tag(tag),
            attributes: Map::new(),
            link: None,
            id,
        }));
    }
    Ok(included)
}

/// Read `[{ "c3_id": n }, ...]` into string ids.
fn legacy_ids(list: Option<&Value>, field: &str) -> Result<Vec<String>, CallbackError> {
    match list {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.get("c3_id").and_then(value_to_id).ok_or_else(|| {
                    CallbackError::MalformedPayload(format!("{} entry without c3_id", field))
                })
            })
            .collect(),
        Some(_) => Err(CallbackError::MalformedPayload(format!(
            "{} must be a list",
            field
        ))),
    }
}

/// A `c3_id` value as an id string. Null, blank and non-scalar values have none.
pub(crate) fn value_to_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Raw wire types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    data: RawPrimary,
    #[serde(default)]
    included: Option<Vec<RawIncluded>>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct RawPrimary {
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default, deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawIncluded {
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default, deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    links: Option<RawLinks>,
}

#[derive(Debug, Deserialize)]
struct RawLinks {
    #[serde(rename = "self", default)]
    self_link: Option<RawLink>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLink {
    Bare(String),
    Object { href: String },
}

impl From<RawIncluded> for IncludedResource {
    fn from(raw: RawIncluded) -> Self {
        let link = raw.links.and_then(|l| l.self_link).map(|l| match l {
            RawLink::Bare(s) => s,
            RawLink::Object { href } => href,
        });
        Self {
            kind: ResourceKind::from_type_tag(&raw.resource_type),
            resource_type: raw.resource_type,
            id: raw.id,
            attributes: raw.attributes,
            link,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
