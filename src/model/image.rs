//! Image attachments for tasks.
//!
//! Attachments are stored inline as base64 data URIs. Older snapshots
//! stored a bare data-URI string instead of the attachment object; both
//! shapes are accepted at the serde boundary and normalized into
//! [`ImageAttachment`] so nothing downstream sees the legacy form.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// MIME subtypes accepted in an image data URI
const ALLOWED_SUBTYPES: [&str; 5] = ["png", "jpeg", "jpg", "gif", "webp"];

/// Canonical image attachment as persisted on a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub id: String,
    /// Base64 data URI (`data:image/png;base64,...`)
    pub data: String,
    /// MIME type, e.g. `image/png`
    #[serde(rename = "type")]
    pub kind: String,
    pub added_at: DateTime<Utc>,
}

/// Either shape an image may arrive in: legacy bare data-URI string or a
/// full attachment object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageInput {
    Attachment(ImageAttachment),
    Data(String),
}

impl ImageInput {
    /// Normalize into the canonical attachment form.
    ///
    /// Legacy strings get a fresh id, a type inferred from the data URI,
    /// and `added_at = now`. Attachment objects keep their fields, filling
    /// in a missing type from the URI.
    pub fn normalize(self, now: DateTime<Utc>) -> ImageAttachment {
        match self {
            ImageInput::Attachment(mut att) => {
                if att.kind.is_empty() {
                    att.kind = infer_mime_type(&att.data).unwrap_or_default();
                }
                att
            }
            ImageInput::Data(data) => ImageAttachment {
                id: Uuid::new_v4().to_string(),
                kind: infer_mime_type(&data).unwrap_or_default(),
                data,
                added_at: now,
            },
        }
    }

    /// The raw data URI, whichever shape this is
    pub fn data_uri(&self) -> &str {
        match self {
            ImageInput::Attachment(att) => &att.data,
            ImageInput::Data(data) => data,
        }
    }
}

/// Deserialize a task image list accepting both legacy and canonical shapes
pub fn deserialize_images<'de, D>(deserializer: D) -> Result<Vec<ImageAttachment>, D::Error>
where
    D: Deserializer<'de>,
{
    let inputs: Vec<ImageInput> = Vec::deserialize(deserializer)?;
    // Legacy strings carry no timestamp of their own; stamp them uniformly.
    let now = Utc::now();
    Ok(inputs.into_iter().map(|input| input.normalize(now)).collect())
}

/// Check that a string is a well-formed base64 image data URI:
/// `data:image/(png|jpeg|jpg|gif|webp);base64,<payload>`, case-insensitive
/// on everything before the payload, payload decodable as base64.
pub fn is_valid_image_data_uri(value: &str) -> bool {
    let Some(payload) = split_data_uri(value).map(|(_, payload)| payload) else {
        return false;
    };
    if payload.is_empty() {
        return false;
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .is_ok()
}

/// Extract the MIME type (`image/png`) from a data URI, if well-formed
pub fn infer_mime_type(value: &str) -> Option<String> {
    split_data_uri(value).map(|(subtype, _)| format!("image/{subtype}"))
}

/// Split `data:image/<subtype>;base64,<payload>` into (subtype, payload)
fn split_data_uri(value: &str) -> Option<(String, &str)> {
    let lower = value.to_ascii_lowercase();
    let rest = lower.strip_prefix("data:image/")?;
    let (subtype, _) = rest.split_once(";base64,")?;
    if !ALLOWED_SUBTYPES.contains(&subtype) {
        return None;
    }
    // Payload offset is the same in the original string since the prefix is ASCII.
    let payload_start = "data:image/".len() + subtype.len() + ";base64,".len();
    Some((subtype.to_string(), &value[payload_start..]))
}
