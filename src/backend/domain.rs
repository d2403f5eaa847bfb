//! # Diary Domain Model
//!
//! Diary items, their serialized storage form, and the entry key scheme.
//!
//! ## Stored format
//!
//! Each entry is one JSON record with exactly two fields:
//!
//! ```json
//! {"type": "text", "data": "free text"}
//! {"type": "image", "data": "data:image/png;base64,..."}
//! ```
//!
//! ## Key scheme
//!
//! Keys are the literal prefix `diary` followed by the creation timestamp in
//! epoch milliseconds, e.g. `diary1756110134000`. Edits reuse the key; only
//! creation allocates a new one.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix shared by every entry key; other keys in the store are ignored.
pub const KEY_PREFIX: &str = "diary";

/// What kind of content a diary item holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Text,
    Image,
}

impl ItemKind {
    fn as_wire(self) -> &'static str {
        match self {
            ItemKind::Text => "text",
            ItemKind::Image => "image",
        }
    }
}

/// One decoded diary item: a kind tag plus its payload string.
///
/// The payload is free text for text items and a self-contained data URL for
/// image items; it is never absent.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaryItem {
    pub kind: ItemKind,
    pub payload: String,
}

/// Wire form of a stored item. The kind stays a free string here so that a
/// structurally valid record with an unknown kind can be told apart from
/// garbage that does not parse at all.
#[derive(Serialize, Deserialize)]
struct ItemRecord {
    #[serde(rename = "type")]
    kind: String,
    data: String,
}

/// Why a stored record could not be decoded into a [`DiaryItem`].
#[derive(Debug, Error)]
pub enum ItemDecodeError {
    /// The record is not valid JSON or lacks the expected fields.
    #[error("malformed diary item: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The record parsed but its kind is neither `text` nor `image`.
    #[error("unexpected diary item kind {0:?}")]
    UnexpectedKind(String),
}

/// Serialize an item for storage. Total for any payload string.
pub fn encode_item(kind: ItemKind, payload: &str) -> String {
    let record = ItemRecord {
        kind: kind.as_wire().to_string(),
        data: payload.to_string(),
    };
    // A flat record of two strings always serializes.
    serde_json::to_string(&record).expect("item record serialization")
}

/// Parse a stored record back into an item.
pub fn decode_item(serialized: &str) -> Result<DiaryItem, ItemDecodeError> {
    let record: ItemRecord = serde_json::from_str(serialized)?;
    let kind = match record.kind.as_str() {
        "text" => ItemKind::Text,
        "image" => ItemKind::Image,
        other => return Err(ItemDecodeError::UnexpectedKind(other.to_string())),
    };
    Ok(DiaryItem {
        kind,
        payload: record.data,
    })
}

/// Timestamp of the most recently allocated key, for collision avoidance.
static LAST_KEY_MS: AtomicI64 = AtomicI64::new(0);

/// Allocate a fresh entry key from the current time.
///
/// Two entries created within the same millisecond still get distinct,
/// strictly increasing keys: the suffix is bumped past the last one handed
/// out whenever the clock has not moved yet.
pub fn allocate_entry_key() -> String {
    let now = Utc::now().timestamp_millis();
    let prev = LAST_KEY_MS
        .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .expect("key timestamp update is infallible");
    format!("{}{}", KEY_PREFIX, now.max(prev + 1))
}

/// Whether a store key belongs to the diary namespace.
pub fn is_entry_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX)
}

/// The creation timestamp embedded in an entry key, if it parses.
pub fn key_timestamp(key: &str) -> Option<i64> {
    key.strip_prefix(KEY_PREFIX)?.parse().ok()
}

/// Sort entry keys into creation order.
///
/// Ordering is numeric on the timestamp suffix, not lexical on the whole key:
/// a plain string sort would put `diary100` before `diary20`. Keys whose
/// suffix does not parse sort after all well-formed ones, by raw string.
pub fn sort_entry_keys(keys: &mut [String]) {
    keys.sort_by(|a, b| match (key_timestamp(a), key_timestamp(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    });
}

/// Build a self-contained data URL for image payload storage.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes);
    format!("data:{};base64,{}", mime, encoded)
}

/// Recover the raw image bytes from a data URL payload.
pub fn decode_data_url(payload: &str) -> Option<Vec<u8>> {
    let (_, encoded) = payload.split_once(";base64,")?;
    base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded).ok()
}

/// MIME type for a photo file, guessed from its extension.
pub fn photo_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
