//! JSON (de)serialization of backup files.
//!
//! Documents are written as canonical Extended JSON v2 so identifiers, dates
//! and numeric widths survive a round trip. Reading also accepts relaxed
//! Extended JSON and plain JSON.

use crate::errors::FormatError;
use crate::model::DocumentSet;
use serde::Serialize;

/// Serialize document sets; `pretty` selects 2-space indentation.
///
/// # Errors
/// Returns `InvalidJson` if a value cannot be represented.
pub fn serialize(data: &[DocumentSet], pretty: bool) -> Result<String, FormatError> {
    to_text(data, pretty)
}

/// Parse backup text into document sets.
///
/// # Errors
/// Returns `InvalidJson` for malformed JSON or a payload of the wrong shape.
pub fn deserialize(text: &str) -> Result<Vec<DocumentSet>, FormatError> {
    Ok(serde_json::from_str(text)?)
}

/// Re-emit arbitrary JSON text in compact or pretty form, keeping key order.
///
/// # Errors
/// Returns `InvalidJson` if `text` is not JSON.
pub fn reformat(text: &str, pretty: bool) -> Result<String, FormatError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    to_text(&value, pretty)
}

fn to_text<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, FormatError> {
    let s = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    Ok(s)
}

/// `#[serde(with = ...)]` adapter between `Vec<bson::Document>` and Extended JSON.
pub mod extjson {
    use bson::{Bson, Document};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(docs: &[Document], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(docs.iter().map(|d| Bson::Document(d.clone()).into_canonical_extjson()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Document>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| document_from_json(v).map_err(|e| D::Error::custom(format!("document {i}: {e}"))))
            .collect()
    }

    /// Convert one JSON object (Extended JSON or plain) into a BSON document.
    ///
    /// # Errors
    /// Returns a message when the value is not an object or has invalid `$` keys.
    pub fn document_from_json(value: serde_json::Value) -> Result<Document, String> {
        match Bson::try_from(value).map_err(|e| e.to_string())? {
            Bson::Document(d) => Ok(d),
            other => Err(format!("expected a JSON object, found {:?}", other.element_type())),
        }
    }
}
