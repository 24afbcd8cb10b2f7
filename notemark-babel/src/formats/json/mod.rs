//! JSON format
//!
//! The document model serialized as-is with `serde_json`: lines with their block attributes
//! and runs, the table arena and the frontmatter. Unset attributes are omitted, so a plain
//! paragraph is just `{"kind": "paragraph", "runs": [{"text": "..."}]}`.
//!
//! This is the machine-readable view of a note: it round-trips everything the model holds,
//! including literal-marker runs and identities the Markdown export does not keep.

use crate::error::FormatError;
use crate::format::{bool_option, Format};
use crate::model::Note;
use std::collections::HashMap;

pub fn to_json(note: &Note, compact: bool) -> Result<String, FormatError> {
    let json = if compact {
        serde_json::to_string(note)?
    } else {
        serde_json::to_string_pretty(note)?
    };
    Ok(json)
}

pub fn from_json(source: &str) -> Result<Note, FormatError> {
    Ok(serde_json::from_str(source)?)
}

/// Format implementation for the JSON view of a note
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Document model as JSON (lines, block attributes, inline runs)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Note, FormatError> {
        from_json(source)
    }

    fn serialize(&self, note: &Note) -> Result<String, FormatError> {
        to_json(note, false)
    }

    fn serialize_with_options(
        &self,
        note: &Note,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if let Some(key) = options.keys().find(|key| key.as_str() != "compact") {
            return Err(FormatError::NotSupported(format!(
                "unknown json option '{key}'"
            )));
        }
        to_json(note, bool_option(options, "compact")?.unwrap_or(false))
    }
}
