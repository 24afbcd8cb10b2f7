//! Format trait definition
//!
//! Every representation a [`Note`] can be read from or written to implements [`Format`]:
//! Markdown (the storage format), JSON (the attribute schema, machine readable) and treeviz
//! (a debugging view). The registry dispatches on the format name.

use crate::error::FormatError;
use crate::model::Note;
use std::collections::HashMap;

/// Trait for note formats
///
/// Formats can support parsing, serialization, or both.
///
/// # Examples
///
/// ```ignore
/// struct Plain;
///
/// impl Format for Plain {
///     fn name(&self) -> &str {
///         "plain"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, note: &Note) -> Result<String, FormatError> {
///         Ok(note.document.text())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "markdown", "json")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// File extensions without the leading dot, used to detect the format from a filename.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into a note
    fn parse(&self, _source: &str) -> Result<Note, FormatError> {
        Err(FormatError::NotSupported(format!(
            "format '{}' cannot be parsed",
            self.name()
        )))
    }

    /// Serialize a note into text
    fn serialize(&self, _note: &Note) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "format '{}' cannot be serialized",
            self.name()
        )))
    }

    /// Serialize with extra `key=value` options (from `--extra-*` on the command line).
    ///
    /// Formats without options reject any non-empty option map.
    fn serialize_with_options(
        &self,
        note: &Note,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if options.is_empty() {
            self.serialize(note)
        } else {
            let mut keys: Vec<_> = options.keys().map(String::as_str).collect();
            keys.sort_unstable();
            Err(FormatError::NotSupported(format!(
                "format '{}' takes no options (got {})",
                self.name(),
                keys.join(", ")
            )))
        }
    }
}

/// Reads a boolean option, accepting `true`/`false`, `yes`/`no`, `1`/`0` and a bare flag.
pub fn bool_option(
    options: &HashMap<String, String>,
    key: &str,
) -> Result<Option<bool>, FormatError> {
    match options.get(key).map(|value| value.to_ascii_lowercase()) {
        None => Ok(None),
        Some(value) => match value.as_str() {
            "" | "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            _ => Err(FormatError::NotSupported(format!(
                "option '{key}' expects a boolean, got '{value}'"
            ))),
        },
    }
}

/// Reads a single-character option restricted to `allowed`.
pub fn char_option(
    options: &HashMap<String, String>,
    key: &str,
    allowed: &[char],
) -> Result<Option<char>, FormatError> {
    let Some(value) = options.get(key) else {
        return Ok(None);
    };
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if allowed.contains(&ch) => Ok(Some(ch)),
        _ => Err(FormatError::NotSupported(format!(
            "option '{key}' expects one of {allowed:?}, got '{value}'"
        ))),
    }
}
