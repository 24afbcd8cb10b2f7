//! Inline runs and their attributes.

use serde::{Deserialize, Serialize};

use super::IMAGE_PLACEHOLDER;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Target and alternative text of an inline image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageReference {
    pub url: String,
    pub alt_text: String,
}

/// Attributes shared by every character of an [`InlineRun`].
///
/// Attributes compose: bold and italic may be set at the same time, and a link
/// can wrap formatted text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineAttributes {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub code: bool,
    /// Raw inline HTML, passed through verbatim.
    #[serde(skip_serializing_if = "is_false")]
    pub inline_html: bool,
    /// Syntax characters on display during editing. Stripped on export.
    #[serde(skip_serializing_if = "is_false")]
    pub literal_marker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReference>,
}

impl InlineAttributes {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn bold() -> Self {
        InlineAttributes {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        InlineAttributes {
            italic: true,
            ..Self::default()
        }
    }

    pub fn code() -> Self {
        InlineAttributes {
            code: true,
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Union of two attribute sets. Flags are or-ed; the innermost link or image wins.
    pub fn union(&self, other: &InlineAttributes) -> InlineAttributes {
        InlineAttributes {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            strikethrough: self.strikethrough || other.strikethrough,
            code: self.code || other.code,
            inline_html: self.inline_html || other.inline_html,
            literal_marker: self.literal_marker || other.literal_marker,
            link: other.link.clone().or_else(|| self.link.clone()),
            image: other.image.clone().or_else(|| self.image.clone()),
        }
    }

    /// Attributes a character typed right after a run with these attributes should get.
    pub(crate) fn for_typing(&self) -> InlineAttributes {
        InlineAttributes {
            literal_marker: false,
            image: None,
            inline_html: false,
            ..self.clone()
        }
    }
}

/// A maximal span of characters within a line sharing the same attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "InlineAttributes::is_plain")]
    pub attributes: InlineAttributes,
}

impl InlineRun {
    pub fn new(text: impl Into<String>, attributes: InlineAttributes) -> Self {
        InlineRun {
            text: text.into(),
            attributes,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, InlineAttributes::plain())
    }

    /// An image attachment run.
    pub fn image(url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self::image_with(
            ImageReference {
                url: url.into(),
                alt_text: alt_text.into(),
            },
            InlineAttributes::plain(),
        )
    }

    pub(crate) fn image_with(image: ImageReference, attributes: InlineAttributes) -> Self {
        InlineRun {
            text: IMAGE_PLACEHOLDER.to_string(),
            attributes: InlineAttributes {
                image: Some(image),
                ..attributes
            },
        }
    }

    /// Length in chars.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub(crate) fn can_merge_with(&self, next: &InlineRun) -> bool {
        self.attributes == next.attributes && self.attributes.image.is_none()
    }
}

/// Byte index of the `column`-th char of `text`, or `text.len()` past the end.
pub(crate) fn byte_index(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}
