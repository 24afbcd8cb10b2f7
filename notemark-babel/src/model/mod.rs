//! Document model shared by the importer, the exporter and the shortcut engine.
//!
//!     A [`Document`] is an ordered arena of [`Line`] records addressed by index. Every line
//!     belongs to exactly one block: its [`BlockKind`] plus the grouping identities (list, quote,
//!     fence, table) decide which neighbours it shares a block with. Inline formatting lives in
//!     the line's [`InlineRun`]s, each a maximal span of text with one set of
//!     [`InlineAttributes`].
//!
//!     The backing text of a document is the plain text of its lines joined with `\n`. Line
//!     breaks are therefore never stored inside runs: a soft break inside a paragraph is a line
//!     boundary whose left line carries [`LineBreak::Soft`].
//!
//!     Tables are carried as table metadata on ordinary lines (see [`TableRow`] and
//!     [`TableMeta`]) rather than as a block kind. Cells inside a row line are separated by
//!     [`TABLE_CELL_DELIMITER`].
//!
//!     The model is not a storage format. It is built wholesale from Markdown on open, mutated in
//!     place while editing, and serialized back to Markdown on save.

mod block;
mod document;
mod inline;

pub use block::{BlockKind, ColumnAlignment, HtmlKind, LineBreak, TableMeta, TableRow};
pub use document::{Document, InsertionPoint, Line};
pub use inline::{ImageReference, InlineAttributes, InlineRun};

use serde::{Deserialize, Serialize};

/// Reserved token that turns a paragraph into an image caption.
pub const IMAGE_CAPTION_MARKER: &str = "!caption ";

/// Reserved substring that classifies a raw HTML block as a gallery.
pub const GALLERY_MARKER: &str = "class=\"gallery\"";

/// Separates cells inside a table row line. Never legal in rendered cell text.
pub const TABLE_CELL_DELIMITER: char = '\t';

/// Text of an image run: the object replacement character, standing in for the attachment.
pub const IMAGE_PLACEHOLDER: char = '\u{FFFC}';

/// A document together with its opaque frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub document: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<String>,
}

impl Note {
    pub fn new(document: Document, frontmatter: Option<String>) -> Self {
        Note {
            document,
            frontmatter,
        }
    }
}
