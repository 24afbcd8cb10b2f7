//! Block-level attributes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::GALLERY_MARKER;

/// The closed set of block categories a line can have.
///
/// Table rows are not a kind of their own: a table row is a line (usually a
/// [`BlockKind::Paragraph`]) carrying [`TableRow`] metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    #[default]
    Paragraph,
    BlankLine,
    /// Heading level, always within `1..=6`.
    Heading(u8),
    BulletList,
    OrderedList,
    TaskUnchecked,
    TaskChecked,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    ImageCaption,
    HtmlBlock(HtmlKind),
}

impl BlockKind {
    /// Heading of the given level, clamped to `1..=6`.
    pub fn heading(level: u8) -> Self {
        BlockKind::Heading(level.clamp(1, 6))
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            BlockKind::Heading(level) => Some((*level).clamp(1, 6)),
            _ => None,
        }
    }

    /// Bullet, ordered and task items.
    pub fn is_list_item(&self) -> bool {
        matches!(
            self,
            BlockKind::BulletList
                | BlockKind::OrderedList
                | BlockKind::TaskUnchecked
                | BlockKind::TaskChecked
        )
    }

    pub fn is_task(&self) -> bool {
        matches!(self, BlockKind::TaskUnchecked | BlockKind::TaskChecked)
    }

    pub fn is_html(&self) -> bool {
        matches!(self, BlockKind::HtmlBlock(_))
    }

    /// Kinds whose text is raw source, never inline-formatted.
    pub fn is_verbatim(&self) -> bool {
        matches!(self, BlockKind::CodeBlock | BlockKind::HtmlBlock(_))
    }

    /// Stable kebab-case name, used by the inspection formats.
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::BlankLine => "blank-line",
            BlockKind::Heading(level) => match level {
                1 => "heading1",
                2 => "heading2",
                3 => "heading3",
                4 => "heading4",
                5 => "heading5",
                _ => "heading6",
            },
            BlockKind::BulletList => "bullet-list",
            BlockKind::OrderedList => "ordered-list",
            BlockKind::TaskUnchecked => "task-unchecked",
            BlockKind::TaskChecked => "task-checked",
            BlockKind::Blockquote => "blockquote",
            BlockKind::CodeBlock => "code-block",
            BlockKind::HorizontalRule => "horizontal-rule",
            BlockKind::ImageCaption => "image-caption",
            BlockKind::HtmlBlock(HtmlKind::Generic) => "html-block",
            BlockKind::HtmlBlock(HtmlKind::Gallery) => "gallery",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Variant of a raw HTML block, sniffed from its content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HtmlKind {
    #[default]
    Generic,
    Gallery,
}

impl HtmlKind {
    pub fn classify(raw: &str) -> Self {
        if raw.contains(GALLERY_MARKER) {
            HtmlKind::Gallery
        } else {
            HtmlKind::Generic
        }
    }
}

/// Break between a line and the next line of the same paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineBreak {
    Soft,
    Hard,
}

/// Alignment of a table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl ColumnAlignment {
    /// Cell of the synthesized alignment row.
    pub fn delimiter_cell(&self) -> &'static str {
        match self {
            ColumnAlignment::Left => "---",
            ColumnAlignment::Center => ":---:",
            ColumnAlignment::Right => "---:",
        }
    }
}

/// Table-level metadata, stored once per table in the document arena.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub column_alignments: Vec<ColumnAlignment>,
}

impl TableMeta {
    /// Alignment of a column; columns beyond the stored alignments are left-aligned.
    pub fn alignment(&self, column: usize) -> ColumnAlignment {
        self.column_alignments
            .get(column)
            .copied()
            .unwrap_or_default()
    }
}

/// Row metadata attached to a line that belongs to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRow {
    /// Index of the table in [`super::Document::tables`].
    pub table: usize,
    pub is_header: bool,
    pub row_index: usize,
}
