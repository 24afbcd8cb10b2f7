//! Icon mapping for the tree visualization format

use crate::model::{BlockKind, HtmlKind};

/// Unicode icon for a block kind.
pub fn block_icon(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Paragraph => "¶",
        BlockKind::BlankLine => "⎯",
        BlockKind::Heading(_) => "§",
        BlockKind::BulletList => "•",
        BlockKind::OrderedList => "№",
        BlockKind::TaskUnchecked => "☐",
        BlockKind::TaskChecked => "☑",
        BlockKind::Blockquote => "❝",
        BlockKind::CodeBlock => "𝒱",
        BlockKind::HorizontalRule => "―",
        BlockKind::ImageCaption => "⊡",
        BlockKind::HtmlBlock(HtmlKind::Generic) => "◇",
        BlockKind::HtmlBlock(HtmlKind::Gallery) => "▦",
    }
}

/// Icon for the structural nodes that are not blocks.
pub fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        "document" => "⧉",
        "table" => "⊞",
        "line" => "↵",
        "run" => "◦",
        "image" => "▣",
        _ => "○",
    }
}
