//! Block shortcuts: a Markdown prefix typed at the start of a line turns the line into a
//! heading, list item, task or quote.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{BlockKind, Document, InsertionPoint, Line};

static ORDERED_SHORTCUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,9})\.\s$").expect("valid ordered shortcut regex"));

/// Literal prefixes in match order. The ordered-list regex is tried after all of them.
const BLOCK_PREFIXES: &[(&str, BlockKind)] = &[
    ("# ", BlockKind::Heading(1)),
    ("## ", BlockKind::Heading(2)),
    ("### ", BlockKind::Heading(3)),
    ("#### ", BlockKind::Heading(4)),
    ("##### ", BlockKind::Heading(5)),
    ("###### ", BlockKind::Heading(6)),
    ("- ", BlockKind::BulletList),
    ("* ", BlockKind::BulletList),
    ("+ ", BlockKind::BulletList),
    ("> ", BlockKind::Blockquote),
    ("- [ ] ", BlockKind::TaskUnchecked),
    ("- [x] ", BlockKind::TaskChecked),
    ("- [X] ", BlockKind::TaskChecked),
];

/// Longest text any prefix can match: nine digits, a dot and a space.
const MAX_PREFIX_LEN: usize = 11;

/// Checkbox prefixes typed at the start of an existing bullet item.
const TASK_UPGRADES: &[(&str, BlockKind)] = &[
    ("[ ] ", BlockKind::TaskUnchecked),
    ("[x] ", BlockKind::TaskChecked),
    ("[X] ", BlockKind::TaskChecked),
];

/// What a matched prefix turns its line into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockTarget {
    pub kind: BlockKind,
    pub ordinal: Option<u64>,
}

/// Matches text that must equal a shortcut prefix exactly.
pub(crate) fn match_prefix(text: &str) -> Option<BlockTarget> {
    if let Some((_, kind)) = BLOCK_PREFIXES.iter().find(|(prefix, _)| *prefix == text) {
        return Some(BlockTarget {
            kind: *kind,
            ordinal: None,
        });
    }
    let captures = ORDERED_SHORTCUT.captures(text)?;
    let ordinal = captures[1].parse::<u64>().ok()?;
    Some(BlockTarget {
        kind: BlockKind::OrderedList,
        ordinal: Some(ordinal),
    })
}

fn match_target(line: &Line, text: &str) -> Option<BlockTarget> {
    if line.table_row.is_some() {
        return None;
    }
    match line.kind {
        BlockKind::Paragraph | BlockKind::BlankLine => match_prefix(text),
        BlockKind::BulletList => TASK_UPGRADES
            .iter()
            .find(|(prefix, _)| *prefix == text)
            .map(|(_, kind)| BlockTarget {
                kind: *kind,
                ordinal: None,
            }),
        _ => None,
    }
}

/// The line before the cursor was just completed by a line break. If it is exactly a
/// prefix, the break is consumed and the completed line is converted.
pub(crate) fn on_line_break(
    document: &mut Document,
    cursor: InsertionPoint,
) -> Option<(InsertionPoint, BlockKind)> {
    if cursor.column != 0 || cursor.line == 0 {
        return None;
    }
    let index = cursor.line - 1;
    let line = document.line(index)?;
    if line.byte_len() > MAX_PREFIX_LEN {
        return None;
    }
    let text = line.text();
    let target = match_target(line, &text)?;
    let width = line.char_len();

    document.delete(InsertionPoint::new(index, width), cursor);
    document.delete(InsertionPoint::new(index, 0), InsertionPoint::new(index, width));
    convert_line(document, index, target);
    Some((InsertionPoint::new(index, 0), target.kind))
}

/// A space completed a prefix at the start of the cursor's line.
pub(crate) fn on_space(
    document: &mut Document,
    cursor: InsertionPoint,
) -> Option<(InsertionPoint, BlockKind)> {
    if cursor.column > MAX_PREFIX_LEN {
        return None;
    }
    let line = document.line(cursor.line)?;
    let typed: String = line.chars_before(cursor.column, cursor.column)?.into_iter().collect();
    let target = match_target(line, &typed)?;

    document.delete(InsertionPoint::new(cursor.line, 0), cursor);
    convert_line(document, cursor.line, target);
    Some((InsertionPoint::new(cursor.line, 0), target.kind))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFamily {
    Ordered,
    Unordered,
}

impl ListFamily {
    fn of(kind: BlockKind) -> Option<Self> {
        match kind {
            BlockKind::OrderedList => Some(ListFamily::Ordered),
            kind if kind.is_list_item() => Some(ListFamily::Unordered),
            _ => None,
        }
    }
}

/// Neighbouring lines, previous first.
fn neighbours(document: &Document, index: usize) -> impl Iterator<Item = &Line> {
    let previous = index.checked_sub(1).and_then(|i| document.line(i));
    previous.into_iter().chain(document.line(index + 1))
}

fn adjacent_list_identity(
    document: &Document,
    index: usize,
    family: ListFamily,
    depth: usize,
) -> Option<u32> {
    neighbours(document, index)
        .filter(|line| ListFamily::of(line.kind) == Some(family))
        .filter(|line| line.effective_list_depth() == Some(depth))
        .find_map(|line| line.list_identity)
}

fn adjacent_quote_identity(document: &Document, index: usize) -> Option<u32> {
    neighbours(document, index)
        .filter(|line| line.effective_quote_depth() > 0)
        .find_map(|line| line.quote_identity)
}

fn convert_line(document: &mut Document, index: usize, target: BlockTarget) {
    let Some(line) = document.line(index) else {
        return;
    };
    let kind = target.kind;

    if line.kind.is_list_item() {
        // checkbox typed into an existing bullet: the item keeps its list
        if let Some(line) = document.line_mut(index) {
            line.kind = kind;
        }
        return;
    }

    let list = ListFamily::of(kind).map(|family| {
        let depth = line.list_depth.unwrap_or(1).max(1);
        (depth, adjacent_list_identity(document, index, family, depth))
    });
    let quote = (kind == BlockKind::Blockquote)
        .then(|| line.quote_identity.or_else(|| adjacent_quote_identity(document, index)));

    let list = list.map(|(depth, identity)| {
        (depth, identity.unwrap_or_else(|| document.allocate_identity()))
    });
    let quote = quote.map(|identity| identity.unwrap_or_else(|| document.allocate_identity()));

    let Some(line) = document.line_mut(index) else {
        return;
    };
    line.kind = kind;
    line.list_ordinal = target.ordinal;
    if let Some((depth, identity)) = list {
        line.list_depth = Some(depth);
        line.list_identity = Some(identity);
    }
    if let Some(identity) = quote {
        line.quote_depth = line.quote_depth.max(1);
        line.quote_identity = Some(identity);
    }
}
