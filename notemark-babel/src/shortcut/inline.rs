//! Inline shortcuts: a closing delimiter typed after `**text` (and friends) formats the
//! enclosed text and removes both delimiters.

use crate::model::{Document, InlineAttributes, InsertionPoint};

/// Number of characters before the cursor searched for an opening delimiter.
pub const INLINE_WINDOW: usize = 200;

/// Inline attribute a delimiter pair applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    Bold,
    Italic,
    Code,
    Strikethrough,
}

impl InlineStyle {
    pub fn set(self, attributes: &mut InlineAttributes, on: bool) {
        match self {
            InlineStyle::Bold => attributes.bold = on,
            InlineStyle::Italic => attributes.italic = on,
            InlineStyle::Code => attributes.code = on,
            InlineStyle::Strikethrough => attributes.strikethrough = on,
        }
    }
}

/// Delimiters in match order: longer delimiters first so `**x**` is never read as italics.
const DELIMITERS: &[(&str, InlineStyle)] = &[
    ("**", InlineStyle::Bold),
    ("__", InlineStyle::Bold),
    ("*", InlineStyle::Italic),
    ("_", InlineStyle::Italic),
    ("`", InlineStyle::Code),
    ("~~", InlineStyle::Strikethrough),
];

/// Characters whose insertion can complete a delimiter.
pub(crate) fn is_delimiter_char(ch: char) -> bool {
    matches!(ch, '*' | '_' | '`' | '~')
}

/// A delimiter pair found in the scan window, as window-relative indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    open: usize,
    close: usize,
    width: usize,
}

/// Looks for `delimiter` closing at the end of `window` and its nearest opener.
fn find_span(window: &[char], delimiter: &str) -> Option<Span> {
    let delimiter: Vec<char> = delimiter.chars().collect();
    let width = delimiter.len();
    let close = window.len().checked_sub(width)?;
    if window[close..] != delimiter[..] {
        return None;
    }
    let marker = delimiter[0];
    let single = width == 1 && matches!(marker, '*' | '_');
    if single && close > 0 && window[close - 1] == marker {
        return None;
    }

    let open = (0..=close.checked_sub(width)?)
        .rev()
        .find(|&start| window[start..start + width] == delimiter[..])?;
    let content = &window[open + width..close];
    if content.is_empty()
        || content.first().is_some_and(|c| c.is_whitespace())
        || content.last().is_some_and(|c| c.is_whitespace())
    {
        return None;
    }
    let before_open = open.checked_sub(1).map(|i| window[i]);
    if single && before_open == Some(marker) {
        return None;
    }
    // underscores inside a word are not emphasis
    if marker == '_' && before_open.is_some_and(char::is_alphanumeric) {
        return None;
    }
    Some(Span { open, close, width })
}

/// Formats the text enclosed by a delimiter pair ending at the cursor.
pub(crate) fn on_insert(
    document: &mut Document,
    cursor: InsertionPoint,
) -> Option<(InsertionPoint, InlineStyle)> {
    let line = document.line(cursor.line)?;
    if line.kind.is_verbatim() {
        return None;
    }
    let window = line.chars_before(cursor.column, INLINE_WINDOW)?;
    let start = cursor.column - window.len();

    let (span, style) = DELIMITERS.iter().find_map(|(delimiter, style)| {
        find_span(&window, delimiter).map(|span| (span, *style))
    })?;

    let open = start + span.open;
    let close = start + span.close;
    let protected = line.slice(open, cursor.column).iter().any(|run| {
        run.attributes.code || run.attributes.inline_html || run.attributes.image.is_some()
    });
    if protected {
        return None;
    }

    let row = cursor.line;
    document.delete(InsertionPoint::new(row, close), cursor);
    document.delete(
        InsertionPoint::new(row, open),
        InsertionPoint::new(row, open + span.width),
    );
    let end = close - span.width;
    document.apply_inline(
        InsertionPoint::new(row, open),
        InsertionPoint::new(row, end),
        |attributes| style.set(attributes, true),
    );
    Some((InsertionPoint::new(row, end), style))
}
