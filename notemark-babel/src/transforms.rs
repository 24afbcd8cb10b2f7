//! Whole-text transforms built from the importer, exporter and shortcut engine.
//!
//! These give the command line and the tests a functional interface over the pieces an
//! editor would call separately.

use crate::formats::markdown::parser::parse_from_markdown;
use crate::formats::markdown::serializer::{serialize_with_rules, ExportRules};
use crate::model::{Document, InlineAttributes, InsertionPoint};
use crate::shortcut::{Selection, ShortcutEngine, ShortcutKind, ShortcutRules};

/// Imports and re-exports Markdown with the default rules.
///
/// # Example
///
/// ```
/// use notemark_babel::transforms::normalize_markdown;
///
/// assert_eq!(normalize_markdown("Title\n=====\n\n* a\n* b\n"), "# Title\n\n- a\n- b");
/// ```
pub fn normalize_markdown(source: &str) -> String {
    normalize_markdown_with_rules(source, &ExportRules::default())
}

/// Imports and re-exports Markdown with custom export rules.
pub fn normalize_markdown_with_rules(source: &str, rules: &ExportRules) -> String {
    serialize_with_rules(&parse_from_markdown(source), rules)
}

/// Types `keystrokes` into an empty document one character at a time, running the shortcut
/// engine after each character, and returns the resulting document.
pub fn replay_keystrokes(keystrokes: &str) -> Document {
    replay_keystrokes_with_rules(keystrokes, &ShortcutRules::default())
}

/// Like [`replay_keystrokes`], with explicit shortcut rules.
///
/// After an inline shortcut fires, the following characters are typed without the style it
/// applied, as an editor resets its typing attributes at that point. A line break ends that
/// override.
pub fn replay_keystrokes_with_rules(keystrokes: &str, rules: &ShortcutRules) -> Document {
    let engine = ShortcutEngine::new(rules.clone());
    let mut document = Document::new();
    let mut cursor = InsertionPoint::default();
    let mut typing: Option<InlineAttributes> = None;
    let mut buffer = [0u8; 4];

    for ch in keystrokes.chars() {
        let text = ch.encode_utf8(&mut buffer);
        if ch == '\n' {
            typing = None;
        }
        cursor = match &typing {
            Some(attributes) => document.insert_styled(cursor, text, attributes.clone()),
            None => document.insert_at(cursor, text),
        };

        if let Some(applied) = engine.apply(&mut document, Selection::Caret(cursor), Some(ch)) {
            cursor = applied.cursor;
            if let ShortcutKind::Inline(style) = applied.kind {
                let mut attributes = document
                    .line(cursor.line)
                    .map(|line| line.typing_attributes(cursor.column))
                    .unwrap_or_default();
                style.set(&mut attributes, false);
                typing = Some(attributes);
            }
        }
    }
    document
}
