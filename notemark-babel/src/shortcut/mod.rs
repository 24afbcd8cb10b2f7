//! Live shortcut engine
//!
//! Called after every character the user types. Recognizes Markdown syntax as it is typed
//! and rewrites it into block kinds and inline attributes, so the syntax characters do not
//! remain in the text.
//!
//! - Block shortcuts ([`block`]) fire on a line break, or on a space when
//!   [`ShortcutRules::trigger_on_space`] is set: `# `, `- `, `> `, `1. `, `- [ ] ` and friends.
//! - Inline shortcuts ([`inline`]) fire when a closing delimiter is typed: `**bold**`,
//!   `__bold__`, `*italic*`, `_italic_`, `` `code` ``, `~~strike~~`.
//!
//! Work per keystroke is bounded: block shortcuts look at one line, inline shortcuts at most
//! [`inline::INLINE_WINDOW`] characters before the cursor. A keystroke that matches nothing
//! returns `None`, which is the common case and not an error.

pub mod block;
pub mod inline;

pub use inline::{InlineStyle, INLINE_WINDOW};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::model::{BlockKind, Document, InsertionPoint};

/// Which shortcut families are active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutRules {
    pub block: bool,
    pub inline: bool,
    /// Convert a block prefix as soon as its trailing space is typed, not only on Enter.
    pub trigger_on_space: bool,
}

impl Default for ShortcutRules {
    fn default() -> Self {
        ShortcutRules {
            block: true,
            inline: true,
            trigger_on_space: true,
        }
    }
}

/// The editor's selection. Shortcuts only run on a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Caret(InsertionPoint),
    Range {
        start: InsertionPoint,
        end: InsertionPoint,
    },
}

/// What a shortcut turned the typed syntax into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKind {
    Block(BlockKind),
    Inline(InlineStyle),
}

/// A shortcut that fired, with the cursor to place afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub cursor: InsertionPoint,
    pub kind: ShortcutKind,
}

#[derive(Debug, Clone, Default)]
pub struct ShortcutEngine {
    rules: ShortcutRules,
}

impl ShortcutEngine {
    pub fn new(rules: ShortcutRules) -> Self {
        ShortcutEngine { rules }
    }

    pub fn rules(&self) -> &ShortcutRules {
        &self.rules
    }

    /// Runs the shortcuts for the character just inserted before the caret and returns the
    /// new cursor when one fired.
    pub fn process(
        &self,
        document: &mut Document,
        selection: Selection,
        last_inserted: Option<char>,
    ) -> Option<InsertionPoint> {
        self.apply(document, selection, last_inserted)
            .map(|applied| applied.cursor)
    }

    /// Like [`ShortcutEngine::process`], also reporting which shortcut fired.
    pub fn apply(
        &self,
        document: &mut Document,
        selection: Selection,
        last_inserted: Option<char>,
    ) -> Option<Applied> {
        let Selection::Caret(cursor) = selection else {
            trace!("shortcut skipped: range selection");
            return None;
        };

        let applied = match last_inserted {
            Some('\n') if self.rules.block => block::on_line_break(document, cursor)
                .map(|(cursor, kind)| (cursor, ShortcutKind::Block(kind))),
            Some(' ') if self.rules.block && self.rules.trigger_on_space => {
                block::on_space(document, cursor)
                    .map(|(cursor, kind)| (cursor, ShortcutKind::Block(kind)))
            }
            Some(ch) if !inline::is_delimiter_char(ch) => None,
            _ if self.rules.inline => inline::on_insert(document, cursor)
                .map(|(cursor, style)| (cursor, ShortcutKind::Inline(style))),
            _ => None,
        };

        match applied {
            Some((cursor, kind)) => {
                debug!(?kind, line = cursor.line, column = cursor.column, "shortcut applied");
                Some(Applied { cursor, kind })
            }
            None => {
                trace!(?last_inserted, line = cursor.line, "no shortcut");
                None
            }
        }
    }
}

/// Runs the default shortcuts at a caret.
pub fn process_shortcut(
    document: &mut Document,
    cursor: InsertionPoint,
    last_inserted: Option<char>,
) -> Option<InsertionPoint> {
    ShortcutEngine::default().process(document, Selection::Caret(cursor), last_inserted)
}
