//! Markdown format implementation
//!
//! Bidirectional conversion between Markdown text and the line-based [`Document`] model.
//! Markdown is the storage format: a note is imported once when opened and exported on every
//! save.
//!
//! # Library Choice
//!
//! Parsing uses `comrak` with the GFM extensions the notes rely on (tables, strikethrough,
//! task lists, autolinks). Serialization is hand-written: comrak's own renderer would
//! canonicalize away the spacing and list grouping the document model records.
//!
//! # Element Mapping Table
//!
//! | Markdown                | Document line(s)                                   | Export notes                          |
//! |-------------------------|----------------------------------------------------|---------------------------------------|
//! | `# Heading`             | `heading(n)`                                       | `#`×n + space                         |
//! | Paragraph               | `paragraph`, one line per soft/hard break          | breaks restored from `line_break`     |
//! | `- item` / `1. item`    | `bulletList` / `orderedList`, depth + identity     | tight within one identity             |
//! | `- [ ] task`            | `taskUnchecked` / `taskChecked`                    | `- [ ] ` / `- [x] `                   |
//! | `> quote`               | `blockquote`, `quote_depth` + `quote_identity`     | `> ` per level, `>` between blocks    |
//! | Fenced / indented code  | `codeBlock` per physical line, shared language     | fence longer than any inner backticks |
//! | `---`                   | `horizontalRule`                                   | `---`                                 |
//! | Raw HTML block          | `htmlBlock` / gallery, per physical line           | verbatim                              |
//! | `!caption text`         | `imageCaption`                                     | marker + plain text                   |
//! | Pipe table              | one `paragraph` line per row with table metadata  | alignment row synthesized             |
//! | Inline emphasis, code   | run attributes (union of nested inlines)           | delimiters on attribute transitions   |
//! | Links, images           | `link` / `image` run attributes                    | `[text](url)`, `![alt](url)`          |
//!
//! # Lossy Conversions
//!
//! - Link and image titles are dropped.
//! - Setext headings, `*`/`+` bullets and `)` delimiters come back in canonical form.
//! - Loose lists come back tight.
//! - Reference-style links come back inline.
//! - Indented code blocks come back fenced.

pub mod parser;
pub mod serializer;

pub use serializer::ExportRules;

use crate::error::FormatError;
use crate::format::{bool_option, char_option, Format};
use crate::model::Note;
use std::collections::HashMap;

/// Format implementation for Markdown
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormat {
    rules: ExportRules,
}

impl MarkdownFormat {
    pub fn with_rules(rules: ExportRules) -> Self {
        MarkdownFormat { rules }
    }

    pub fn rules(&self) -> &ExportRules {
        &self.rules
    }

    /// The format's rules with per-call options applied on top.
    fn rules_with_options(
        &self,
        options: &HashMap<String, String>,
    ) -> Result<ExportRules, FormatError> {
        let mut rules = self.rules.clone();
        for key in options.keys() {
            match key.as_str() {
                "bullet" | "emphasis" | "trailing-newline" | "list-indent" => {}
                other => {
                    return Err(FormatError::NotSupported(format!(
                        "unknown markdown option '{other}'"
                    )))
                }
            }
        }
        if let Some(bullet) = char_option(options, "bullet", &['-', '*', '+'])? {
            rules.unordered_marker = bullet;
        }
        if let Some(emphasis) = char_option(options, "emphasis", &['*', '_'])? {
            rules.emphasis_marker = emphasis;
        }
        if let Some(trailing) = bool_option(options, "trailing-newline")? {
            rules.trailing_newline = trailing;
        }
        if let Some(indent) = options.get("list-indent") {
            rules.list_indent = indent
                .parse::<usize>()
                .ok()
                .filter(|indent| (1..=8).contains(indent))
                .ok_or_else(|| {
                    FormatError::NotSupported(format!(
                        "option 'list-indent' expects 1 to 8 spaces, got '{indent}'"
                    ))
                })?;
        }
        Ok(rules)
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "Markdown with GFM tables, task lists and note extensions"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Note, FormatError> {
        Ok(parser::parse_from_markdown(source))
    }

    fn serialize(&self, note: &Note) -> Result<String, FormatError> {
        Ok(serializer::serialize_with_rules(note, &self.rules))
    }

    fn serialize_with_options(
        &self,
        note: &Note,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let rules = self.rules_with_options(options)?;
        Ok(serializer::serialize_with_rules(note, &rules))
    }
}
