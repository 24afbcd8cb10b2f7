//! Markdown ⇄ rich text for a note editor
//!
//!     This crate holds the document model an editing surface renders, and the three operations
//!     around it: importing Markdown into the model when a note is opened, exporting the model
//!     back to Markdown on save, and recognizing Markdown syntax live as the user types.
//!
//!     This is a pure lib, that is, it powers the notemark cli but is shell agnostic: no code
//!     should be written that supposes a shell environment, be it std print, env vars etc.
//!
//! Architecture
//!
//!     The model (./model) is a flat arena of lines. Each line carries its block attributes
//!     (kind, list depth and identity, quote depth, code language, table row) and a list of
//!     inline runs with their attributes. Nesting is never stored as a tree: it is recovered
//!     from depths and identities when exporting.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── model                   # Document, Line, InlineRun and their attributes
//!     ├── common                  # Frontmatter, escaping and table helpers
//!     ├── formats
//!     │   ├── markdown
//!     │   │   ├── parser.rs       # Markdown -> Document (comrak AST walk)
//!     │   │   ├── serializer.rs   # Document -> Markdown
//!     │   │   └── mod.rs
//!     │   ├── json                # The model as JSON
//!     │   └── treeviz             # Debugging tree view
//!     ├── shortcut                # Live block and inline shortcuts
//!     ├── transforms.rs           # normalize / replay helpers
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── markdown
//!     ├── shortcut
//!     └── fixtures
//!
//!     Rust does not by default discover tests in subdirectories, so tests/lib.rs declares them.
//!
//! Core Algorithms
//!
//!     Import walks comrak's AST with an explicit stack of list frames and emits one line per
//!     physical line of text. Export walks the lines once, deciding the separator between
//!     consecutive lines from their kinds and identities, and rebuilding prefixes from depths.
//!     Both are total: any input imports, any document exports.
//!
//!     The shortcut engine only looks at the cursor's line, and at most 200 characters back
//!     for inline delimiters, so each keystroke costs the same regardless of document size.

pub mod common;
pub mod error;
pub mod format;
pub mod formats;
pub mod model;
pub mod registry;
pub mod shortcut;
pub mod transforms;

pub use error::FormatError;
pub use format::Format;
pub use model::{Document, InlineAttributes, InlineRun, InsertionPoint, Line, Note};
pub use registry::FormatRegistry;
pub use shortcut::{process_shortcut, Selection, ShortcutEngine, ShortcutRules};

use formats::markdown::{parser, serializer, ExportRules};

/// Imports Markdown text into a document and its opaque frontmatter.
pub fn import(text: &str) -> (Document, Option<String>) {
    let note = parser::parse_from_markdown(text);
    (note.document, note.frontmatter)
}

/// Exports a document, reattaching frontmatter, with the default rules.
pub fn export(document: &Document, frontmatter: Option<&str>) -> String {
    serializer::export_markdown(document, frontmatter, &ExportRules::default())
}
