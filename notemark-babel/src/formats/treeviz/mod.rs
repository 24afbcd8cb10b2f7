//! Treeviz formatter for documents
//!
//! Treeviz is a visual representation of the line model, meant for debugging imports and
//! shortcut edits. Lines are grouped into the blocks the exporter would write, so the tree
//! shows both the flat line list and the block structure recovered from it.
//!
//! The format is:
//! <prefix><connector> <icon><space><label> (labels truncated to 30 characters)
//!
//! Example:
//!
//! ⧉ Document (5 lines, 3 blocks)
//! ├─ § heading1
//! │ └─ ↵ Groceries
//! ├─ • bullet-list ×2
//! │ ├─ ↵ milk
//! │ └─ ↵ eggs
//! └─ ¶ paragraph
//!   └─ ↵ That's all.
//!
//! Icons are listed in [`super::icons`].

use super::icons::{block_icon, get_icon};
use crate::error::FormatError;
use crate::format::{bool_option, Format};
use crate::model::{BlockKind, Document, InlineRun, Line, Note};
use std::collections::HashMap;
use std::ops::Range;

const LABEL_WIDTH: usize = 30;

fn truncate(text: &str) -> String {
    if text.chars().count() <= LABEL_WIDTH {
        text.to_string()
    } else {
        let head: String = text.chars().take(LABEL_WIDTH - 1).collect();
        format!("{head}…")
    }
}

fn connector(is_last: bool) -> (&'static str, &'static str) {
    if is_last {
        ("└─", "  ")
    } else {
        ("├─", "│ ")
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TreevizParams {
    show_runs: bool,
    show_linum: bool,
}

impl TreevizParams {
    fn linum(&self, index: usize) -> String {
        if self.show_linum {
            format!("{:02} ", index + 1)
        } else {
            String::new()
        }
    }
}

fn block_label(document: &Document, range: &Range<usize>) -> String {
    let first = &document.lines()[range.start];
    let count = range.len();
    if let Some(row) = first.table_row {
        let columns = document
            .table(row.table)
            .map(|meta| meta.column_alignments.len())
            .unwrap_or_default();
        return format!("{} table {count}×{columns}", get_icon("table"));
    }
    let mut label = format!("{} {}", block_icon(first.kind), first.kind.name());
    if let Some(language) = first.code_language.as_deref().filter(|l| !l.is_empty()) {
        label.push_str(&format!(" [{language}]"));
    }
    if let Some(depth) = first.effective_list_depth().filter(|depth| *depth > 1) {
        label.push_str(&format!(" @{depth}"));
    }
    if first.effective_quote_depth() > 0 && first.kind != BlockKind::Blockquote {
        label.push_str(&format!(" >{}", first.effective_quote_depth()));
    }
    if count > 1 {
        label.push_str(&format!(" ×{count}"));
    }
    label
}

fn run_label(run: &InlineRun) -> String {
    if let Some(image) = &run.attributes.image {
        return format!("{} {} ({})", get_icon("image"), truncate(&image.alt_text), image.url);
    }
    let attrs = &run.attributes;
    let mut flags: Vec<String> = [
        (attrs.bold, "bold"),
        (attrs.italic, "italic"),
        (attrs.strikethrough, "strike"),
        (attrs.code, "code"),
        (attrs.inline_html, "html"),
        (attrs.literal_marker, "marker"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, name)| name.to_string())
    .collect();
    if let Some(url) = &attrs.link {
        flags.push(format!("link={url}"));
    }
    let mut label = format!("{} \"{}\"", get_icon("run"), truncate(&run.text));
    if !flags.is_empty() {
        label.push_str(&format!(" [{}]", flags.join(", ")));
    }
    label
}

fn format_line(
    line: &Line,
    index: usize,
    prefix: &str,
    is_last: bool,
    params: TreevizParams,
    output: &mut String,
) {
    let (branch, indent) = connector(is_last);
    let text = if line.kind.is_verbatim() || line.table_row.is_some() {
        line.text().replace('\t', " │ ")
    } else {
        line.text()
    };
    output.push_str(&format!(
        "{}{prefix}{branch} {} {}\n",
        params.linum(index),
        get_icon("line"),
        truncate(&text)
    ));

    if params.show_runs {
        let child_prefix = format!("{prefix}{indent}");
        let count = line.runs.len();
        for (i, run) in line.runs.iter().enumerate() {
            let (branch, _) = connector(i == count - 1);
            output.push_str(&format!(
                "{}{child_prefix}{branch} {}\n",
                params.linum(index),
                run_label(run)
            ));
        }
    }
}

fn format_block(
    document: &Document,
    range: Range<usize>,
    is_last: bool,
    params: TreevizParams,
    output: &mut String,
) {
    let (branch, indent) = connector(is_last);
    output.push_str(&format!(
        "{}{branch} {}\n",
        params.linum(range.start),
        block_label(document, &range)
    ));
    let end = range.end;
    for index in range {
        format_line(
            &document.lines()[index],
            index,
            indent,
            index == end - 1,
            params,
            output,
        );
    }
}

fn render(document: &Document, params: TreevizParams) -> String {
    let blocks = document.blocks();
    let mut output = format!(
        "{} Document ({} lines, {} blocks)\n",
        get_icon("document"),
        document.len(),
        blocks.len()
    );
    let count = blocks.len();
    for (i, range) in blocks.into_iter().enumerate() {
        format_block(document, range, i == count - 1, params, &mut output);
    }
    output
}

pub fn to_treeviz_str(document: &Document) -> String {
    render(document, TreevizParams::default())
}

/// Convert a document to a treeviz string with optional parameters
///
/// # Parameters
///
/// - `"show-runs"`: list the inline runs of every line with their attributes.
/// - `"show-linum"`: prefix each row with the 1-based line index it comes from.
pub fn to_treeviz_str_with_params(
    document: &Document,
    params: &HashMap<String, String>,
) -> Result<String, FormatError> {
    for key in params.keys() {
        if key != "show-runs" && key != "show-linum" {
            return Err(FormatError::NotSupported(format!(
                "unknown treeviz option '{key}'"
            )));
        }
    }
    let params = TreevizParams {
        show_runs: bool_option(params, "show-runs")?.unwrap_or(false),
        show_linum: bool_option(params, "show-linum")?.unwrap_or(false),
    };
    Ok(render(document, params))
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree of blocks and lines with Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, note: &Note) -> Result<String, FormatError> {
        Ok(to_treeviz_str(&note.document))
    }

    fn serialize_with_options(
        &self,
        note: &Note,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        to_treeviz_str_with_params(&note.document, options)
    }
}
