//! CLI-specific transforms
//!
//! The `inspect` command shows the document model a Markdown file imports to. Each transform
//! is a stage + format combination, though there is a single stage (`doc`) for now:
//!
//! - `doc-treeviz`: blocks and lines as a tree with Unicode icons (default)
//! - `doc-json`: the model as JSON
//! - `doc-blocks`: one row per block with its line range and kind
//! - `doc-text`: the backing text, one document line per output line
//!
//! ## Extra Parameters
//!
//! Transforms accept extra parameters via `--extra-<name> [value]`:
//!
//! - `show-runs`, `show-linum`: treeviz detail (defaults from `[inspect.treeviz]`)
//! - `compact`: single-line JSON
//!
//! Example: `notemark inspect note.md --extra-show-runs`

use notemark_babel::format::Format;
use notemark_babel::formats::json::JsonFormat;
use notemark_babel::formats::markdown::parser::parse_from_markdown;
use notemark_babel::formats::treeviz::to_treeviz_str_with_params;
use notemark_babel::model::Note;
use std::collections::HashMap;

/// All available CLI transforms (stage + format combinations)
pub const AVAILABLE_TRANSFORMS: &[&str] = &["doc-treeviz", "doc-json", "doc-blocks", "doc-text"];

pub const DEFAULT_TRANSFORM: &str = "doc-treeviz";

const TREEVIZ_PARAMS: &[&str] = &["show-runs", "show-linum"];
const JSON_PARAMS: &[&str] = &["compact"];

fn select(params: &HashMap<String, String>, keys: &[&str]) -> HashMap<String, String> {
    params
        .iter()
        .filter(|(key, _)| keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Execute a named transform on Markdown source with optional extra parameters
///
/// Parameters meant for other transforms are ignored; parameters no transform knows are an
/// error.
pub fn execute_transform(
    source: &str,
    transform_name: &str,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    let known = |key: &&String| {
        TREEVIZ_PARAMS.contains(&key.as_str()) || JSON_PARAMS.contains(&key.as_str())
    };
    if let Some(key) = extra_params.keys().find(|key| !known(key)) {
        return Err(format!("Unknown parameter '--extra-{key}'"));
    }

    let note = parse_from_markdown(source);
    match transform_name {
        "doc-treeviz" => {
            to_treeviz_str_with_params(&note.document, &select(extra_params, TREEVIZ_PARAMS))
                .map_err(|e| e.to_string())
        }
        "doc-json" => JsonFormat
            .serialize_with_options(&note, &select(extra_params, JSON_PARAMS))
            .map(|json| format!("{json}\n"))
            .map_err(|e| e.to_string()),
        "doc-blocks" => Ok(block_table(&note)),
        "doc-text" => Ok(format!("{}\n", note.document.text())),
        other => Err(format!(
            "Unknown transform '{other}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

fn block_table(note: &Note) -> String {
    let lines = note.document.lines();
    let mut output = String::new();
    for range in note.document.blocks() {
        let first = &lines[range.start];
        let kind = if first.table_row.is_some() {
            "table".to_string()
        } else {
            first.kind.to_string()
        };
        output.push_str(&format!("{:>3}-{:<3} {kind}\n", range.start + 1, range.end));
    }
    output
}
