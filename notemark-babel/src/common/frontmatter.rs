//! Opaque frontmatter handling.
//!
//! A note may begin with a block delimited by `---` lines. The block is never parsed: it is
//! split off before the Markdown body is read and glued back verbatim on export.

const DELIMITER: &str = "---";

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches('\r').trim_end() == DELIMITER
}

/// Splits `text` into its frontmatter (delimiters included, no trailing newline) and body.
///
/// Returns `None` for the frontmatter unless the text opens with a `---` line and a closing
/// `---` line follows. Blank lines between the frontmatter and the body are dropped.
pub fn split_frontmatter(text: &str) -> (Option<String>, &str) {
    let mut lines = text.split_inclusive('\n');
    match lines.next() {
        Some(first) if is_delimiter(first) => {}
        _ => return (None, text),
    }

    let mut offset = text.split_inclusive('\n').next().map_or(0, str::len);
    for line in lines {
        let end = offset + line.len();
        if is_delimiter(line) {
            let frontmatter = text[..end].trim_end_matches(['\n', '\r']).to_string();
            let body = skip_blank_lines(&text[end..]);
            return (Some(frontmatter), body);
        }
        offset = end;
    }
    (None, text)
}

fn skip_blank_lines(text: &str) -> &str {
    let mut rest = text;
    while let Some(index) = rest.find('\n') {
        if rest[..index].trim().is_empty() {
            rest = &rest[index + 1..];
        } else {
            break;
        }
    }
    if rest.trim().is_empty() {
        ""
    } else {
        rest
    }
}

/// Reattaches frontmatter to an exported body with exactly one blank line between them.
pub fn join_frontmatter(frontmatter: Option<&str>, body: &str) -> String {
    match frontmatter {
        Some(frontmatter) => {
            let frontmatter = frontmatter.trim_end_matches(['\n', '\r']);
            if body.is_empty() {
                frontmatter.to_string()
            } else {
                format!("{frontmatter}\n\n{body}")
            }
        }
        None => body.to_string(),
    }
}
