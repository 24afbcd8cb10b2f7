//! Backslash escaping for text written back to Markdown.

/// Length of the longest run of `needle` in `text`.
pub fn longest_run(text: &str, needle: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == needle {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Escapes characters that would otherwise be read as inline syntax.
pub fn escape_inline(text: &str, out: &mut String) {
    let chars: Vec<char> = text.chars().collect();
    for (index, &ch) in chars.iter().enumerate() {
        let prev = index.checked_sub(1).map(|i| chars[i]);
        let next = chars.get(index + 1).copied();
        let escape = match ch {
            '\\' | '*' | '`' | '~' | '[' | ']' => true,
            '_' => !(is_word(prev) && is_word(next)),
            '<' => {
                matches!(next, Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
            }
            '&' => matches!(next, Some(c) if c.is_ascii_alphanumeric() || c == '#'),
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(ch);
    }
}

fn is_word(ch: Option<char>) -> bool {
    ch.is_some_and(char::is_alphanumeric)
}

/// Escapes a line start that would re-parse as block syntax (headings, quotes, list
/// markers, rules, setext underlines, table rows).
pub fn escape_block_start(line: &str) -> String {
    let Some(first) = line.chars().next() else {
        return String::new();
    };
    let rest = &line[first.len_utf8()..];
    let marker_follows = |s: &str| s.is_empty() || s.starts_with(' ') || s.starts_with('\t');
    let needs_escape = match first {
        '>' | '=' | '|' => true,
        '#' => {
            let hashes = line.chars().take_while(|c| *c == '#').count();
            hashes <= 6 && marker_follows(&line[hashes..])
        }
        '+' => marker_follows(rest),
        '-' => marker_follows(rest) || line.chars().all(|c| c == '-' || c == ' '),
        _ => false,
    };
    if needs_escape {
        return format!("\\{line}");
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if (1..=9).contains(&digits) {
        let after = &line[digits..];
        if (after.starts_with('.') || after.starts_with(')')) && marker_follows(&after[1..]) {
            return format!("{}\\{}", &line[..digits], after);
        }
    }
    line.to_string()
}

/// Escapes a trailing run of `#` in heading content that would read as a closing sequence.
pub fn escape_heading_end(content: &str) -> String {
    let body = content.trim_end_matches('#');
    if body.len() == content.len() || !(body.is_empty() || body.ends_with([' ', '\t'])) {
        return content.to_string();
    }
    format!("{body}\\{}", &content[body.len()..])
}

/// Renders `content` as an inline code span, choosing a backtick fence the
/// content cannot close.
pub fn code_span(content: &str) -> String {
    let ticks = "`".repeat(longest_run(content, '`') + 1);
    let pad = content.starts_with('`')
        || content.ends_with('`')
        || (content.len() > 1
            && content.starts_with(' ')
            && content.ends_with(' ')
            && !content.trim().is_empty());
    if pad {
        format!("{ticks} {content} {ticks}")
    } else {
        format!("{ticks}{content}{ticks}")
    }
}

/// Link or image destination, angle-bracketed when it would not parse bare.
pub fn link_destination(url: &str) -> String {
    let bare = !url.is_empty()
        && !url
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>'));
    if bare {
        url.to_string()
    } else {
        format!("<{}>", url.replace('<', "\\<").replace('>', "\\>"))
    }
}

/// Escapes image alternative text.
pub fn escape_alt(alt: &str) -> String {
    let mut out = String::with_capacity(alt.len());
    for ch in alt.chars() {
        if matches!(ch, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
