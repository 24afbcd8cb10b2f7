//! Markdown serialization (Document → Markdown export)
//!
//! The exporter walks the lines once. It keeps the previously emitted line for the blank-line
//! decision, a stack of open list frames for indentation, and renders the verbatim groups
//! (code fences, raw HTML, tables) as whole blocks.
//!
//! Blank lines are never copied from the document. Whether two emitted blocks are separated
//! is decided by [`Exporter::separator`]: lines joined by a soft break, lines of one verbatim
//! block and items of one tight list stay together, lines of one blockquote are separated by
//! a bare `>` line, everything else gets exactly one blank line.

use crate::common::escape::{
    code_span, escape_alt, escape_block_start, escape_heading_end, escape_inline,
    link_destination, longest_run,
};
use crate::common::frontmatter::join_frontmatter;
use crate::common::table::{alignment_row, escape_pipes, render_row, split_cells};
use crate::model::{BlockKind, Document, InlineRun, Line, LineBreak, Note, IMAGE_CAPTION_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static ORDERED_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,9}[.)] ").expect("valid ordered list prefix regex"));

/// Knobs for the Markdown the exporter writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRules {
    /// Bullet for unordered and task items: `-`, `*` or `+`.
    pub unordered_marker: char,
    /// `*` or `_`; bold doubles it.
    pub emphasis_marker: char,
    /// Spaces per nesting level for list items without an open parent.
    pub list_indent: usize,
    pub trailing_newline: bool,
}

impl Default for ExportRules {
    fn default() -> Self {
        ExportRules {
            unordered_marker: '-',
            emphasis_marker: '*',
            list_indent: 2,
            trailing_newline: false,
        }
    }
}

impl ExportRules {
    fn bullet(&self) -> char {
        if matches!(self.unordered_marker, '-' | '*' | '+') {
            self.unordered_marker
        } else {
            '-'
        }
    }

    fn alternate_bullet(&self) -> char {
        if self.bullet() == '-' {
            '*'
        } else {
            '-'
        }
    }

    fn italic(&self) -> &'static str {
        if self.emphasis_marker == '_' {
            "_"
        } else {
            "*"
        }
    }

    fn bold(&self) -> &'static str {
        if self.emphasis_marker == '_' {
            "__"
        } else {
            "**"
        }
    }
}

/// Serialize a note with the default rules.
pub fn serialize_to_markdown(note: &Note) -> String {
    serialize_with_rules(note, &ExportRules::default())
}

pub fn serialize_with_rules(note: &Note, rules: &ExportRules) -> String {
    export_markdown(&note.document, note.frontmatter.as_deref(), rules)
}

/// Document and frontmatter to Markdown. Total: every document yields some text.
pub fn export_markdown(
    document: &Document,
    frontmatter: Option<&str>,
    rules: &ExportRules,
) -> String {
    let exporter = Exporter::new(document, rules);
    let body = exporter.run();
    let mut markdown = join_frontmatter(frontmatter, &body);
    if rules.trailing_newline && !markdown.is_empty() {
        markdown.push('\n');
    }
    debug!(
        lines = document.len(),
        bytes = markdown.len(),
        "exported markdown"
    );
    markdown
}

/// A list whose items are still being emitted.
#[derive(Debug, Clone)]
struct OpenList {
    identity: Option<u32>,
    depth: usize,
    quote_depth: usize,
    /// Prefix of content lines inside the current item.
    content_lead: String,
    ordered: bool,
    bullet: char,
    delimiter: char,
    next_ordinal: u64,
}

/// The last emitted line.
struct Previous<'a> {
    line: &'a Line,
    /// Still joined to the next line by a break.
    joined: bool,
}

enum Separator {
    None,
    Blank,
    /// A bare quote line at the given depth.
    Quote(usize),
}

struct Exporter<'a> {
    document: &'a Document,
    rules: &'a ExportRules,
    out: Vec<String>,
    previous: Option<Previous<'a>>,
    open_lists: Vec<OpenList>,
}

fn quote_prefix(depth: usize) -> String {
    "> ".repeat(depth)
}

fn visible_line(line: &Line) -> Line {
    Line {
        runs: line
            .runs
            .iter()
            .filter(|run| !run.attributes.literal_marker)
            .cloned()
            .collect(),
        ..Line::default()
    }
}

/// Char length of a block prefix the line's own text already carries.
fn literal_prefix_len(kind: BlockKind, text: &str) -> Option<usize> {
    let candidates: &[&str] = match kind {
        BlockKind::BulletList => &["- ", "* ", "+ "],
        BlockKind::TaskUnchecked => &["- [ ] ", "* [ ] ", "+ [ ] "],
        BlockKind::TaskChecked => &["- [x] ", "- [X] ", "* [x] ", "* [X] ", "+ [x] ", "+ [X] "],
        BlockKind::Blockquote => &["> "],
        BlockKind::OrderedList => {
            return ORDERED_PREFIX
                .find(text)
                .map(|found| text[..found.end()].chars().count());
        }
        BlockKind::Heading(level) => {
            let prefix = format!("{} ", "#".repeat(usize::from(level.clamp(1, 6))));
            return text.starts_with(&prefix).then(|| prefix.chars().count());
        }
        _ => return None,
    };
    candidates
        .iter()
        .find(|prefix| text.starts_with(*prefix))
        .map(|prefix| prefix.chars().count())
}

impl<'a> Exporter<'a> {
    fn new(document: &'a Document, rules: &'a ExportRules) -> Self {
        Exporter {
            document,
            rules,
            out: Vec::new(),
            previous: None,
            open_lists: Vec::new(),
        }
    }

    fn run(mut self) -> String {
        let lines = self.document.lines();
        let mut index = 0;
        while index < lines.len() {
            let line = &lines[index];
            if line.is_blank() {
                if let Some(previous) = self.previous.as_mut() {
                    previous.joined = false;
                }
                index += 1;
                continue;
            }
            index = if line.table_row.is_some() {
                self.emit_table(index)
            } else {
                match line.kind {
                    BlockKind::CodeBlock => self.emit_code(index),
                    BlockKind::HtmlBlock(_) => self.emit_html(index),
                    _ => {
                        self.emit_line(line);
                        index + 1
                    }
                }
            };
        }
        self.out.join("\n")
    }

    fn remember(&mut self, line: &'a Line) {
        self.previous = Some(Previous {
            line,
            joined: line.line_break.is_some(),
        });
    }

    // ----- blank-line rule -----

    fn separator(&self, line: &Line) -> Separator {
        let Some(previous) = &self.previous else {
            return Separator::None;
        };
        if previous.joined {
            return Separator::None;
        }
        let prev = previous.line;

        if let (Some(a), Some(b)) = (prev.block_identity, line.block_identity) {
            if a == b && prev.kind == line.kind {
                return Separator::None;
            }
        }

        if line.kind.is_list_item() {
            if prev.kind.is_list_item() {
                let prev_depth = prev.effective_list_depth().unwrap_or(1);
                let depth = line.effective_list_depth().unwrap_or(1);
                match (prev.list_identity, line.list_identity) {
                    (Some(a), Some(b)) if a == b => return Separator::None,
                    (None, _) | (_, None) if prev_depth == depth => return Separator::None,
                    _ => {}
                }
                if depth == prev_depth + 1 {
                    return Separator::None;
                }
            }
            let returning = line.list_identity.is_some_and(|identity| {
                self.open_lists
                    .iter()
                    .any(|list| list.identity == Some(identity))
            });
            if returning {
                return Separator::None;
            }
        }

        // An empty item followed by its own content.
        if prev.kind.is_list_item()
            && prev.runs.is_empty()
            && !line.kind.is_list_item()
            && line.list_identity.is_some()
            && line.list_identity == prev.list_identity
        {
            return Separator::None;
        }

        let prev_quote = prev.effective_quote_depth();
        let quote = line.effective_quote_depth();
        if prev_quote > 0 && quote > 0 && prev.quote_identity == line.quote_identity {
            return Separator::Quote(prev_quote.min(quote));
        }

        Separator::Blank
    }

    fn separate(&mut self, line: &Line) {
        match self.separator(line) {
            Separator::None => {}
            Separator::Blank => self.out.push(String::new()),
            Separator::Quote(depth) => {
                let lead = self.container_lead(depth, self.container_depth(line));
                self.out.push(lead.trim_end().to_string());
            }
        }
    }

    // ----- containers -----

    /// List depth whose content lines this line is laid out in.
    fn container_depth(&self, line: &Line) -> Option<usize> {
        if line.kind.is_list_item() {
            line.effective_list_depth()
                .and_then(|depth| depth.checked_sub(1))
                .filter(|depth| *depth > 0)
        } else {
            line.list_depth
        }
    }

    /// Prefix for content at list depth `depth` nested in `quote_depth` quotes.
    fn container_lead(&self, quote_depth: usize, depth: Option<usize>) -> String {
        let frame = depth.and_then(|depth| self.open_lists.iter().rev().find(|l| l.depth == depth));
        match (frame, depth) {
            (Some(frame), _) if quote_depth >= frame.quote_depth => {
                format!(
                    "{}{}",
                    frame.content_lead,
                    quote_prefix(quote_depth - frame.quote_depth)
                )
            }
            (_, Some(depth)) => format!(
                "{}{}",
                quote_prefix(quote_depth),
                " ".repeat(depth * self.rules.list_indent)
            ),
            _ => quote_prefix(quote_depth),
        }
    }

    /// Closes lists deeper than a non-item line's own list context.
    fn enter_block(&mut self, line: &Line) {
        match line.list_depth {
            Some(depth) => self.open_lists.retain(|list| list.depth <= depth),
            None => self.open_lists.clear(),
        }
    }

    // ----- line kinds -----

    fn emit_line(&mut self, line: &'a Line) {
        self.separate(line);
        if line.kind.is_list_item() {
            self.emit_list_item(line);
        } else {
            self.enter_block(line);
            let rendered = self.render_block(line);
            self.out.push(rendered);
        }
        self.remember(line);
    }

    fn render_block(&self, line: &Line) -> String {
        let visible = visible_line(line);
        let text = visible.text();
        let mut quote_depth = line.effective_quote_depth();

        let body = match line.kind {
            BlockKind::HorizontalRule => "---".to_string(),
            BlockKind::ImageCaption => format!("{IMAGE_CAPTION_MARKER}{text}"),
            BlockKind::Heading(level) => {
                let inline = escape_heading_end(self.inline(&visible.runs).trim_end());
                if literal_prefix_len(line.kind, &text).is_some() {
                    inline
                } else {
                    let hashes = "#".repeat(usize::from(level.clamp(1, 6)));
                    format!("{hashes} {inline}")
                }
            }
            _ => {
                if line.kind == BlockKind::Blockquote
                    && literal_prefix_len(line.kind, &text).is_some()
                {
                    quote_depth -= 1;
                    self.inline(&visible.runs)
                } else {
                    let inline = self.inline(&visible.runs);
                    escape_block_start(inline.trim_start())
                }
            }
        };

        let lead = self.container_lead(quote_depth, line.list_depth);
        let mut rendered = format!("{lead}{body}").trim_end().to_string();
        if line.line_break == Some(LineBreak::Hard) && !body.trim().is_empty() {
            rendered.push('\\');
        }
        rendered
    }

    fn emit_list_item(&mut self, line: &Line) {
        let depth = line.effective_list_depth().unwrap_or(1);
        let quote_depth = line.effective_quote_depth();
        let base = self.container_lead(quote_depth, self.container_depth(line));

        let continuing = self
            .open_lists
            .iter()
            .rev()
            .find(|list| list.depth == depth && list.identity == line.list_identity)
            .cloned();
        let replaced = self
            .open_lists
            .iter()
            .rev()
            .find(|list| list.depth == depth)
            .cloned();
        self.open_lists.retain(|list| list.depth < depth);

        let ordered = line.kind == BlockKind::OrderedList;
        let mut frame = continuing.unwrap_or_else(|| {
            let sibling = replaced.filter(|list| list.identity != line.list_identity);
            OpenList {
                identity: line.list_identity,
                depth,
                quote_depth,
                content_lead: String::new(),
                ordered,
                bullet: match &sibling {
                    Some(list) if !list.ordered && list.bullet == self.rules.bullet() => {
                        self.rules.alternate_bullet()
                    }
                    _ => self.rules.bullet(),
                },
                delimiter: match &sibling {
                    Some(list) if list.ordered && list.delimiter == '.' => ')',
                    _ => '.',
                },
                next_ordinal: 1,
            }
        });

        let visible = visible_line(line);
        let text = visible.text();
        let (marker, body) = match literal_prefix_len(line.kind, &text) {
            Some(prefix_len) => {
                let prefix: String = text.chars().take(prefix_len).collect();
                let rest = visible.slice(prefix_len, visible.char_len());
                (prefix, self.inline(&rest))
            }
            None => {
                let marker = match line.kind {
                    BlockKind::OrderedList => {
                        let ordinal = line.list_ordinal.unwrap_or(frame.next_ordinal);
                        frame.next_ordinal = ordinal + 1;
                        format!("{ordinal}{} ", frame.delimiter)
                    }
                    BlockKind::TaskUnchecked => format!("{} [ ] ", frame.bullet),
                    BlockKind::TaskChecked => format!("{} [x] ", frame.bullet),
                    _ => format!("{} ", frame.bullet),
                };
                (marker, escape_block_start(self.inline(&visible.runs).trim_start()))
            }
        };

        let marker_width = if line.kind.is_task() {
            2
        } else {
            marker.chars().count()
        };
        frame.content_lead = format!("{base}{}", " ".repeat(marker_width));
        frame.quote_depth = quote_depth;
        self.open_lists.push(frame);

        let mut rendered = format!("{base}{marker}{body}");
        if !(line.kind.is_task() && body.is_empty()) {
            rendered = rendered.trim_end().to_string();
        }
        if line.line_break == Some(LineBreak::Hard) && !body.trim().is_empty() {
            rendered.push('\\');
        }
        self.out.push(rendered);
    }

    /// End (exclusive) of the verbatim group starting at `start`. Blank lines inside the
    /// group belong to it; trailing blank lines do not.
    fn group_end(&self, start: usize, same_group: impl Fn(&Line, &Line) -> bool) -> usize {
        let lines = self.document.lines();
        let first = &lines[start];
        let mut end = start + 1;
        let mut cursor = start + 1;
        while cursor < lines.len() {
            let line = &lines[cursor];
            if line.kind == BlockKind::BlankLine {
                cursor += 1;
            } else if same_group(first, line) {
                cursor += 1;
                end = cursor;
            } else {
                break;
            }
        }
        end
    }

    fn emit_code(&mut self, start: usize) -> usize {
        let lines = self.document.lines();
        let end = self.group_end(start, |first, line| {
            line.kind == BlockKind::CodeBlock
                && line.table_row.is_none()
                && match (first.block_identity, line.block_identity) {
                    (Some(a), Some(b)) => a == b,
                    (None, None) => first.code_language == line.code_language,
                    _ => false,
                }
        });
        let group = &lines[start..end];
        let first = &lines[start];

        self.separate(first);
        self.enter_block(first);
        let lead = self.container_lead(first.effective_quote_depth(), first.list_depth);
        let ticks = group
            .iter()
            .map(|line| longest_run(&line.text(), '`'))
            .max()
            .unwrap_or(0);
        let fence = "`".repeat(ticks.max(2) + 1);
        let language = first.code_language.as_deref().unwrap_or("");

        self.out.push(format!("{lead}{fence}{language}"));
        // an empty fence imports as one empty line
        let empty = group.len() == 1 && group[0].char_len() == 0;
        for line in group.iter().filter(|_| !empty) {
            let text = line.text();
            if text.is_empty() {
                self.out.push(lead.trim_end().to_string());
            } else {
                self.out.push(format!("{lead}{text}"));
            }
        }
        self.out.push(format!("{lead}{fence}"));
        self.previous = Some(Previous {
            line: &lines[end - 1],
            joined: false,
        });
        end
    }

    fn emit_html(&mut self, start: usize) -> usize {
        let lines = self.document.lines();
        let end = self.group_end(start, |first, line| {
            line.kind == first.kind
                && line.table_row.is_none()
                && first.block_identity == line.block_identity
        });
        let first = &lines[start];

        self.separate(first);
        self.enter_block(first);
        let lead = self.container_lead(first.effective_quote_depth(), first.list_depth);
        for line in &lines[start..end] {
            let text = line.text();
            self.out.push(format!("{lead}{text}").trim_end().to_string());
        }
        self.previous = Some(Previous {
            line: &lines[end - 1],
            joined: false,
        });
        end
    }

    fn emit_table(&mut self, start: usize) -> usize {
        let lines = self.document.lines();
        let table = lines[start].table_row.map(|row| row.table);
        let mut end = start;
        while end < lines.len() && lines[end].table_row.map(|row| row.table) == table {
            end += 1;
        }
        let first = &lines[start];

        self.separate(first);
        self.enter_block(first);
        let lead = self.container_lead(first.effective_quote_depth(), first.list_depth);

        let rows: Vec<Vec<String>> = lines[start..end]
            .iter()
            .map(|line| {
                split_cells(&visible_line(line).runs)
                    .iter()
                    .map(|cell| escape_pipes(self.inline(cell).trim()))
                    .collect()
            })
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(1);
        let meta = table.and_then(|table| self.document.table(table));

        for (index, cells) in rows.iter().enumerate() {
            self.out.push(format!("{lead}{}", render_row(cells, width)));
            if index == 0 {
                self.out.push(format!("{lead}{}", alignment_row(meta, width)));
            }
        }
        self.previous = Some(Previous {
            line: &lines[end - 1],
            joined: false,
        });
        end
    }

    // ----- inline -----

    /// Serializes inline runs, emitting delimiters on attribute transitions.
    fn inline(&self, runs: &[InlineRun]) -> String {
        let mut writer = InlineWriter::new(self.rules);
        let mut index = 0;
        while index < runs.len() {
            let run = &runs[index];
            if run.attributes.literal_marker {
                index += 1;
                continue;
            }
            if let Some(url) = &run.attributes.link {
                let mut end = index;
                while end < runs.len() && runs[end].attributes.link.as_ref() == Some(url) {
                    end += 1;
                }
                let inner: Vec<InlineRun> = runs[index..end]
                    .iter()
                    .map(|run| {
                        let mut run = run.clone();
                        run.attributes.link = None;
                        run
                    })
                    .collect();
                writer.close_all();
                writer.raw(&self.link(&inner, url));
                index = end;
                continue;
            }
            writer.run(run);
            index += 1;
        }
        writer.finish()
    }

    fn link(&self, inner: &[InlineRun], url: &str) -> String {
        let text: String = inner.iter().map(|run| run.text.as_str()).collect();
        let plain = inner.iter().all(|run| run.attributes.is_plain());
        let autolink = plain
            && text == url
            && (url.contains("://") || url.starts_with("mailto:"))
            && !url.chars().any(|c| c.is_whitespace() || c == '<' || c == '>');
        if autolink {
            format!("<{url}>")
        } else {
            format!("[{}]({})", self.inline(inner), link_destination(url))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Strike,
    Bold,
    Italic,
}

/// Accumulates inline Markdown, keeping emphasis delimiters outside surrounding whitespace.
struct InlineWriter<'r> {
    rules: &'r ExportRules,
    out: String,
    open: Vec<Delimiter>,
}

impl<'r> InlineWriter<'r> {
    fn new(rules: &'r ExportRules) -> Self {
        InlineWriter {
            rules,
            out: String::new(),
            open: Vec::new(),
        }
    }

    fn marker(&self, delimiter: Delimiter) -> &'static str {
        match delimiter {
            Delimiter::Strike => "~~",
            Delimiter::Bold => self.rules.bold(),
            Delimiter::Italic => self.rules.italic(),
        }
    }

    fn wanted(run: &InlineRun) -> Vec<Delimiter> {
        let attributes = &run.attributes;
        let mut wanted = Vec::new();
        if attributes.strikethrough {
            wanted.push(Delimiter::Strike);
        }
        if attributes.bold {
            wanted.push(Delimiter::Bold);
        }
        if attributes.italic {
            wanted.push(Delimiter::Italic);
        }
        wanted
    }

    /// Pushes a closer in front of any trailing whitespace already written.
    fn close_one(&mut self) {
        if let Some(delimiter) = self.open.pop() {
            let kept = self.out.trim_end().len();
            let tail = self.out.split_off(kept);
            let marker = self.marker(delimiter);
            self.out.push_str(marker);
            self.out.push_str(&tail);
        }
    }

    fn close_all(&mut self) {
        while !self.open.is_empty() {
            self.close_one();
        }
    }

    /// Closes every open delimiter from the first one `wanted` does not contain.
    fn close_unwanted(&mut self, wanted: &[Delimiter]) {
        if let Some(first_unwanted) = self.open.iter().position(|d| !wanted.contains(d)) {
            while self.open.len() > first_unwanted {
                self.close_one();
            }
        }
    }

    fn open_missing(&mut self, wanted: &[Delimiter]) {
        for delimiter in wanted {
            if !self.open.contains(delimiter) {
                let marker = self.marker(*delimiter);
                self.out.push_str(marker);
                self.open.push(*delimiter);
            }
        }
    }

    fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn run(&mut self, run: &InlineRun) {
        let wanted = Self::wanted(run);
        self.close_unwanted(&wanted);

        let attributes = &run.attributes;
        if let Some(image) = &attributes.image {
            self.open_missing(&wanted);
            self.out.push_str(&format!(
                "![{}]({})",
                escape_alt(&image.alt_text),
                link_destination(&image.url)
            ));
            return;
        }
        if attributes.code {
            self.open_missing(&wanted);
            self.out.push_str(&code_span(&run.text));
            return;
        }

        let content = run.text.trim_start();
        let leading = &run.text[..run.text.len() - content.len()];
        self.out.push_str(leading);
        if content.is_empty() {
            return;
        }
        self.open_missing(&wanted);
        if attributes.inline_html {
            self.out.push_str(content);
        } else {
            escape_inline(content, &mut self.out);
        }
    }

    fn finish(mut self) -> String {
        self.close_all();
        self.out
    }
}
