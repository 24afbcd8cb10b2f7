//! Lines and the document arena.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::inline::byte_index;
use super::{BlockKind, InlineAttributes, InlineRun, LineBreak, TableMeta, TableRow};

fn is_zero(value: &usize) -> bool {
    *value == 0
}

/// A caret position: a line index and a column counted in chars.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct InsertionPoint {
    pub line: usize,
    pub column: usize,
}

impl InsertionPoint {
    pub fn new(line: usize, column: usize) -> Self {
        InsertionPoint { line, column }
    }
}

/// One line of a document with its block attributes and inline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Line {
    pub kind: BlockKind,
    /// 1-based nesting depth of list items and of blocks nested inside them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_depth: Option<usize>,
    /// Groups the items of one logical list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_identity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_ordinal: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_language: Option<String>,
    /// Number of enclosing blockquotes.
    #[serde(skip_serializing_if = "is_zero")]
    pub quote_depth: usize,
    /// Identity of the outermost enclosing blockquote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_identity: Option<u32>,
    /// Groups the physical lines of one code fence or raw HTML block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_identity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_row: Option<TableRow>,
    /// Set when the next line continues this paragraph after a line break.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_break: Option<LineBreak>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<InlineRun>,
}

impl Line {
    pub fn new(kind: BlockKind) -> Self {
        Line {
            kind,
            ..Line::default()
        }
    }

    pub fn blank() -> Self {
        Self::new(BlockKind::BlankLine)
    }

    /// A line of the given kind holding one plain run.
    pub fn with_text(kind: BlockKind, text: &str) -> Self {
        let mut line = Self::new(kind);
        if !text.is_empty() {
            line.runs.push(InlineRun::plain(text));
        }
        line
    }

    pub fn paragraph(text: &str) -> Self {
        Self::with_text(BlockKind::Paragraph, text)
    }

    /// Plain text of the line, literal markers included.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(InlineRun::char_len).sum()
    }

    /// Length of the line's text in bytes, without walking its characters.
    pub fn byte_len(&self) -> usize {
        self.runs.iter().map(|run| run.text.len()).sum()
    }

    /// At most `limit` chars ending at `column`, or `None` when `column` is past the end.
    pub fn chars_before(&self, column: usize, limit: usize) -> Option<Vec<char>> {
        let start = column.saturating_sub(limit);
        let mut window = Vec::with_capacity(column - start);
        let mut offset = 0;
        for run in &self.runs {
            if offset >= column {
                break;
            }
            let len = run.char_len();
            if offset + len > start {
                let skip = start.saturating_sub(offset);
                let take = column.min(offset + len) - offset - skip;
                window.extend(run.text.chars().skip(skip).take(take));
            }
            offset += len;
        }
        (offset >= column).then_some(window)
    }

    /// A blank line, or an empty paragraph outside any table.
    pub fn is_blank(&self) -> bool {
        match self.kind {
            BlockKind::BlankLine => true,
            BlockKind::Paragraph => {
                self.table_row.is_none() && self.runs.iter().all(|run| run.text.is_empty())
            }
            _ => false,
        }
    }

    /// Depth used for list layout: explicit depth, else 1 for list items.
    pub fn effective_list_depth(&self) -> Option<usize> {
        match self.list_depth {
            Some(depth) => Some(depth.max(1)),
            None if self.kind.is_list_item() => Some(1),
            None => None,
        }
    }

    /// Quote nesting; a blockquote line is always at least one level deep.
    pub fn effective_quote_depth(&self) -> usize {
        if self.kind == BlockKind::Blockquote {
            self.quote_depth.max(1)
        } else {
            self.quote_depth
        }
    }

    /// Splits runs so that a run boundary falls at `column`, returning the
    /// index of the first run at or after it.
    fn split_runs_at(&mut self, column: usize) -> usize {
        let mut start = 0;
        for index in 0..self.runs.len() {
            if column <= start {
                return index;
            }
            let len = self.runs[index].char_len();
            if column < start + len {
                let split = byte_index(&self.runs[index].text, column - start);
                let tail = self.runs[index].text.split_off(split);
                let attributes = self.runs[index].attributes.clone();
                self.runs.insert(index + 1, InlineRun::new(tail, attributes));
                return index + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    /// Merges neighbouring runs with equal attributes and drops empty runs.
    pub fn normalize(&mut self) {
        let mut merged: Vec<InlineRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            if let Some(last) = merged.last_mut().filter(|last| last.can_merge_with(&run)) {
                last.text.push_str(&run.text);
            } else {
                merged.push(run);
            }
        }
        self.runs = merged;
    }

    /// Runs covering the char range `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Vec<InlineRun> {
        let mut slice = Vec::new();
        let mut offset = 0;
        for run in &self.runs {
            let len = run.char_len();
            let from = start.max(offset);
            let to = end.min(offset + len);
            if from < to {
                let text: String = run.text.chars().skip(from - offset).take(to - from).collect();
                slice.push(InlineRun::new(text, run.attributes.clone()));
            }
            offset += len;
        }
        slice
    }

    pub fn delete_range(&mut self, start: usize, end: usize) {
        let end = end.min(self.char_len());
        if start >= end {
            return;
        }
        let first = self.split_runs_at(start);
        let last = self.split_runs_at(end);
        self.runs.drain(first..last);
        self.normalize();
    }

    /// Inserts text without line breaks, taking the attributes of the text before it.
    pub fn insert_str(&mut self, column: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let column = column.min(self.char_len());
        let attributes = self.typing_attributes(column);
        let index = self.split_runs_at(column);
        self.runs.insert(index, InlineRun::new(text, attributes));
        self.normalize();
    }

    /// Inserts text carrying explicit attributes instead of inheriting them.
    pub fn insert_run(&mut self, column: usize, run: InlineRun) {
        if run.text.is_empty() {
            return;
        }
        let index = self.split_runs_at(column.min(self.char_len()));
        self.runs.insert(index, run);
        self.normalize();
    }

    /// Attributes text typed at `column` would take: those of the character before it,
    /// or of the first character at the start of the line.
    pub fn typing_attributes(&self, column: usize) -> InlineAttributes {
        let mut offset = 0;
        for run in &self.runs {
            let len = run.char_len();
            if len > 0 && (column == 0 || column <= offset + len) {
                return run.attributes.for_typing();
            }
            offset += len;
        }
        InlineAttributes::plain()
    }

    pub fn apply_attributes<F>(&mut self, start: usize, end: usize, apply: F)
    where
        F: Fn(&mut InlineAttributes),
    {
        let end = end.min(self.char_len());
        if start >= end {
            return;
        }
        let first = self.split_runs_at(start);
        let last = self.split_runs_at(end);
        for run in &mut self.runs[first..last] {
            apply(&mut run.attributes);
        }
        self.normalize();
    }

    /// Empty line continuing this line's block after a line break.
    ///
    /// Lists, quotes and verbatim blocks continue; ordered items count up and checked
    /// tasks continue unchecked. Everything else continues as a paragraph.
    pub fn continuation(&self) -> Line {
        let mut next = Line {
            list_depth: self.list_depth,
            list_identity: self.list_identity,
            quote_depth: self.quote_depth,
            quote_identity: self.quote_identity,
            ..Line::default()
        };
        match self.kind {
            BlockKind::BulletList | BlockKind::TaskUnchecked | BlockKind::OrderedList => {
                next.kind = self.kind;
                next.list_ordinal = self.list_ordinal.map(|ordinal| ordinal + 1);
            }
            BlockKind::TaskChecked => next.kind = BlockKind::TaskUnchecked,
            BlockKind::CodeBlock => {
                next.kind = BlockKind::CodeBlock;
                next.code_language = self.code_language.clone();
                next.block_identity = self.block_identity;
            }
            BlockKind::HtmlBlock(html) => {
                next.kind = BlockKind::HtmlBlock(html);
                next.block_identity = self.block_identity;
            }
            BlockKind::Blockquote => next.kind = BlockKind::Blockquote,
            _ => next.kind = BlockKind::Paragraph,
        }
        next
    }

    /// Splits the line at `column`; the returned line holds the tail and
    /// continues this line's block.
    pub fn split_off(&mut self, column: usize) -> Line {
        let index = self.split_runs_at(column.min(self.char_len()));
        let mut next = self.continuation();
        next.runs = self.runs.split_off(index);
        next.line_break = self.line_break.take();
        self.normalize();
        next.normalize();
        next
    }
}

/// An ordered arena of lines plus the table metadata they point into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    lines: Vec<Line>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tables: Vec<TableMeta>,
    #[serde(default)]
    next_identity: u32,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from lines, reserving every identity they already use.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let next_identity = lines
            .iter()
            .flat_map(|line| [line.list_identity, line.quote_identity, line.block_identity])
            .flatten()
            .max()
            .unwrap_or(0);
        Document {
            lines,
            tables: Vec::new(),
            next_identity,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn line_mut(&mut self, index: usize) -> Option<&mut Line> {
        self.lines.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn push_line(&mut self, line: Line) -> usize {
        self.lines.push(line);
        self.lines.len() - 1
    }

    pub fn insert_line(&mut self, index: usize, line: Line) {
        let index = index.min(self.lines.len());
        self.lines.insert(index, line);
    }

    pub fn remove_line(&mut self, index: usize) -> Option<Line> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    pub fn tables(&self) -> &[TableMeta] {
        &self.tables
    }

    pub fn table(&self, index: usize) -> Option<&TableMeta> {
        self.tables.get(index)
    }

    pub fn push_table(&mut self, meta: TableMeta) -> usize {
        self.tables.push(meta);
        self.tables.len() - 1
    }

    /// Allocates a fresh list, quote or block identity.
    pub fn allocate_identity(&mut self) -> u32 {
        self.next_identity += 1;
        self.next_identity
    }

    /// Backing text: the lines' plain text joined with `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Guarantees at least one line to edit.
    pub fn ensure_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(Line::new(BlockKind::Paragraph));
        }
    }

    /// Position just past the last character.
    pub fn end(&self) -> InsertionPoint {
        match self.lines.last() {
            Some(line) => InsertionPoint::new(self.lines.len() - 1, line.char_len()),
            None => InsertionPoint::default(),
        }
    }

    /// Clamps a point into the document.
    pub fn clamp(&self, point: InsertionPoint) -> InsertionPoint {
        match self.lines.get(point.line) {
            Some(line) => InsertionPoint::new(point.line, point.column.min(line.char_len())),
            None => self.end(),
        }
    }

    /// Char offset of a point in the backing text.
    pub fn offset_of(&self, point: InsertionPoint) -> usize {
        let point = self.clamp(point);
        let before: usize = self.lines[..point.line.min(self.lines.len())]
            .iter()
            .map(|line| line.char_len() + 1)
            .sum();
        before + point.column
    }

    /// Point of a char offset in the backing text, clamped to the end.
    pub fn point_at(&self, offset: usize) -> InsertionPoint {
        let mut remaining = offset;
        for (index, line) in self.lines.iter().enumerate() {
            let len = line.char_len();
            if remaining <= len {
                return InsertionPoint::new(index, remaining);
            }
            remaining -= len + 1;
        }
        self.end()
    }

    /// Inserts text at a point and returns the point just after it.
    /// Each `\n` splits the current line.
    pub fn insert_at(&mut self, point: InsertionPoint, text: &str) -> InsertionPoint {
        self.insert_with(point, text, None)
    }

    /// Like [`Document::insert_at`], but the inserted text takes `attributes`.
    pub fn insert_styled(
        &mut self,
        point: InsertionPoint,
        text: &str,
        attributes: InlineAttributes,
    ) -> InsertionPoint {
        self.insert_with(point, text, Some(attributes))
    }

    fn insert_with(
        &mut self,
        point: InsertionPoint,
        text: &str,
        attributes: Option<InlineAttributes>,
    ) -> InsertionPoint {
        self.ensure_line();
        let mut point = self.clamp(point);
        for (index, segment) in text.split('\n').enumerate() {
            if index > 0 {
                let next = self.lines[point.line].split_off(point.column);
                self.lines.insert(point.line + 1, next);
                point = InsertionPoint::new(point.line + 1, 0);
            }
            let line = &mut self.lines[point.line];
            match &attributes {
                Some(attributes) => {
                    line.insert_run(point.column, InlineRun::new(segment, attributes.clone()))
                }
                None => line.insert_str(point.column, segment),
            }
            point.column += segment.chars().count();
        }
        point
    }

    /// Deletes the text between two points, joining lines when the range spans a break.
    pub fn delete(&mut self, start: InsertionPoint, end: InsertionPoint) {
        if self.lines.is_empty() {
            return;
        }
        let (start, end) = ordered(self.clamp(start), self.clamp(end));
        if start.line == end.line {
            self.lines[start.line].delete_range(start.column, end.column);
            return;
        }
        let last = &self.lines[end.line];
        let tail = last.slice(end.column, last.char_len());
        let line_break = last.line_break;
        let first = &mut self.lines[start.line];
        first.delete_range(start.column, first.char_len());
        first.runs.extend(tail);
        first.line_break = line_break;
        first.normalize();
        self.lines.drain(start.line + 1..=end.line);
    }

    /// Applies an inline attribute change to every character in a range.
    pub fn apply_inline<F>(&mut self, start: InsertionPoint, end: InsertionPoint, apply: F)
    where
        F: Fn(&mut InlineAttributes),
    {
        if self.lines.is_empty() {
            return;
        }
        let (start, end) = ordered(self.clamp(start), self.clamp(end));
        for index in start.line..=end.line {
            let line = &mut self.lines[index];
            let from = if index == start.line { start.column } else { 0 };
            let to = if index == end.line {
                end.column
            } else {
                line.char_len()
            };
            line.apply_attributes(from, to, &apply);
        }
    }

    /// Flags or unflags a range as displayed syntax.
    pub fn set_literal_marker(&mut self, start: InsertionPoint, end: InsertionPoint, flag: bool) {
        self.apply_inline(start, end, |attributes| attributes.literal_marker = flag);
    }

    /// Line ranges of the document's blocks: maximal runs of lines sharing a kind and,
    /// where relevant, a grouping identity.
    pub fn blocks(&self) -> Vec<Range<usize>> {
        let mut blocks: Vec<Range<usize>> = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            let extends = blocks
                .last()
                .is_some_and(|block| same_block(&self.lines[block.end - 1], line));
            if extends {
                if let Some(block) = blocks.last_mut() {
                    block.end = index + 1;
                }
            } else {
                blocks.push(index..index + 1);
            }
        }
        blocks
    }
}

fn same_block(prev: &Line, line: &Line) -> bool {
    match (prev.table_row, line.table_row) {
        (Some(a), Some(b)) => return a.table == b.table,
        (None, None) => {}
        _ => return false,
    }
    if prev.kind.is_list_item() && line.kind.is_list_item() {
        return prev.list_identity == line.list_identity;
    }
    if prev.kind != line.kind {
        return false;
    }
    match line.kind {
        BlockKind::CodeBlock | BlockKind::HtmlBlock(_) => {
            prev.block_identity == line.block_identity
        }
        BlockKind::Blockquote => {
            prev.quote_identity == line.quote_identity && prev.line_break.is_some()
        }
        BlockKind::Paragraph => prev.line_break.is_some(),
        BlockKind::BlankLine => true,
        _ => false,
    }
}

fn ordered(a: InsertionPoint, b: InsertionPoint) -> (InsertionPoint, InsertionPoint) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
