//! Markdown parsing (Markdown → Document import)
//!
//! Pipeline: Markdown string → frontmatter split → Comrak AST → Document lines.
//!
//! The walk is a single depth-first pass over the comrak node graph. List and blockquote
//! nesting is tracked with an explicit stack of [`ListFrame`]s and a quote counter, and every
//! visited block node emits one or more [`Line`]s tagged with that context.

use crate::common::frontmatter::split_frontmatter;
use crate::common::table::sanitize_cell_text;
use crate::model::{
    BlockKind, ColumnAlignment, Document, HtmlKind, ImageReference, InlineAttributes, InlineRun,
    Line, LineBreak, Note, TableMeta, TableRow, IMAGE_CAPTION_MARKER, TABLE_CELL_DELIMITER,
};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};
use tracing::debug;

/// Parse a Markdown string into a note. Never fails: anything comrak cannot
/// make sense of is kept as paragraph text.
pub fn parse_from_markdown(source: &str) -> Note {
    let (frontmatter, body) = split_frontmatter(source);

    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, body, &options);

    let mut importer = Importer::default();
    importer.visit_block(root);

    debug!(
        lines = importer.document.len(),
        tables = importer.document.tables().len(),
        frontmatter = frontmatter.is_some(),
        "imported markdown"
    );
    Note::new(importer.document, frontmatter)
}

pub(crate) fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

/// One open list during the walk.
#[derive(Debug, Clone, Copy)]
struct ListFrame {
    ordered: bool,
    depth: usize,
    identity: u32,
    /// Ordinal of the next item.
    next_ordinal: u64,
}

#[derive(Default)]
struct Importer {
    document: Document,
    lists: Vec<ListFrame>,
    quote_depth: usize,
    quote_identity: Option<u32>,
}

impl Importer {
    /// Empty line of `kind` carrying the current list and quote context.
    fn context_line(&self, kind: BlockKind) -> Line {
        let mut line = Line::new(kind);
        if let Some(frame) = self.lists.last() {
            line.list_depth = Some(frame.depth);
            line.list_identity = Some(frame.identity);
        }
        line.quote_depth = self.quote_depth;
        line.quote_identity = self.quote_identity;
        line
    }

    /// Kind of a paragraph at the current position.
    fn paragraph_kind(&self) -> BlockKind {
        if self.quote_depth > 0 {
            BlockKind::Blockquote
        } else {
            BlockKind::Paragraph
        }
    }

    fn visit_block<'a>(&mut self, node: &'a AstNode<'a>) {
        let node_data = node.data.borrow();

        match &node_data.value {
            NodeValue::Document => {
                for child in node.children() {
                    self.visit_block(child);
                }
            }

            NodeValue::Paragraph => {
                let first = self.context_line(self.paragraph_kind());
                self.emit_paragraph(node, first);
            }

            NodeValue::Heading(heading) => {
                let line = self.context_line(BlockKind::heading(heading.level));
                self.emit_heading(node, line);
            }

            NodeValue::List(list) => {
                let identity = self.document.allocate_identity();
                let ordered = list.list_type == ListType::Ordered;
                self.lists.push(ListFrame {
                    ordered,
                    depth: self.lists.len() + 1,
                    identity,
                    next_ordinal: if ordered { list.start as u64 } else { 1 },
                });
                for child in node.children() {
                    self.visit_block(child);
                }
                self.lists.pop();
            }

            NodeValue::Item(_) => self.visit_item(node, None),

            NodeValue::TaskItem(symbol) => self.visit_item(node, Some(symbol.is_some())),

            NodeValue::BlockQuote => {
                self.quote_depth += 1;
                if self.quote_identity.is_none() {
                    self.quote_identity = Some(self.document.allocate_identity());
                }
                if node.first_child().is_none() {
                    let line = self.context_line(BlockKind::Blockquote);
                    self.document.push_line(line);
                }
                for child in node.children() {
                    self.visit_block(child);
                }
                self.quote_depth -= 1;
                if self.quote_depth == 0 {
                    self.quote_identity = None;
                }
            }

            NodeValue::ThematicBreak => {
                let line = self.context_line(BlockKind::HorizontalRule);
                self.document.push_line(line);
            }

            NodeValue::CodeBlock(code_block) => {
                let literal = code_block
                    .literal
                    .strip_suffix('\n')
                    .unwrap_or(&code_block.literal);
                let info = code_block.info.trim();
                let language = (!info.is_empty()).then(|| info.to_string());
                let identity = self.document.allocate_identity();
                for raw in literal.split('\n') {
                    let mut line = self.context_line(BlockKind::CodeBlock);
                    line.code_language = language.clone();
                    line.block_identity = Some(identity);
                    if !raw.is_empty() {
                        line.runs.push(InlineRun::plain(raw));
                    }
                    self.document.push_line(line);
                }
            }

            NodeValue::HtmlBlock(html) => {
                let raw = html.literal.trim();
                let kind = BlockKind::HtmlBlock(HtmlKind::classify(raw));
                let identity = self.document.allocate_identity();
                for raw_line in raw.split('\n') {
                    let mut line = self.context_line(kind);
                    line.block_identity = Some(identity);
                    if !raw_line.is_empty() {
                        line.runs.push(InlineRun::plain(raw_line.trim_end_matches('\r')));
                    }
                    self.document.push_line(line);
                }
            }

            NodeValue::Table(table) => {
                let column_alignments = table
                    .alignments
                    .iter()
                    .map(|alignment| match alignment {
                        TableAlignment::Center => ColumnAlignment::Center,
                        TableAlignment::Right => ColumnAlignment::Right,
                        TableAlignment::Left | TableAlignment::None => ColumnAlignment::Left,
                    })
                    .collect();
                let table = self.document.push_table(TableMeta { column_alignments });
                for (row_index, row) in node.children().enumerate() {
                    let is_header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
                    self.emit_table_row(row, table, is_header, row_index);
                }
            }

            NodeValue::FrontMatter(_) => {}

            _ => {
                for child in node.children() {
                    self.visit_block(child);
                }
            }
        }
    }

    fn visit_item<'a>(&mut self, node: &'a AstNode<'a>, task: Option<bool>) {
        let advanced = self.lists.last_mut().map(|frame| {
            let current = *frame;
            frame.next_ordinal += 1;
            current
        });
        let Some(frame) = advanced else {
            for child in node.children() {
                self.visit_block(child);
            }
            return;
        };

        let kind = match task {
            Some(true) => BlockKind::TaskChecked,
            Some(false) => BlockKind::TaskUnchecked,
            None if frame.ordered => BlockKind::OrderedList,
            None => BlockKind::BulletList,
        };
        let mut item = self.context_line(kind);
        if frame.ordered && task.is_none() {
            item.list_ordinal = Some(frame.next_ordinal);
        }

        let mut children = node.children().peekable();
        let leads_with_paragraph = children
            .peek()
            .is_some_and(|child| matches!(child.data.borrow().value, NodeValue::Paragraph));
        match children.next() {
            Some(first) if leads_with_paragraph => self.emit_inline_lines(first, item),
            Some(first) => {
                self.document.push_line(item);
                self.visit_block(first);
            }
            None => {
                self.document.push_line(item);
            }
        }
        for child in children {
            self.visit_block(child);
        }
    }

    /// Paragraph lines, promoted to an image caption when the text opens with the marker.
    fn emit_paragraph<'a>(&mut self, node: &'a AstNode<'a>, first: Line) {
        let start = self.document.len();
        self.emit_inline_lines(node, first);
        let marker_len = IMAGE_CAPTION_MARKER.chars().count();
        if let Some(line) = self.document.line_mut(start) {
            if line.text().starts_with(IMAGE_CAPTION_MARKER) {
                line.delete_range(0, marker_len);
                line.kind = BlockKind::ImageCaption;
            }
        }
    }

    /// Emits the inline content of `node`; every soft or hard break starts a new line
    /// continuing the first one's block.
    fn emit_inline_lines<'a>(&mut self, node: &'a AstNode<'a>, first: Line) {
        let mut collected = InlineLines::default();
        for child in node.children() {
            collect_inlines(child, &InlineAttributes::plain(), &mut collected);
        }

        let continuation = self.context_line(self.paragraph_kind());
        let mut template = Some(first);
        for (runs, line_break) in collected.into_lines() {
            let mut line = template.take().unwrap_or_else(|| continuation.clone());
            line.runs = runs;
            line.line_break = line_break;
            line.normalize();
            self.document.push_line(line);
        }
    }

    /// A heading stays one line: the lines of a multi-line setext heading are joined by a
    /// space.
    fn emit_heading<'a>(&mut self, node: &'a AstNode<'a>, mut line: Line) {
        let mut collected = InlineLines::default();
        for child in node.children() {
            collect_inlines(child, &InlineAttributes::plain(), &mut collected);
        }
        for (index, (runs, _)) in collected.into_lines().into_iter().enumerate() {
            if index > 0 {
                line.runs.push(InlineRun::plain(" "));
            }
            line.runs.extend(runs);
        }
        line.normalize();
        self.document.push_line(line);
    }

    fn emit_table_row<'a>(
        &mut self,
        row: &'a AstNode<'a>,
        table: usize,
        is_header: bool,
        row_index: usize,
    ) {
        let mut line = self.context_line(BlockKind::Paragraph);
        line.table_row = Some(TableRow {
            table,
            is_header,
            row_index,
        });
        for (column, cell) in row.children().enumerate() {
            if column > 0 {
                line.runs.push(InlineRun::plain(TABLE_CELL_DELIMITER));
            }
            let mut collected = InlineLines::default();
            for child in cell.children() {
                collect_inlines(child, &InlineAttributes::plain(), &mut collected);
            }
            for (runs, _) in collected.into_lines() {
                for mut run in runs {
                    run.text = sanitize_cell_text(&run.text);
                    line.runs.push(run);
                }
            }
        }
        line.normalize();
        self.document.push_line(line);
    }
}

/// Inline runs split at line breaks.
struct InlineLines {
    lines: Vec<Vec<InlineRun>>,
    breaks: Vec<LineBreak>,
}

impl Default for InlineLines {
    fn default() -> Self {
        InlineLines {
            lines: vec![Vec::new()],
            breaks: Vec::new(),
        }
    }
}

impl InlineLines {
    fn push(&mut self, run: InlineRun) {
        if run.text.is_empty() {
            return;
        }
        if let Some(line) = self.lines.last_mut() {
            line.push(run);
        }
    }

    fn line_break(&mut self, kind: LineBreak) {
        self.breaks.push(kind);
        self.lines.push(Vec::new());
    }

    /// Each line's runs with the break that follows it, if any.
    fn into_lines(self) -> Vec<(Vec<InlineRun>, Option<LineBreak>)> {
        let mut breaks = self.breaks.into_iter();
        self.lines
            .into_iter()
            .map(|runs| (runs, breaks.next()))
            .collect()
    }
}

/// Collects inline runs, unioning the attributes of every enclosing inline node.
fn collect_inlines<'a>(
    node: &'a AstNode<'a>,
    attributes: &InlineAttributes,
    out: &mut InlineLines,
) {
    let node_data = node.data.borrow();

    match &node_data.value {
        NodeValue::Text(text) => out.push(InlineRun::new(text.clone(), attributes.clone())),

        NodeValue::Code(code) => out.push(InlineRun::new(
            code.literal.clone(),
            attributes.union(&InlineAttributes::code()),
        )),

        NodeValue::HtmlInline(html) => out.push(InlineRun::new(
            html.clone(),
            attributes.union(&InlineAttributes {
                inline_html: true,
                ..InlineAttributes::default()
            }),
        )),

        NodeValue::Emph => {
            collect_children(node, &attributes.union(&InlineAttributes::italic()), out)
        }

        NodeValue::Strong => {
            collect_children(node, &attributes.union(&InlineAttributes::bold()), out)
        }

        NodeValue::Strikethrough => {
            let strike = InlineAttributes {
                strikethrough: true,
                ..InlineAttributes::default()
            };
            collect_children(node, &attributes.union(&strike), out)
        }

        NodeValue::Link(link) => {
            let target = InlineAttributes {
                link: Some(link.url.clone()),
                ..InlineAttributes::default()
            };
            collect_children(node, &attributes.union(&target), out)
        }

        NodeValue::Image(link) => {
            let image = ImageReference {
                url: link.url.clone(),
                alt_text: collect_plain_text(node),
            };
            out.push(InlineRun::image_with(image, attributes.clone()));
        }

        NodeValue::SoftBreak => out.line_break(LineBreak::Soft),

        NodeValue::LineBreak => out.line_break(LineBreak::Hard),

        _ => collect_children(node, attributes, out),
    }
}

fn collect_children<'a>(
    node: &'a AstNode<'a>,
    attributes: &InlineAttributes,
    out: &mut InlineLines,
) {
    for child in node.children() {
        collect_inlines(child, attributes, out);
    }
}

/// Plain text of a node's descendants, used for image alternative text.
fn collect_plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.descendants().skip(1) {
        match &child.data.borrow().value {
            NodeValue::Text(value) => text.push_str(value),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => {}
        }
    }
    text
}
