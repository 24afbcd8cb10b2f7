//! Export tests for Markdown format (Document → Markdown)
//!
//! These tests build documents line by line, the way an editor holds them, and verify the
//! exported text and the Comrak AST it parses back into.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use insta::assert_snapshot;
use notemark_babel::format::Format;
use notemark_babel::formats::markdown::{ExportRules, MarkdownFormat};
use notemark_babel::model::{
    BlockKind, Document, InlineAttributes, InlineRun, Line, LineBreak, Note,
};
use notemark_babel::{export, import};
use std::collections::HashMap;

fn md(document: &Document) -> String {
    export(document, None)
}

fn item(kind: BlockKind, text: &str, identity: u32, depth: usize) -> Line {
    let mut line = Line::with_text(kind, text);
    line.list_identity = Some(identity);
    line.list_depth = Some(depth);
    line
}

fn quoted(text: &str, identity: u32, line_break: Option<LineBreak>) -> Line {
    let mut line = Line::with_text(BlockKind::Blockquote, text);
    line.quote_depth = 1;
    line.quote_identity = Some(identity);
    line.line_break = line_break;
    line
}

/// Helper to parse exported Markdown back into a Comrak AST
fn to_comrak_ast<'a>(md: &str, arena: &'a Arena<AstNode<'a>>) -> &'a AstNode<'a> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    parse_document(arena, md, &options)
}

fn top_level_types<'a>(root: &'a AstNode<'a>) -> Vec<&'static str> {
    root.children()
        .map(|child| match child.data.borrow().value {
            NodeValue::Paragraph => "Paragraph",
            NodeValue::Heading(_) => "Heading",
            NodeValue::List(_) => "List",
            NodeValue::BlockQuote => "BlockQuote",
            NodeValue::CodeBlock(_) => "CodeBlock",
            NodeValue::HtmlBlock(_) => "HtmlBlock",
            NodeValue::ThematicBreak => "ThematicBreak",
            NodeValue::Table(_) => "Table",
            _ => "Other",
        })
        .collect()
}

#[test]
fn test_blocks_are_separated_by_one_blank_line() {
    let document = Document::from_lines(vec![
        Line::with_text(BlockKind::heading(2), "Plan"),
        Line::paragraph("Buy things."),
        Line::new(BlockKind::HorizontalRule),
        Line::paragraph("Done."),
    ]);
    assert_snapshot!(md(&document), @r"
    ## Plan

    Buy things.

    ---

    Done.
    ");
}

#[test]
fn test_tight_list_with_tasks() {
    let document = Document::from_lines(vec![
        item(BlockKind::BulletList, "milk", 1, 1),
        item(BlockKind::TaskUnchecked, "eggs", 1, 1),
        item(BlockKind::TaskChecked, "bread", 1, 1),
    ]);
    let output = md(&document);
    assert_snapshot!(output, @r"
    - milk
    - [ ] eggs
    - [x] bread
    ");

    let arena = Arena::new();
    let root = to_comrak_ast(&output, &arena);
    assert_eq!(top_level_types(root), vec!["List"]);
}

#[test]
fn test_nested_list_indents_under_parent_content() {
    let document = Document::from_lines(vec![
        item(BlockKind::OrderedList, "first", 1, 1),
        item(BlockKind::BulletList, "detail", 2, 2),
        item(BlockKind::OrderedList, "second", 1, 1),
    ]);
    let output = md(&document);
    assert_snapshot!(output, @r"
    1. first
       - detail
    2. second
    ");

    let arena = Arena::new();
    let root = to_comrak_ast(&output, &arena);
    let list = root.first_child().expect("list");
    assert_eq!(list.children().count(), 2);
}

#[test]
fn test_ordinals_are_kept() {
    let mut first = item(BlockKind::OrderedList, "c", 1, 1);
    first.list_ordinal = Some(3);
    let mut second = item(BlockKind::OrderedList, "d", 1, 1);
    second.list_ordinal = Some(4);
    let document = Document::from_lines(vec![first, second]);
    assert_eq!(md(&document), "3. c\n4. d");
}

#[test]
fn test_quote_paragraphs() {
    let document = Document::from_lines(vec![
        quoted("one", 7, Some(LineBreak::Soft)),
        quoted("still one", 7, None),
        quoted("two", 7, None),
    ]);
    let output = md(&document);
    assert_snapshot!(output, @r"
    > one
    > still one
    >
    > two
    ");

    let arena = Arena::new();
    let root = to_comrak_ast(&output, &arena);
    assert_eq!(top_level_types(root), vec!["BlockQuote"]);
}

#[test]
fn test_code_block_is_fenced_with_language() {
    let mut lines = Vec::new();
    for text in ["fn main() {", "", "}"] {
        let mut line = Line::with_text(BlockKind::CodeBlock, text);
        line.code_language = Some("rust".to_string());
        line.block_identity = Some(1);
        lines.push(line);
    }
    lines.push(Line::paragraph("after"));
    let output = md(&Document::from_lines(lines));
    assert_eq!(output, "```rust\nfn main() {\n\n}\n```\n\nafter");

    let arena = Arena::new();
    let root = to_comrak_ast(&output, &arena);
    assert_eq!(top_level_types(root), vec!["CodeBlock", "Paragraph"]);
}

#[test]
fn test_inline_styles() {
    let document = Document::from_lines(vec![Line {
        runs: vec![
            InlineRun::plain("a "),
            InlineRun::new("b", InlineAttributes::bold()),
            InlineRun::plain(" "),
            InlineRun::new("i", InlineAttributes::italic()),
            InlineRun::plain(" "),
            InlineRun::new(
                "s",
                InlineAttributes {
                    strikethrough: true,
                    ..InlineAttributes::default()
                },
            ),
            InlineRun::plain(" "),
            InlineRun::new("c", InlineAttributes::code()),
        ],
        ..Line::new(BlockKind::Paragraph)
    }]);
    assert_snapshot!(md(&document), @"a **b** *i* ~~s~~ `c`");
}

#[test]
fn test_overlapping_styles_nest() {
    let document = Document::from_lines(vec![Line {
        runs: vec![
            InlineRun::new("bold ", InlineAttributes::bold()),
            InlineRun::new(
                "both",
                InlineAttributes::bold().union(&InlineAttributes::italic()),
            ),
        ],
        ..Line::new(BlockKind::Paragraph)
    }]);
    let output = md(&document);
    assert_eq!(output, "**bold *both***");

    let (reimported, _) = import(&output);
    assert_eq!(reimported.lines()[0].runs, document.lines()[0].runs);
}

#[test]
fn test_plain_text_is_escaped() {
    let document = Document::from_lines(vec![
        Line::paragraph("2 * 3 = 6"),
        Line::paragraph("- not a list"),
        Line::paragraph("1. not ordered"),
    ]);
    assert_snapshot!(md(&document), @r"
    2 \* 3 = 6

    \- not a list

    1\. not ordered
    ");
}

#[test]
fn test_image_and_caption() {
    let caption = Line::with_text(BlockKind::ImageCaption, "A sunset");
    let document = Document::from_lines(vec![
        Line {
            runs: vec![InlineRun::image("sunset.png", "sunset")],
            ..Line::new(BlockKind::Paragraph)
        },
        caption,
    ]);
    assert_eq!(md(&document), "![sunset](sunset.png)\n\n!caption A sunset");
}

#[test]
fn test_export_rules() {
    let document = Document::from_lines(vec![
        item(BlockKind::BulletList, "one", 1, 1),
        Line {
            runs: vec![
                InlineRun::new("soft", InlineAttributes::italic()),
                InlineRun::plain(" and "),
                InlineRun::new("loud", InlineAttributes::bold()),
            ],
            ..Line::new(BlockKind::Paragraph)
        },
    ]);
    let rules = ExportRules {
        unordered_marker: '+',
        emphasis_marker: '_',
        trailing_newline: true,
        ..ExportRules::default()
    };
    let format = MarkdownFormat::with_rules(rules);
    let output = format
        .serialize(&Note::new(document, None))
        .expect("serialize");
    assert_eq!(output, "+ one\n\n_soft_ and __loud__\n");
}

#[test]
fn test_list_indent_option() {
    let document = Document::from_lines(vec![item(BlockKind::BulletList, "deep", 1, 2)]);
    let mut options = HashMap::new();
    options.insert("list-indent".to_string(), "4".to_string());
    let output = MarkdownFormat::default()
        .serialize_with_options(&Note::new(document, None), &options)
        .expect("serialize");
    assert_eq!(output, "    - deep");
}

#[test]
fn test_empty_document_exports_empty_text() {
    assert_eq!(md(&Document::new()), "");
    assert_eq!(
        md(&Document::from_lines(vec![Line::blank(), Line::blank()])),
        ""
    );
}
