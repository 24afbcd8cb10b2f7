//! Import tests for Markdown format (Markdown → Document)
//!
//! These tests verify that Markdown documents are correctly converted to lines by
//! checking the resulting kinds, depths, identities and inline runs.

use notemark_babel::format::Format;
use notemark_babel::formats::markdown::MarkdownFormat;
use notemark_babel::model::{BlockKind, HtmlKind, LineBreak};
use notemark_babel::{import, Document};
use std::path::PathBuf;

fn md_to_doc(md: &str) -> Document {
    MarkdownFormat::default()
        .parse(md)
        .expect("Should parse markdown")
        .document
}

fn kinds(document: &Document) -> Vec<BlockKind> {
    document.lines().iter().map(|line| line.kind).collect()
}

fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

#[test]
fn test_paragraph_simple() {
    let doc = md_to_doc("This is a simple paragraph.\n");
    assert_eq!(kinds(&doc), vec![BlockKind::Paragraph]);
    assert_eq!(doc.text(), "This is a simple paragraph.");
}

#[test]
fn test_empty_input() {
    let (doc, frontmatter) = import("");
    assert!(doc.is_empty());
    assert!(frontmatter.is_none());
}

#[test]
fn test_blank_lines_are_not_imported() {
    let doc = md_to_doc("one\n\n\n\ntwo\n");
    assert_eq!(kinds(&doc), vec![BlockKind::Paragraph, BlockKind::Paragraph]);
}

#[test]
fn test_heading_levels() {
    let doc = md_to_doc("# One\n\n### Three\n\nSetext\n======\n");
    assert_eq!(
        kinds(&doc),
        vec![
            BlockKind::Heading(1),
            BlockKind::Heading(3),
            BlockKind::Heading(1)
        ]
    );
    assert_eq!(doc.lines()[1].text(), "Three");
}

#[test]
fn test_multi_line_setext_heading_is_one_line() {
    let doc = md_to_doc("Two\nlines\n---\n");
    assert_eq!(kinds(&doc), vec![BlockKind::Heading(2)]);
    assert_eq!(doc.text(), "Two lines");
    assert_eq!(doc.lines()[0].line_break, None);
}

#[test]
fn test_ordered_list_keeps_start_number() {
    let doc = md_to_doc("0. a\n5. b\n\n- x\n\n7. c\n");
    let ordinals: Vec<_> = doc.lines().iter().map(|line| line.list_ordinal).collect();
    assert_eq!(ordinals, vec![Some(0), Some(1), None, Some(7)]);
}

#[test]
fn test_empty_blockquote_is_one_line() {
    let doc = md_to_doc(">\n");
    assert_eq!(kinds(&doc), vec![BlockKind::Blockquote]);
    assert_eq!(doc.lines()[0].quote_depth, 1);
    assert!(doc.lines()[0].runs.is_empty());
}

#[test]
fn test_multi_line_paragraph_keeps_breaks() {
    let doc = md_to_doc("first\nsecond  \nthird\n");
    let lines = doc.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].line_break, Some(LineBreak::Soft));
    assert_eq!(lines[1].line_break, Some(LineBreak::Hard));
    assert_eq!(lines[2].line_break, None);
    assert_eq!(doc.blocks().len(), 1);
}

#[test]
fn test_inline_attributes_compose() {
    let doc = md_to_doc("plain **bold *both*** ~~gone~~ `x`\n");
    let runs = &doc.lines()[0].runs;

    let both = runs.iter().find(|run| run.text == "both").expect("run");
    assert!(both.attributes.bold && both.attributes.italic);

    let bold = runs.iter().find(|run| run.text == "bold ").expect("run");
    assert!(bold.attributes.bold && !bold.attributes.italic);

    let gone = runs.iter().find(|run| run.text == "gone").expect("run");
    assert!(gone.attributes.strikethrough);

    let code = runs.iter().find(|run| run.text == "x").expect("run");
    assert!(code.attributes.code);
}

#[test]
fn test_link_wraps_formatted_text() {
    let doc = md_to_doc("[read *this*](https://example.com)\n");
    let runs = &doc.lines()[0].runs;
    assert!(runs
        .iter()
        .all(|run| run.attributes.link.as_deref() == Some("https://example.com")));
    assert!(runs.iter().any(|run| run.text == "this" && run.attributes.italic));
}

#[test]
fn test_image_run() {
    let doc = md_to_doc("![a cat](cat.png)\n");
    let image = doc.lines()[0].runs[0]
        .attributes
        .image
        .clone()
        .expect("image");
    assert_eq!(image.url, "cat.png");
    assert_eq!(image.alt_text, "a cat");
}

#[test]
fn test_nested_list_depths_and_identities() {
    let doc = md_to_doc("- a\n  - b\n    - c\n- d\n");
    let lines = doc.lines();
    let depths: Vec<_> = lines.iter().map(|line| line.list_depth).collect();
    assert_eq!(depths, vec![Some(1), Some(2), Some(3), Some(1)]);
    assert_eq!(lines[0].list_identity, lines[3].list_identity);
    assert_ne!(lines[0].list_identity, lines[1].list_identity);
    assert_ne!(lines[1].list_identity, lines[2].list_identity);
}

#[test]
fn test_separate_lists_get_separate_identities() {
    let doc = md_to_doc("- a\n\n1. b\n");
    let lines = doc.lines();
    assert_eq!(
        kinds(&doc),
        vec![BlockKind::BulletList, BlockKind::OrderedList]
    );
    assert_ne!(lines[0].list_identity, lines[1].list_identity);
}

#[test]
fn test_paragraph_inside_list_item() {
    let doc = md_to_doc("- item\n\n  more about it\n");
    let lines = doc.lines();
    assert_eq!(
        kinds(&doc),
        vec![BlockKind::BulletList, BlockKind::Paragraph]
    );
    assert_eq!(lines[1].list_depth, Some(1));
    assert_eq!(lines[1].list_identity, lines[0].list_identity);
}

#[test]
fn test_nested_quotes_share_identity() {
    let doc = md_to_doc("> outer\n>\n> > inner\n");
    let lines = doc.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].quote_depth, 1);
    assert_eq!(lines[1].quote_depth, 2);
    assert_eq!(lines[0].quote_identity, lines[1].quote_identity);
}

#[test]
fn test_list_inside_quote() {
    let doc = md_to_doc("> - a\n> - b\n");
    let lines = doc.lines();
    assert!(lines.iter().all(|line| line.kind == BlockKind::BulletList));
    assert!(lines.iter().all(|line| line.quote_depth == 1));
}

#[test]
fn test_indented_code_has_no_language() {
    let doc = md_to_doc("    let x = 1;\n");
    let line = &doc.lines()[0];
    assert_eq!(line.kind, BlockKind::CodeBlock);
    assert_eq!(line.code_language, None);
    assert_eq!(line.text(), "let x = 1;");
}

#[test]
fn test_generic_html_block() {
    let doc = md_to_doc("<details>\n<summary>More</summary>\n</details>\n");
    assert!(doc
        .lines()
        .iter()
        .all(|line| line.kind == BlockKind::HtmlBlock(HtmlKind::Generic)));
    assert_eq!(doc.lines()[1].text(), "<summary>More</summary>");
}

#[test]
fn test_kitchensink_fixture() {
    let (doc, frontmatter) = import(&read_fixture("kitchensink.md"));

    assert_eq!(
        frontmatter.as_deref(),
        Some("---\ntitle: Kitchen sink\ntags: [demo]\n---")
    );
    let gallery = BlockKind::HtmlBlock(HtmlKind::Gallery);
    assert_eq!(
        kinds(&doc),
        vec![
            BlockKind::Heading(1),
            BlockKind::Paragraph,
            BlockKind::Paragraph,
            BlockKind::Heading(2),
            BlockKind::BulletList,
            BlockKind::BulletList,
            BlockKind::BulletList,
            BlockKind::TaskUnchecked,
            BlockKind::TaskChecked,
            BlockKind::OrderedList,
            BlockKind::OrderedList,
            BlockKind::Blockquote,
            BlockKind::Blockquote,
            BlockKind::Blockquote,
            BlockKind::CodeBlock,
            BlockKind::CodeBlock,
            BlockKind::CodeBlock,
            BlockKind::Paragraph,
            BlockKind::Paragraph,
            BlockKind::HorizontalRule,
            BlockKind::Paragraph,
            BlockKind::ImageCaption,
            gallery,
            gallery,
            gallery,
        ]
    );

    let lines = doc.lines();
    assert_eq!(lines[6].list_depth, Some(2));
    assert_eq!(lines[14].code_language.as_deref(), Some("rust"));
    assert!(lines[17].table_row.is_some_and(|row| row.is_header));
    assert_eq!(lines[21].text(), "A sunset");
}
