//! Inline shortcut scenarios
//!
//! Typing a closing delimiter formats the text back to its nearest opener and removes both
//! delimiters. Anything ambiguous is left as typed.

use notemark_babel::model::{
    BlockKind, Document, InlineAttributes, InlineRun, InsertionPoint, Line,
};
use notemark_babel::shortcut::{InlineStyle, ShortcutKind};
use notemark_babel::transforms::replay_keystrokes;
use notemark_babel::{export, process_shortcut, Selection, ShortcutEngine};

/// Runs the engine with the caret at the end of a one-line paragraph.
fn close(text: &str) -> (Document, Option<InsertionPoint>) {
    let mut document = Document::from_lines(vec![Line::paragraph(text)]);
    let column = text.chars().count();
    let last = text.chars().last();
    let cursor = process_shortcut(&mut document, InsertionPoint::new(0, column), last);
    (document, cursor)
}

#[test]
fn test_bold_places_cursor_after_content() {
    let (document, cursor) = close("**foo**");
    assert_eq!(cursor, Some(InsertionPoint::new(0, 3)));
    let line = &document.lines()[0];
    assert_eq!(line.text(), "foo");
    assert!(line.runs[0].attributes.bold);
}

#[test]
fn test_each_delimiter_applies_its_style() {
    let engine = ShortcutEngine::default();
    let cases = [
        ("a **b**", InlineStyle::Bold),
        ("a __b__", InlineStyle::Bold),
        ("a *b*", InlineStyle::Italic),
        ("a _b_", InlineStyle::Italic),
        ("a `b`", InlineStyle::Code),
        ("a ~~b~~", InlineStyle::Strikethrough),
    ];
    for (text, style) in cases {
        let mut document = Document::from_lines(vec![Line::paragraph(text)]);
        let caret = Selection::Caret(InsertionPoint::new(0, text.chars().count()));
        let applied = engine
            .apply(&mut document, caret, text.chars().last())
            .unwrap_or_else(|| panic!("no shortcut for {text:?}"));
        assert_eq!(applied.kind, ShortcutKind::Inline(style));
        assert_eq!(applied.cursor, InsertionPoint::new(0, 3));
        assert_eq!(document.text(), "a b");
    }
}

#[test]
fn test_text_before_and_after_keeps_its_attributes() {
    let mut document = Document::from_lines(vec![Line::paragraph("say **hi** there")]);
    let cursor = process_shortcut(&mut document, InsertionPoint::new(0, 10), Some('*'));
    assert_eq!(cursor, Some(InsertionPoint::new(0, 6)));
    assert_eq!(
        document.lines()[0].runs,
        vec![
            InlineRun::plain("say "),
            InlineRun::new("hi", InlineAttributes::bold()),
            InlineRun::plain(" there"),
        ]
    );
}

#[test]
fn test_ambiguous_delimiters_are_left_alone() {
    for text in ["*foo**bar*", "** foo**", "**foo **", "snake_case_", "****", "a *"] {
        let (document, cursor) = close(text);
        assert_eq!(cursor, None, "text {text:?}");
        assert_eq!(document.text(), text);
    }
}

#[test]
fn test_opener_must_be_within_the_window() {
    let far = format!("**{}**", "a".repeat(250));
    assert_eq!(close(&far).1, None);

    let near = format!("**{}**", "a".repeat(190));
    let (document, cursor) = close(&near);
    assert_eq!(cursor, Some(InsertionPoint::new(0, 190)));
    assert!(document.lines()[0].runs[0].attributes.bold);
}

#[test]
fn test_long_line_only_scans_the_window() {
    let mut document = Document::from_lines(vec![Line {
        runs: vec![
            InlineRun::plain("x".repeat(10_000)),
            InlineRun::new(" tail ", InlineAttributes::italic()),
            InlineRun::plain("**foo**"),
        ],
        ..Line::new(BlockKind::Paragraph)
    }]);
    let column = document.lines()[0].char_len();
    let cursor = process_shortcut(&mut document, InsertionPoint::new(0, column), Some('*'));
    assert_eq!(cursor, Some(InsertionPoint::new(0, 10_009)));
    let runs = &document.lines()[0].runs;
    assert_eq!(runs.last(), Some(&InlineRun::new("foo", InlineAttributes::bold())));
    assert_eq!(runs[1], InlineRun::new(" tail ", InlineAttributes::italic()));

    let mut document = Document::from_lines(vec![Line::paragraph("**a**")]);
    assert_eq!(
        process_shortcut(&mut document, InsertionPoint::new(0, 9), Some('*')),
        None
    );
}

#[test]
fn test_code_blocks_are_verbatim() {
    let mut document = Document::from_lines(vec![Line::with_text(BlockKind::CodeBlock, "**a**")]);
    assert_eq!(
        process_shortcut(&mut document, InsertionPoint::new(0, 5), Some('*')),
        None
    );
}

#[test]
fn test_code_spans_are_protected() {
    let mut document = Document::from_lines(vec![Line {
        runs: vec![
            InlineRun::plain("*"),
            InlineRun::new("a", InlineAttributes::code()),
            InlineRun::plain("*"),
        ],
        ..Line::new(BlockKind::Paragraph)
    }]);
    assert_eq!(
        process_shortcut(&mut document, InsertionPoint::new(0, 3), Some('*')),
        None
    );
}

#[test]
fn test_typing_continues_unstyled() {
    let document = replay_keystrokes("Buy *fresh* milk");
    assert_eq!(document.text(), "Buy fresh milk");
    assert_eq!(export(&document, None), "Buy *fresh* milk");
}

#[test]
fn test_styles_compose_when_typed_inside_each_other() {
    let document = replay_keystrokes("**bold *both***");
    assert_eq!(document.text(), "bold both");
    let both = document.lines()[0]
        .runs
        .iter()
        .find(|run| run.text == "both")
        .expect("run");
    assert!(both.attributes.italic);
}
