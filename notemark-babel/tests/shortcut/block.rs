//! Block shortcut scenarios
//!
//! A prefix typed at the start of a paragraph converts the line when the space after it
//! is typed, or when the line is completed with Enter.

use notemark_babel::model::{BlockKind, Document, InsertionPoint, Line, TableMeta, TableRow};
use notemark_babel::shortcut::ShortcutKind;
use notemark_babel::transforms::{replay_keystrokes, replay_keystrokes_with_rules};
use notemark_babel::{export, process_shortcut, Selection, ShortcutEngine, ShortcutRules};

fn enter_only() -> ShortcutEngine {
    ShortcutEngine::new(ShortcutRules {
        trigger_on_space: false,
        ..ShortcutRules::default()
    })
}

/// Types a space-terminated prefix into an empty paragraph and runs the engine.
fn space_prefix(prefix: &str) -> (Document, Option<InsertionPoint>) {
    let mut document = Document::new();
    let cursor = document.insert_at(InsertionPoint::default(), prefix);
    let result = process_shortcut(&mut document, cursor, Some(' '));
    (document, result)
}

#[test]
fn test_every_prefix_converts_on_space() {
    let cases = [
        ("# ", BlockKind::Heading(1)),
        ("## ", BlockKind::Heading(2)),
        ("###### ", BlockKind::Heading(6)),
        ("- ", BlockKind::BulletList),
        ("* ", BlockKind::BulletList),
        ("+ ", BlockKind::BulletList),
        ("> ", BlockKind::Blockquote),
        ("1. ", BlockKind::OrderedList),
        ("- [ ] ", BlockKind::TaskUnchecked),
        ("- [x] ", BlockKind::TaskChecked),
    ];
    for (prefix, kind) in cases {
        let (document, cursor) = space_prefix(prefix);
        assert_eq!(cursor, Some(InsertionPoint::new(0, 0)), "prefix {prefix:?}");
        let line = &document.lines()[0];
        assert_eq!(line.kind, kind, "prefix {prefix:?}");
        assert_eq!(line.text(), "", "prefix {prefix:?}");
    }
}

#[test]
fn test_non_prefixes_do_nothing() {
    for text in ["####### ", "-x ", "1) ", "a ", "[ ] "] {
        let (document, cursor) = space_prefix(text);
        assert_eq!(cursor, None, "text {text:?}");
        assert_eq!(document.lines()[0].kind, BlockKind::Paragraph);
        assert_eq!(document.lines()[0].text(), text);
    }
}

#[test]
fn test_prefix_scan_stops_at_longest_prefix() {
    let (document, cursor) = space_prefix("123456789. ");
    assert_eq!(cursor, Some(InsertionPoint::new(0, 0)));
    assert_eq!(document.lines()[0].list_ordinal, Some(123_456_789));

    let long = format!("{} ", "word ".repeat(2_000));
    let (document, cursor) = space_prefix(&long);
    assert_eq!(cursor, None);
    assert_eq!(document.lines()[0].text(), long);

    let mut document = Document::from_lines(vec![
        Line::paragraph(&"- ".repeat(2_000)),
        Line::paragraph(""),
    ]);
    let cursor = enter_only().process(
        &mut document,
        Selection::Caret(InsertionPoint::new(1, 0)),
        Some('\n'),
    );
    assert_eq!(cursor, None);
    assert_eq!(document.lines()[0].kind, BlockKind::Paragraph);
}

#[test]
fn test_ordered_prefix_keeps_its_number() {
    let (document, _) = space_prefix("7. ");
    assert_eq!(document.lines()[0].list_ordinal, Some(7));

    let typed = replay_keystrokes("7. seven\neight");
    assert_eq!(export(&typed, None), "7. seven\n8. eight");
}

#[test]
fn test_enter_converts_and_consumes_the_break() {
    let engine = enter_only();
    let mut document = Document::from_lines(vec![Line::paragraph("## ")]);
    let cursor = document.insert_at(InsertionPoint::new(0, 3), "\n");
    assert_eq!(cursor, InsertionPoint::new(1, 0));

    let applied = engine
        .apply(&mut document, Selection::Caret(cursor), Some('\n'))
        .expect("shortcut");
    assert_eq!(applied.cursor, InsertionPoint::new(0, 0));
    assert_eq!(applied.kind, ShortcutKind::Block(BlockKind::Heading(2)));
    assert_eq!(document.len(), 1);
    assert_eq!(document.lines()[0].text(), "");
}

#[test]
fn test_enter_after_ordinary_text_keeps_the_break() {
    let mut document = Document::from_lines(vec![Line::paragraph("hello")]);
    let cursor = document.insert_at(InsertionPoint::new(0, 5), "\n");
    assert_eq!(process_shortcut(&mut document, cursor, Some('\n')), None);
    assert_eq!(document.len(), 2);
}

#[test]
fn test_space_only_waits_for_enter_when_disabled() {
    let engine = enter_only();
    let mut document = Document::new();
    let cursor = document.insert_at(InsertionPoint::default(), "- ");
    assert_eq!(
        engine.process(&mut document, Selection::Caret(cursor), Some(' ')),
        None
    );
    assert_eq!(document.lines()[0].kind, BlockKind::Paragraph);

    let cursor = document.insert_at(cursor, "\n");
    assert_eq!(
        engine.process(&mut document, Selection::Caret(cursor), Some('\n')),
        Some(InsertionPoint::new(0, 0))
    );
    assert_eq!(document.lines()[0].kind, BlockKind::BulletList);
}

#[test]
fn test_block_family_can_be_disabled() {
    let rules = ShortcutRules {
        block: false,
        ..ShortcutRules::default()
    };
    let document = replay_keystrokes_with_rules("# not a heading", &rules);
    assert_eq!(document.lines()[0].kind, BlockKind::Paragraph);
    assert_eq!(export(&document, None), "\\# not a heading");
}

#[test]
fn test_prefix_typed_before_existing_text() {
    let mut document = Document::from_lines(vec![Line::paragraph("> quoted words")]);
    let cursor = process_shortcut(&mut document, InsertionPoint::new(0, 2), Some(' '));
    assert_eq!(cursor, Some(InsertionPoint::new(0, 0)));
    let line = &document.lines()[0];
    assert_eq!(line.kind, BlockKind::Blockquote);
    assert_eq!(line.quote_depth, 1);
    assert_eq!(line.text(), "quoted words");
}

#[test]
fn test_checkbox_upgrades_a_bullet() {
    let mut item = Line::with_text(BlockKind::BulletList, "[ ] ");
    item.list_depth = Some(1);
    item.list_identity = Some(3);
    let mut document = Document::from_lines(vec![item]);
    let cursor = process_shortcut(&mut document, InsertionPoint::new(0, 4), Some(' '));
    assert_eq!(cursor, Some(InsertionPoint::new(0, 0)));
    let line = &document.lines()[0];
    assert_eq!(line.kind, BlockKind::TaskUnchecked);
    assert_eq!(line.list_identity, Some(3));
}

#[test]
fn test_table_rows_are_never_converted() {
    let mut document = Document::new();
    let table = document.push_table(TableMeta::default());
    let mut row = Line::paragraph("- ");
    row.table_row = Some(TableRow {
        table,
        is_header: true,
        row_index: 0,
    });
    document.push_line(row);
    assert_eq!(
        process_shortcut(&mut document, InsertionPoint::new(0, 2), Some(' ')),
        None
    );
}

#[test]
fn test_bullet_joins_the_list_above() {
    let mut item = Line::with_text(BlockKind::BulletList, "milk");
    item.list_depth = Some(1);
    item.list_identity = Some(4);
    let mut document = Document::from_lines(vec![item, Line::paragraph("- ")]);
    process_shortcut(&mut document, InsertionPoint::new(1, 2), Some(' '));
    let lines = document.lines();
    assert_eq!(lines[1].kind, BlockKind::BulletList);
    assert_eq!(lines[1].list_identity, Some(4));
    assert_eq!(document.blocks().len(), 1);
}

#[test]
fn test_typed_document() {
    let document = replay_keystrokes("## Groceries\n- milk\neggs");
    let kinds: Vec<_> = document.lines().iter().map(|line| line.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Heading(2),
            BlockKind::BulletList,
            BlockKind::BulletList,
        ]
    );
    assert_eq!(export(&document, None), "## Groceries\n\n- milk\n- eggs");
}
