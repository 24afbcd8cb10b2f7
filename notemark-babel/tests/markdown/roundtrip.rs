//! Round-trip tests
//!
//! Export after import is canonical: the exported form of any Markdown imports and
//! exports to itself.

use notemark_babel::transforms::normalize_markdown;
use proptest::prelude::*;
use std::path::PathBuf;

fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

#[test]
fn test_canonical_forms() {
    assert_eq!(normalize_markdown("Title\n=====\n\n* a\n* b\n"), "# Title\n\n- a\n- b");
    assert_eq!(normalize_markdown("- a\n\n- b\n"), "- a\n- b");
    assert_eq!(normalize_markdown("    indented\n"), "```\nindented\n```");
    assert_eq!(
        normalize_markdown("[x][r]\n\n[r]: https://a.io \"Title\"\n"),
        "[x](https://a.io)"
    );
    assert_eq!(normalize_markdown("__bold__ _it_"), "**bold** *it*");
}

#[test]
fn test_kitchensink_is_stable() {
    let once = normalize_markdown(&read_fixture("kitchensink.md"));
    assert_eq!(normalize_markdown(&once), once);

    for expected in [
        "---\ntitle: Kitchen sink\ntags: [demo]\n---\n\n# Kitchen sink",
        "A paragraph with **bold**, *italic*, `code`, ~~strike~~ and a [link](https://example.com).",
        "- eggs\n  - free range\n- [ ] bread\n- [x] butter",
        "1. first\n2. second",
        "> A quote\n> that spans lines.\n>\n> And a second paragraph.",
        "```rust\nfn main() {\n    println!(\"hi\");\n}\n```",
        "| Item | Qty |\n| --- | ---: |\n| milk | 2 |",
        "![sunset](sunset.png)\n\n!caption A sunset",
        "<div class=\"gallery\">\n<img src=\"a.png\">\n</div>",
    ] {
        assert!(once.contains(expected), "missing {expected:?} in:\n{once}");
    }
}

#[test]
fn test_multi_line_setext_heading_stays_one_heading() {
    let once = normalize_markdown("Setext\nline\n===\n");
    assert_eq!(once, "# Setext line");
    assert_eq!(normalize_markdown(&once), once);
}

#[test]
fn test_trailing_hashes_in_headings_survive() {
    let once = normalize_markdown("# foo \\#");
    assert_eq!(once, "# foo \\#");
    assert_eq!(normalize_markdown(&once), once);

    let once = normalize_markdown("## Learn C ###\\##");
    assert_eq!(once, "## Learn C \\####");
    assert_eq!(normalize_markdown(&once), once);

    assert_eq!(normalize_markdown("# C#"), "# C#");
    assert_eq!(normalize_markdown("# Closed #"), "# Closed");
}

#[test]
fn test_lists_may_start_at_zero() {
    assert_eq!(normalize_markdown("0. a\n1. b\n"), "0. a\n1. b");
}

#[test]
fn test_empty_blocks_are_kept() {
    assert_eq!(normalize_markdown("```\n```\n"), "```\n```");
    assert_eq!(normalize_markdown(">\n"), ">");
    assert_eq!(normalize_markdown("a\n\n>\n\nb"), "a\n\n>\n\nb");
}

fn words() -> impl Strategy<Value = String> {
    "[a-z]{1,8}( [a-z]{1,8}){0,3}"
}

fn block() -> impl Strategy<Value = String> {
    prop_oneof![
        words(),
        (1..=6usize, words()).prop_map(|(level, text)| format!("{} {text}", "#".repeat(level))),
        words().prop_map(|text| format!("- {text}")),
        words().prop_map(|text| format!("1. {text}")),
        words().prop_map(|text| format!("- [ ] {text}")),
        words().prop_map(|text| format!("> {text}")),
        words().prop_map(|text| format!("**{text}** and *{text}*")),
        words().prop_map(|text| format!("```\n{text}\n```")),
    ]
}

proptest! {
    #[test]
    fn test_export_is_a_fixed_point(blocks in prop::collection::vec(block(), 0..8)) {
        let source = blocks.join("\n\n");
        let once = normalize_markdown(&source);
        prop_assert_eq!(normalize_markdown(&once), once);
    }
}
