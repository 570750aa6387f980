#![allow(clippy::unwrap_used)]

use metal_syntax::syntax::shares_subtree;
use metal_syntax::{Edit, Parser, ParserOptions, SyntaxTree, parse, reparse};

use crate::helpers::source_fixtures::{COMPUTE_KERNEL, TWO_FUNCTIONS, VERTEX_AND_FRAGMENT};
use crate::helpers::tree_helpers::{assert_lossless, assert_no_errors};

/// Replace the first occurrence of `needle` and reparse
fn edit(old: &SyntaxTree, needle: &str, replacement: &str) -> (SyntaxTree, String) {
    let mut text = old.text().to_string();
    let start = text.find(needle).unwrap();
    let edit = Edit::apply(&mut text, start..start + needle.len(), replacement);
    let tree = reparse(old, &[edit], &text);
    (tree, text)
}

#[test]
fn test_edit_in_second_function_reuses_first() {
    let old = parse(TWO_FUNCTIONS);
    let (new, text) = edit(&old, "y + 1.0", "y + 2.0");

    assert_eq!(new, parse(&text));
    assert!(new.shared_nodes(&old) > 0);
    let old_first = old.root().first_child().unwrap();
    let new_first = new.root().first_child().unwrap();
    assert!(shares_subtree(&old_first, &new_first));

    let old_second = old.root().last_child().unwrap();
    let new_second = new.root().last_child().unwrap();
    assert!(!shares_subtree(&old_second, &new_second));
}

#[test]
fn test_inserted_statement() {
    let old = parse(TWO_FUNCTIONS);
    let (new, text) = edit(&old, "    return z;", "    z = z * 2.0;\n    return z;");
    assert_eq!(new, parse(&text));
    assert_no_errors(&new);
    assert_lossless(&new, &text);
}

#[test]
fn test_breaking_and_fixing_an_edit() {
    let old = parse(TWO_FUNCTIONS);
    let (broken, text) = edit(&old, "x * 2.0;", "x * 2.0");
    assert!(broken.has_errors());
    assert_eq!(broken, parse(&text));

    let (fixed, text) = edit(&broken, "x * 2.0", "x * 2.0;");
    assert_eq!(text, TWO_FUNCTIONS);
    assert_no_errors(&fixed);
    assert_eq!(fixed, old);
}

#[test]
fn test_sequential_edits_in_one_call() {
    let old = parse(VERTEX_AND_FRAGMENT);
    let mut text = old.text().to_string();
    let first = text.find("float2 uv").unwrap();
    let e1 = Edit::apply(&mut text, first..first + 6, "float3");
    let second = text.find("0.0, 1.0);\n}").unwrap();
    let e2 = Edit::apply(&mut text, second..second + 3, "0.5");

    let new = reparse(&old, &[e1, e2], &text);
    assert_eq!(new, parse(&text));
    assert_no_errors(&new);
}

#[test]
fn test_edit_at_start_of_file() {
    let old = parse(COMPUTE_KERNEL);
    let mut text = old.text().to_string();
    let e = Edit::apply(&mut text, 0..0, "// header\n");
    let new = reparse(&old, &[e], &text);
    assert_eq!(new, parse(&text));
}

#[test]
fn test_edit_at_end_of_file() {
    let old = parse(TWO_FUNCTIONS);
    let mut text = old.text().to_string();
    let end = text.len();
    let e = Edit::apply(&mut text, end..end, "int tail = 3;\n");
    let new = reparse(&old, &[e], &text);
    assert_eq!(new, parse(&text));
    assert_eq!(new.root().children().count(), 3);
    assert!(new.shared_nodes(&old) > 0);
}

#[test]
fn test_no_edits_reuses_everything_reusable() {
    let old = parse(TWO_FUNCTIONS);
    let new = reparse(&old, &[], old.text());
    assert_eq!(new, old);
    assert!(new.shared_nodes(&old) > 0);
}

#[test]
fn test_mismatched_edits_fall_back_to_full_parse() {
    let old = parse(TWO_FUNCTIONS);
    let text = TWO_FUNCTIONS.replace("1.0", "10.0");
    // Claims a same-length replacement although the text grew
    let wrong = Edit::replace(0..1, 1);
    let new = reparse(&old, &[wrong], &text);
    assert_eq!(new, parse(&text));
    assert_eq!(new.shared_nodes(&old), 0);
}

#[test]
fn test_edit_past_end_falls_back() {
    let old = parse("int x;");
    let new = reparse(&old, &[Edit::new(10, 12, 10)], "int y;");
    assert_eq!(new, parse("int y;"));
}

#[test]
fn test_reuse_can_be_disabled() {
    let parser = Parser::with_options(ParserOptions {
        reuse_subtrees: false,
        ..ParserOptions::default()
    });
    let old = parser.parse(TWO_FUNCTIONS);
    let mut text = old.text().to_string();
    let start = text.find("y + 1.0").unwrap();
    let e = Edit::apply(&mut text, start..start + 7, "y - 1.0");
    let new = parser.reparse(&old, &[e], &text);
    assert_eq!(new, parser.parse(&text));
    assert_eq!(new.shared_nodes(&old), 0);
}

#[test]
fn test_chain_of_reparses() {
    let mut tree = parse(COMPUTE_KERNEL);
    for replacement in ["a[index] - b[index]", "a[index] * 2.0", "b[index]"] {
        let text = tree.text().to_string();
        let start = text.find("result[index] = ").unwrap() + "result[index] = ".len();
        let end = start + text[start..].find(';').unwrap();
        let mut next = text.clone();
        let e = Edit::apply(&mut next, start..end, replacement);
        tree = reparse(&tree, &[e], &next);
        assert_eq!(tree, parse(&next));
        assert_no_errors(&tree);
    }
}
