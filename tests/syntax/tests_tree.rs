#![allow(clippy::unwrap_used)]

use metal_syntax::{LineCol, SyntaxKind, TextRange, TextSize, parse};

use crate::helpers::source_fixtures::{COMPUTE_KERNEL, TWO_FUNCTIONS};

fn range_of(text: &str, needle: &str) -> TextRange {
    let start = text.find(needle).unwrap();
    TextRange::at(TextSize::from(start as u32), TextSize::of(needle))
}

#[test]
fn test_debug_tree_marks_recovery() {
    let tree = parse("int x = 1");
    assert_eq!(
        tree.debug_tree(),
        "SOURCE_FILE@0..9\n\
         \x20 DECLARATION@0..9\n\
         \x20   BUILTIN_TYPE@0..3\n\
         \x20     PRIMITIVE_TYPE@0..3 \"int\"\n\
         \x20   WHITESPACE@3..4 \" \"\n\
         \x20   INIT_DECLARATOR@4..9\n\
         \x20     NAME@4..5\n\
         \x20       IDENT@4..5 \"x\"\n\
         \x20     WHITESPACE@5..6 \" \"\n\
         \x20     EQ@6..7 \"=\"\n\
         \x20     WHITESPACE@7..8 \" \"\n\
         \x20     LITERAL@8..9\n\
         \x20       INT_NUMBER@8..9 \"1\"\n\
         \x20   MISSING@9..9\n\
         \x20     SEMICOLON@9..9 \"\"\n"
    );
}

#[test]
fn test_debug_output_lists_errors() {
    let tree = parse("}");
    let debug = format!("{tree:?}");
    assert!(debug.starts_with("SOURCE_FILE@0..1\n"));
    assert!(debug.ends_with("error[E0202] at 0..1: unexpected `}`\n"));
}

#[test]
fn test_display_is_the_text() {
    let tree = parse(TWO_FUNCTIONS);
    assert_eq!(tree.to_string(), TWO_FUNCTIONS);
    assert_eq!(tree.text(), TWO_FUNCTIONS);
}

#[test]
fn test_node_at_range() {
    let tree = parse(COMPUTE_KERNEL);
    let call = tree
        .node_at_range(range_of(COMPUTE_KERNEL, "a[index] + b[index]"))
        .unwrap();
    assert_eq!(call.kind(), SyntaxKind::BINARY_EXPR);

    let attribute = tree
        .node_at_range(range_of(COMPUTE_KERNEL, "thread_position_in_grid"))
        .unwrap();
    assert_eq!(attribute.kind(), SyntaxKind::ATTRIBUTE);

    let past_end = TextRange::at(TextSize::of(COMPUTE_KERNEL), 1.into());
    assert!(tree.node_at_range(past_end).is_none());
}

#[test]
fn test_token_at_offset() {
    let tree = parse(COMPUTE_KERNEL);
    let at = range_of(COMPUTE_KERNEL, "add_arrays").start();
    let token = tree.token_at_offset(at).right_biased().unwrap();
    assert_eq!(token.kind(), SyntaxKind::IDENT);
    assert_eq!(token.text(), "add_arrays");
    assert_eq!(token.parent().unwrap().kind(), SyntaxKind::NAME);
}

#[test]
fn test_line_col() {
    let tree = parse(TWO_FUNCTIONS);
    let second = range_of(TWO_FUNCTIONS, "float second").start();
    assert_eq!(tree.line_col(second), LineCol { line: 4, col: 0 });
    assert_eq!(tree.line_index().line_count(), 9);
    assert_eq!(
        tree.text_range_str(range_of(TWO_FUNCTIONS, "second")),
        Some("second")
    );
}

#[test]
fn test_error_nodes_in_source_order() {
    let tree = parse("int a = 1 ) ;\nvoid f() { g(1; }");
    let kinds: Vec<_> = tree.error_nodes().map(|node| node.kind()).collect();
    assert!(!kinds.is_empty());
    let starts: Vec<_> = tree
        .error_nodes()
        .map(|node| node.text_range().start())
        .collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert!(kinds.iter().all(|kind| kind.is_error()));
}

#[test]
fn test_structural_equality_sees_token_text() {
    let a = parse("float x = 1.0;");
    let b = parse("float x = 2.0;");
    assert!(!a.structurally_eq(&b));
    assert_ne!(a, b);
    assert!(a.structurally_eq(&a.clone()));
}

#[test]
fn test_clones_share_everything() {
    let tree = parse(TWO_FUNCTIONS);
    let copy = tree.clone();
    assert_eq!(copy.shared_nodes(&tree), tree.root().descendants().count());
}
