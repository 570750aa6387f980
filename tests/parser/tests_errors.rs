#![allow(clippy::unwrap_used)]

use metal_syntax::{ErrorCode, ParseContext, Severity, TextRange, parse};
use rstest::rstest;

#[test]
fn test_format_with_reports_one_based_location() {
    let tree = parse("int x = 1\nint y;");
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].format_with(tree.line_index()),
        "1:10: error[E0201]: missing `;`\n  hint: insert `;`"
    );
}

#[test]
fn test_format_with_lists_related_locations() {
    let tree = parse("void f() { return x");
    let brace = &tree.errors()[1];
    assert_eq!(
        brace.format_with(tree.line_index()),
        "1:20: error[E0201]: missing `}`\n  1:10: in block opened here\n  hint: insert `}`"
    );
}

#[test]
fn test_format_with_on_later_lines() {
    let text = "kernel void k() {\n    x = 1\n}\n";
    let tree = parse(text);
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    let formatted = errors[0].format_with(tree.line_index());
    assert!(formatted.starts_with("2:10: error[E0201]: missing `;`"), "{formatted}");
}

#[test]
fn test_display() {
    let tree = parse("}");
    assert_eq!(tree.errors()[0].to_string(), "error[E0202] at 0..1: unexpected `}`");
}

#[rstest]
#[case::invalid_character("int x = 1 @ 2;", ErrorCode::E0101, "invalid character `@`", 10, 11)]
#[case::unterminated_string("\"abc\nint x;", ErrorCode::E0102, "unterminated string literal", 0, 4)]
#[case::unterminated_comment("int x; /* open", ErrorCode::E0103, "unterminated block comment", 7, 14)]
fn test_lexical_errors(
    #[case] input: &str,
    #[case] code: ErrorCode,
    #[case] message: &str,
    #[case] start: u32,
    #[case] end: u32,
) {
    let tree = parse(input);
    let first = &tree.errors()[0];
    assert_eq!(first.code, code);
    assert!(first.code.is_lexical());
    assert_eq!(first.message, message);
    assert_eq!(first.range, TextRange::new(start.into(), end.into()));
}

#[test]
fn test_lexical_error_inside_block_has_context() {
    let tree = parse("void f() { int x = 1 ` 2; }");
    let lexical: Vec<_> = tree
        .errors()
        .iter()
        .filter(|error| error.code.is_lexical())
        .collect();
    assert_eq!(lexical.len(), 1);
    assert_eq!(lexical[0].context, ParseContext::Block);
}

#[test]
fn test_errors_are_sorted_by_start() {
    let text = "int a = ;\n} struct S { float x; \nint b = 1 @;\nvoid f( {";
    let tree = parse(text);
    let errors = tree.errors();
    assert!(errors.len() > 2);
    assert!(
        errors
            .windows(2)
            .all(|pair| pair[0].range.start() <= pair[1].range.start())
    );
}

#[test]
fn test_errors_lie_within_text() {
    let text = "fragment float4 f(VertexOut in [[stage_in]] { return in.color";
    let tree = parse(text);
    assert_eq!(
        tree.errors().iter().map(|e| e.code).collect::<Vec<_>>(),
        vec![ErrorCode::E0201; 3]
    );
    let end = tree.root().text_range().end();
    for error in tree.errors() {
        assert!(error.range.end() <= end);
        assert_eq!(error.severity, Severity::Error);
    }
}

#[test]
fn test_missing_errors_carry_hints() {
    let tree = parse("struct S { float a; ");
    for error in tree.errors() {
        assert!(error.code.is_missing());
        assert!(error.has_hint());
    }
    assert_eq!(tree.errors()[0].message, "missing `}`");
    assert_eq!(tree.errors()[1].message, "missing `;`");
}
