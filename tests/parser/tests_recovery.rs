#![allow(clippy::unwrap_used)]

use metal_syntax::{ErrorCode, ParseContext, SyntaxKind, TextRange, parse};
use rstest::rstest;

use crate::helpers::tree_helpers::{assert_lossless, assert_well_formed, compact, error_codes};

#[rstest]
#[case::missing_semicolon(
    "void f() { x = 1 }",
    "(SOURCE_FILE (FUNCTION_DEFINITION (BUILTIN_TYPE void) (FUNCTION_DECLARATOR (NAME f) (PARAMETER_LIST ( ))) (COMPOUND_STATEMENT { (EXPRESSION_STATEMENT (ASSIGNMENT_EXPR (NAME_REF x) = (LITERAL 1)) (MISSING <SEMICOLON>)) })))",
    &[ErrorCode::E0201]
)]
#[case::missing_paren_in_call(
    "void f() { foo(a, b; }",
    "(SOURCE_FILE (FUNCTION_DEFINITION (BUILTIN_TYPE void) (FUNCTION_DECLARATOR (NAME f) (PARAMETER_LIST ( ))) (COMPOUND_STATEMENT { (EXPRESSION_STATEMENT (CALL_EXPR (NAME_REF foo) (ARG_LIST ( (NAME_REF a) , (NAME_REF b) (MISSING <R_PAREN>))) ;) })))",
    &[ErrorCode::E0201]
)]
#[case::missing_operand(
    "void f() { x = ; }",
    "(SOURCE_FILE (FUNCTION_DEFINITION (BUILTIN_TYPE void) (FUNCTION_DECLARATOR (NAME f) (PARAMETER_LIST ( ))) (COMPOUND_STATEMENT { (EXPRESSION_STATEMENT (NAME_REF x) (ERROR =) ;) })))",
    &[ErrorCode::E0203]
)]
#[case::dangling_operator(
    "float f(float x) { return x * ; }",
    "(SOURCE_FILE (FUNCTION_DEFINITION (BUILTIN_TYPE float) (FUNCTION_DECLARATOR (NAME f) (PARAMETER_LIST ( (PARAMETER (BUILTIN_TYPE float) (NAME x)) ))) (COMPOUND_STATEMENT { (RETURN_STATEMENT return (NAME_REF x) (ERROR *) ;) })))",
    &[ErrorCode::E0203]
)]
#[case::stray_closer(
    "}",
    "(SOURCE_FILE (ERROR }))",
    &[ErrorCode::E0202]
)]
#[case::truncated_function(
    "void f() { return x",
    "(SOURCE_FILE (FUNCTION_DEFINITION (BUILTIN_TYPE void) (FUNCTION_DECLARATOR (NAME f) (PARAMETER_LIST ( ))) (COMPOUND_STATEMENT { (RETURN_STATEMENT return (NAME_REF x) (MISSING <SEMICOLON>)) (MISSING <R_BRACE>))))",
    &[ErrorCode::E0201, ErrorCode::E0201]
)]
#[case::skipped_run(
    "int x = 1; ) ) int y = 2;",
    "(SOURCE_FILE (DECLARATION (BUILTIN_TYPE int) (INIT_DECLARATOR (NAME x) = (LITERAL 1)) ;) (ERROR ) )) (DECLARATION (BUILTIN_TYPE int) (INIT_DECLARATOR (NAME y) = (LITERAL 2)) ;))",
    &[ErrorCode::E0202]
)]
#[case::unclosed_struct(
    "struct S { float a; ",
    "(SOURCE_FILE (DECLARATION (STRUCT_SPECIFIER struct S (FIELD_LIST { (FIELD_DECLARATION (BUILTIN_TYPE float) (NAME a) ;) (MISSING <R_BRACE>))) (MISSING <SEMICOLON>)))",
    &[ErrorCode::E0201, ErrorCode::E0201]
)]
#[case::half_closed_attribute(
    "float4 v [[position];",
    "(SOURCE_FILE (DECLARATION (BUILTIN_TYPE float4) (INIT_DECLARATOR (NAME v) (ATTRIBUTE_SPECIFIER [[ (ATTRIBUTE position) ] (MISSING <R_BRACKET>))) ;))",
    &[ErrorCode::E0201]
)]
#[case::if_without_body(
    "void f() { if (x) }",
    "(SOURCE_FILE (FUNCTION_DEFINITION (BUILTIN_TYPE void) (FUNCTION_DECLARATOR (NAME f) (PARAMETER_LIST ( ))) (COMPOUND_STATEMENT { (IF_STATEMENT if ( (NAME_REF x) ) (EXPRESSION_STATEMENT (MISSING <SEMICOLON>))) })))",
    &[ErrorCode::E0201]
)]
#[case::unclosed_array_bound(
    "int a[4;",
    "(SOURCE_FILE (DECLARATION (BUILTIN_TYPE int) (INIT_DECLARATOR (ARRAY_DECLARATOR (NAME a) [ (LITERAL 4) (MISSING <R_BRACKET>))) ;))",
    &[ErrorCode::E0201]
)]
#[case::unterminated_comment(
    "void f() { /* open",
    "(SOURCE_FILE (FUNCTION_DEFINITION (BUILTIN_TYPE void) (FUNCTION_DECLARATOR (NAME f) (PARAMETER_LIST ( ))) (COMPOUND_STATEMENT { (ERROR /* open) (MISSING <R_BRACE>))))",
    &[ErrorCode::E0103, ErrorCode::E0201]
)]
#[case::separated_shift(
    "int x = a > > b;",
    "(SOURCE_FILE (DECLARATION (BUILTIN_TYPE int) (INIT_DECLARATOR (NAME x) = (BINARY_EXPR (NAME_REF a) > (ERROR >) (NAME_REF b))) ;))",
    &[ErrorCode::E0202]
)]
#[case::attribute_before_function(
    "[[early_fragment_tests]] fragment float4 f() { return 0 }",
    "(SOURCE_FILE (FUNCTION_DEFINITION (ATTRIBUTE_SPECIFIER [[ (ATTRIBUTE early_fragment_tests) ] ]) fragment (BUILTIN_TYPE float4) (FUNCTION_DECLARATOR (NAME f) (PARAMETER_LIST ( ))) (COMPOUND_STATEMENT { (RETURN_STATEMENT return (LITERAL 0) (MISSING <SEMICOLON>)) })))",
    &[ErrorCode::E0201]
)]
fn test_recovery_shapes(#[case] input: &str, #[case] expected: &str, #[case] codes: &[ErrorCode]) {
    let tree = parse(input);
    assert_eq!(compact(&tree.root()), expected);
    assert_eq!(error_codes(&tree), codes);
    assert_lossless(&tree, input);
    assert_well_formed(&tree);
}

#[test]
fn test_missing_closer_points_at_opener() {
    let tree = parse("void f() { return x");
    let errors = tree.errors();
    assert_eq!(errors.len(), 2);

    let semicolon = &errors[0];
    assert_eq!(semicolon.message, "missing `;`");
    assert_eq!(semicolon.range, TextRange::empty(19.into()));
    assert_eq!(semicolon.context, ParseContext::Block);
    assert!(!semicolon.has_related());

    let brace = &errors[1];
    assert_eq!(brace.message, "missing `}`");
    assert_eq!(brace.hint.as_deref(), Some("insert `}`"));
    assert_eq!(brace.related.len(), 1);
    assert_eq!(brace.related[0].message, "in block opened here");
    assert_eq!(brace.related[0].range, TextRange::new(9.into(), 10.into()));
}

#[test]
fn test_wrapped_input_range() {
    let tree = parse("void f() { x = ; }");
    let error = &tree.errors()[0];
    assert_eq!(error.code, ErrorCode::E0203);
    assert_eq!(error.message, "unexpected input before `;`");
    assert_eq!(error.range, TextRange::new(13.into(), 14.into()));
    assert_eq!(error.context, ParseContext::Block);
}

#[test]
fn test_skipped_tokens_share_one_error() {
    let tree = parse("int x = 1; ) ) int y = 2;");
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "unexpected `)`");
    assert_eq!(errors[0].range, TextRange::new(11.into(), 14.into()));
    assert_eq!(errors[0].context, ParseContext::TopLevel);

    let error_nodes: Vec<_> = tree.error_nodes().collect();
    assert_eq!(error_nodes.len(), 1);
    assert_eq!(error_nodes[0].text().to_string(), ") )");
}

#[test]
fn test_missing_nodes_are_zero_width() {
    let tree = parse("struct S { float a; ");
    let missing: Vec<_> = tree
        .error_nodes()
        .filter(|node| node.kind() == SyntaxKind::MISSING)
        .collect();
    assert_eq!(missing.len(), 2);
    assert!(missing.iter().all(|node| node.text_range().is_empty()));
    assert_eq!(
        missing[0].text_range().start(),
        missing[1].text_range().start()
    );
    let inserted: Vec<_> = missing
        .iter()
        .filter_map(|node| node.first_token())
        .map(|token| token.kind())
        .collect();
    assert_eq!(inserted, vec![SyntaxKind::R_BRACE, SyntaxKind::SEMICOLON]);
}

#[test]
fn test_recovery_keeps_later_items_intact() {
    let text = "int x = 1\nint y;\nvoid f() {}\n";
    let tree = parse(text);
    assert_eq!(error_codes(&tree), vec![ErrorCode::E0201]);
    let kinds: Vec<_> = tree.root().children().map(|node| node.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::DECLARATION,
            SyntaxKind::DECLARATION,
            SyntaxKind::FUNCTION_DEFINITION
        ]
    );
    assert!(tree.root().children().skip(1).all(|node| {
        !node.descendants().any(|d| d.kind().is_error())
    }));
}

#[rstest]
#[case("")]
#[case("// just a comment\n")]
#[case("#include <metal_stdlib>\n")]
#[case("  \n\t\n")]
fn test_inputs_without_items(#[case] input: &str) {
    let tree = parse(input);
    assert!(!tree.has_errors());
    assert_eq!(tree.root().children().count(), 0);
    assert_lossless(&tree, input);
}
