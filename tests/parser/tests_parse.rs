#![allow(clippy::unwrap_used)]

use metal_syntax::parser::{AstNode, ShaderStage, SourceFile, tokenize};
use metal_syntax::{Parser, ParserOptions, SyntaxKind, language, parse, parse_batch};
use rstest::rstest;

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_helpers::{assert_lossless, assert_no_errors, assert_well_formed};

#[rstest]
#[case::simple_declaration(SIMPLE_DECLARATION)]
#[case::constant_declaration(CONSTANT_DECLARATION)]
#[case::empty_function(EMPTY_FUNCTION)]
#[case::two_functions(TWO_FUNCTIONS)]
#[case::compute_kernel(COMPUTE_KERNEL)]
#[case::vertex_and_fragment(VERTEX_AND_FRAGMENT)]
fn test_valid_sources(#[case] text: &str) {
    let tree = parse(text);
    assert_no_errors(&tree);
    assert_lossless(&tree, text);
    assert_well_formed(&tree);
    assert_eq!(tree.root().kind(), SyntaxKind::SOURCE_FILE);
}

#[rstest]
#[case(COMPUTE_KERNEL, &[SyntaxKind::USING_DECLARATION, SyntaxKind::FUNCTION_DEFINITION])]
#[case(
    VERTEX_AND_FRAGMENT,
    &[SyntaxKind::DECLARATION, SyntaxKind::FUNCTION_DEFINITION, SyntaxKind::FUNCTION_DEFINITION]
)]
#[case(TWO_FUNCTIONS, &[SyntaxKind::FUNCTION_DEFINITION, SyntaxKind::FUNCTION_DEFINITION])]
fn test_top_level_items(#[case] text: &str, #[case] expected: &[SyntaxKind]) {
    let tree = parse(text);
    let kinds: Vec<_> = tree.root().children().map(|node| node.kind()).collect();
    assert_eq!(kinds, expected);
}

#[test]
fn test_entry_points() {
    let file = SourceFile::cast(parse(VERTEX_AND_FRAGMENT).root()).unwrap();
    let stages: Vec<_> = file
        .entry_points()
        .map(|f| (f.name().unwrap().to_string(), f.stage()))
        .collect();
    assert_eq!(
        stages,
        vec![
            ("vs".to_string(), Some(ShaderStage::Vertex)),
            ("fs".to_string(), Some(ShaderStage::Fragment)),
        ]
    );
}

#[test]
fn test_kernel_bindings() {
    let file = SourceFile::cast(parse(COMPUTE_KERNEL).root()).unwrap();
    let kernel = file.function("add_arrays").unwrap();
    assert_eq!(kernel.stage(), Some(ShaderStage::Kernel));
    let bindings: Vec<_> = kernel
        .parameters()
        .iter()
        .filter_map(|param| param.binding())
        .map(|(kind, index)| (kind.to_string(), index))
        .collect();
    assert_eq!(
        bindings,
        vec![
            ("buffer".to_string(), 0),
            ("buffer".to_string(), 1),
            ("buffer".to_string(), 2),
        ]
    );
}

#[test]
fn test_parse_tokens_matches_parse() {
    let tokens = tokenize(COMPUTE_KERNEL);
    let parser = Parser::new();
    assert_eq!(parser.parse_tokens(COMPUTE_KERNEL, &tokens), parser.parse(COMPUTE_KERNEL));
}

#[test]
fn test_parse_is_deterministic() {
    let a = parse(VERTEX_AND_FRAGMENT);
    let b = parse(VERTEX_AND_FRAGMENT);
    assert_eq!(a, b);
    assert!(a.structurally_eq(&b));
}

#[test]
fn test_parse_batch_keeps_order() {
    let texts = [
        SIMPLE_DECLARATION,
        "void f() { x = 1 }",
        COMPUTE_KERNEL,
        "",
        TWO_FUNCTIONS,
    ];
    let trees = parse_batch(&texts);
    assert_eq!(trees.len(), texts.len());
    for (tree, text) in trees.iter().zip(texts) {
        assert_eq!(tree.text(), text);
        assert_eq!(*tree, parse(text));
    }
    assert!(trees[1].has_errors());
}

#[test]
fn test_parser_with_options() {
    let options = ParserOptions {
        max_insertions: 1,
        skip_window: 2,
        reuse_subtrees: false,
    };
    let mut parser = Parser::with_options(options.clone());
    assert_eq!(parser.options(), &options);

    parser.set_options(ParserOptions::default());
    assert_eq!(parser.options().max_insertions, 3);
    assert!(parser.options().reuse_subtrees);
}

#[test]
fn test_set_language() {
    let mut parser = Parser::new();
    assert!(parser.set_language(language()).is_ok());
    assert_eq!(parser.language().name(), "metal");
    assert_eq!(parser.language(), language());
    assert_no_errors(&parser.parse(EMPTY_FUNCTION));
}

#[test]
fn test_parser_across_threads() {
    let parser = &Parser::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = [COMPUTE_KERNEL, TWO_FUNCTIONS]
            .into_iter()
            .map(|text| scope.spawn(move || parser.parse(text)))
            .collect();
        for handle in handles {
            let tree = handle.join().unwrap();
            assert!(!tree.has_errors());
        }
    });
}

#[test]
fn test_trivia_kept_outside_items() {
    let text = "// leading\nint x; // trailing\n";
    let tree = parse(text);
    assert_lossless(&tree, text);
    let declaration = tree.root().first_child().unwrap();
    assert_eq!(declaration.text().to_string(), "int x;");
}

#[rstest]
#[case::early_fragment_tests(
    "[[early_fragment_tests]] fragment float4 f() { return 0; }",
    "early_fragment_tests",
    ShaderStage::Fragment
)]
#[case::max_threads(
    "[[max_total_threads_per_threadgroup(64)]] kernel void k() {}",
    "max_total_threads_per_threadgroup",
    ShaderStage::Kernel
)]
fn test_attributes_before_function(
    #[case] text: &str,
    #[case] attribute: &str,
    #[case] stage: ShaderStage,
) {
    let tree = parse(text);
    assert_no_errors(&tree);
    assert_lossless(&tree, text);

    let file = SourceFile::cast(tree.root()).unwrap();
    let function = file.functions().next().unwrap();
    assert_eq!(function.stage(), Some(stage));
    assert!(function.attribute(attribute).is_some());
    assert_eq!(function.attributes().count(), 1);
}

#[test]
fn test_attribute_before_function_keeps_its_argument() {
    let file = SourceFile::cast(
        parse("[[max_total_threads_per_threadgroup(64)]] kernel void k() {}").root(),
    )
    .unwrap();
    let function = file.function("k").unwrap();
    let limit = function.attribute("max_total_threads_per_threadgroup").unwrap();
    assert_eq!(limit.index(), Some(64));
}

#[test]
fn test_attributes_before_declaration() {
    let tree = parse("[[maybe_unused]] [[deprecated]] int x;");
    assert_no_errors(&tree);
    let kinds: Vec<_> = tree
        .root()
        .first_child()
        .unwrap()
        .children()
        .map(|node| node.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::ATTRIBUTE_SPECIFIER,
            SyntaxKind::ATTRIBUTE_SPECIFIER,
            SyntaxKind::BUILTIN_TYPE,
            SyntaxKind::INIT_DECLARATOR,
        ]
    );
}

#[rstest]
#[case("float4 vec = 1;")]
#[case("int array = 2;")]
#[case("void f() { uint matrix = 3; matrix += 1; }")]
fn test_template_names_as_variables(#[case] text: &str) {
    let tree = parse(text);
    assert_no_errors(&tree);
    assert_lossless(&tree, text);
}

#[test]
fn test_shift_right_needs_joint_angles() {
    assert_no_errors(&parse("int x = a >> b;"));
    assert_no_errors(&parse("array<array<int, 2>> nested;"));
    assert!(parse("int x = a > > b;").has_errors());
    assert!(parse("int x = a > /*c*/ > b;").has_errors());
}
