use metal_syntax::parser::{Lexer, SyntaxKind, lex_errors, tokenize, tokenize_from};
use metal_syntax::{LineIndex, TextSize};
use rstest::rstest;

use crate::helpers::source_fixtures::{COMPUTE_KERNEL, VERTEX_AND_FRAGMENT, fixture_files};

fn significant(input: &str) -> Vec<SyntaxKind> {
    tokenize(input)
        .into_iter()
        .map(|token| token.kind)
        .filter(|kind| !kind.is_trivia())
        .collect()
}

#[rstest]
#[case(COMPUTE_KERNEL)]
#[case(VERTEX_AND_FRAGMENT)]
fn test_tokens_tile_fixture(#[case] input: &str) {
    let tokens = tokenize(input);
    let rebuilt: String = tokens.iter().map(|token| token.text).collect();
    assert_eq!(rebuilt, input);
    assert!(lex_errors(&tokens).is_empty());
}

#[test]
fn test_spans_agree_with_line_index() {
    let index = LineIndex::new(VERTEX_AND_FRAGMENT);
    for token in tokenize(VERTEX_AND_FRAGMENT) {
        let at = index.line_col(token.offset());
        assert_eq!(token.span.start.line, at.line as usize, "{:?}", token.text);
        assert_eq!(token.span.start.column, at.col as usize, "{:?}", token.text);
    }
}

#[test]
fn test_restart_at_every_token() {
    for path in fixture_files() {
        let input = std::fs::read_to_string(&path).unwrap_or_default();
        let full = tokenize(&input);
        for (i, token) in full.iter().enumerate().step_by(7) {
            let tail = tokenize_from(&input, usize::from(token.offset()));
            assert_eq!(&full[i..], &tail[..], "restart at {} in {}", i, path.display());
        }
    }
}

#[test]
fn test_restart_inside_a_character() {
    let input = "x é y";
    let tokens: Vec<_> = Lexer::starting_at(input, 3).collect();
    assert_eq!(tokens[0].offset(), TextSize::from(4));
    assert_eq!(tokens[0].kind, SyntaxKind::WHITESPACE);
    assert_eq!(tokens[1].text, "y");
}

#[test]
fn test_keywords_and_attributes() {
    assert_eq!(
        significant("kernel void k(device float* p [[buffer(0)]])"),
        vec![
            SyntaxKind::KERNEL_KW,
            SyntaxKind::PRIMITIVE_TYPE,
            SyntaxKind::IDENT,
            SyntaxKind::L_PAREN,
            SyntaxKind::DEVICE_KW,
            SyntaxKind::PRIMITIVE_TYPE,
            SyntaxKind::STAR,
            SyntaxKind::IDENT,
            SyntaxKind::L_ATTR,
            SyntaxKind::IDENT,
            SyntaxKind::L_PAREN,
            SyntaxKind::INT_NUMBER,
            SyntaxKind::R_PAREN,
            SyntaxKind::R_BRACKET,
            SyntaxKind::R_BRACKET,
            SyntaxKind::R_PAREN,
        ]
    );
}

#[test]
fn test_comments_and_preprocessor_are_trivia() {
    let input = "#include <metal_stdlib>\n// line\n/* block */ int";
    let kinds: Vec<_> = tokenize(input).into_iter().map(|token| token.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::PREPROCESSOR,
            SyntaxKind::WHITESPACE,
            SyntaxKind::LINE_COMMENT,
            SyntaxKind::WHITESPACE,
            SyntaxKind::BLOCK_COMMENT,
            SyntaxKind::WHITESPACE,
            SyntaxKind::PRIMITIVE_TYPE,
        ]
    );
    assert!(kinds[..6].iter().all(|kind| kind.is_trivia()));
}
