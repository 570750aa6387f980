//! Assertions over parse results shared by the test modules.

use metal_syntax::{ErrorCode, SyntaxNode, SyntaxTree, TextSize};
use rowan::NodeOrToken;

/// One-line rendering of a tree without trivia: `(KIND child child)` for
/// nodes, the text for tokens and `<KIND>` for zero-width tokens.
pub fn compact(node: &SyntaxNode) -> String {
    let inner: Vec<String> = node
        .children_with_tokens()
        .filter_map(|element| match element {
            NodeOrToken::Node(child) => Some(compact(&child)),
            NodeOrToken::Token(token) if token.kind().is_trivia() => None,
            NodeOrToken::Token(token) if token.text().is_empty() => {
                Some(format!("<{:?}>", token.kind()))
            }
            NodeOrToken::Token(token) => Some(token.text().to_string()),
        })
        .collect();
    format!("({:?} {})", node.kind(), inner.join(" "))
}

/// The tree reproduces its text and spans all of it
pub fn assert_lossless(tree: &SyntaxTree, text: &str) {
    let root = tree.root();
    assert_eq!(root.text().to_string(), text, "tree text differs from input");
    assert_eq!(root.text_range().start(), TextSize::from(0));
    assert_eq!(usize::from(root.text_range().end()), text.len());
}

/// Parent ranges contain their children and siblings are contiguous
pub fn assert_well_formed(tree: &SyntaxTree) {
    for node in tree.root().descendants() {
        let range = node.text_range();
        let mut cursor = range.start();
        for child in node.children_with_tokens() {
            let child_range = child.text_range();
            assert_eq!(child_range.start(), cursor, "gap before {:?}", child.kind());
            assert!(range.contains_range(child_range));
            cursor = child_range.end();
        }
        assert_eq!(cursor, range.end(), "children of {:?} stop short", node.kind());
    }
}

pub fn error_codes(tree: &SyntaxTree) -> Vec<ErrorCode> {
    tree.errors().iter().map(|error| error.code).collect()
}

pub fn assert_no_errors(tree: &SyntaxTree) {
    assert!(
        !tree.has_errors(),
        "unexpected errors:\n{}",
        tree.errors()
            .iter()
            .map(|error| error.format_with(tree.line_index()))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
