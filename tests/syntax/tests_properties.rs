//! Property-based tests for the parser.
//!
//! Any input, however broken, must give back a lossless tree, and reparsing
//! after an edit must agree with parsing the edited text from scratch.

use metal_syntax::{Edit, parse, reparse};
use proptest::prelude::*;

use crate::helpers::source_fixtures::{
    COMPUTE_KERNEL, MISSING_SEMICOLON, STRAY_PARENS, TWO_FUNCTIONS, UNCLOSED_STRUCT,
    VERTEX_AND_FRAGMENT,
};
use crate::helpers::tree_helpers::{assert_lossless, assert_well_formed};

// ============================================================================
// Strategies
// ============================================================================

fn arb_base() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(TWO_FUNCTIONS),
        Just(COMPUTE_KERNEL),
        Just(VERTEX_AND_FRAGMENT),
        Just(MISSING_SEMICOLON),
        Just(STRAY_PARENS),
        Just(UNCLOSED_STRUCT),
    ]
}

/// Short pieces of Metal, some of them unbalanced on purpose
fn arb_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(";".to_string()),
        Just("}".to_string()),
        Just("{".to_string()),
        Just("(".to_string()),
        Just("[[".to_string()),
        Just(" + 1".to_string()),
        Just("float4 v;".to_string()),
        Just("/* note */".to_string()),
        Just("// line\n".to_string()),
        Just("if (a) b = c;".to_string()),
        "[a-z][a-z0-9_]{0,6}",
        "[0-9]{1,4}(\\.[0-9]{1,2})?",
        "[ -~\n]{0,12}",
    ]
}

/// Metal-looking token soup
fn arb_token_soup() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        Just("int"),
        Just("float4"),
        Just("kernel"),
        Just("void"),
        Just("struct"),
        Just("return"),
        Just("x"),
        Just("1"),
        Just("="),
        Just("*"),
        Just("<"),
        Just(">"),
        Just(";"),
        Just(","),
        Just("("),
        Just(")"),
        Just("{"),
        Just("}"),
        Just("[["),
        Just("]]"),
        Just("\n"),
    ];
    prop::collection::vec(token, 0..40).prop_map(|tokens| tokens.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The tree text is the input, whatever the input
    #[test]
    fn parse_is_lossless(input in any::<String>()) {
        let tree = parse(&input);
        assert_lossless(&tree, &input);
        assert_well_formed(&tree);
    }

    #[test]
    fn token_soup_is_lossless(input in arb_token_soup()) {
        let tree = parse(&input);
        assert_lossless(&tree, &input);
        assert_well_formed(&tree);
        let end = tree.root().text_range().end();
        prop_assert!(tree.errors().iter().all(|error| error.range.end() <= end));
    }

    /// Reparsing after one edit gives the same tree as a fresh parse
    #[test]
    fn reparse_matches_parse(
        base in arb_base(),
        a in 0usize..2000,
        b in 0usize..2000,
        fragment in arb_fragment(),
    ) {
        let old = parse(base);
        let mut text = base.to_string();
        let (start, end) = (a.min(b) % (text.len() + 1), a.max(b) % (text.len() + 1));
        let (start, end) = (start.min(end), start.max(end));
        let edit = Edit::apply(&mut text, start..end, &fragment);

        let new = reparse(&old, &[edit], &text);
        prop_assert_eq!(&new, &parse(&text));
        assert_lossless(&new, &text);
    }

    /// Two edits in a row, fed to one reparse
    #[test]
    fn reparse_matches_parse_after_two_edits(
        base in arb_base(),
        first in 0usize..2000,
        second in 0usize..2000,
        a in arb_fragment(),
        b in arb_fragment(),
    ) {
        let old = parse(base);
        let mut text = base.to_string();
        let at = first % (text.len() + 1);
        let e1 = Edit::apply(&mut text, at..at, &a);
        let from = second % (text.len() + 1);
        let to = (from + 3).min(text.len());
        let e2 = Edit::apply(&mut text, from..to, &b);

        let new = reparse(&old, &[e1, e2], &text);
        prop_assert_eq!(&new, &parse(&text));
    }

    /// Inserting into a source that needed recovery reparses like a fresh parse
    #[test]
    fn reparse_of_broken_base_matches_parse(
        base in prop_oneof![Just(MISSING_SEMICOLON), Just(STRAY_PARENS), Just(UNCLOSED_STRUCT)],
        at in 0usize..200,
        fragment in arb_fragment(),
    ) {
        let old = parse(base);
        prop_assert!(old.has_errors());
        let mut text = base.to_string();
        let at = at % (text.len() + 1);
        let edit = Edit::apply(&mut text, at..at, &fragment);

        let new = reparse(&old, &[edit], &text);
        prop_assert_eq!(&new, &parse(&text));
        assert_lossless(&new, &text);
    }
}
