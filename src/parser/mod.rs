//! Table-driven incremental parser for the Metal Shading Language
//!
//! ```text
//! Grammar (builder DSL)  →  ParseTable (LALR(1))  →  Language
//!                                                       ↓
//! Source text  →  Lexer (logos)  →  Tokens  →  Parser engine  →  SyntaxTree
//!                                                       ↓
//!                                            typed AST (ast::*)
//! ```
//!
//! The grammar is compiled into a parse table once per process. Parsing is
//! lossless: every byte of the input, whitespace, comments and preprocessor
//! lines included, ends up in exactly one token of the tree. Syntax errors
//! never stop a parse; they are repaired locally and reported alongside the
//! tree.
//!
//! ## Incremental reparsing
//!
//! [`Parser::reparse`] takes the previous tree and the edits made to its
//! text. Tokens before the first edit are taken over, the rest is relexed,
//! and at every shift the engine first tries to push a whole subtree of the
//! old tree. The result is indistinguishable from a fresh parse except that
//! unchanged subtrees are the same green nodes as before.

pub mod ast;
mod engine;
pub mod errors;
pub mod grammar;
pub(crate) mod incremental;
mod language;
mod lexer;
pub mod recovery;
mod syntax_kind;
pub mod table;

pub use ast::*;
pub use engine::{GreenElement, Parser, ParserOptions, parse, parse_batch, reparse};
pub use errors::{ErrorCode, ParseContext, RelatedInfo, Severity, SyntaxError};
pub use incremental::{EditMap, NodeStates};
pub use language::{Language, LanguageError, language};
pub use lexer::{Lexer, Token, lex_error, lex_errors, tokenize, tokenize_from};
pub use syntax_kind::{
    KIND_COUNT, MetalLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxNodeChildren,
    SyntaxToken, TERMINAL_COUNT,
};
pub use table::{ABI_VERSION, MIN_COMPATIBLE_ABI_VERSION, GrammarError, ParseTable};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
