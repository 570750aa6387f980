//! # metal-syntax
//!
//! Incremental, error-tolerant parsing for the Metal Shading Language.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! syntax    → SyntaxTree, Edit, tree printing and comparison
//!   ↓
//! parser    → logos lexer, LALR(1) tables, recovering parser engine,
//!             incremental reparse, typed AST wrappers
//!   ↓
//! base      → Primitives (TextRange, LineIndex, Position)
//! ```
//!
//! ## Quick start
//!
//! ```
//! use metal_syntax::{Edit, Parser};
//!
//! let parser = Parser::new();
//! let mut text = String::from("kernel void k() { x = 1; }");
//! let tree = parser.parse(&text);
//! assert!(!tree.has_errors());
//!
//! let edit = Edit::apply(&mut text, 22..23, "2");
//! let next = parser.reparse(&tree, &[edit], &text);
//! assert_eq!(next.text(), text);
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax)
// ============================================================================

/// Foundation types: TextRange, LineIndex, Position
pub mod base;

/// Parser: lexer, grammar tables, engine, recovery, incremental reparse, AST
pub mod parser;

/// Syntax: SyntaxTree and Edit
pub mod syntax;

// Re-export the entry points a binding wraps
pub use parser::{
    ABI_VERSION, ErrorCode, Language, LanguageError, MIN_COMPATIBLE_ABI_VERSION, ParseContext,
    Parser, ParserOptions, Severity, SyntaxError, SyntaxKind, SyntaxNode, SyntaxToken, language,
    parse, parse_batch, reparse,
};
pub use syntax::{Edit, SyntaxTree};

// Re-export foundation types
pub use base::{LineCol, LineIndex, Position, Span, TextRange, TextSize};
