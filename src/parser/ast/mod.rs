//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a SyntaxNode of one kind and provides methods to access
//! children. Accessors return `Option` because recovered trees may lack any
//! piece: a `MISSING` node stands where a token was inserted and `ERROR`
//! nodes may sit between children.

use smol_str::SmolStr;

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

// ============================================================================
// Helper utilities for reducing code duplication
// ============================================================================

/// Check if a syntax node has a direct child token of the specified kind.
///
/// Qualifiers (`const`, `device`, `kernel`, ...) are direct tokens of the
/// declaration they belong to, so this covers most boolean queries.
#[inline]
fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == kind)
}

/// First direct child token of the given kind.
#[inline]
fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Direct child tokens that are not trivia.
fn significant_tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
}

/// Name declared by the declarator chain below `node`.
///
/// Declarators nest (`*`, `&`, `[]`, `()` wrap the inner declarator), so this
/// walks down the declarator kinds only and never into parameter lists or
/// array bounds.
fn declarator_name(node: &SyntaxNode) -> Option<Name> {
    for child in node.children() {
        match child.kind() {
            SyntaxKind::NAME => return Name::cast(child),
            SyntaxKind::POINTER_DECLARATOR
            | SyntaxKind::REFERENCE_DECLARATOR
            | SyntaxKind::ARRAY_DECLARATOR
            | SyntaxKind::FUNCTION_DECLARATOR => return declarator_name(&child),
            _ => {}
        }
    }
    None
}

/// Whether the declarator chain below `node` contains a `kind` declarator.
/// Function declarators are not entered, their parameters declare their own.
fn declarator_has(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    node.children().any(|child| match child.kind() {
        k if k == kind => true,
        SyntaxKind::POINTER_DECLARATOR
        | SyntaxKind::REFERENCE_DECLARATOR
        | SyntaxKind::ARRAY_DECLARATOR => declarator_has(&child, kind),
        _ => false,
    })
}

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    /// Find all descendant nodes of a specific AST type
    fn descendants<T: AstNode>(&self) -> impl Iterator<Item = T> {
        self.syntax().descendants().filter_map(T::cast)
    }

    /// Source text of the node, trivia included
    fn text(&self) -> String {
        self.syntax().text().to_string()
    }

    /// Whether error recovery touched this node or anything below it
    fn has_errors(&self) -> bool {
        self.syntax().descendants().any(|n| n.kind().is_error())
    }

    /// Extract doc comment preceding this node.
    /// Looks for a block comment (`/* ... */`) or consecutive line comments
    /// (`// ...`) immediately preceding the node, separated only by whitespace.
    fn doc_comment(&self) -> Option<String> {
        extract_doc_comment(self.syntax())
    }
}

/// Extract the comment block directly in front of `node`.
pub fn extract_doc_comment(node: &SyntaxNode) -> Option<String> {
    let mut comments = Vec::new();
    let mut current = node.prev_sibling_or_token();

    while let Some(rowan::NodeOrToken::Token(t)) = current {
        match t.kind() {
            SyntaxKind::WHITESPACE => {
                // A blank line detaches the comment from the node
                if t.text().matches('\n').count() > 1 {
                    break;
                }
                current = t.prev_sibling_or_token();
            }
            SyntaxKind::BLOCK_COMMENT => {
                let content = t
                    .text()
                    .strip_prefix("/*")
                    .and_then(|s| s.strip_suffix("*/"))
                    .map(clean_doc_comment)
                    .unwrap_or_default();
                if !content.is_empty() {
                    comments.push(content);
                }
                break;
            }
            SyntaxKind::LINE_COMMENT => {
                let text = t.text();
                let content = text.trim_start_matches('/').trim();
                if !content.is_empty() {
                    comments.push(content.to_string());
                }
                current = t.prev_sibling_or_token();
            }
            _ => break,
        }
    }

    if comments.is_empty() {
        return None;
    }

    // Collected bottom-up
    comments.reverse();
    Some(comments.join("\n"))
}

/// Remove leading asterisks and surrounding whitespace from each line.
fn clean_doc_comment(s: &str) -> String {
    s.lines()
        .map(|line| {
            let trimmed = line.trim();
            trimmed.strip_prefix('*').map(str::trim_start).unwrap_or(trimmed)
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

/// Enum over several node wrappers, dispatching on the node kind.
///
/// Usage:
/// ```ignore
/// ast_enum!(Item {
///     Function(FunctionDefinition) = FUNCTION_DEFINITION,
///     Declaration(Declaration) = DECLARATION,
/// });
/// ```
macro_rules! ast_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident($type:ident) = $kind:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant($type),)+
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                match node.kind() {
                    $(SyntaxKind::$kind => Some(Self::$variant($type(node))),)+
                    _ => None,
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                match self {
                    $(Self::$variant(inner) => &inner.0,)+
                }
            }
        }
    };
}

/// Macro to generate boolean property methods that check for a specific token kind.
///
/// Usage:
/// ```ignore
/// impl Declaration {
///     has_token_method!(is_const, CONST_KW, "const float x = 1;");
/// }
/// ```
macro_rules! has_token_method {
    ($name:ident, $kind:ident) => {
        #[doc = concat!("Check if this node has the `", stringify!($kind), "` token.")]
        pub fn $name(&self) -> bool {
            has_token(&self.0, SyntaxKind::$kind)
        }
    };
    ($name:ident, $kind:ident, $example:literal) => {
        #[doc = concat!("Check if this node has the `", stringify!($kind), "` token (e.g., `", $example, "`).")]
        pub fn $name(&self) -> bool {
            has_token(&self.0, SyntaxKind::$kind)
        }
    };
}

/// Macro to generate a method that finds the first child of a specific AST type.
macro_rules! first_child_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get the first `", stringify!($type), "` child of this node.")]
        pub fn $name(&self) -> Option<$type> {
            self.0.children().find_map($type::cast)
        }
    };
}

/// Macro to generate a method that returns an iterator over children of a specific AST type.
macro_rules! children_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get all `", stringify!($type), "` children of this node.")]
        pub fn $name(&self) -> impl Iterator<Item = $type> + '_ {
            self.0.children().filter_map($type::cast)
        }
    };
}

/// Macro to generate a method that returns an iterator over descendants of a specific AST type.
///
/// Unlike `children_method!`, this traverses the entire subtree, not just direct children.
macro_rules! descendants_method {
    ($name:ident, $type:ident, $doc:literal) => {
        #[doc = $doc]
        pub fn $name(&self) -> impl Iterator<Item = $type> + '_ {
            self.0.descendants().filter_map($type::cast)
        }
    };
}

/// Macro to generate a method that maps token kinds to enum variants.
///
/// Usage:
/// ```ignore
/// impl Parameter {
///     token_to_enum_method!(address_space, AddressSpace, [
///         DEVICE_KW => Device,
///         CONSTANT_KW => Constant,
///     ]);
/// }
/// ```
macro_rules! token_to_enum_method {
    ($name:ident, $enum_type:ident, [$($token:ident => $variant:ident),+ $(,)?]) => {
        pub fn $name(&self) -> Option<$enum_type> {
            for token in self.0.children_with_tokens().filter_map(|e| e.into_token()) {
                match token.kind() {
                    $(SyntaxKind::$token => return Some($enum_type::$variant),)+
                    _ => {}
                }
            }
            None
        }
    };
}

/// Address-space qualifier lookup shared by everything that carries
/// declaration specifiers.
macro_rules! address_space_method {
    () => {
        token_to_enum_method!(address_space, AddressSpace, [
            DEVICE_KW => Device,
            CONSTANT_KW => Constant,
            THREAD_KW => Thread,
            THREADGROUP_KW => Threadgroup,
            THREADGROUP_IMAGEBLOCK_KW => ThreadgroupImageblock,
        ]);
    };
}

// Submodules, declared after macros so macro_rules! are in scope
mod expressions;
mod items;
mod statements;
mod types;

// Re-export all public types so external code sees a flat namespace
pub use self::expressions::*;
pub use self::items::*;
pub use self::statements::*;
pub use self::types::*;

// ============================================================================
// Names
// ============================================================================

ast_node!(Name, NAME);

impl Name {
    pub fn text(&self) -> Option<SmolStr> {
        child_token(&self.0, SyntaxKind::IDENT).map(|t| SmolStr::new(t.text()))
    }

    pub fn ident(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::IDENT)
    }
}
