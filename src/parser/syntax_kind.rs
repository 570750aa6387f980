//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Terminals come first (the parse table indexes its action rows by them),
//! then the `EOF` sentinel, then nonterminal node kinds.

/// All syntax kinds (tokens and nodes) of the Metal Shading Language
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (functions, declarations, statements, expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "artifact", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace, comments and preprocessor lines)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,
    PREPROCESSOR, // #include <metal_stdlib>

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,          // identifier
    INT_NUMBER,     // 42, 0x2A, 7u
    FLOAT_NUMBER,   // 3.14, 1e-3, 0.5h, 2.0f
    STRING,         // "hello"
    CHAR,           // 'a'
    PRIMITIVE_TYPE, // float4, half3x3, texture2d, sampler, void, ...

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,     // {
    R_BRACE,     // }
    L_BRACKET,   // [
    R_BRACKET,   // ]
    L_ATTR,      // [[
    L_PAREN,     // (
    R_PAREN,     // )
    SEMICOLON,   // ;
    COLON,       // :
    COLON_COLON, // ::
    COMMA,       // ,
    DOT,         // .
    ARROW,       // ->
    QUESTION,    // ?
    EQ,          // =
    PLUS_EQ,     // +=
    MINUS_EQ,    // -=
    STAR_EQ,     // *=
    SLASH_EQ,    // /=
    PERCENT_EQ,  // %=
    AMP_EQ,      // &=
    PIPE_EQ,     // |=
    CARET_EQ,    // ^=
    SHL_EQ,      // <<=
    SHR_EQ,      // >>=
    EQ_EQ,       // ==
    BANG_EQ,     // !=
    LT,          // <
    GT,          // >
    GT_JOINT,    // >  directly followed by another `>`, so `>>` closes two templates
    LT_EQ,       // <=
    GT_EQ,       // >=
    PLUS,        // +
    MINUS,       // -
    STAR,        // *
    SLASH,       // /
    PERCENT,     // %
    PLUS_PLUS,   // ++
    MINUS_MINUS, // --
    BANG,        // !
    TILDE,       // ~
    AMP,         // &
    PIPE,        // |
    CARET,       // ^
    AMP_AMP,     // &&
    PIPE_PIPE,   // ||
    SHL,         // <<

    // =========================================================================
    // KEYWORDS (C++ subset plus Metal qualifiers)
    // =========================================================================
    AS_TYPE_KW,
    BREAK_KW,
    CASE_KW,
    CLASS_KW,
    CONST_KW,
    CONSTANT_KW,
    CONSTEXPR_KW,
    CONTINUE_KW,
    DEFAULT_KW,
    DEVICE_KW,
    DO_KW,
    ELSE_KW,
    ENUM_KW,
    EXTERN_KW,
    FALSE_KW,
    FOR_KW,
    FRAGMENT_KW,
    IF_KW,
    INLINE_KW,
    KERNEL_KW,
    NAMESPACE_KW,
    REINTERPRET_CAST_KW,
    RETURN_KW,
    SIZEOF_KW,
    STATIC_KW,
    STATIC_CAST_KW,
    STRUCT_KW,
    SWITCH_KW,
    THREAD_KW,
    THREADGROUP_KW,
    THREADGROUP_IMAGEBLOCK_KW,
    TRUE_KW,
    TYPEDEF_KW,
    USING_KW,
    VERTEX_KW,
    VOLATILE_KW,
    WHILE_KW,

    // =========================================================================
    // SPECIAL TERMINALS
    // =========================================================================
    ERROR, // unrecognised input (token) or wrapped invalid input (node)
    EOF,   // end of input, never stored in a tree

    // =========================================================================
    // NODES - items
    // =========================================================================
    SOURCE_FILE,
    FUNCTION_DEFINITION,
    DECLARATION,
    USING_DECLARATION,
    ALIAS_DECLARATION,
    NAMESPACE_DEFINITION,

    // Types
    BUILTIN_TYPE,
    NAMED_TYPE,
    STRUCT_SPECIFIER,
    ENUM_SPECIFIER,
    TEMPLATE_ARG_LIST,
    FIELD_LIST,
    FIELD_DECLARATION,
    ENUMERATOR_LIST,
    ENUMERATOR,

    // Declarators
    NAME,
    INIT_DECLARATOR,
    FUNCTION_DECLARATOR,
    ARRAY_DECLARATOR,
    POINTER_DECLARATOR,
    REFERENCE_DECLARATOR,
    PARAMETER_LIST,
    PARAMETER,
    ATTRIBUTE_SPECIFIER,
    ATTRIBUTE,
    INITIALIZER_LIST,

    // Statements
    COMPOUND_STATEMENT,
    EXPRESSION_STATEMENT,
    IF_STATEMENT,
    WHILE_STATEMENT,
    DO_STATEMENT,
    FOR_STATEMENT,
    SWITCH_STATEMENT,
    CASE_LABEL,
    BREAK_STATEMENT,
    CONTINUE_STATEMENT,
    RETURN_STATEMENT,

    // Expressions
    ASSIGNMENT_EXPR,
    CONDITIONAL_EXPR,
    BINARY_EXPR,
    UNARY_EXPR,
    POSTFIX_EXPR,
    CAST_EXPR,
    CALL_EXPR,
    CONSTRUCTOR_EXPR,
    INDEX_EXPR,
    FIELD_EXPR,
    PAREN_EXPR,
    SIZEOF_EXPR,
    LITERAL,
    NAME_REF,
    ARG_LIST,

    // Special
    MISSING, // zero-width token inserted by error recovery

    #[doc(hidden)]
    __LAST,
}

/// Number of terminal kinds, `EOF` included. Action rows are this wide.
pub const TERMINAL_COUNT: usize = SyntaxKind::EOF as usize + 1;

/// Number of kinds overall; part of the grammar artifact's schema.
pub const KIND_COUNT: usize = SyntaxKind::__LAST as usize;

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace, comment, preprocessor line)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT | Self::PREPROCESSOR
        )
    }

    /// Check if this kind can be produced by the lexer or fed to the parser
    pub fn is_terminal(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::AS_TYPE_KW as u16) && (self as u16) <= (Self::WHILE_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::SHL as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INT_NUMBER | Self::FLOAT_NUMBER | Self::STRING | Self::CHAR
        )
    }

    /// Check if this kind marks a recovered region of the tree
    pub fn is_error(self) -> bool {
        matches!(self, Self::ERROR | Self::MISSING)
    }

    /// Convert a raw discriminant back into a kind
    pub fn from_raw(raw: u16) -> Option<SyntaxKind> {
        if raw < SyntaxKind::__LAST as u16 {
            // Safety: repr(u16) with contiguous discriminants, bounds checked above
            Some(unsafe { std::mem::transmute::<u16, SyntaxKind>(raw) })
        } else {
            None
        }
    }

    /// Source text of fixed tokens, used in diagnostics
    pub fn display_text(self) -> Option<&'static str> {
        let text = match self {
            Self::L_BRACE => "{",
            Self::R_BRACE => "}",
            Self::L_BRACKET => "[",
            Self::R_BRACKET => "]",
            Self::L_ATTR => "[[",
            Self::L_PAREN => "(",
            Self::R_PAREN => ")",
            Self::SEMICOLON => ";",
            Self::COLON => ":",
            Self::COLON_COLON => "::",
            Self::COMMA => ",",
            Self::DOT => ".",
            Self::ARROW => "->",
            Self::QUESTION => "?",
            Self::EQ => "=",
            Self::LT => "<",
            Self::GT | Self::GT_JOINT => ">",
            _ => return None,
        };
        Some(text)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetalLanguage {}

impl rowan::Language for MetalLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<MetalLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<MetalLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<MetalLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<MetalLanguage>;
