//! Error codes for parser diagnostics
//!
//! Codes are grouped by the stage that reports them:
//! - E01xx: lexical errors, reported while tokenizing
//! - E02xx: structural errors, reported by error recovery

use std::fmt;

/// Categorized error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Character that starts no token
    E0101,
    /// String literal runs to end of input
    E0102,
    /// Block comment runs to end of input
    E0103,

    // =========================================================================
    // E02xx: Structural errors
    // =========================================================================
    /// A token was assumed present and inserted as a zero-width node
    E0201,
    /// A token was skipped
    E0202,
    /// Already-parsed input was abandoned into an error node
    E0203,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
        }
    }

    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 | Self::E0102 | Self::E0103 => "lexical error",
            Self::E0201 | Self::E0202 | Self::E0203 => "syntax error",
        }
    }

    /// Get the default message template for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "invalid character",
            Self::E0102 => "unterminated string literal",
            Self::E0103 => "unterminated block comment",
            Self::E0201 => "missing token",
            Self::E0202 => "unexpected token",
            Self::E0203 => "unexpected input",
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::E0101 | Self::E0102 | Self::E0103)
    }

    /// Errors whose node has zero width in the tree
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::E0201)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
