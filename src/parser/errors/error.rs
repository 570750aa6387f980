//! Syntax error types
//!
//! Errors are plain data: the parser never stops on one, it records it and
//! keeps going. Positions are byte ranges into the parsed text; use a
//! [`LineIndex`] to turn them into line/column pairs for display.

use std::fmt;

use rowan::{TextRange, TextSize};

use super::codes::ErrorCode;
use super::context::ParseContext;
use crate::base::{LineCol, LineIndex};

/// Severity level for diagnostics
///
/// The parser only reports errors; the level is still printed so output
/// lines up with other compiler diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
        }
    }
}

/// Related location information for an error
///
/// Used to point at the opening `{` of a block whose closing brace had to
/// be inserted, for example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub message: String,
    pub range: TextRange,
}

impl RelatedInfo {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// A syntax error recorded during parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable error message
    pub message: String,
    /// Source location; empty for missing tokens
    pub range: TextRange,
    pub code: ErrorCode,
    pub severity: Severity,
    pub context: ParseContext,
    /// Optional suggestion for fixing the error
    pub hint: Option<String>,
    pub related: Vec<RelatedInfo>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            range,
            code,
            severity: Severity::Error,
            context: ParseContext::TopLevel,
            hint: None,
            related: vec![],
        }
    }

    /// Create an error at a specific offset with zero-width range
    pub fn at_offset(message: impl Into<String>, offset: TextSize, code: ErrorCode) -> Self {
        Self::new(message, TextRange::empty(offset), code)
    }

    pub fn builder(code: ErrorCode) -> SyntaxErrorBuilder {
        SyntaxErrorBuilder::new(code)
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn with_context(mut self, context: ParseContext) -> Self {
        self.context = context;
        self
    }

    pub fn has_hint(&self) -> bool {
        self.hint.is_some()
    }

    pub fn has_related(&self) -> bool {
        !self.related.is_empty()
    }

    /// Start of the error as a zero-based line and column
    pub fn line_col(&self, index: &LineIndex) -> LineCol {
        index.line_col(self.range.start())
    }

    /// Format the error for display
    pub fn format(&self) -> String {
        let mut result = format!("{}: {}", self.code, self.message);
        if let Some(hint) = &self.hint {
            result.push_str(&format!("\n  hint: {}", hint));
        }
        result
    }

    /// Format with a one-based `line:col` prefix, the way editors print locations
    pub fn format_with(&self, index: &LineIndex) -> String {
        let pos = self.line_col(index);
        let mut result = format!(
            "{}:{}: {}[{}]: {}",
            pos.line + 1,
            pos.col + 1,
            self.severity.as_str(),
            self.code,
            self.message
        );
        for related in &self.related {
            let at = index.line_col(related.range.start());
            result.push_str(&format!(
                "\n  {}:{}: {}",
                at.line + 1,
                at.col + 1,
                related.message
            ));
        }
        if let Some(hint) = &self.hint {
            result.push_str(&format!("\n  hint: {}", hint));
        }
        result
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] at {:?}: {}",
            self.severity.as_str(),
            self.code,
            self.range,
            self.message
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Builder for creating complex syntax errors
#[derive(Debug, Clone)]
pub struct SyntaxErrorBuilder {
    code: ErrorCode,
    message: Option<String>,
    range: Option<TextRange>,
    context: ParseContext,
    hint: Option<String>,
    related: Vec<RelatedInfo>,
}

impl SyntaxErrorBuilder {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
            range: None,
            context: ParseContext::TopLevel,
            hint: None,
            related: vec![],
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Set the offset (creates an empty range at that position)
    pub fn at_offset(mut self, offset: TextSize) -> Self {
        self.range = Some(TextRange::empty(offset));
        self
    }

    pub fn context(mut self, context: ParseContext) -> Self {
        self.context = context;
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn related(mut self, message: impl Into<String>, range: TextRange) -> Self {
        self.related.push(RelatedInfo::new(message, range));
        self
    }

    /// Build the syntax error
    ///
    /// An unset message falls back to the code's default message and an
    /// unset range to the empty range at offset 0.
    pub fn build(self) -> SyntaxError {
        SyntaxError {
            message: self
                .message
                .unwrap_or_else(|| self.code.default_message().to_string()),
            range: self
                .range
                .unwrap_or_else(|| TextRange::empty(TextSize::new(0))),
            code: self.code,
            severity: Severity::Error,
            context: self.context,
            hint: self.hint,
            related: self.related,
        }
    }
}
