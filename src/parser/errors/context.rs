//! Where in the source structure an error happened
//!
//! The context is read off the parse stack: the innermost opening delimiter
//! that has not been closed yet decides it.

use crate::parser::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseContext {
    #[default]
    TopLevel,
    /// Inside `{ ... }`
    Block,
    /// Inside `( ... )`
    Parens,
    /// Inside `[ ... ]`
    Brackets,
    /// Inside `[[ ... ]]`
    Attribute,
}

impl ParseContext {
    /// Context opened by `kind`, if it is an opening delimiter
    pub fn opened_by(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::L_BRACE => Some(Self::Block),
            SyntaxKind::L_PAREN => Some(Self::Parens),
            SyntaxKind::L_BRACKET => Some(Self::Brackets),
            SyntaxKind::L_ATTR => Some(Self::Attribute),
            _ => None,
        }
    }

    /// The token that closes this context
    pub fn closer(self) -> Option<SyntaxKind> {
        match self {
            Self::TopLevel => None,
            Self::Block => Some(SyntaxKind::R_BRACE),
            Self::Parens => Some(SyntaxKind::R_PAREN),
            Self::Brackets | Self::Attribute => Some(SyntaxKind::R_BRACKET),
        }
    }

    /// How many closing tokens end this context
    pub fn closer_count(self) -> usize {
        match self {
            Self::TopLevel => 0,
            Self::Attribute => 2,
            _ => 1,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::TopLevel => "at top level",
            Self::Block => "in block",
            Self::Parens => "in parentheses",
            Self::Brackets => "in brackets",
            Self::Attribute => "in attribute",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SyntaxKind::L_BRACE, ParseContext::Block, SyntaxKind::R_BRACE)]
    #[case(SyntaxKind::L_PAREN, ParseContext::Parens, SyntaxKind::R_PAREN)]
    #[case(SyntaxKind::L_ATTR, ParseContext::Attribute, SyntaxKind::R_BRACKET)]
    #[case(SyntaxKind::L_BRACKET, ParseContext::Brackets, SyntaxKind::R_BRACKET)]
    fn test_openers_and_closers(
        #[case] opener: SyntaxKind,
        #[case] context: ParseContext,
        #[case] closer: SyntaxKind,
    ) {
        assert_eq!(ParseContext::opened_by(opener), Some(context));
        assert_eq!(context.closer(), Some(closer));
    }

    #[test]
    fn test_non_openers() {
        assert_eq!(ParseContext::opened_by(SyntaxKind::IDENT), None);
        assert_eq!(ParseContext::opened_by(SyntaxKind::LT), None);
        assert_eq!(ParseContext::TopLevel.closer(), None);
    }
}
