//! Parser diagnostics
//!
//! Every error the lexer or the recovery engine reports carries:
//! - a categorized error code
//! - the byte range of the offending (or missing) input
//! - the structural context it occurred in, where known
//! - an optional hint and related locations (e.g. "opened here")

mod codes;
mod context;
mod error;

pub use codes::ErrorCode;
pub use context::ParseContext;
pub use error::{RelatedInfo, Severity, SyntaxError, SyntaxErrorBuilder};
