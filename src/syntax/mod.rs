//! Syntax trees and the edits that lead from one to the next

mod edit;
mod tree;

pub use edit::Edit;
pub use tree::{SyntaxTree, shares_subtree};
