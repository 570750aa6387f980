//! The result of a parse
//!
//! A [`SyntaxTree`] owns an immutable green tree together with the text it
//! was parsed from, the errors found on the way and the per-node parse
//! states incremental reparsing needs. Cloning is cheap and trees built by
//! reparsing share every untouched subtree with their ancestors.

use std::fmt;
use std::sync::Arc;

use rowan::{GreenNode, GreenNodeData, TokenAtOffset, WalkEvent};
use rustc_hash::FxHashSet;

use crate::base::{LineCol, LineIndex, TextRange, TextSize};
use crate::parser::errors::SyntaxError;
use crate::parser::incremental::NodeStates;
use crate::parser::{SyntaxNode, SyntaxToken};

#[derive(Clone)]
pub struct SyntaxTree {
    green: GreenNode,
    text: Arc<str>,
    errors: Arc<[SyntaxError]>,
    states: Arc<NodeStates>,
    line_index: Arc<LineIndex>,
    language_id: usize,
}

impl SyntaxTree {
    pub(crate) fn new(
        green: GreenNode,
        text: Arc<str>,
        errors: Vec<SyntaxError>,
        states: NodeStates,
        language_id: usize,
    ) -> Self {
        Self {
            line_index: Arc::new(LineIndex::new(&text)),
            green,
            text,
            errors: errors.into(),
            states: Arc::new(states),
            language_id,
        }
    }

    /// Root node of the red tree; parent and sibling links are computed on
    /// demand
    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// The source text. The tree is lossless, so this is also the text of
    /// the root node.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Source text in `range`, `None` if the range is out of bounds or
    /// splits a character
    pub fn text_range_str(&self, range: TextRange) -> Option<&str> {
        self.text.get(std::ops::Range::<usize>::from(range))
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        self.line_index.line_col(offset)
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `ERROR` and `MISSING` nodes, in source order
    pub fn error_nodes(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.root()
            .descendants()
            .filter(|node| node.kind().is_error())
    }

    /// Smallest node covering `range`
    pub fn node_at_range(&self, range: TextRange) -> Option<SyntaxNode> {
        let root = self.root();
        if !root.text_range().contains_range(range) {
            return None;
        }
        match root.covering_element(range) {
            rowan::NodeOrToken::Node(node) => Some(node),
            rowan::NodeOrToken::Token(token) => token.parent(),
        }
    }

    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        self.root().token_at_offset(offset)
    }

    /// Same kinds, same token texts, same shape. Which subtrees are
    /// physically shared does not matter.
    pub fn structurally_eq(&self, other: &SyntaxTree) -> bool {
        self.green == other.green
    }

    /// Number of nodes of this tree that are physically shared with `other`
    pub fn shared_nodes(&self, other: &SyntaxTree) -> usize {
        let theirs: FxHashSet<*const GreenNodeData> = other
            .root()
            .descendants()
            .map(|node| green_ptr(&node))
            .collect();
        self.root()
            .descendants()
            .filter(|node| theirs.contains(&green_ptr(node)))
            .count()
    }

    /// Render the tree one element per line, indented by depth:
    /// `KIND@start..end` for nodes, followed by the quoted text for tokens
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        let mut depth = 0;
        for event in self.root().preorder_with_tokens() {
            match event {
                WalkEvent::Enter(element) => {
                    let range = element.text_range();
                    out.push_str(&"  ".repeat(depth));
                    out.push_str(&format!(
                        "{:?}@{}..{}",
                        element.kind(),
                        u32::from(range.start()),
                        u32::from(range.end())
                    ));
                    if let Some(token) = element.as_token() {
                        out.push_str(&format!(" {:?}", token.text()));
                    }
                    out.push('\n');
                    depth += 1;
                }
                WalkEvent::Leave(_) => depth -= 1,
            }
        }
        out
    }

    pub(crate) fn node_states(&self) -> &NodeStates {
        &self.states
    }

    pub(crate) fn language_id(&self) -> usize {
        self.language_id
    }
}

/// Whether two nodes are backed by the same green node
pub fn shares_subtree(a: &SyntaxNode, b: &SyntaxNode) -> bool {
    std::ptr::eq(green_ptr(a), green_ptr(b))
}

fn green_ptr(node: &SyntaxNode) -> *const GreenNodeData {
    let green = node.green();
    &*green as *const GreenNodeData
}

impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.structurally_eq(other) && self.errors == other.errors
    }
}

impl Eq for SyntaxTree {}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_tree())?;
        for error in self.errors.iter() {
            writeln!(f, "{error}")?;
        }
        Ok(())
    }
}
