//! Incremental reparsing support
//!
//! A reparse lexes the new text from shortly before the first edit until the
//! tokens line up with the old ones again after the last edit, and runs the
//! normal engine over the result. At every shift the engine asks
//! [`ReuseContext::find`] whether a node of the old tree can stand in for the
//! tokens ahead; a node is taken as a whole (the same `GreenNode`, not a
//! copy) when the parse would have rebuilt it identically.
//!
//! That is the case when the node
//! - does not overlap any edited range
//! - contains no recovered errors
//! - was entered in the state the parser is in now
//! - covers exactly the tokens ahead, text and trivia included
//! - was reduced on the same lookahead kind that follows it now

use rowan::{GreenNodeData, NodeOrToken, TextSize, TokenAtOffset};
use rustc_hash::FxHashMap;

use crate::base::{Position, Span, TextRange};
use crate::parser::lexer::{Lexer, Token, tokenize_from};
use crate::parser::table::StateId;
use crate::parser::{SyntaxKind, SyntaxNode, SyntaxToken};
use crate::syntax::{Edit, SyntaxTree};

/// Parse facts about a node, taken when it was reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeState {
    /// State on top of the stack before the node's first token
    pub pre_state: StateId,
    /// Lookahead kind the node was reduced on
    pub follow: SyntaxKind,
}

/// Node states keyed by green node identity
#[derive(Debug, Clone, Default)]
pub struct NodeStates {
    map: FxHashMap<usize, NodeState>,
}

impl NodeStates {
    fn key(node: &GreenNodeData) -> usize {
        node as *const GreenNodeData as usize
    }

    pub(crate) fn record(&mut self, node: &GreenNodeData, state: NodeState) {
        self.map.insert(Self::key(node), state);
    }

    pub(crate) fn get(&self, node: &GreenNodeData) -> Option<NodeState> {
        self.map.get(&Self::key(node)).copied()
    }

    /// Carry the states of `node` and all its descendants over from `other`
    pub(crate) fn copy_subtree(&mut self, other: &NodeStates, node: &GreenNodeData) {
        let mut stack = vec![node];
        while let Some(node) = stack.pop() {
            if let Some(state) = other.get(node) {
                self.record(node, state);
            }
            stack.extend(node.children().filter_map(NodeOrToken::into_node));
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    new_start: usize,
    new_end: usize,
    old_start: usize,
    old_end: usize,
}

/// The changed regions of a text after a sequence of edits, in both old and
/// new coordinates
///
/// Text outside the segments is unchanged and maps between the two versions
/// by a constant shift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditMap {
    segments: Vec<Segment>,
}

impl EditMap {
    /// Compose `edits` over a text of `old_len` bytes. Returns `None` if an
    /// edit reaches past the text it applies to.
    pub fn new(edits: &[Edit], old_len: usize) -> Option<Self> {
        let mut map = Self::default();
        let mut len = old_len;
        for edit in edits {
            if !edit.is_well_formed() || edit.old_end > len {
                return None;
            }
            len = len - (edit.old_end - edit.start) + (edit.new_end - edit.start);
            if edit.old_end != edit.start || edit.new_end != edit.start {
                map.apply(edit);
            }
        }
        Some(map)
    }

    fn apply(&mut self, edit: &Edit) {
        let (start, end) = (edit.start, edit.old_end);
        // Segments touching start..end get merged into one.
        let first = self.segments.partition_point(|s| s.new_end < start);
        let last = self.segments.partition_point(|s| s.new_start <= end);

        let merged = if first < last {
            let a = self.segments[first];
            let b = self.segments[last - 1];
            Segment {
                new_start: start.min(a.new_start),
                new_end: end.max(b.new_end),
                old_start: if start < a.new_start {
                    a.old_start - (a.new_start - start)
                } else {
                    a.old_start
                },
                old_end: if end > b.new_end {
                    b.old_end + (end - b.new_end)
                } else {
                    b.old_end
                },
            }
        } else {
            Segment {
                new_start: start,
                new_end: end,
                old_start: self.unchanged_to_old(start, first),
                old_end: self.unchanged_to_old(end, first),
            }
        };

        let delta = edit.delta();
        let shift = |pos: usize| (pos as isize + delta) as usize;
        let merged = Segment {
            new_end: shift(merged.new_end),
            ..merged
        };
        self.segments.splice(first..last, std::iter::once(merged));
        for segment in &mut self.segments[first + 1..] {
            segment.new_start = shift(segment.new_start);
            segment.new_end = shift(segment.new_end);
        }
    }

    /// Map an unchanged new offset, `before` being the number of segments
    /// that end before it
    fn unchanged_to_old(&self, pos: usize, before: usize) -> usize {
        match before.checked_sub(1).map(|i| self.segments[i]) {
            Some(prev) => pos - prev.new_end + prev.old_end,
            None => pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First changed byte; identical in old and new coordinates
    pub fn first_change(&self) -> Option<usize> {
        self.segments.first().map(|s| s.new_start)
    }

    /// End of the last changed region in new coordinates
    pub fn last_change(&self) -> Option<usize> {
        self.segments.last().map(|s| s.new_end)
    }

    /// Old offset of the byte at new offset `pos`, `None` inside changed text
    pub fn to_old(&self, pos: usize) -> Option<usize> {
        let before = self.segments.partition_point(|s| s.new_end <= pos);
        match self.segments.get(before) {
            Some(s) if s.new_start <= pos => None,
            _ => Some(self.unchanged_to_old(pos, before)),
        }
    }

    /// Whether old range `start..end` overlaps text that was edited
    pub fn touches(&self, start: usize, end: usize) -> bool {
        self.segments.iter().any(|s| {
            if s.old_start == s.old_end {
                start < s.old_start && s.old_start < end
            } else {
                start < s.old_end && s.old_start < end
            }
        })
    }
}

/// Tokens for `new_text`: the old tree's tokens before the first edit, a
/// fresh lex of the edited region, and the old tree's tokens again once the
/// fresh ones line up with them in the unchanged text after the last edit
pub(crate) fn relex<'a>(old: &SyntaxTree, map: &EditMap, new_text: &'a str) -> Vec<Token<'a>> {
    let (Some(first_change), Some(last_change)) = (map.first_change(), map.last_change()) else {
        return tokenize_from(new_text, 0);
    };
    let start = relex_start(old, first_change);

    let old_tokens: Vec<SyntaxToken> = old
        .root()
        .descendants_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .filter(|token| !token.text_range().is_empty())
        .collect();
    let kept = old_tokens.partition_point(|token| usize::from(token.text_range().end()) <= start);

    let mut tokens = Vec::with_capacity(old_tokens.len());
    carry_over(&mut tokens, &old_tokens[..kept], 0, new_text, Position::default());

    for token in Lexer::starting_at(new_text, start) {
        let end = usize::from(token.range.end());
        let position = token.span.end;
        tokens.push(token);
        if end < last_change {
            continue;
        }
        // Past the last edit the texts agree, so once a token boundary
        // matches an old one every later token does too.
        let Some(old_end) = map.to_old(end) else {
            continue;
        };
        let resume = old_tokens[kept..]
            .binary_search_by_key(&old_end, |token| usize::from(token.text_range().start()));
        if let Ok(index) = resume {
            let shift = end as isize - old_end as isize;
            carry_over(&mut tokens, &old_tokens[kept + index..], shift, new_text, position);
            break;
        }
    }
    tokens
}

/// Append old tokens moved `shift` bytes along, with spans recomputed from
/// `position`
fn carry_over<'a>(
    tokens: &mut Vec<Token<'a>>,
    old: &[SyntaxToken],
    shift: isize,
    new_text: &'a str,
    mut position: Position,
) {
    for leaf in old {
        let range = leaf.text_range();
        let start = (usize::from(range.start()) as isize + shift) as usize;
        let range = TextRange::at(TextSize::from(start as u32), range.len());
        let text = &new_text[range];
        let end = position.advance(text);
        tokens.push(Token {
            kind: leaf.kind(),
            text,
            range,
            span: Span::new(position, end),
        });
        position = end;
    }
}

/// Relexing starts at the token holding the line break before the first
/// change, so tokens that could absorb the edited text are redone too.
fn relex_start(old: &SyntaxTree, first_change: usize) -> usize {
    let line = old.line_index().line_col(TextSize::from(first_change as u32)).line;
    let line_start = old
        .line_index()
        .line_start(line)
        .map_or(0, usize::from);
    if line_start == 0 {
        return 0;
    }
    let line_break = TextSize::from(line_start as u32 - 1);
    match old.root().token_at_offset(line_break).right_biased() {
        Some(token) => usize::from(token.text_range().start()),
        None => 0,
    }
}

/// A node picked for reuse
pub(crate) struct Reusable {
    pub node: SyntaxNode,
    /// Number of tokens the node covers
    pub token_count: usize,
    /// State after the node is pushed
    pub next: StateId,
}

pub(crate) struct ReuseContext<'o> {
    root: SyntaxNode,
    states: &'o NodeStates,
    map: EditMap,
    pub reused: usize,
}

impl<'o> ReuseContext<'o> {
    pub(crate) fn new(old: &'o SyntaxTree, map: EditMap) -> Self {
        Self {
            root: old.root(),
            states: old.node_states(),
            map,
            reused: 0,
        }
    }

    pub(crate) fn old_states(&self) -> &'o NodeStates {
        self.states
    }

    /// Old nodes starting where new offset `at` maps to, largest first
    fn candidates(&self, at: TextSize) -> Vec<SyntaxNode> {
        let Some(old) = self.map.to_old(usize::from(at)) else {
            return Vec::new();
        };
        let offset = TextSize::from(old as u32);
        let token = match self.root.token_at_offset(offset) {
            TokenAtOffset::None => return Vec::new(),
            TokenAtOffset::Single(token) => token,
            TokenAtOffset::Between(_, right) => right,
        };
        if token.text_range().start() != offset {
            return Vec::new();
        }
        let mut nodes: Vec<SyntaxNode> = token
            .parent_ancestors()
            .take_while(|node| node.text_range().start() == offset)
            .collect();
        nodes.reverse();
        nodes
    }

    /// Find the largest old node that can replace the tokens starting at
    /// `tokens[at]` when the parser is in state `top`. `goto` gives the state
    /// after a node of the given kind.
    pub(crate) fn find(
        &self,
        tokens: &[Token<'_>],
        at: usize,
        top: StateId,
        goto: impl Fn(SyntaxKind) -> Option<StateId>,
    ) -> Option<Reusable> {
        let first = tokens.get(at)?;
        self.candidates(first.offset())
            .into_iter()
            .find_map(|node| self.check(node, tokens, at, top, &goto))
    }

    fn check(
        &self,
        node: SyntaxNode,
        tokens: &[Token<'_>],
        at: usize,
        top: StateId,
        goto: &impl Fn(SyntaxKind) -> Option<StateId>,
    ) -> Option<Reusable> {
        let state = self.states.get(&node.green())?;
        if state.pre_state != top {
            return None;
        }
        let next = goto(node.kind())?;
        let range: TextRange = node.text_range();
        if self.map.touches(range.start().into(), range.end().into()) {
            return None;
        }

        let mut count = 0;
        for leaf in node.descendants_with_tokens().filter_map(|e| e.into_token()) {
            let token = tokens.get(at + count)?;
            if token.kind != leaf.kind() || token.text != leaf.text() {
                return None;
            }
            count += 1;
        }

        let follow = tokens[at + count..]
            .iter()
            .find(|t| !t.kind.is_trivia())
            .map_or(SyntaxKind::EOF, |t| t.kind);
        if follow != state.follow {
            return None;
        }

        Some(Reusable {
            node,
            token_count: count,
            next,
        })
    }
}
