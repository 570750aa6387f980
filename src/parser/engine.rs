//! Table-driven shift-reduce parser
//!
//! The engine runs a standard LR loop over the non-trivia tokens and builds
//! rowan green nodes as it reduces. Trivia and recovered garbage ride along
//! on the stack as *extras*: entries that keep the state below them, so the
//! automaton never sees them, but whose text ends up in the tree wherever
//! the surrounding reductions put it.
//!
//! Parsing never fails. When the table has no action for the lookahead the
//! engine asks [`recovery::choose`] for a local repair, records a
//! [`SyntaxError`] and carries on, so the root always spans the whole input.

use rayon::prelude::*;
use rowan::{GreenNode, GreenToken, NodeOrToken, TextRange, TextSize};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::parser::SyntaxKind;
use crate::parser::errors::{ErrorCode, ParseContext, SyntaxError};
use crate::parser::grammar::NonTerminal;
use crate::parser::incremental::{EditMap, NodeState, NodeStates, ReuseContext, relex};
use crate::parser::language::{Language, LanguageError, language};
use crate::parser::lexer::{Token, lex_error, tokenize};
use crate::parser::recovery::{self, Recovery};
use crate::parser::table::{Action, ParseTable, ProductionId, StateId};
use crate::syntax::{Edit, SyntaxTree};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Tunables for error recovery and reparsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Zero-width tokens inserted at one position before skipping or
    /// wrapping is tried instead
    pub max_insertions: usize,
    /// Tokens after an unexpected one that are checked when deciding
    /// whether to skip it
    pub skip_window: usize,
    /// Reuse subtrees of the old tree in [`Parser::reparse`]
    pub reuse_subtrees: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_insertions: 3,
            skip_window: 3,
            reuse_subtrees: true,
        }
    }
}

/// A parser for one language
///
/// Parsers are cheap to create and hold no per-parse state; a parser can be
/// used for any number of parses, one at a time or from several threads.
#[derive(Debug, Clone)]
pub struct Parser {
    language: Language,
    options: ParserOptions,
    /// Nonterminal that produces each node kind, for pushing reused nodes
    node_symbols: FxHashMap<SyntaxKind, NonTerminal>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// A parser for the built-in Metal language
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        let language = language().clone();
        Self {
            node_symbols: node_symbols(language.table()),
            language,
            options,
        }
    }

    /// Switch to another language, refusing tables this build cannot drive
    pub fn set_language(&mut self, language: &Language) -> Result<(), LanguageError> {
        language.check_compatible()?;
        self.node_symbols = node_symbols(language.table());
        self.language = language.clone();
        Ok(())
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ParserOptions) {
        self.options = options;
    }

    pub fn parse(&self, text: &str) -> SyntaxTree {
        let tokens = tokenize(text);
        self.parse_tokens(text, &tokens)
    }

    /// Parse an already lexed text. `tokens` must tile `text` in order, as
    /// the lexer produces them.
    pub fn parse_tokens(&self, text: &str, tokens: &[Token<'_>]) -> SyntaxTree {
        self.run(text, tokens, None)
    }

    /// Parse `new_text`, the result of applying `edits` to `old.text()`,
    /// reusing the parts of `old` the edits left alone
    ///
    /// The result is the tree [`Parser::parse`] would build for `new_text`.
    /// Edits that do not lead from the old text to the new one are ignored
    /// and the text is parsed from scratch.
    pub fn reparse(&self, old: &SyntaxTree, edits: &[Edit], new_text: &str) -> SyntaxTree {
        if !self.options.reuse_subtrees || old.language_id() != self.language.id() {
            return self.parse(new_text);
        }
        let expected_len = edits
            .iter()
            .fold(old.text().len() as isize, |len, edit| len + edit.delta());
        let map = match EditMap::new(edits, old.text().len()) {
            Some(map) if expected_len == new_text.len() as isize => map,
            _ => {
                debug!(
                    old_len = old.text().len(),
                    new_len = new_text.len(),
                    "edits do not match the texts, parsing from scratch"
                );
                return self.parse(new_text);
            }
        };

        let tokens = relex(old, &map, new_text);
        let mut reuse = ReuseContext::new(old, map);
        let tree = self.run(new_text, &tokens, Some(&mut reuse));
        debug!(
            reused = reuse.reused,
            tokens = tokens.len(),
            "incremental reparse"
        );
        tree
    }

    /// Parse independent texts in parallel, one parser per worker
    pub fn parse_batch(&self, texts: &[&str]) -> Vec<SyntaxTree> {
        texts
            .par_iter()
            .map_init(|| self.clone(), |parser, text| parser.parse(text))
            .collect()
    }

    fn run(&self, text: &str, tokens: &[Token<'_>], reuse: Option<&mut ReuseContext<'_>>) -> SyntaxTree {
        let engine = Engine {
            table: self.language.table(),
            options: &self.options,
            node_symbols: &self.node_symbols,
            tokens,
            pos: 0,
            pending: Vec::new(),
            stack: Vec::new(),
            cursor: TextSize::from(0),
            errors: Vec::new(),
            states: NodeStates::default(),
            inserted: 0,
            last_skip: false,
            reuse,
        };
        let (green, errors, states) = engine.run();
        SyntaxTree::new(green, text.into(), errors, states, self.language.id())
    }
}

/// Parse Metal source text
pub fn parse(text: &str) -> SyntaxTree {
    Parser::new().parse(text)
}

/// Incrementally reparse Metal source text, see [`Parser::reparse`]
pub fn reparse(old: &SyntaxTree, edits: &[Edit], new_text: &str) -> SyntaxTree {
    Parser::new().reparse(old, edits, new_text)
}

/// Parse Metal source texts in parallel
pub fn parse_batch(texts: &[&str]) -> Vec<SyntaxTree> {
    Parser::new().parse_batch(texts)
}

fn node_symbols(table: &ParseTable) -> FxHashMap<SyntaxKind, NonTerminal> {
    (0..table.production_count())
        .map(|id| table.production(id as ProductionId))
        .filter_map(|info| info.node.map(|kind| (kind, info.lhs)))
        .collect()
}

fn green_token(token: &Token<'_>) -> GreenElement {
    GreenToken::new(token.kind.into(), token.text).into()
}

/// How a kind reads in a diagnostic
fn describe(kind: SyntaxKind) -> String {
    if let Some(text) = kind.display_text() {
        return format!("`{text}`");
    }
    match kind {
        SyntaxKind::EOF => "end of input".to_string(),
        SyntaxKind::IDENT => "identifier".to_string(),
        SyntaxKind::PRIMITIVE_TYPE => "type".to_string(),
        _ if kind.is_literal() => "literal".to_string(),
        _ => {
            let name = format!("{kind:?}").to_lowercase();
            match name.strip_suffix("_kw") {
                Some(keyword) => format!("`{keyword}`"),
                None => name,
            }
        }
    }
}

struct Entry {
    state: StateId,
    /// Trivia or recovered input; does not count as a grammar symbol
    extra: bool,
    /// Holds the children of an `ERROR` node that later skips may extend
    skipped: bool,
    has_error: bool,
    offset: TextSize,
    children: Vec<GreenElement>,
}

impl Entry {
    fn into_children(self) -> Vec<GreenElement> {
        if self.skipped {
            vec![GreenNode::new(SyntaxKind::ERROR.into(), self.children).into()]
        } else {
            self.children
        }
    }
}

struct Engine<'e, 'o> {
    table: &'e ParseTable,
    options: &'e ParserOptions,
    node_symbols: &'e FxHashMap<SyntaxKind, NonTerminal>,
    tokens: &'e [Token<'e>],
    /// Index of the next unread token
    pos: usize,
    /// Trivia read past while looking for the lookahead
    pending: Vec<usize>,
    stack: Vec<Entry>,
    /// End offset of the text on the stack
    cursor: TextSize,
    errors: Vec<SyntaxError>,
    states: NodeStates,
    /// Tokens inserted since the last token was consumed
    inserted: usize,
    last_skip: bool,
    reuse: Option<&'e mut ReuseContext<'o>>,
}

impl Engine<'_, '_> {
    fn run(mut self) -> (GreenNode, Vec<SyntaxError>, NodeStates) {
        loop {
            let lookahead = self.lookahead();
            match self.table.action(self.top_state(), lookahead) {
                Action::Shift(next) => {
                    if !self.reuse_subtree() {
                        self.shift(next);
                    }
                }
                Action::Reduce(production) => self.reduce(production, lookahead),
                Action::Accept => break,
                Action::Error => {
                    if self.recover(lookahead) {
                        break;
                    }
                }
            }
        }
        self.finish()
    }

    fn top_state(&self) -> StateId {
        self.stack.last().map_or(0, |entry| entry.state)
    }

    /// Kind of the next non-trivia token, moving trivia before it to `pending`
    fn lookahead(&mut self) -> SyntaxKind {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                return token.kind;
            }
            self.pending.push(self.pos);
            self.pos += 1;
        }
        SyntaxKind::EOF
    }

    fn upcoming(&self) -> Vec<SyntaxKind> {
        let window = self.options.skip_window;
        let mut kinds: Vec<SyntaxKind> = self
            .tokens
            .get(self.pos + 1..)
            .unwrap_or_default()
            .iter()
            .map(|token| token.kind)
            .filter(|kind| !kind.is_trivia())
            .take(window)
            .collect();
        if kinds.len() < window {
            kinds.push(SyntaxKind::EOF);
        }
        kinds
    }

    fn push(&mut self, entry: Entry) {
        self.stack.push(entry);
    }

    fn flush_pending(&mut self) {
        let tokens = self.tokens;
        for index in std::mem::take(&mut self.pending) {
            let token = &tokens[index];
            let state = self.top_state();
            self.push(Entry {
                state,
                extra: true,
                skipped: false,
                has_error: false,
                offset: token.offset(),
                children: vec![green_token(token)],
            });
            self.cursor = token.range.end();
        }
    }

    fn shift(&mut self, next: StateId) {
        self.flush_pending();
        let token = &self.tokens[self.pos];
        self.push(Entry {
            state: next,
            extra: false,
            skipped: false,
            has_error: false,
            offset: token.offset(),
            children: vec![green_token(token)],
        });
        self.cursor = token.range.end();
        self.pos += 1;
        self.inserted = 0;
        self.last_skip = false;
    }

    fn reduce(&mut self, production: ProductionId, lookahead: SyntaxKind) {
        let table = self.table;
        let info = table.production(production);

        // Extras on top belong after the reduced node, not inside it.
        let trailing_from = self
            .stack
            .iter()
            .rposition(|entry| !entry.extra)
            .map_or(0, |i| i + 1);
        let mut trailing = self.stack.split_off(trailing_from);

        let mut start = self.stack.len();
        let mut remaining = info.len;
        while remaining > 0 && start > 0 {
            start -= 1;
            if !self.stack[start].extra {
                remaining -= 1;
            }
        }

        let mut popped = self.stack.drain(start..);
        // The first entry's children are reused so left-recursive lists
        // grow in place.
        let (mut children, mut has_error, offset) = match popped.next() {
            Some(first) => (first.children, first.has_error, first.offset),
            None => (
                Vec::new(),
                false,
                trailing.first().map_or(self.cursor, |entry| entry.offset),
            ),
        };
        for entry in popped {
            has_error |= entry.has_error;
            children.extend(entry.into_children());
        }

        let below = self.top_state();
        // `ParseTable::is_well_formed` rejects tables where a reduction can
        // end on a state without this goto.
        let next = table.goto(below, info.lhs);
        debug_assert!(
            next.is_some(),
            "no goto on `{}` from state {below}",
            table.nonterminal_name(info.lhs)
        );
        let next = next.unwrap_or(below);

        if let Some(kind) = info.node {
            let node = GreenNode::new(kind.into(), children);
            if !has_error && node.text_len() > TextSize::from(0) {
                self.states.record(
                    &node,
                    NodeState {
                        pre_state: below,
                        follow: lookahead,
                    },
                );
            }
            children = vec![node.into()];
        }

        self.push(Entry {
            state: next,
            extra: false,
            skipped: false,
            has_error,
            offset,
            children,
        });
        for entry in &mut trailing {
            entry.state = next;
        }
        self.stack.append(&mut trailing);
    }

    /// Push an unchanged node of the old tree instead of reparsing its tokens
    fn reuse_subtree(&mut self) -> bool {
        let top = self.top_state();
        let table = self.table;
        let symbols = self.node_symbols;
        let Some(reuse) = self.reuse.as_deref() else {
            return false;
        };
        let goto = |kind: SyntaxKind| symbols.get(&kind).and_then(|&nt| table.goto(top, nt));
        let Some(found) = reuse.find(self.tokens, self.pos, top, goto) else {
            return false;
        };
        let old_states = reuse.old_states();

        let green = found.node.green().into_owned();
        trace!(kind = ?found.node.kind(), tokens = found.token_count, "reusing subtree");
        self.flush_pending();
        self.states.copy_subtree(old_states, &green);
        let offset = self.cursor;
        self.cursor += green.text_len();
        self.push(Entry {
            state: found.next,
            extra: false,
            skipped: false,
            has_error: false,
            offset,
            children: vec![green.into()],
        });
        self.pos += found.token_count;
        self.inserted = 0;
        self.last_skip = false;
        if let Some(reuse) = self.reuse.as_deref_mut() {
            reuse.reused += 1;
        }
        true
    }

    /// Repair the input at an unexpected lookahead. Returns true when the
    /// parse has to end here.
    fn recover(&mut self, lookahead: SyntaxKind) -> bool {
        let states: Vec<StateId> = std::iter::once(0)
            .chain(self.stack.iter().filter(|e| !e.extra).map(|e| e.state))
            .collect();
        let upcoming = self.upcoming();
        let can_insert = self.inserted < self.options.max_insertions;
        let decision = recovery::choose(self.table, &states, lookahead, &upcoming, can_insert);
        trace!(?lookahead, ?decision, depth = states.len(), "recovering");

        match decision {
            Recovery::Insert(kind) => self.insert(kind),
            Recovery::Skip | Recovery::Wrap(0) if lookahead == SyntaxKind::EOF => return true,
            Recovery::Skip | Recovery::Wrap(0) => self.skip(),
            Recovery::Wrap(depth) => self.wrap(depth, lookahead),
        }
        false
    }

    fn insert(&mut self, kind: SyntaxKind) {
        loop {
            match self.table.action(self.top_state(), kind) {
                Action::Reduce(production) => self.reduce(production, kind),
                Action::Shift(next) => {
                    let error = self.missing_error(kind);
                    self.errors.push(error);
                    let missing = GreenNode::new(
                        SyntaxKind::MISSING.into(),
                        vec![GreenToken::new(kind.into(), "").into()],
                    );
                    self.push(Entry {
                        state: next,
                        extra: false,
                        skipped: false,
                        has_error: true,
                        offset: self.cursor,
                        children: vec![missing.into()],
                    });
                    break;
                }
                Action::Accept | Action::Error => break,
            }
        }
        self.inserted += 1;
        self.last_skip = false;
    }

    fn skip(&mut self) {
        let tokens = self.tokens;
        let token = &tokens[self.pos];
        self.pos += 1;

        let extend = self.last_skip && self.stack.last().is_some_and(|entry| entry.skipped);
        let expected = self.expected_hint();
        if extend {
            let pending: Vec<GreenElement> = std::mem::take(&mut self.pending)
                .into_iter()
                .map(|index| green_token(&tokens[index]))
                .collect();
            if let Some(top) = self.stack.last_mut() {
                top.children.extend(pending);
                top.children.push(green_token(token));
            }
        } else {
            self.flush_pending();
            let state = self.top_state();
            self.push(Entry {
                state,
                extra: true,
                skipped: true,
                has_error: true,
                offset: token.offset(),
                children: vec![green_token(token)],
            });
        }
        self.cursor = token.range.end();

        let context = self.context();
        if let Some(error) = lex_error(token) {
            self.errors.push(error.with_context(context));
        } else if let Some(last) = self
            .errors
            .last_mut()
            .filter(|last| extend && last.code == ErrorCode::E0202)
        {
            last.range = last.range.cover(token.range);
        } else {
            let mut builder = SyntaxError::builder(ErrorCode::E0202)
                .message(format!("unexpected `{}`", token.text))
                .range(token.range)
                .context(context);
            if let Some(hint) = expected {
                builder = builder.hint(hint);
            }
            self.errors.push(builder.build());
        }

        self.last_skip = true;
        self.inserted = 0;
    }

    fn wrap(&mut self, depth: usize, lookahead: SyntaxKind) {
        let mut start = self.stack.len();
        let mut remaining = depth;
        while remaining > 0 && start > 0 {
            start -= 1;
            if !self.stack[start].extra {
                remaining -= 1;
            }
        }
        let popped: Vec<Entry> = self.stack.drain(start..).collect();
        let offset = popped.first().map_or(self.cursor, |entry| entry.offset);
        let children: Vec<GreenElement> = popped.into_iter().flat_map(Entry::into_children).collect();

        let state = self.top_state();
        self.push(Entry {
            state,
            extra: true,
            skipped: false,
            has_error: true,
            offset,
            children: vec![GreenNode::new(SyntaxKind::ERROR.into(), children).into()],
        });

        let error = SyntaxError::builder(ErrorCode::E0203)
            .message(format!("unexpected input before {}", describe(lookahead)))
            .range(TextRange::new(offset, self.cursor))
            .context(self.context())
            .build();
        self.errors.push(error);
        self.last_skip = false;
    }

    fn missing_error(&self, kind: SyntaxKind) -> SyntaxError {
        let mut builder = SyntaxError::builder(ErrorCode::E0201)
            .message(format!("missing {}", describe(kind)))
            .at_offset(self.cursor)
            .hint(format!("insert {}", describe(kind)));
        if let Some((context, opener)) = self.open_delimiter() {
            builder = builder.context(context);
            if context.closer() == Some(kind) {
                builder = builder.related(format!("{} opened here", context.description()), opener);
            }
        }
        builder.build()
    }

    fn context(&self) -> ParseContext {
        self.open_delimiter()
            .map_or(ParseContext::TopLevel, |(context, _)| context)
    }

    /// Innermost opening delimiter on the stack that has not been closed
    fn open_delimiter(&self) -> Option<(ParseContext, TextRange)> {
        let mut closed = 0;
        for entry in self.stack.iter().rev().filter(|e| !e.extra) {
            let [NodeOrToken::Token(token)] = entry.children.as_slice() else {
                continue;
            };
            let kind = SyntaxKind::from(token.kind());
            if matches!(
                kind,
                SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET | SyntaxKind::R_BRACE
            ) {
                closed += 1;
                continue;
            }
            if let Some(context) = ParseContext::opened_by(kind) {
                let needed = context.closer_count();
                if closed >= needed {
                    closed -= needed;
                } else {
                    return Some((context, TextRange::at(entry.offset, token.text_len())));
                }
            }
        }
        None
    }

    fn expected_hint(&self) -> Option<String> {
        let expected: Vec<String> = self
            .table
            .expected(self.top_state())
            .map(describe)
            .collect();
        match expected.as_slice() {
            [] => None,
            [only] => Some(format!("expected {only}")),
            many if many.len() <= 6 => Some(format!("expected one of {}", many.join(", "))),
            _ => None,
        }
    }

    fn finish(mut self) -> (GreenNode, Vec<SyntaxError>, NodeStates) {
        self.flush_pending();
        let children: Vec<GreenElement> = std::mem::take(&mut self.stack)
            .into_iter()
            .flat_map(Entry::into_children)
            .collect();
        let root = GreenNode::new(SyntaxKind::SOURCE_FILE.into(), children);
        self.errors.sort_by_key(|error| error.range.start());
        (root, self.errors, self.states)
    }
}
