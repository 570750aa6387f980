//! LALR(1) parse table construction
//!
//! The table is built once per grammar: the LR(0) automaton first (states are
//! deduplicated by their kernel items), then LALR(1) lookaheads by propagating
//! them to a fixed point, then dense action and goto rows. Shift/reduce and
//! reduce/reduce conflicts are settled by precedence where the grammar
//! declares it; any other conflict fails the build.

use crate::parser::SyntaxKind;
use crate::parser::grammar::{Assoc, Grammar, NonTerminal, Symbol};
use crate::parser::syntax_kind::TERMINAL_COUNT;
use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;

pub type StateId = u32;
pub type ProductionId = u32;

/// Version of the table layout. Bumped whenever `ParseTable` changes shape.
pub const ABI_VERSION: u32 = 3;

/// Oldest table layout this parser can still drive
pub const MIN_COMPATIBLE_ABI_VERSION: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "artifact", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Error,
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "shift/reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce/reduce"),
        }
    }
}

/// Errors raised while validating a grammar or building its table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    EmptyGrammar,

    #[error("`{0:?}` cannot appear in a production")]
    InvalidTerminal(SyntaxKind),

    #[error("nonterminal `{0}` has no productions")]
    UndefinedSymbol(SmolStr),

    #[error("nonterminal `{0}` is unreachable from the start symbol")]
    UnreachableSymbol(SmolStr),

    #[error("nonterminal `{0}` derives no terminal string")]
    UnproductiveSymbol(SmolStr),

    #[error("{kind} conflict in state {state} on {lookahead:?}: `{first}` vs `{second}`")]
    Conflict {
        kind: ConflictKind,
        state: StateId,
        lookahead: SyntaxKind,
        first: String,
        second: String,
    },
}

/// What the driver needs to know about a production at reduce time
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "artifact", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductionInfo {
    pub lhs: NonTerminal,
    pub len: u16,
    /// Kind of the node built on reduction, `None` when the lhs is hidden
    pub node: Option<SyntaxKind>,
}

/// Dense LALR(1) tables for one grammar
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "artifact", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseTable {
    pub(crate) abi_version: u32,
    pub(crate) symbol_count: u16,
    state_count: u32,
    nonterminal_count: u16,
    actions: Vec<Action>,
    gotos: Vec<Option<StateId>>,
    productions: Vec<ProductionInfo>,
    nonterminal_names: Vec<String>,
}

impl ParseTable {
    pub fn build(grammar: &Grammar) -> Result<ParseTable, GrammarError> {
        grammar.validate()?;
        let table = LalrBuilder::new(grammar).build()?;
        tracing::debug!(
            "built parse table: {} states, {} productions",
            table.state_count,
            table.productions.len()
        );
        Ok(table)
    }

    pub fn abi_version(&self) -> u32 {
        self.abi_version
    }

    pub fn symbol_count(&self) -> usize {
        self.symbol_count as usize
    }

    pub fn state_count(&self) -> usize {
        self.state_count as usize
    }

    pub fn production_count(&self) -> usize {
        self.productions.len()
    }

    pub fn action(&self, state: StateId, terminal: SyntaxKind) -> Action {
        debug_assert!(terminal.is_terminal());
        self.actions[state as usize * TERMINAL_COUNT + terminal as usize]
    }

    pub fn goto(&self, state: StateId, nt: NonTerminal) -> Option<StateId> {
        self.gotos[state as usize * self.nonterminal_count as usize + nt.index()]
    }

    pub fn production(&self, production: ProductionId) -> &ProductionInfo {
        &self.productions[production as usize]
    }

    pub fn nonterminal_name(&self, nt: NonTerminal) -> &str {
        &self.nonterminal_names[nt.index()]
    }

    /// Terminals with a non-error action in `state`
    pub fn expected(&self, state: StateId) -> impl Iterator<Item = SyntaxKind> + '_ {
        let row = &self.actions[state as usize * TERMINAL_COUNT..][..TERMINAL_COUNT];
        row.iter().enumerate().filter_map(|(raw, action)| {
            (*action != Action::Error)
                .then(|| SyntaxKind::from_raw(raw as u16))
                .flatten()
        })
    }

    /// Check that the rows have the width this build expects and that the
    /// driver can never step outside them.
    ///
    /// Beyond index bounds this checks that every reduction lands on a goto:
    /// for each `Reduce(p)` in state `q`, every state `len(p)` transitions
    /// before `q` has a goto on the production's lhs, and none of the states
    /// passed on the way back is the start state. A table built from a grammar
    /// always has this shape; a hand-edited artifact may not.
    pub(crate) fn is_well_formed(&self) -> bool {
        let states = self.state_count as usize;
        let nonterminals = self.nonterminal_count as usize;
        states > 0
            && self.actions.len() == states * TERMINAL_COUNT
            && self.gotos.len() == states * nonterminals
            && self.nonterminal_names.len() == nonterminals
            && self.productions.iter().all(|info| info.lhs.index() < nonterminals)
            && self.actions.iter().all(|action| match *action {
                Action::Shift(next) => (next as usize) < states,
                Action::Reduce(p) => (p as usize) < self.productions.len(),
                Action::Error | Action::Accept => true,
            })
            && self.gotos.iter().flatten().all(|&next| (next as usize) < states)
            && self.reductions_reach_gotos()
    }

    fn reductions_reach_gotos(&self) -> bool {
        let states = self.state_count as usize;
        let mut predecessors = vec![Vec::new(); states];
        for state in 0..states {
            let id = state as StateId;
            let shifts = self.actions[state * TERMINAL_COUNT..][..TERMINAL_COUNT]
                .iter()
                .filter_map(|action| match *action {
                    Action::Shift(next) => Some(next),
                    _ => None,
                });
            let gotos = self.gotos[state * self.nonterminal_count as usize..]
                [..self.nonterminal_count as usize]
                .iter()
                .flatten()
                .copied();
            for next in shifts.chain(gotos) {
                predecessors[next as usize].push(id);
            }
        }

        let mut frontier = vec![false; states];
        let mut previous = vec![false; states];
        for state in 0..states {
            let row = &self.actions[state * TERMINAL_COUNT..][..TERMINAL_COUNT];
            let mut reduced: Vec<ProductionId> = row
                .iter()
                .filter_map(|action| match *action {
                    Action::Reduce(p) => Some(p),
                    _ => None,
                })
                .collect();
            reduced.sort_unstable();
            reduced.dedup();

            for production in reduced {
                let info = &self.productions[production as usize];
                frontier.fill(false);
                frontier[state] = true;
                for _ in 0..info.len {
                    if frontier[0] {
                        return false;
                    }
                    std::mem::swap(&mut frontier, &mut previous);
                    frontier.fill(false);
                    for (at, _) in previous.iter().enumerate().filter(|(_, on)| **on) {
                        for &before in &predecessors[at] {
                            frontier[before as usize] = true;
                        }
                    }
                }
                let lands = frontier
                    .iter()
                    .enumerate()
                    .filter(|(_, on)| **on)
                    .all(|(at, _)| self.goto(at as StateId, info.lhs).is_some());
                if !lands {
                    return false;
                }
            }
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn without_states(&self) -> Self {
        Self {
            state_count: 0,
            actions: Vec::new(),
            gotos: Vec::new(),
            ..self.clone()
        }
    }
}

// =============================================================================
// LALR(1) construction
// =============================================================================

const WORDS: usize = TERMINAL_COUNT.div_ceil(64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct TerminalSet([u64; WORDS]);

impl TerminalSet {
    fn insert(&mut self, kind: SyntaxKind) -> bool {
        let (word, bit) = (kind as usize / 64, 1u64 << (kind as usize % 64));
        let fresh = self.0[word] & bit == 0;
        self.0[word] |= bit;
        fresh
    }

    fn union(&mut self, other: &TerminalSet) -> bool {
        let mut changed = false;
        for (mine, theirs) in self.0.iter_mut().zip(other.0.iter()) {
            let merged = *mine | *theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    fn iter(&self) -> impl Iterator<Item = SyntaxKind> + '_ {
        (0..TERMINAL_COUNT)
            .filter(|&raw| self.0[raw / 64] & (1u64 << (raw % 64)) != 0)
            .filter_map(|raw| SyntaxKind::from_raw(raw as u16))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Item {
    production: u32,
    dot: u16,
}

struct LalrBuilder<'g> {
    grammar: &'g Grammar,
    /// `$accept -> start`, numbered after the grammar's own productions
    augmented: [Symbol; 1],
    nullable: Vec<bool>,
    first: Vec<TerminalSet>,
    kernels: IndexSet<Vec<Item>>,
    transitions: Vec<IndexMap<Symbol, StateId>>,
}

impl<'g> LalrBuilder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let mut builder = Self {
            grammar,
            augmented: [Symbol::NonTerminal(grammar.start())],
            nullable: vec![false; grammar.nonterminals().len()],
            first: vec![TerminalSet::default(); grammar.nonterminals().len()],
            kernels: IndexSet::new(),
            transitions: Vec::new(),
        };
        builder.compute_first_sets();
        builder
    }

    fn augmented_id(&self) -> u32 {
        self.grammar.productions().len() as u32
    }

    fn rhs(&self, production: u32) -> &[Symbol] {
        if production == self.augmented_id() {
            &self.augmented
        } else {
            &self.grammar.productions()[production as usize].rhs
        }
    }

    fn compute_first_sets(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.grammar.productions() {
                let lhs = production.lhs.index();
                let mut all_nullable = true;
                for &symbol in &production.rhs {
                    match symbol {
                        Symbol::Terminal(kind) => {
                            changed |= self.first[lhs].insert(kind);
                            all_nullable = false;
                        }
                        Symbol::NonTerminal(nt) => {
                            let first = self.first[nt.index()];
                            changed |= self.first[lhs].union(&first);
                            if !self.nullable[nt.index()] {
                                all_nullable = false;
                            }
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if all_nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
    }

    /// FIRST of a symbol string, and whether the whole string is nullable
    fn first_of(&self, symbols: &[Symbol]) -> (TerminalSet, bool) {
        let mut set = TerminalSet::default();
        for &symbol in symbols {
            match symbol {
                Symbol::Terminal(kind) => {
                    set.insert(kind);
                    return (set, false);
                }
                Symbol::NonTerminal(nt) => {
                    set.union(&self.first[nt.index()]);
                    if !self.nullable[nt.index()] {
                        return (set, false);
                    }
                }
            }
        }
        (set, true)
    }

    fn closure(&self, kernel: &[Item]) -> Vec<Item> {
        let mut items: IndexSet<Item> = kernel.iter().copied().collect();
        let mut next = 0;
        while next < items.len() {
            let item = items[next];
            next += 1;
            if let Some(Symbol::NonTerminal(nt)) = self.rhs(item.production).get(item.dot as usize) {
                for &p in self.grammar.productions_of(*nt) {
                    items.insert(Item {
                        production: p as u32,
                        dot: 0,
                    });
                }
            }
        }
        items.into_iter().collect()
    }

    fn build_automaton(&mut self) {
        let start = vec![Item {
            production: self.augmented_id(),
            dot: 0,
        }];
        self.kernels.insert(start);
        let mut next = 0;
        while next < self.kernels.len() {
            let kernel = self.kernels[next].clone();
            next += 1;

            let mut advanced: IndexMap<Symbol, Vec<Item>> = IndexMap::new();
            for item in self.closure(&kernel) {
                if let Some(&symbol) = self.rhs(item.production).get(item.dot as usize) {
                    advanced.entry(symbol).or_default().push(Item {
                        production: item.production,
                        dot: item.dot + 1,
                    });
                }
            }

            let mut row = IndexMap::new();
            for (symbol, mut target) in advanced {
                target.sort();
                target.dedup();
                let (id, _) = self.kernels.insert_full(target);
                row.insert(symbol, id as StateId);
            }
            self.transitions.push(row);
        }
    }

    /// LR(1) closure of a state given its kernel lookaheads
    fn closure_with_lookaheads(
        &self,
        state: usize,
        lookaheads: &[TerminalSet],
    ) -> IndexMap<Item, TerminalSet> {
        let mut items: IndexMap<Item, TerminalSet> = self.kernels[state]
            .iter()
            .copied()
            .zip(lookaheads.iter().copied())
            .collect();
        let mut work: Vec<Item> = items.keys().copied().collect();
        while let Some(item) = work.pop() {
            let rhs = self.rhs(item.production);
            let Some(Symbol::NonTerminal(nt)) = rhs.get(item.dot as usize) else {
                continue;
            };
            let (mut follow, nullable) = self.first_of(&rhs[item.dot as usize + 1..]);
            if nullable {
                follow.union(&items[&item]);
            }
            for &p in self.grammar.productions_of(*nt) {
                let derived = Item {
                    production: p as u32,
                    dot: 0,
                };
                match items.get_mut(&derived) {
                    Some(existing) => {
                        if existing.union(&follow) {
                            work.push(derived);
                        }
                    }
                    None => {
                        items.insert(derived, follow);
                        work.push(derived);
                    }
                }
            }
        }
        items
    }

    fn propagate_lookaheads(&self) -> Vec<Vec<TerminalSet>> {
        let mut lookaheads: Vec<Vec<TerminalSet>> = self
            .kernels
            .iter()
            .map(|kernel| vec![TerminalSet::default(); kernel.len()])
            .collect();
        lookaheads[0][0].insert(SyntaxKind::EOF);

        let mut changed = true;
        while changed {
            changed = false;
            for state in 0..self.kernels.len() {
                let closure = self.closure_with_lookaheads(state, &lookaheads[state]);
                for (item, set) in closure {
                    let Some(&symbol) = self.rhs(item.production).get(item.dot as usize) else {
                        continue;
                    };
                    let target = self.transitions[state][&symbol] as usize;
                    let advanced = Item {
                        production: item.production,
                        dot: item.dot + 1,
                    };
                    let Some(slot) = self.kernels[target].iter().position(|&k| k == advanced)
                    else {
                        continue;
                    };
                    changed |= lookaheads[target][slot].union(&set);
                }
            }
        }
        lookaheads
    }

    fn build(mut self) -> Result<ParseTable, GrammarError> {
        self.build_automaton();
        let lookaheads = self.propagate_lookaheads();

        let state_count = self.kernels.len();
        let nonterminal_count = self.grammar.nonterminals().len();
        let mut actions = vec![Action::Error; state_count * TERMINAL_COUNT];
        let mut gotos = vec![None; state_count * nonterminal_count];

        for state in 0..state_count {
            let row = &mut actions[state * TERMINAL_COUNT..][..TERMINAL_COUNT];
            for (&symbol, &target) in &self.transitions[state] {
                match symbol {
                    Symbol::Terminal(kind) => row[kind as usize] = Action::Shift(target),
                    Symbol::NonTerminal(nt) => {
                        gotos[state * nonterminal_count + nt.index()] = Some(target)
                    }
                }
            }

            for (item, set) in self.closure_with_lookaheads(state, &lookaheads[state]) {
                if (item.dot as usize) < self.rhs(item.production).len() {
                    continue;
                }
                let candidate = if item.production == self.augmented_id() {
                    Action::Accept
                } else {
                    Action::Reduce(item.production)
                };
                for terminal in set.iter() {
                    let slot = &mut row[terminal as usize];
                    *slot = self.resolve(state as StateId, terminal, *slot, candidate)?;
                }
            }
        }

        let productions = self
            .grammar
            .productions()
            .iter()
            .map(|production| ProductionInfo {
                lhs: production.lhs,
                len: production.rhs.len() as u16,
                node: self.grammar.nonterminal(production.lhs).node,
            })
            .collect();

        Ok(ParseTable {
            abi_version: ABI_VERSION,
            symbol_count: crate::parser::syntax_kind::KIND_COUNT as u16,
            state_count: state_count as u32,
            nonterminal_count: nonterminal_count as u16,
            actions,
            gotos,
            productions,
            nonterminal_names: self
                .grammar
                .nonterminals()
                .iter()
                .map(|info| info.name.to_string())
                .collect(),
        })
    }

    fn resolve(
        &self,
        state: StateId,
        lookahead: SyntaxKind,
        current: Action,
        candidate: Action,
    ) -> Result<Action, GrammarError> {
        let conflict = |kind, first: String, second: String| GrammarError::Conflict {
            kind,
            state,
            lookahead,
            first,
            second,
        };
        let reduce = match candidate {
            Action::Reduce(p) => p,
            _ => {
                return match current {
                    Action::Error => Ok(candidate),
                    _ => Err(conflict(
                        ConflictKind::ReduceReduce,
                        self.describe(current, lookahead),
                        "accept".to_string(),
                    )),
                };
            }
        };

        match current {
            Action::Error => Ok(candidate),
            Action::Shift(_) => {
                let production_prec = self.grammar.production_precedence(reduce as usize);
                let token_prec = self.grammar.token_precedence(lookahead);
                match (production_prec, token_prec) {
                    (Some((p, _)), Some((t, _))) if p > t => Ok(candidate),
                    (Some((p, _)), Some((t, _))) if p < t => Ok(current),
                    (Some(_), Some((_, assoc))) => Ok(match assoc {
                        Assoc::Left => candidate,
                        Assoc::Right => current,
                        Assoc::NonAssoc => Action::Error,
                    }),
                    _ => Err(conflict(
                        ConflictKind::ShiftReduce,
                        self.describe(current, lookahead),
                        self.grammar.display_production(reduce as usize),
                    )),
                }
            }
            Action::Reduce(existing) => {
                let a = self.grammar.production_precedence(existing as usize);
                let b = self.grammar.production_precedence(reduce as usize);
                match (a, b) {
                    (Some((a, _)), Some((b, _))) if a != b => {
                        Ok(if b > a { candidate } else { current })
                    }
                    _ => Err(conflict(
                        ConflictKind::ReduceReduce,
                        self.grammar.display_production(existing as usize),
                        self.grammar.display_production(reduce as usize),
                    )),
                }
            }
            Action::Accept => Err(conflict(
                ConflictKind::ReduceReduce,
                "accept".to_string(),
                self.grammar.display_production(reduce as usize),
            )),
        }
    }

    fn describe(&self, action: Action, lookahead: SyntaxKind) -> String {
        match action {
            Action::Shift(_) => format!("shift {lookahead:?}"),
            Action::Reduce(p) => self.grammar.display_production(p as usize),
            Action::Accept => "accept".to_string(),
            Action::Error => "error".to_string(),
        }
    }
}
