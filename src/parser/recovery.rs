//! Local error recovery policy
//!
//! When the table has no action for the lookahead, the engine asks [`choose`]
//! what to do. The decision only looks at the parse states and the next few
//! terminal kinds, so it can be tested on hand-built stacks without running
//! the engine.

use crate::parser::SyntaxKind;
use crate::parser::table::{Action, ParseTable, StateId};

/// Tokens that may be inserted as zero-width `MISSING` nodes, in the order
/// they are tried
pub const INSERTABLE: [SyntaxKind; 6] = [
    SyntaxKind::SEMICOLON,
    SyntaxKind::R_PAREN,
    SyntaxKind::R_BRACKET,
    SyntaxKind::R_BRACE,
    SyntaxKind::GT,
    SyntaxKind::COLON,
];

/// A recovery decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Pretend a token of this kind was present
    Insert(SyntaxKind),
    /// Wrap the lookahead in an `ERROR` node and move past it
    Skip,
    /// Wrap the top `n` stack entries in an `ERROR` node
    Wrap(usize),
}

/// Run the table on `terminal` starting from `states`, performing every
/// reduction it asks for. Returns the states after the terminal was shifted
/// (or accepted), or `None` if the terminal is rejected.
pub fn simulate(table: &ParseTable, states: &[StateId], terminal: SyntaxKind) -> Option<Vec<StateId>> {
    let mut states = states.to_vec();
    loop {
        let top = *states.last()?;
        match table.action(top, terminal) {
            Action::Shift(next) => {
                states.push(next);
                return Some(states);
            }
            Action::Accept => return Some(states),
            Action::Reduce(production) => {
                let info = table.production(production);
                let len = info.len as usize;
                if len >= states.len() {
                    return None;
                }
                states.truncate(states.len() - len);
                let next = table.goto(*states.last()?, info.lhs)?;
                states.push(next);
            }
            Action::Error => return None,
        }
    }
}

pub fn accepts(table: &ParseTable, states: &[StateId], terminal: SyntaxKind) -> bool {
    simulate(table, states, terminal).is_some()
}

/// Pick a recovery for `lookahead` in `states`
///
/// `states` holds the state of every real stack entry, starting with the
/// initial state. `upcoming` holds the kinds of the non-trivia tokens after
/// the lookahead (ending in `EOF` when the input runs out). `can_insert` is
/// false once the insertion budget for this position is spent.
///
/// Preference order:
/// 1. insert a closer that makes the lookahead acceptable (at end of input,
///    any closer the state accepts)
/// 2. skip the lookahead if one of the upcoming tokens fits the current
///    state, or if the lookahead is a lexical error
/// 3. wrap the fewest stack entries that expose a state accepting the
///    lookahead
pub fn choose(
    table: &ParseTable,
    states: &[StateId],
    lookahead: SyntaxKind,
    upcoming: &[SyntaxKind],
    can_insert: bool,
) -> Recovery {
    let at_eof = lookahead == SyntaxKind::EOF;

    if lookahead != SyntaxKind::ERROR && can_insert {
        for kind in INSERTABLE {
            if let Some(after) = simulate(table, states, kind) {
                if accepts(table, &after, lookahead) {
                    return Recovery::Insert(kind);
                }
            }
        }
        if at_eof {
            if let Some(kind) = INSERTABLE.into_iter().find(|&kind| accepts(table, states, kind)) {
                return Recovery::Insert(kind);
            }
        }
    }

    if !at_eof
        && (lookahead == SyntaxKind::ERROR
            || upcoming.iter().any(|&kind| accepts(table, states, kind)))
    {
        return Recovery::Skip;
    }

    for depth in 1..states.len() {
        if accepts(table, &states[..states.len() - depth], lookahead) {
            return Recovery::Wrap(depth);
        }
    }

    if at_eof {
        Recovery::Wrap(states.len().saturating_sub(1))
    } else {
        Recovery::Skip
    }
}
