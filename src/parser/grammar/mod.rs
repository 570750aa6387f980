//! Grammar definitions and the builder they are written with
//!
//! A grammar is a list of productions over terminals ([`SyntaxKind`] tokens)
//! and nonterminals. A nonterminal is either *visible*, reducing to a node of
//! a fixed kind, or *hidden*, splicing its children into whatever node
//! contains it. Left-recursive hidden lists therefore give flat children.
//!
//! Precedence works as in yacc: every call to [`GrammarBuilder::left`],
//! [`GrammarBuilder::right`] or [`GrammarBuilder::nonassoc`] declares a new
//! level binding tighter than all earlier ones. A production takes the level
//! given to [`GrammarBuilder::rule_prec`], or else the level of its last
//! terminal that has one.

pub mod metal;

use crate::parser::SyntaxKind;
use crate::parser::table::GrammarError;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

pub use metal::grammar as metal_grammar;

/// Build a right-hand side from terminals and nonterminals
#[macro_export]
macro_rules! seq {
    () => {
        &[] as &[$crate::parser::grammar::Symbol]
    };
    ($($sym:expr),+ $(,)?) => {
        &[$($crate::parser::grammar::Symbol::from($sym)),+]
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "artifact", derive(serde::Serialize, serde::Deserialize))]
pub struct NonTerminal(pub(crate) u16);

impl NonTerminal {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(SyntaxKind),
    NonTerminal(NonTerminal),
}

impl From<SyntaxKind> for Symbol {
    fn from(kind: SyntaxKind) -> Self {
        Symbol::Terminal(kind)
    }
}

impl From<NonTerminal> for Symbol {
    fn from(nt: NonTerminal) -> Self {
        Symbol::NonTerminal(nt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    NonAssoc,
}

/// A precedence level; greater binds tighter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(u16);

#[derive(Debug, Clone)]
pub struct NonTerminalInfo {
    pub name: SmolStr,
    /// Node kind produced on reduction; `None` for hidden nonterminals
    pub node: Option<SyntaxKind>,
}

#[derive(Debug, Clone)]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: Vec<Symbol>,
    pub prec: Option<Precedence>,
}

#[derive(Debug, Clone)]
pub struct Grammar {
    nonterminals: Vec<NonTerminalInfo>,
    productions: Vec<Production>,
    by_lhs: Vec<Vec<usize>>,
    start: NonTerminal,
    token_prec: FxHashMap<SyntaxKind, Precedence>,
    levels: Vec<Assoc>,
}

impl Grammar {
    pub fn start(&self) -> NonTerminal {
        self.start
    }

    pub fn nonterminals(&self) -> &[NonTerminalInfo] {
        &self.nonterminals
    }

    pub fn nonterminal(&self, nt: NonTerminal) -> &NonTerminalInfo {
        &self.nonterminals[nt.index()]
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Indices of the productions with `nt` on the left
    pub fn productions_of(&self, nt: NonTerminal) -> &[usize] {
        &self.by_lhs[nt.index()]
    }

    pub fn token_precedence(&self, kind: SyntaxKind) -> Option<(Precedence, Assoc)> {
        self.token_prec
            .get(&kind)
            .map(|&level| (level, self.levels[level.0 as usize]))
    }

    pub fn production_precedence(&self, production: usize) -> Option<(Precedence, Assoc)> {
        let production = &self.productions[production];
        if let Some(level) = production.prec {
            return Some((level, self.levels[level.0 as usize]));
        }
        production.rhs.iter().rev().find_map(|symbol| match symbol {
            Symbol::Terminal(kind) => self.token_precedence(*kind),
            Symbol::NonTerminal(_) => None,
        })
    }

    pub fn display_symbol(&self, symbol: Symbol) -> String {
        match symbol {
            Symbol::Terminal(kind) => format!("{kind:?}"),
            Symbol::NonTerminal(nt) => self.nonterminal(nt).name.to_string(),
        }
    }

    pub fn display_production(&self, production: usize) -> String {
        let production = &self.productions[production];
        let mut out = format!("{} ->", self.nonterminal(production.lhs).name);
        if production.rhs.is_empty() {
            out.push_str(" <empty>");
        }
        for &symbol in &production.rhs {
            out.push(' ');
            out.push_str(&self.display_symbol(symbol));
        }
        out
    }

    /// Reject grammars the table builder cannot turn into a usable parser
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.productions.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        for production in &self.productions {
            for &symbol in &production.rhs {
                let Symbol::Terminal(kind) = symbol else {
                    continue;
                };
                if !kind.is_terminal() || kind.is_trivia() || kind == SyntaxKind::EOF {
                    return Err(GrammarError::InvalidTerminal(kind));
                }
            }
        }

        for (index, info) in self.nonterminals.iter().enumerate() {
            if self.by_lhs[index].is_empty() {
                return Err(GrammarError::UndefinedSymbol(info.name.clone()));
            }
        }

        // Reachability from the start symbol
        let mut reachable = vec![false; self.nonterminals.len()];
        let mut stack = vec![self.start];
        reachable[self.start.index()] = true;
        while let Some(nt) = stack.pop() {
            for &p in self.productions_of(nt) {
                for &symbol in &self.productions[p].rhs {
                    if let Symbol::NonTerminal(next) = symbol {
                        if !reachable[next.index()] {
                            reachable[next.index()] = true;
                            stack.push(next);
                        }
                    }
                }
            }
        }
        if let Some(index) = reachable.iter().position(|r| !r) {
            return Err(GrammarError::UnreachableSymbol(
                self.nonterminals[index].name.clone(),
            ));
        }

        // Productivity: every nonterminal must derive some terminal string
        let mut productive = vec![false; self.nonterminals.len()];
        let mut changed = true;
        while changed {
            changed = false;
            for production in &self.productions {
                if productive[production.lhs.index()] {
                    continue;
                }
                let all = production.rhs.iter().all(|symbol| match symbol {
                    Symbol::Terminal(_) => true,
                    Symbol::NonTerminal(nt) => productive[nt.index()],
                });
                if all {
                    productive[production.lhs.index()] = true;
                    changed = true;
                }
            }
        }
        if let Some(index) = productive.iter().position(|p| !p) {
            return Err(GrammarError::UnproductiveSymbol(
                self.nonterminals[index].name.clone(),
            ));
        }

        Ok(())
    }
}

/// Incrementally declares nonterminals, precedence levels and productions
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    nonterminals: Vec<NonTerminalInfo>,
    productions: Vec<Production>,
    token_prec: FxHashMap<SyntaxKind, Precedence>,
    levels: Vec<Assoc>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A nonterminal that reduces to a node of `kind`
    pub fn node(&mut self, kind: SyntaxKind) -> NonTerminal {
        self.declare(SmolStr::new(format!("{kind:?}")), Some(kind))
    }

    /// A nonterminal whose children are spliced into the parent node
    pub fn hidden(&mut self, name: &str) -> NonTerminal {
        self.declare(SmolStr::new(name), None)
    }

    fn declare(&mut self, name: SmolStr, node: Option<SyntaxKind>) -> NonTerminal {
        let nt = NonTerminal(self.nonterminals.len() as u16);
        self.nonterminals.push(NonTerminalInfo { name, node });
        nt
    }

    pub fn left(&mut self, tokens: &[SyntaxKind]) -> Precedence {
        self.level(Assoc::Left, tokens)
    }

    pub fn right(&mut self, tokens: &[SyntaxKind]) -> Precedence {
        self.level(Assoc::Right, tokens)
    }

    pub fn nonassoc(&mut self, tokens: &[SyntaxKind]) -> Precedence {
        self.level(Assoc::NonAssoc, tokens)
    }

    fn level(&mut self, assoc: Assoc, tokens: &[SyntaxKind]) -> Precedence {
        let level = Precedence(self.levels.len() as u16);
        self.levels.push(assoc);
        for &token in tokens {
            self.token_prec.insert(token, level);
        }
        level
    }

    pub fn rule(&mut self, lhs: NonTerminal, rhs: &[Symbol]) {
        self.productions.push(Production {
            lhs,
            rhs: rhs.to_vec(),
            prec: None,
        });
    }

    pub fn rule_prec(&mut self, lhs: NonTerminal, prec: Precedence, rhs: &[Symbol]) {
        self.productions.push(Production {
            lhs,
            rhs: rhs.to_vec(),
            prec: Some(prec),
        });
    }

    pub fn build(self, start: NonTerminal) -> Grammar {
        let mut by_lhs = vec![Vec::new(); self.nonterminals.len()];
        for (index, production) in self.productions.iter().enumerate() {
            by_lhs[production.lhs.index()].push(index);
        }
        Grammar {
            nonterminals: self.nonterminals,
            productions: self.productions,
            by_lhs,
            start,
            token_prec: self.token_prec,
            levels: self.levels,
        }
    }
}
