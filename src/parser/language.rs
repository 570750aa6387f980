//! The parser-facing handle to a built grammar
//!
//! A [`Language`] is a cheap, shareable reference to a [`ParseTable`]. The
//! Metal language is built on first use and shared process-wide; building it
//! again yields an identical table.

use crate::parser::grammar::metal_grammar;
use crate::parser::syntax_kind::KIND_COUNT;
use crate::parser::table::{ABI_VERSION, GrammarError, MIN_COMPATIBLE_ABI_VERSION, ParseTable};
use once_cell::sync::Lazy;
use std::sync::Arc;
use thiserror::Error;

/// Why a parser refused a language
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    #[error("incompatible table version {found}, expected {min}..={max}")]
    AbiMismatch { found: u32, min: u32, max: u32 },

    #[error("table was built for {found} syntax kinds, this parser has {expected}")]
    SymbolMismatch { found: usize, expected: usize },

    #[error("parse table is malformed")]
    Malformed,

    #[cfg(feature = "artifact")]
    #[error("invalid grammar artifact: {0}")]
    Artifact(String),
}

#[derive(Debug, Clone)]
pub struct Language {
    name: &'static str,
    table: Arc<ParseTable>,
}

impl Language {
    pub fn new(name: &'static str, table: ParseTable) -> Self {
        Self {
            name,
            table: Arc::new(table),
        }
    }

    /// Build a language from a grammar; conflicts are reported, not resolved
    pub fn from_grammar(
        name: &'static str,
        grammar: &crate::parser::grammar::Grammar,
    ) -> Result<Self, GrammarError> {
        Ok(Self::new(name, ParseTable::build(grammar)?))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn abi_version(&self) -> u32 {
        self.table.abi_version()
    }

    /// Identity of the underlying table; clones of a language share it
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.table) as usize
    }

    pub fn state_count(&self) -> usize {
        self.table.state_count()
    }

    /// Verify this language can be driven by the current parser
    pub fn check_compatible(&self) -> Result<(), LanguageError> {
        let found = self.table.abi_version();
        if !(MIN_COMPATIBLE_ABI_VERSION..=ABI_VERSION).contains(&found) {
            return Err(LanguageError::AbiMismatch {
                found,
                min: MIN_COMPATIBLE_ABI_VERSION,
                max: ABI_VERSION,
            });
        }
        if self.table.symbol_count() != KIND_COUNT {
            return Err(LanguageError::SymbolMismatch {
                found: self.table.symbol_count(),
                expected: KIND_COUNT,
            });
        }
        if !self.table.is_well_formed() {
            return Err(LanguageError::Malformed);
        }
        Ok(())
    }

    /// Serialize the table so other tooling can load it without rebuilding
    #[cfg(feature = "artifact")]
    pub fn to_artifact(&self) -> Result<String, LanguageError> {
        serde_json::to_string(&*self.table).map_err(|e| LanguageError::Artifact(e.to_string()))
    }

    #[cfg(feature = "artifact")]
    pub fn from_artifact(name: &'static str, json: &str) -> Result<Self, LanguageError> {
        let table: ParseTable =
            serde_json::from_str(json).map_err(|e| LanguageError::Artifact(e.to_string()))?;
        let language = Self::new(name, table);
        language.check_compatible()?;
        Ok(language)
    }

    #[cfg(test)]
    pub(crate) fn with_abi_version(&self, version: u32) -> Self {
        let mut table = (*self.table).clone();
        table.abi_version = version;
        Self::new(self.name, table)
    }

    #[cfg(test)]
    pub(crate) fn with_symbol_count(&self, count: u16) -> Self {
        let mut table = (*self.table).clone();
        table.symbol_count = count;
        Self::new(self.name, table)
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && (Arc::ptr_eq(&self.table, &other.table) || self.table == other.table)
    }
}

impl Eq for Language {}

static METAL: Lazy<Language> = Lazy::new(|| {
    // The grammar is fixed at compile time; a conflict here is a bug in it.
    match Language::from_grammar("metal", &metal_grammar()) {
        Ok(language) => language,
        Err(err) => panic!("the built-in Metal grammar is invalid: {err}"),
    }
});

/// The Metal Shading Language
pub fn language() -> &'static Language {
    &METAL
}
