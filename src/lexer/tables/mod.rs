// src/lexer/tables/mod.rs
pub mod build;
pub mod io;
pub mod pattern;
pub mod rules;
pub mod tokens;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub use build::build_tables;
pub use io::{load_tables_bin_bytes, load_tables_json_bytes, save_tables_bin, save_tables_json};
pub use pattern::{N_SYMBOLS, SYM_BOL, SYM_EOF};
pub use tokens::TokenKind;

use crate::lexer::action::Action;
use crate::lexer::state::LexicalState;

/// "No edge" in the transition table.
pub const NO_STATE: u32 = u32::MAX;
/// "No rule" in the per-state rule maps.
pub const NO_RULE: u32 = u32::MAX;

/// How a DFA state may end a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AcceptCondition {
    NotAccept = 0,
    /// Winner is a line-anchored rule; reached only through the BOL edge.
    AcceptOnStart = 1,
    /// Valid; one trailing line terminator is trimmed off the match.
    AcceptOnEnd = 2,
    Accept = 3,
}

impl AcceptCondition {
    pub fn from_u8(v: u8) -> Option<AcceptCondition> {
        Some(match v {
            0 => AcceptCondition::NotAccept,
            1 => AcceptCondition::AcceptOnStart,
            2 => AcceptCondition::AcceptOnEnd,
            3 => AcceptCondition::Accept,
            _ => return None,
        })
    }
}

/// Compressed scanner tables plus the rule-indexed action table.
#[derive(Debug)]
pub struct Tables {
    /// symbol -> column class
    pub columns: [u16; N_SYMBOLS],
    pub n_columns: u32,
    /// DFA state -> compressed row
    pub row_of: Vec<u32>,
    /// n_rows * n_columns, row-major; NO_STATE = no edge
    pub transitions: Vec<u32>,
    pub accept: Vec<AcceptCondition>,
    /// DFA state -> winning rule (or NO_RULE)
    pub rule_of: Vec<u32>,
    /// LexicalState index -> entry DFA state
    pub entry: [u32; LexicalState::COUNT],
    pub actions: Vec<Action>,
}

impl Tables {
    #[inline]
    pub fn n_states(&self) -> usize {
        self.row_of.len()
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.transitions.len() / self.n_columns.max(1) as usize
    }

    #[inline]
    pub fn column(&self, sym: usize) -> usize {
        self.columns[sym] as usize
    }

    #[inline]
    pub fn entry(&self, state: LexicalState) -> u32 {
        self.entry[state.idx()]
    }

    /// Next DFA state on `sym`, if there is an edge.
    #[inline]
    pub fn next(&self, state: u32, sym: usize) -> Option<u32> {
        let row = self.row_of[state as usize] as usize;
        let t = self.transitions[row * self.n_columns as usize + self.column(sym)];
        (t != NO_STATE).then_some(t)
    }

    #[inline]
    pub fn accept(&self, state: u32) -> AcceptCondition {
        self.accept[state as usize]
    }

    /// Action of the rule that wins in `state`.
    pub fn action(&self, state: u32) -> Option<Action> {
        let rule = self.rule_of[state as usize];
        if rule == NO_RULE {
            return None;
        }
        self.actions.get(rule as usize).copied()
    }
}

static PHP_TABLES: Lazy<Tables> = Lazy::new(build_tables);

/// The compiled PHP tables, built on first use.
pub fn php_tables() -> &'static Tables {
    &PHP_TABLES
}
