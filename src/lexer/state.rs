// src/lexer/state.rs

use serde::{Deserialize, Serialize};

/// Scanning modes; each has its own DFA entry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LexicalState {
    Initial = 0,
    InScripting,
    DoubleQuotes,
    SingleQuotes,
    Backquote,
    Heredoc,
    Newdoc,
    LookingForProperty,
    LookingForVarname,
    VarOffset,
    DocComment,
    Comment,
    OneLineComment,
}

impl LexicalState {
    pub const COUNT: usize = 13;

    pub const ALL: [LexicalState; LexicalState::COUNT] = [
        LexicalState::Initial,
        LexicalState::InScripting,
        LexicalState::DoubleQuotes,
        LexicalState::SingleQuotes,
        LexicalState::Backquote,
        LexicalState::Heredoc,
        LexicalState::Newdoc,
        LexicalState::LookingForProperty,
        LexicalState::LookingForVarname,
        LexicalState::VarOffset,
        LexicalState::DocComment,
        LexicalState::Comment,
        LexicalState::OneLineComment,
    ];

    #[inline]
    pub fn idx(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_heredoc(self) -> bool {
        matches!(self, LexicalState::Heredoc | LexicalState::Newdoc)
    }
}

/// Terminator of the heredoc/nowdoc currently being scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeredocLabel {
    pub label: Vec<u8>,
    pub nowdoc: bool,
}

impl HeredocLabel {
    /// Parse the label out of a `<<<` opener such as `<<< "EOT"\r\n`.
    pub fn from_opener(lexeme: &[u8]) -> HeredocLabel {
        let mut s = lexeme.strip_prefix(b"<<<").unwrap_or(lexeme);
        while let [b' ' | b'\t', rest @ ..] = s {
            s = rest;
        }
        while let [rest @ .., b'\r' | b'\n'] = s {
            s = rest;
        }
        let nowdoc = s.first() == Some(&b'\'');
        if let [b'\'' | b'"', inner @ .., b'\'' | b'"'] = s {
            s = inner;
        }
        HeredocLabel {
            label: s.to_vec(),
            nowdoc,
        }
    }

    /// Length of the closing label (indentation included) when `candidate`
    /// closes this heredoc.
    ///
    /// `candidate` is a line-start match of `[ \t]*label`, optionally
    /// followed by `;` and a line terminator. Flexible syntax (7.3+) accepts
    /// indentation and any non-label byte after the label. The strict form
    /// needs the label in column 0 followed only by an optional `;` and the
    /// end of the line; `at_eof` tells whether the input ends after `candidate`.
    pub fn closing_len(&self, candidate: &[u8], flexible: bool, at_eof: bool) -> Option<usize> {
        let body = candidate.trim_ascii_start();
        let indent = candidate.len() - body.len();
        let tail = body.strip_prefix(self.label.as_slice())?;
        if !tail.first().is_none_or(|&b| matches!(b, b';' | b'\r' | b'\n')) {
            return None;
        }
        if !flexible {
            let rest = tail.strip_prefix(b";").unwrap_or(tail);
            let line_ends = matches!(rest, b"\n" | b"\r" | b"\r\n") || (rest.is_empty() && at_eof);
            if indent > 0 || !line_ends {
                return None;
            }
        }
        Some(indent + self.label.len())
    }
}

#[derive(Debug, Clone)]
struct Frame {
    state: LexicalState,
    heredoc: Option<HeredocLabel>,
}

/// The active mode plus the saved modes of enclosing constructs.
///
/// The heredoc label travels with its mode, so it is present exactly while
/// HEREDOC/NEWDOC is active and survives nested `{$...}` scanning.
#[derive(Debug, Clone)]
pub struct StateStack {
    current: LexicalState,
    heredoc: Option<HeredocLabel>,
    saved: Vec<Frame>,
}

impl StateStack {
    pub fn new(initial: LexicalState) -> Self {
        Self {
            current: initial,
            heredoc: None,
            saved: Vec::new(),
        }
    }

    #[inline]
    pub fn current(&self) -> LexicalState {
        self.current
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn heredoc(&self) -> Option<&HeredocLabel> {
        self.heredoc.as_ref()
    }

    /// Unconditional switch; leaves the saved frames alone.
    pub fn begin(&mut self, state: LexicalState) {
        log::trace!("begin {:?} -> {:?}", self.current, state);
        self.current = state;
        if !state.is_heredoc() {
            self.heredoc = None;
        }
    }

    pub fn begin_heredoc(&mut self, label: HeredocLabel) {
        let state = if label.nowdoc {
            LexicalState::Newdoc
        } else {
            LexicalState::Heredoc
        };
        log::trace!("begin {:?} -> {:?} ({:?})", self.current, state, label);
        self.current = state;
        self.heredoc = Some(label);
    }

    pub fn push(&mut self, state: LexicalState) {
        log::trace!("push {:?} over {:?}", state, self.current);
        self.saved.push(Frame {
            state: self.current,
            heredoc: self.heredoc.take(),
        });
        self.current = state;
    }

    /// Returns false (and changes nothing) when there is nothing to pop.
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(frame) => {
                log::trace!("pop {:?} -> {:?}", self.current, frame.state);
                self.current = frame.state;
                self.heredoc = frame.heredoc;
                true
            }
            None => false,
        }
    }
}
