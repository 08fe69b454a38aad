// src/lexer/scanner.rs
// Longest-match driver over the compiled DFA tables.

use std::io::Read;

use crate::config::LexerOptions;
use crate::lexer::action::Outcome;
use crate::lexer::buffer::{DEFAULT_CAPACITY, LexerBuffer, Offsets};
use crate::lexer::state::{HeredocLabel, LexicalState, StateStack};
use crate::lexer::tables::{AcceptCondition, SYM_BOL, SYM_EOF, Tables, TokenKind, php_tables};
use crate::lexer::token::Token;

/// PHP scanner over any byte source.
///
/// A lexer owns its source for the whole session and is not meant to be
/// shared between threads; create one per source.
pub struct Lexer<'t, R> {
    pub(crate) tables: &'t Tables,
    pub(crate) buf: LexerBuffer<R>,
    pub(crate) stack: StateStack,
    pub(crate) options: LexerOptions,
    finished: bool,
}

impl<R: Read> Lexer<'static, R> {
    /// Scan a whole source, starting in INITIAL at a line start.
    pub fn new(source: R, options: LexerOptions) -> Self {
        Self::with_state(source, options, LexicalState::Initial, true)
    }

    /// Scan starting in `state`; `at_bol` tells whether the first byte begins a line.
    pub fn with_state(source: R, options: LexerOptions, state: LexicalState, at_bol: bool) -> Self {
        Lexer::with_tables(php_tables(), source, options, state, at_bol)
    }
}

impl<'t, R: Read> Lexer<'t, R> {
    pub fn with_tables(
        tables: &'t Tables,
        source: R,
        options: LexerOptions,
        state: LexicalState,
        at_bol: bool,
    ) -> Self {
        Self {
            tables,
            buf: LexerBuffer::new(source, DEFAULT_CAPACITY, at_bol),
            stack: StateStack::new(state),
            options,
            finished: false,
        }
    }

    /// Set the initial window size. Bytes already read are kept.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.buf.set_capacity(capacity);
        self
    }

    /// Reset offsets, mode and stack and scan `source` from its start.
    pub fn initialize(&mut self, source: R, state: LexicalState, at_bol: bool) {
        self.buf.reset(source, at_bol);
        self.stack = StateStack::new(state);
        self.finished = false;
    }

    #[inline]
    pub fn state(&self) -> LexicalState {
        self.stack.current()
    }

    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn heredoc_label(&self) -> Option<&HeredocLabel> {
        self.stack.heredoc()
    }

    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    pub fn offsets(&self) -> Offsets {
        self.buf.offsets()
    }

    pub fn read_error(&self) -> Option<&std::io::Error> {
        self.buf.read_error()
    }

    fn finish(&mut self, kind: TokenKind) -> Token {
        let (lexeme, start, end) = self.buf.take_token();
        log::trace!("{kind:?} {start}..{end} -> {:?}", self.stack.current());
        Token {
            kind,
            lexeme,
            start,
            end,
        }
    }

    /// Scan the next token. After the input is exhausted every call returns END.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.buf.begin_chunk();
            if self.buf.peek().is_none() {
                if self.buf.has_pending() {
                    // unterminated construct: hand out what was collected
                    let kind = self.fragment_kind();
                    return self.finish(kind);
                }
                let at = self.buf.offset();
                return Token {
                    kind: TokenKind::End,
                    lexeme: Vec::new(),
                    start: at,
                    end: at,
                };
            }

            let mut state = self.tables.entry(self.stack.current());
            if self.buf.at_line_start() {
                if let Some(bol) = self.tables.next(state, SYM_BOL) {
                    state = bol;
                }
            }

            // AcceptOnStart states sit behind the BOL edge, so any match of
            // one starts at a line start, pending text or not.
            let mut best: Option<(u32, usize)> = None;
            loop {
                let sym = self.buf.advance();
                let Some(next) = self.tables.next(state, sym) else {
                    break;
                };
                state = next;
                if self.tables.accept(state) != AcceptCondition::NotAccept {
                    best = Some((state, self.buf.mark()));
                }
                if sym == SYM_EOF {
                    break;
                }
            }

            let Some((state, end)) = best else {
                if self.buf.has_pending() {
                    self.buf.accept_chunk_prefix(0);
                    let kind = self.fragment_kind();
                    return self.finish(kind);
                }
                self.buf.accept_chunk_prefix(1);
                log::debug!(
                    "no rule matches at offset {} in {:?}",
                    self.buf.token_start_offset(),
                    self.stack.current()
                );
                return self.finish(TokenKind::Error);
            };

            self.buf.accept_mark(end);
            if self.tables.accept(state) == AcceptCondition::AcceptOnEnd {
                self.buf.trim_newline();
            }
            let Some(action) = self.tables.action(state) else {
                unreachable!("accepting DFA state {state} has no action");
            };

            match self.dispatch(action) {
                // A zero-width emit only switched modes; scan on.
                Outcome::Emit(_) if self.buf.token_len() == 0 => continue,
                Outcome::Emit(kind) => return self.finish(kind),
                Outcome::Extend | Outcome::Rescan => continue,
            }
        }
    }
}

impl<R: Read> Iterator for Lexer<'_, R> {
    type Item = Token;

    /// Yields every token including the final END, then stops.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let tok = self.next_token();
        if tok.kind == TokenKind::End {
            self.finished = true;
        }
        Some(tok)
    }
}
