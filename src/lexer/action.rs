// src/lexer/action.rs
// Per-rule semantic actions and their dispatcher.

use std::io::Read;

use crate::config::PhpVersion;
use crate::lexer::scanner::Lexer;
use crate::lexer::state::{HeredocLabel, LexicalState};
use crate::lexer::tables::TokenKind;

/// Which configuration flag admits a tag spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagGate {
    Always,
    Short,
    Asp,
}

/// What a rule does once it wins the longest match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Emit the matched text, downgraded for the configured language version.
    Emit(TokenKind),
    /// Keep the text and continue scanning into the same token.
    Extend,
    OpenTag(TokenKind, TagGate),
    CloseTag(TagGate),
    /// `?>`/`%>` inside a one-line comment.
    CommentCloseTag(TagGate),
    OpenBrace,
    CloseBrace,
    ObjectOperator(TokenKind),
    EnterComment(LexicalState),
    AttributeOrComment,
    EndComment(TokenKind),
    OpenQuote(TokenKind, LexicalState),
    CloseQuote(TokenKind),
    StartHeredoc,
    EndHeredoc,
    /// Variable or interpolation opener inside a string body.
    Interpolate {
        kind: TokenKind,
        push: Option<LexicalState>,
        give_back: u8,
    },
    PropertyName,
    VarnameLabel,
    VarnameRescan,
    PopAndRescan,
    CloseOffset,
}

/// Result of running an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Emit(TokenKind),
    Extend,
    /// The current chunk was given back; scan again (usually in a new mode).
    Rescan,
}

impl<R: Read> Lexer<'_, R> {
    fn gate_open(&self, gate: TagGate) -> bool {
        match gate {
            TagGate::Always => true,
            TagGate::Short => self.options.allow_short_tags,
            TagGate::Asp => self.options.allow_asp_tags,
        }
    }

    /// Kind used for text accumulated by `Extend` in the current mode.
    pub(crate) fn fragment_kind(&self) -> TokenKind {
        use LexicalState::*;
        match self.stack.current() {
            Initial => TokenKind::InlineHtml,
            DoubleQuotes | SingleQuotes | Backquote | Heredoc | Newdoc => {
                TokenKind::EncapsedAndWhitespace
            }
            Comment | OneLineComment => TokenKind::Comment,
            DocComment => TokenKind::DocComment,
            InScripting | LookingForProperty | LookingForVarname | VarOffset => TokenKind::Error,
        }
    }

    /// If text is pending from earlier chunks, give the current chunk back
    /// and emit the pending text on its own.
    fn flush_pending(&mut self) -> Option<Outcome> {
        if !self.buf.has_pending() {
            return None;
        }
        let chunk = self.buf.chunk_len();
        self.buf.push_back(chunk);
        Some(Outcome::Emit(self.fragment_kind()))
    }

    /// Apply version gating, giving bytes back where an older language
    /// splits the lexeme into a shorter token.
    fn gated(&mut self, mut kind: TokenKind) -> TokenKind {
        let version = self.options.version;
        while version < kind.min_version() {
            let Some((keep, older)) = kind.downgrade() else {
                break;
            };
            if let Some(keep) = keep {
                let surplus = self.buf.chunk_len().saturating_sub(keep);
                self.buf.push_back(surplus);
            }
            kind = older;
        }
        kind
    }

    /// Before 7.4 a `_` ends a numeric literal; keep the digits in front of it.
    fn gated_number(&mut self, kind: TokenKind) -> TokenKind {
        if self.options.version >= PhpVersion::Php74 {
            return kind;
        }
        let Some(cut) = self.buf.chunk().iter().position(|&b| b == b'_') else {
            return kind;
        };
        let surplus = self.buf.chunk_len() - cut;
        self.buf.push_back(surplus);
        TokenKind::of_number(self.buf.chunk())
    }

    fn pop_or_script(&mut self) {
        if !self.stack.pop() {
            log::warn!(
                "state stack empty while leaving {:?} at offset {}",
                self.stack.current(),
                self.buf.token_start_offset()
            );
            self.stack.begin(LexicalState::InScripting);
        }
    }

    pub(crate) fn dispatch(&mut self, action: Action) -> Outcome {
        match action {
            Action::Emit(kind) if kind.is_number() => {
                let kind = self.gated_number(kind);
                Outcome::Emit(self.gated(kind))
            }
            Action::Emit(kind) => Outcome::Emit(self.gated(kind)),
            Action::Extend => Outcome::Extend,

            Action::OpenTag(kind, gate) => {
                if !self.gate_open(gate) {
                    return Outcome::Extend;
                }
                if let Some(out) = self.flush_pending() {
                    return out;
                }
                self.stack.begin(LexicalState::InScripting);
                Outcome::Emit(kind)
            }
            Action::CloseTag(gate) => {
                if !self.gate_open(gate) {
                    let surplus = self.buf.chunk_len() - 1;
                    self.buf.push_back(surplus);
                    return Outcome::Emit(TokenKind::Percent);
                }
                self.stack.begin(LexicalState::Initial);
                Outcome::Emit(TokenKind::CloseTag)
            }
            Action::CommentCloseTag(gate) => {
                if !self.gate_open(gate) {
                    return Outcome::Extend;
                }
                let chunk = self.buf.chunk_len();
                self.buf.push_back(chunk);
                self.stack.begin(LexicalState::InScripting);
                Outcome::Emit(TokenKind::Comment)
            }

            Action::OpenBrace => {
                self.stack.push(LexicalState::InScripting);
                Outcome::Emit(TokenKind::LBrace)
            }
            Action::CloseBrace => {
                if self.stack.pop() {
                    Outcome::Emit(TokenKind::RBrace)
                } else {
                    log::warn!("unmatched '}}' at offset {}", self.buf.token_start_offset());
                    Outcome::Emit(TokenKind::Error)
                }
            }
            Action::ObjectOperator(kind) => {
                let kind = self.gated(kind);
                if matches!(
                    kind,
                    TokenKind::ObjectOperator | TokenKind::NullsafeObjectOperator
                ) {
                    self.stack.push(LexicalState::LookingForProperty);
                }
                Outcome::Emit(kind)
            }

            Action::EnterComment(state) => {
                self.stack.begin(state);
                Outcome::Extend
            }
            Action::AttributeOrComment => {
                if self.options.version >= TokenKind::Attribute.min_version() {
                    Outcome::Emit(TokenKind::Attribute)
                } else {
                    self.stack.begin(LexicalState::OneLineComment);
                    Outcome::Extend
                }
            }
            Action::EndComment(kind) => {
                self.stack.begin(LexicalState::InScripting);
                Outcome::Emit(kind)
            }

            Action::OpenQuote(kind, state) => {
                self.stack.begin(state);
                Outcome::Emit(kind)
            }
            Action::CloseQuote(kind) => {
                if let Some(out) = self.flush_pending() {
                    return out;
                }
                self.stack.begin(LexicalState::InScripting);
                Outcome::Emit(kind)
            }

            Action::StartHeredoc => {
                let label = HeredocLabel::from_opener(self.buf.chunk());
                self.stack.begin_heredoc(label);
                Outcome::Emit(TokenKind::StartHeredoc)
            }
            Action::EndHeredoc => {
                let flexible = self.options.version >= PhpVersion::Php73;
                // only the strict form needs to know what follows the match
                let at_eof = !flexible && self.buf.peek().is_none();
                let closing = self
                    .stack
                    .heredoc()
                    .and_then(|h| h.closing_len(self.buf.chunk(), flexible, at_eof));
                let Some(closing) = closing else {
                    return Outcome::Extend;
                };
                if let Some(out) = self.flush_pending() {
                    return out;
                }
                let surplus = self.buf.chunk_len() - closing;
                self.buf.push_back(surplus);
                self.stack.begin(LexicalState::InScripting);
                Outcome::Emit(TokenKind::EndHeredoc)
            }

            Action::Interpolate {
                kind,
                push,
                give_back,
            } => {
                if let Some(out) = self.flush_pending() {
                    return out;
                }
                self.buf.push_back(give_back as usize);
                if let Some(state) = push {
                    self.stack.push(state);
                }
                Outcome::Emit(kind)
            }

            Action::PropertyName => {
                self.pop_or_script();
                Outcome::Emit(TokenKind::String)
            }
            Action::VarnameLabel => {
                self.buf.push_back(1);
                self.pop_or_script();
                self.stack.push(LexicalState::InScripting);
                Outcome::Emit(TokenKind::StringVarname)
            }
            Action::VarnameRescan => {
                let chunk = self.buf.chunk_len();
                self.buf.push_back(chunk);
                self.pop_or_script();
                self.stack.push(LexicalState::InScripting);
                Outcome::Rescan
            }
            Action::PopAndRescan => {
                let chunk = self.buf.chunk_len();
                self.buf.push_back(chunk);
                self.pop_or_script();
                Outcome::Rescan
            }
            Action::CloseOffset => {
                self.pop_or_script();
                Outcome::Emit(TokenKind::RBracket)
            }
        }
    }
}
