// src/lexer/buffer.rs
// Sliding lookahead window over a pull-based byte source.

use std::io::{ErrorKind, Read};

use crate::lexer::tables::SYM_EOF;

pub const DEFAULT_CAPACITY: usize = 4096;

/// Snapshot of the buffer offsets, relative to the current window.
///
/// Always `token_start <= chunk_start <= token_end <= lookahead <= chars_read <= capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offsets {
    pub token_start: usize,
    pub chunk_start: usize,
    pub token_end: usize,
    pub lookahead: usize,
    pub chars_read: usize,
    pub capacity: usize,
}

pub struct LexerBuffer<R> {
    source: R,
    buf: Vec<u8>,
    /// absolute offset of buf[0]
    base: usize,
    token_start: usize,
    chunk_start: usize,
    token_end: usize,
    lookahead: usize,
    chars_read: usize,
    eof: bool,
    read_error: Option<std::io::Error>,
    /// last byte of the previously emitted token
    prev: Option<u8>,
    starts_at_bol: bool,
}

impl<R: Read> LexerBuffer<R> {
    pub fn new(source: R, capacity: usize, at_bol: bool) -> Self {
        Self {
            source,
            buf: vec![0; capacity.max(1)],
            base: 0,
            token_start: 0,
            chunk_start: 0,
            token_end: 0,
            lookahead: 0,
            chars_read: 0,
            eof: false,
            read_error: None,
            prev: None,
            starts_at_bol: at_bol,
        }
    }

    /// Start over on a fresh source; capacity is kept.
    pub fn reset(&mut self, source: R, at_bol: bool) {
        self.source = source;
        self.base = 0;
        self.token_start = 0;
        self.chunk_start = 0;
        self.token_end = 0;
        self.lookahead = 0;
        self.chars_read = 0;
        self.eof = false;
        self.read_error = None;
        self.prev = None;
        self.starts_at_bol = at_bol;
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        let capacity = capacity.max(self.chars_read).max(1);
        self.buf.resize(capacity, 0);
    }

    pub fn offsets(&self) -> Offsets {
        Offsets {
            token_start: self.token_start,
            chunk_start: self.chunk_start,
            token_end: self.token_end,
            lookahead: self.lookahead,
            chars_read: self.chars_read,
            capacity: self.buf.len(),
        }
    }

    pub fn read_error(&self) -> Option<&std::io::Error> {
        self.read_error.as_ref()
    }

    /// Make room at the end of the window: drop the consumed prefix, then
    /// double the capacity if that was not enough.
    fn make_room(&mut self) {
        if self.token_start > 0 {
            let shift = self.token_start;
            self.buf.copy_within(shift..self.chars_read, 0);
            self.base += shift;
            self.token_start = 0;
            self.chunk_start -= shift;
            self.token_end -= shift;
            self.lookahead -= shift;
            self.chars_read -= shift;
        }
        if self.chars_read == self.buf.len() {
            let grown = self.buf.len() * 2;
            log::trace!("lexer buffer grows {} -> {grown}", self.buf.len());
            self.buf.resize(grown, 0);
        }
    }

    /// Pull more bytes from the source; false at end of input.
    fn fill(&mut self) -> bool {
        if self.eof {
            return false;
        }
        if self.chars_read == self.buf.len() {
            self.make_room();
        }
        loop {
            match self.source.read(&mut self.buf[self.chars_read..]) {
                Ok(0) => {
                    self.eof = true;
                    return false;
                }
                Ok(n) => {
                    self.chars_read += n;
                    return true;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("source read failed at offset {}: {e}", self.base + self.chars_read);
                    self.read_error = Some(e);
                    self.eof = true;
                    return false;
                }
            }
        }
    }

    /// Next lookahead symbol: a byte value, or SYM_EOF (which does not move the cursor).
    #[inline]
    pub fn advance(&mut self) -> usize {
        if self.lookahead == self.chars_read && !self.fill() {
            return SYM_EOF;
        }
        let b = self.buf[self.lookahead];
        self.lookahead += 1;
        b as usize
    }

    /// Byte at the cursor without consuming it.
    pub fn peek(&mut self) -> Option<u8> {
        if self.lookahead == self.chars_read && !self.fill() {
            return None;
        }
        Some(self.buf[self.lookahead])
    }

    /// Start a new chunk at the end of the current match.
    pub fn begin_chunk(&mut self) {
        self.chunk_start = self.token_end;
        self.lookahead = self.token_end;
    }

    /// Whether the cursor (at chunk start) sits at the beginning of a line.
    pub fn at_line_start(&mut self) -> bool {
        let before = if self.chunk_start > self.token_start {
            Some(self.buf[self.chunk_start - 1])
        } else {
            self.prev
        };
        match before {
            None => self.starts_at_bol,
            Some(b'\n') => true,
            Some(b'\r') => self.peek() != Some(b'\n'),
            Some(_) => false,
        }
    }

    /// Cursor position relative to the token start; unaffected by compaction.
    #[inline]
    pub fn mark(&self) -> usize {
        self.lookahead - self.token_start
    }

    /// Text from earlier chunks is waiting to be emitted.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.token_start < self.chunk_start
    }

    #[inline]
    pub fn chunk_len(&self) -> usize {
        self.token_end - self.chunk_start
    }

    #[inline]
    pub fn token_len(&self) -> usize {
        self.token_end - self.token_start
    }

    pub fn chunk(&self) -> &[u8] {
        &self.buf[self.chunk_start..self.token_end]
    }

    pub fn token_start_offset(&self) -> usize {
        self.base + self.token_start
    }

    /// Absolute offset of the cursor.
    pub fn offset(&self) -> usize {
        self.base + self.token_end
    }

    /// End the current match at a position taken from `mark`.
    pub fn accept_mark(&mut self, mark: usize) {
        let end = self.token_start + mark;
        debug_assert!(end >= self.chunk_start && end <= self.chars_read);
        self.token_end = end;
        self.lookahead = end;
    }

    /// End the current match `n` bytes into the chunk.
    pub fn accept_chunk_prefix(&mut self, n: usize) {
        self.token_end = self.chunk_start + n;
        self.lookahead = self.token_end;
    }

    /// Return the last `n` matched bytes to the unread input.
    pub fn push_back(&mut self, n: usize) {
        debug_assert!(n <= self.chunk_len());
        self.token_end -= n.min(self.chunk_len());
        self.lookahead = self.token_end;
    }

    /// Drop one trailing LF and/or CR from the current chunk.
    pub fn trim_newline(&mut self) {
        if self.token_end > self.chunk_start && self.buf[self.token_end - 1] == b'\n' {
            self.token_end -= 1;
        }
        if self.token_end > self.chunk_start && self.buf[self.token_end - 1] == b'\r' {
            self.token_end -= 1;
        }
        self.lookahead = self.token_end;
    }

    /// Hand out the current token and start the next one at its end.
    pub fn take_token(&mut self) -> (Vec<u8>, usize, usize) {
        let lexeme = self.buf[self.token_start..self.token_end].to_vec();
        if let Some(&last) = lexeme.last() {
            self.prev = Some(last);
        }
        let span = (self.base + self.token_start, self.base + self.token_end);
        self.token_start = self.token_end;
        self.chunk_start = self.token_end;
        self.lookahead = self.token_end;
        (lexeme, span.0, span.1)
    }
}
