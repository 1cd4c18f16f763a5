//! Byte cursor over a source buffer.
//!
//! Owns the read position and the line counter for a single parse. Lookahead
//! (`peek`) never moves the position; only `advance`/`rewind` do. The line
//! counter is bumped explicitly by whoever consumes a line feed, so the
//! parser stays in control of what counts as a line break.

use memchr::{memchr, memchr2, memchr3};

#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, line: 1 }
    }

    /// Byte at `pos + offset`, if any.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<u8> {
        self.buf.get(self.pos + offset).copied()
    }

    /// True if the bytes at the current position start with `prefix`.
    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.buf[self.pos..].starts_with(prefix)
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    #[inline]
    pub fn rewind(&mut self, n: usize) {
        self.pos = self.pos.saturating_sub(n);
    }

    /// Consume and return the next byte.
    #[inline]
    pub fn next_byte(&mut self) -> Option<u8> {
        let b = self.peek(0)?;
        self.pos += 1;
        Some(b)
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    pub fn remaining_at_least(&self, n: usize) -> bool {
        self.buf.len() - self.pos >= n
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current line, 1-based.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Record that a line feed was consumed.
    #[inline]
    pub fn new_line(&mut self) {
        self.line += 1;
    }

    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.buf[start..end]
    }

    /// Offset (relative to the position) of the next CR or LF, or of EOF.
    pub fn find_line_end(&self) -> usize {
        let rest = &self.buf[self.pos..];
        memchr2(b'\r', b'\n', rest).unwrap_or(rest.len())
    }

    /// Offset (relative to the position) of the next `a`, `b` or `c`, or of EOF.
    pub fn find_any3(&self, a: u8, b: u8, c: u8) -> usize {
        let rest = &self.buf[self.pos..];
        memchr3(a, b, c, rest).unwrap_or(rest.len())
    }

    /// Consume bytes up to `end` (absolute), counting the line feeds passed.
    pub fn advance_to(&mut self, end: usize) {
        let end = end.min(self.buf.len());
        let mut rest = &self.buf[self.pos..end];
        while let Some(i) = memchr(b'\n', rest) {
            self.line += 1;
            rest = &rest[i + 1..];
        }
        self.pos = end;
    }
}
