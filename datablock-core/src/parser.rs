//! Recursive descent parser for data block text.
//!
//! Each nesting level runs the same loop: skip whitespace and comments, read
//! an identifier, then dispatch on the next byte (`{` child block, `:` typed
//! param, `=` untyped string param). A nested level ends at its `}`; the top
//! level ends at EOF.
//!
//! Comments are classified while whitespace is skipped. A comment on the same
//! line as the statement before it is attached to that statement as a
//! trailing comment; anything else is held as pending and flushed in front of
//! the next statement, or at the end of the block.
//!
//! Any failure aborts the parse. No partial tree is returned.

use std::str::FromStr;

use tracing::warn;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::tree::{Block, Comment, CommentPlacement, CommentStyle};
use crate::value::ParamType;

/// Maximum block nesting depth.
pub const MAX_DEPTH: usize = 512;

/// True for bytes allowed in a bare identifier: `[A-Za-z0-9_.~-]`.
#[inline]
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'~' | b'-')
}

#[inline]
fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

/// Padding trimmed from both ends of an unquoted value.
#[inline]
fn is_value_pad(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x00 | 0x1A)
}

/// Parse a whole document into a root block.
pub fn parse(input: &[u8]) -> Result<Block> {
    let mut root = Block::new();
    let mut parser = Parser {
        cur: Cursor::new(input),
    };

    match parser.body(&mut root, 0) {
        Ok(()) => Ok(root),
        Err(err) => {
            warn!(line = err.line(), error = %err, "data block parse failed");
            Err(err)
        }
    }
}

impl Block {
    /// Parse data block text into a root block.
    pub fn parse(input: impl AsRef<[u8]>) -> Result<Block> {
        parse(input.as_ref())
    }
}

impl FromStr for Block {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s.as_bytes())
    }
}

// ============================================================================
// Per-level state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statement {
    None,
    Param,
    Block,
}

/// Comment bookkeeping for one block body.
#[derive(Debug)]
struct Frame {
    last: Statement,
    newline_since: bool,
    pending: Vec<Comment>,
}

impl Frame {
    fn new() -> Self {
        Self {
            last: Statement::None,
            newline_since: false,
            pending: Vec::new(),
        }
    }

    fn finish_statement(&mut self, kind: Statement) {
        self.last = kind;
        self.newline_since = false;
    }

    fn comment(&mut self, block: &mut Block, style: CommentStyle, text: String) {
        if self.newline_since || self.last == Statement::None {
            self.pending
                .push(Comment::new(style, CommentPlacement::Standalone, text));
            return;
        }

        let comment = Comment::new(style, CommentPlacement::Trailing, text);
        match self.last {
            Statement::Param => block.add_comment(comment),
            _ => block.add_block_comment(comment),
        }
    }

    fn flush_to_params(&mut self, block: &mut Block) {
        for comment in self.pending.drain(..) {
            block.add_comment(comment);
        }
    }

    fn flush_to_blocks(&mut self, block: &mut Block) {
        for comment in self.pending.drain(..) {
            block.add_block_comment(comment);
        }
    }

    /// Pending comments at block end go with the children if there are any.
    fn flush_on_close(&mut self, block: &mut Block) {
        if block.has_blocks() {
            self.flush_to_blocks(block);
        } else {
            self.flush_to_params(block);
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    cur: Cursor<'a>,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::syntax(self.cur.line(), message)
    }

    /// Parse statements into `block` until its `}` (nested) or EOF (top level).
    fn body(&mut self, block: &mut Block, depth: usize) -> Result<()> {
        let mut frame = Frame::new();

        loop {
            self.skip_ws(&mut frame, block)?;
            match self.cur.peek(0) {
                None if depth == 0 => break,
                None => {
                    return Err(self.error(format!(
                        "unexpected EOF, block '{}' is not closed",
                        block.name()
                    )))
                }
                Some(b'}') if depth == 0 => return Err(self.error("unexpected '}' at top level")),
                Some(b'}') => {
                    self.cur.advance(1);
                    break;
                }
                Some(_) => self.statement(&mut frame, block, depth)?,
            }
        }

        frame.flush_on_close(block);
        Ok(())
    }

    fn statement(&mut self, frame: &mut Frame, block: &mut Block, depth: usize) -> Result<()> {
        let name = self.identifier()?;
        self.skip_ws(frame, block)?;

        match self.cur.peek(0) {
            Some(b'{') => {
                self.cur.advance(1);
                if depth + 1 > MAX_DEPTH {
                    return Err(self.error(format!("blocks nested deeper than {MAX_DEPTH}")));
                }
                frame.flush_to_blocks(block);
                let child = block.create_block(name);
                self.body(child, depth + 1)?;
                frame.finish_statement(Statement::Block);
            }
            Some(b':') => {
                self.cur.advance(1);
                frame.flush_to_params(block);
                let ty = self.param_type()?;
                self.skip_line_ws();
                if self.cur.peek(0) != Some(b'=') {
                    return Err(self.error(format!("expected '=' after type of param '{name}'")));
                }
                self.cur.advance(1);
                self.param_value(block, name, ty)?;
                frame.finish_statement(Statement::Param);
            }
            Some(b'=') => {
                self.cur.advance(1);
                frame.flush_to_params(block);
                self.param_value(block, name, ParamType::String)?;
                frame.finish_statement(Statement::Param);
            }
            Some(b) => {
                return Err(self.error(format!(
                    "unexpected '{}' after '{name}'",
                    char::from(b).escape_default()
                )))
            }
            None => return Err(self.error(format!("unexpected EOF after '{name}'"))),
        }
        Ok(())
    }

    // ---- Whitespace and comments ----

    fn skip_ws(&mut self, frame: &mut Frame, block: &mut Block) -> Result<()> {
        loop {
            match self.cur.peek(0) {
                Some(b' ' | b'\t' | b'\r' | 0x00 | 0x1A) => self.cur.advance(1),
                Some(b'\n') => {
                    self.cur.advance(1);
                    self.cur.new_line();
                    frame.newline_since = true;
                }
                Some(b'/') if self.cur.peek(1) == Some(b'/') => {
                    self.cur.advance(2);
                    let start = self.cur.position();
                    let end = start + self.cur.find_line_end();
                    let text = String::from_utf8_lossy(self.cur.slice(start, end)).into_owned();
                    self.cur.advance_to(end);
                    frame.comment(block, CommentStyle::Cpp, text);
                }
                Some(b'/') if self.cur.peek(1) == Some(b'*') => {
                    let (text, multiline) = self.block_comment()?;
                    frame.comment(block, CommentStyle::C, text);
                    if multiline {
                        frame.newline_since = true;
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Spaces, tabs and line breaks, no comments.
    fn skip_line_ws(&mut self) {
        while let Some(b) = self.cur.peek(0) {
            match b {
                b' ' | b'\t' | b'\r' => self.cur.advance(1),
                b'\n' => {
                    self.cur.advance(1);
                    self.cur.new_line();
                }
                _ => break,
            }
        }
    }

    fn skip_blanks(&mut self) {
        while self.cur.peek(0).is_some_and(is_blank) {
            self.cur.advance(1);
        }
    }

    /// Read a `/* ... */` comment, nesting allowed. Returns the inner text and
    /// whether it spans lines.
    fn block_comment(&mut self) -> Result<(String, bool)> {
        let open_line = self.cur.line();
        self.cur.advance(2);
        let start = self.cur.position();
        let mut depth = 1usize;

        loop {
            if self.cur.at_eof() {
                return Err(Error::syntax(
                    open_line,
                    "unexpected EOF inside comment",
                ));
            }
            if self.cur.starts_with(b"/*") {
                depth += 1;
                self.cur.advance(2);
            } else if self.cur.starts_with(b"*/") {
                depth -= 1;
                if depth == 0 {
                    let text = self.cur.slice(start, self.cur.position());
                    self.cur.advance(2);
                    return Ok((
                        String::from_utf8_lossy(text).into_owned(),
                        self.cur.line() != open_line,
                    ));
                }
                self.cur.advance(2);
            } else {
                if self.cur.peek(0) == Some(b'\n') {
                    self.cur.new_line();
                }
                self.cur.advance(1);
            }
        }
    }

    // ---- Names ----

    fn identifier(&mut self) -> Result<String> {
        match self.cur.peek(0) {
            Some(q @ (b'"' | b'\'')) => self.quoted(q),
            Some(b) if is_ident_byte(b) => Ok(self.bare_run()),
            Some(b) => Err(self.error(format!(
                "expected identifier, found '{}'",
                char::from(b).escape_default()
            ))),
            None => Err(self.error("expected identifier, found EOF")),
        }
    }

    fn bare_run(&mut self) -> String {
        let start = self.cur.position();
        while self.cur.peek(0).is_some_and(is_ident_byte) {
            self.cur.advance(1);
        }
        // Identifier bytes are ASCII
        String::from_utf8_lossy(self.cur.slice(start, self.cur.position())).into_owned()
    }

    fn param_type(&mut self) -> Result<ParamType> {
        self.skip_blanks();
        let name = self.bare_run();
        if name.is_empty() {
            return Err(self.error("expected type name after ':'"));
        }
        ParamType::from_name(&name).ok_or_else(|| self.error(format!("unknown type '{name}'")))
    }

    // ---- Values ----

    fn param_value(&mut self, block: &mut Block, name: String, ty: ParamType) -> Result<()> {
        self.skip_blanks();
        if matches!(self.cur.peek(0), None | Some(b'\r' | b'\n')) {
            return Err(self.error(format!("param '{name}' has no value")));
        }

        let line = self.cur.line();
        let text = self.value()?;
        if text.is_empty() && ty != ParamType::String {
            return Err(Error::syntax(line, format!("param '{name}' is empty")));
        }

        block
            .add_param_text(name, ty, &text)
            .map_err(|source| Error::TypeMismatch { line, source })?;
        Ok(())
    }

    fn value(&mut self) -> Result<String> {
        match self.cur.peek(0) {
            Some(q @ (b'"' | b'\'')) => {
                let text = if self.cur.remaining_at_least(3) && self.cur.starts_with(&[q, q, q]) {
                    self.triple_quoted(q)?
                } else {
                    self.quoted(q)?
                };
                self.skip_blanks();
                if self.cur.peek(0) == Some(b';') {
                    self.cur.advance(1);
                }
                Ok(text)
            }
            _ => self.unquoted(),
        }
    }

    /// Handle the byte after a `~`. Unknown escapes are kept as written.
    fn escape(&mut self, out: &mut Vec<u8>) {
        let resolved = match self.cur.peek(0) {
            Some(b'n') => b'\n',
            Some(b'r') => b'\r',
            Some(b't') => b'\t',
            Some(b @ (b'~' | b'"' | b'\'')) => b,
            _ => {
                out.push(b'~');
                return;
            }
        };
        self.cur.advance(1);
        out.push(resolved);
    }

    /// Single-line `"..."` or `'...'`.
    fn quoted(&mut self, quote: u8) -> Result<String> {
        let line = self.cur.line();
        self.cur.advance(1);
        let mut out = Vec::new();

        loop {
            let start = self.cur.position();
            let run = self.cur.find_any3(quote, b'~', b'\n');
            out.extend(self.cur.slice(start, start + run).iter().filter(|&&b| b != b'\r'));
            self.cur.advance(run);

            match self.cur.next_byte() {
                None | Some(b'\n') => return Err(Error::syntax(line, "unclosed string")),
                Some(b'~') => self.escape(&mut out),
                Some(_) => break,
            }
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Multi-line `"""..."""` or `'''...'''`.
    fn triple_quoted(&mut self, quote: u8) -> Result<String> {
        let line = self.cur.line();
        let closer = [quote, quote, quote];
        self.cur.advance(3);

        // A line break right after the opener is not content
        let mut skipped = 0;
        while matches!(self.cur.peek(0), Some(b' ' | b'\t' | b'\r')) {
            self.cur.advance(1);
            skipped += 1;
        }
        if self.cur.peek(0) == Some(b'\n') {
            self.cur.advance(1);
            self.cur.new_line();
        } else {
            self.cur.rewind(skipped);
        }

        let mut out = Vec::new();
        // Only a line break from the source text is stripped before the closer
        let mut ends_in_line_break = false;
        loop {
            if self.cur.starts_with(&closer) {
                self.cur.advance(3);
                break;
            }
            match self.cur.next_byte() {
                None => return Err(Error::syntax(line, "unclosed multi-line string")),
                Some(b'\n') => {
                    self.cur.new_line();
                    out.push(b'\n');
                    ends_in_line_break = true;
                }
                Some(b'\r') if self.cur.peek(0) == Some(b'\n') => {}
                Some(b'~') => {
                    self.escape(&mut out);
                    ends_in_line_break = false;
                }
                Some(b) => {
                    out.push(b);
                    ends_in_line_break = false;
                }
            }
        }

        if ends_in_line_break {
            out.pop();
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Raw text up to `;`, line end, `}`, `//` or EOF. Block comments inside
    /// are dropped, padding at both ends is trimmed.
    fn unquoted(&mut self) -> Result<String> {
        let mut out = Vec::new();

        loop {
            match self.cur.peek(0) {
                None | Some(b'\r' | b'\n' | b'}') => break,
                Some(b';') => {
                    self.cur.advance(1);
                    break;
                }
                Some(b'/') if self.cur.peek(1) == Some(b'/') => break,
                Some(b'/') if self.cur.peek(1) == Some(b'*') => {
                    self.block_comment()?;
                }
                Some(b) => {
                    out.push(b);
                    self.cur.advance(1);
                }
            }
        }

        let start = out.iter().position(|&b| !is_value_pad(b)).unwrap_or(out.len());
        let end = out.iter().rposition(|&b| !is_value_pad(b)).map_or(start, |i| i + 1);
        Ok(String::from_utf8_lossy(&out[start..end]).into_owned())
    }
}

// ============================================================================
// Tests
// ============================================================================
