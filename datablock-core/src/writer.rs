//! Serializer: document tree back to data block text.
//!
//! Output layout:
//!
//! ```text
//! width:S32 = 640
//! title:String = "Main window"
//!
//! child
//! {
//!   x:F32 = 1.5
//! }
//! ```
//!
//! Indentation is two spaces per level. Comments are written where they were
//! read: standalone ones on their own line, trailing ones after the statement
//! they follow.

use std::fmt;
use std::io::Write;

use crate::error::Result;
use crate::parser::is_ident_byte;
use crate::tree::{Block, Comment, CommentStyle, Entry, Param};
use crate::value::ParamValue;

/// Layout options for [`Block::write_text`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// No indentation and no blank lines. A block holding a single param is
    /// written on one line as `name\n{a:S32 = 1;}`.
    pub compact: bool,
}

impl WriteOptions {
    pub fn compact() -> Self {
        Self { compact: true }
    }
}

/// True if `text` can be written without quotes.
#[inline]
pub(crate) fn is_simple(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(is_ident_byte)
}

impl Block {
    /// Serialize with the default layout.
    pub fn to_text(&self) -> String {
        self.to_text_with(WriteOptions::default())
    }

    pub fn to_text_with(&self, options: WriteOptions) -> String {
        let mut writer = Writer {
            out: String::new(),
            options,
        };
        writer.body(self, 0);
        writer.out
    }

    /// Serialize into `sink`. Fails only with the sink's I/O errors.
    pub fn write_text<W: Write>(&self, mut sink: W, options: WriteOptions) -> Result<()> {
        sink.write_all(self.to_text_with(options).as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

// ============================================================================
// Writer
// ============================================================================

struct Writer {
    out: String,
    options: WriteOptions,
}

impl Writer {
    fn indent(&mut self, level: usize) {
        if !self.options.compact {
            for _ in 0..level * 2 {
                self.out.push(' ');
            }
        }
    }

    fn blank_line(&mut self) {
        if !self.options.compact {
            self.out.push('\n');
        }
    }

    fn body(&mut self, block: &Block, level: usize) {
        let params = block.param_entries();
        let children = block.block_entries();

        self.params(params, level);
        if !params.is_empty() && !children.is_empty() {
            self.blank_line();
        }
        self.children(children, level);
    }

    fn params(&mut self, entries: &[Entry<Param>], level: usize) {
        let mut i = 0;
        while i < entries.len() {
            self.indent(level);
            match &entries[i] {
                Entry::Item(param) => {
                    self.param(param);
                    // An unquoted value must end before a trailing block comment
                    if matches!(entries.get(i + 1), Some(Entry::Comment(c))
                        if c.is_trailing() && c.style == CommentStyle::C)
                    {
                        self.out.push(';');
                    }
                    i = self.trailing(entries, i + 1, level);
                }
                Entry::Comment(comment) => {
                    self.comment(comment);
                    i += 1;
                }
            }
            self.out.push('\n');
        }
    }

    fn children(&mut self, entries: &[Entry<Block>], level: usize) {
        let mut i = 0;
        while i < entries.len() {
            self.indent(level);
            let block = match &entries[i] {
                Entry::Item(block) => block,
                Entry::Comment(comment) => {
                    self.comment(comment);
                    self.out.push('\n');
                    i += 1;
                    continue;
                }
            };

            self.name(block.name());
            if block.is_empty() {
                self.out.push_str("{}");
            } else if let Some(param) = self.inline_param(block) {
                self.out.push_str("\n{");
                self.param(param);
                self.out.push_str(";}");
            } else {
                self.out.push('\n');
                self.indent(level);
                self.out.push_str("{\n");
                self.body(block, level + 1);
                self.indent(level);
                self.out.push('}');
            }
            i = self.trailing(entries, i + 1, level);
            self.out.push('\n');

            if entries[i..].iter().any(|e| matches!(e, Entry::Item(_))) {
                self.blank_line();
            }
        }
    }

    /// The single param of `block`, if compact output puts it inline.
    fn inline_param<'b>(&self, block: &'b Block) -> Option<&'b Param> {
        if !self.options.compact || !block.block_entries().is_empty() {
            return None;
        }
        match block.param_entries() {
            [Entry::Item(param)] => Some(param),
            _ => None,
        }
    }

    /// Append the trailing comments starting at `start`; returns the index
    /// after the last one.
    fn trailing<T>(&mut self, entries: &[Entry<T>], start: usize, level: usize) -> usize {
        let mut i = start;
        let mut line_closed = false;
        while let Some(Entry::Comment(comment)) = entries.get(i) {
            if !comment.is_trailing() {
                break;
            }
            if line_closed {
                self.out.push('\n');
                self.indent(level);
            } else {
                self.out.push(' ');
            }
            self.comment(comment);
            line_closed = comment.style == CommentStyle::Cpp;
            i += 1;
        }
        i
    }

    fn comment(&mut self, comment: &Comment) {
        match comment.style {
            CommentStyle::Cpp => {
                self.out.push_str("//");
                self.out.push_str(&comment.text);
            }
            CommentStyle::C => {
                self.out.push_str("/*");
                self.out.push_str(&comment.text);
                self.out.push_str("*/");
            }
        }
    }

    fn param(&mut self, param: &Param) {
        self.name(&param.name);
        self.out.push(':');
        self.out.push_str(param.param_type().name());
        self.out.push_str(" = ");
        match &param.value {
            ParamValue::String(text) => self.string(text),
            value => {
                use fmt::Write as _;
                // Writing into a String cannot fail
                let _ = write!(self.out, "{value}");
            }
        }
    }

    fn name(&mut self, name: &str) {
        if is_simple(name) {
            self.out.push_str(name);
        } else {
            self.single_quoted(name, pick_quote(name));
        }
    }

    fn string(&mut self, text: &str) {
        if is_simple(text) {
            self.out.push_str(text);
        } else if text.contains(['\r', '\n']) {
            self.triple_quoted(text, pick_quote(text));
        } else {
            self.single_quoted(text, pick_quote(text));
        }
    }

    fn single_quoted(&mut self, text: &str, quote: char) {
        self.out.push(quote);
        for ch in text.chars() {
            match ch {
                '~' => self.out.push_str("~~"),
                '\n' => self.out.push_str("~n"),
                '\r' => self.out.push_str("~r"),
                '\t' => self.out.push_str("~t"),
                c if c == quote => {
                    self.out.push('~');
                    self.out.push(c);
                }
                c => self.out.push(c),
            }
        }
        self.out.push(quote);
    }

    fn triple_quoted(&mut self, text: &str, quote: char) {
        for _ in 0..3 {
            self.out.push(quote);
        }
        self.out.push('\n');

        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '~' => self.out.push_str("~~"),
                '\r' => self.out.push_str("~r"),
                '\t' => self.out.push_str("~t"),
                c if c == quote && chars.peek() == Some(&quote) => {
                    self.out.push('~');
                    self.out.push(c);
                }
                c => self.out.push(c),
            }
        }

        self.out.push('\n');
        for _ in 0..3 {
            self.out.push(quote);
        }
    }
}

/// `'` when the text has double quotes but no single quotes, `"` otherwise.
fn pick_quote(text: &str) -> char {
    if text.contains('"') && !text.contains('\'') {
        '\''
    } else {
        '"'
    }
}

// ============================================================================
// Tests
// ============================================================================
