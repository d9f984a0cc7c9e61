//! Phase 2: Tokenizer
//!
//! The tokenizer walks the ingested label text with an explicit cursor and
//! produces words:
//! - `"..."` quoted strings (raw CR/LF become the two-character escapes
//!   `\r` / `\n`)
//! - `'...'` symbol strings
//! - bare words, ending at `=` and at whitespace (scalar mode) or at
//!   `, ( ) { }` (list mode); a `-` at end of line joins the next line
//!
//! Whitespace, `/* ... */` comments, and `#` comments are skipped before
//! each word.

use memchr::memmem;
use num_bigint::BigInt;
use tracing::trace;

use crate::error::{ParseContext, ParseError, Result};
use crate::value::{Quantity, Value};

/// A word read from the label.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    /// Text as stored in the keyword table. Keeps surrounding quotes unless
    /// they were stripped.
    pub text: String,
    /// Text without surrounding quotes.
    pub content: String,
    /// Produced by a quoting rule, so string-typed whatever it looks like.
    pub quoted: bool,
}

impl Word {
    fn bare(text: String) -> Self {
        Self {
            content: text.clone(),
            text,
            quoted: false,
        }
    }

    /// Whether the word is string-typed (quoted, or not a number).
    pub fn is_string(&self) -> bool {
        self.quoted || parse_number(&self.content).is_none()
    }

    /// Classify as a scalar value.
    pub fn scalar(&self) -> Value {
        if self.quoted {
            return Value::String(self.content.clone());
        }
        parse_number(&self.content).unwrap_or_else(|| Value::String(self.content.clone()))
    }

    /// Classify a list element. Elements like `10 <KM>` carry their own
    /// unit.
    pub fn list_element(&self) -> Value {
        if !self.quoted && self.content.ends_with('>') {
            if let Some(open) = self.content.rfind('<') {
                let value = Word::bare(self.content[..open].trim_end().to_string());
                let unit = &self.content[open + 1..self.content.len() - 1];
                if !value.content.is_empty() {
                    return Value::Quantity(Quantity::new(value.scalar(), unit));
                }
            }
        }
        self.scalar()
    }
}

/// Lexical classification of numbers: optionally signed integers, and reals
/// with a decimal point and/or exponent.
pub fn parse_number(s: &str) -> Option<Value> {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned.is_empty() {
        return None;
    }

    if unsigned.bytes().all(|b| b.is_ascii_digit()) {
        let digits = s.strip_prefix('+').unwrap_or(s);
        return digits.parse::<BigInt>().ok().map(Value::Integer);
    }

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (mantissa, None),
    };
    let all_digits = |t: &str| t.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
        return None;
    }
    if int_part.is_empty() && frac_part.map_or(true, str::is_empty) {
        return None;
    }
    if frac_part.is_none() && exponent.is_none() {
        return None;
    }
    if let Some(exp) = exponent {
        let exp_digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if exp_digits.is_empty() || !all_digits(exp_digits) {
            return None;
        }
    }
    s.parse::<f64>().ok().map(Value::Real)
}

/// Cursor over label text.
pub struct Cursor<'a> {
    source: &'a str,
    pos: usize,
    ctx: &'a ParseContext,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str, ctx: &'a ParseContext) -> Self {
        Self {
            source,
            pos: 0,
            ctx,
        }
    }

    /// Current byte position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Peek at the next character without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Advance by one character and return it.
    #[inline]
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Attach the line/column of byte position `pos` to an error.
    pub fn error_at(&self, err: ParseError, pos: usize) -> ParseError {
        let before = &self.source[..pos.min(self.source.len())];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let col = before[line_start..].chars().count();
        err.with_location(self.ctx, line, col)
    }

    /// Attach the current position to an error.
    pub fn error(&self, err: ParseError) -> ParseError {
        self.error_at(err, self.pos)
    }

    /// Skip whitespace and comments.
    pub fn skip_white(&mut self) {
        let bytes = self.source.as_bytes();
        loop {
            match bytes.get(self.pos) {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if bytes.get(self.pos + 1) == Some(&b'*') => {
                    match memmem::find(&bytes[self.pos + 2..], b"*/") {
                        Some(i) => {
                            self.pos += i + 4;
                            // Anything after the comment on its line is ignored.
                            self.skip_to_line_end();
                        }
                        None => self.pos = bytes.len(),
                    }
                }
                Some(b'#') if self.pos == 0 || bytes[self.pos - 1].is_ascii_whitespace() => {
                    self.skip_to_line_end();
                }
                _ => break,
            }
        }
    }

    fn skip_to_line_end(&mut self) {
        let bytes = self.source.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            if b == b'\n' || b == b'\r' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_spaces(&mut self) {
        let bytes = self.source.as_bytes();
        while bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    /// Read the next word.
    ///
    /// Returns `Ok(None)` at end of input. A word may be empty when the
    /// next character is a delimiter.
    pub fn read_word(&mut self, list_mode: bool, strip_quotes: bool) -> Result<Option<Word>> {
        self.skip_white();
        let word = match self.peek() {
            None => return Ok(None),
            Some('"') => self.read_quoted('"', strip_quotes)?,
            Some('\'') => self.read_quoted('\'', strip_quotes)?,
            Some(_) => self.read_bare(list_mode),
        };
        trace!(text = %word.text, is_string = word.is_string(), "word");
        Ok(Some(word))
    }

    fn read_quoted(&mut self, quote: char, strip_quotes: bool) -> Result<Word> {
        let start = self.pos;
        self.pos += 1;
        let mut content = String::new();
        loop {
            let Some(c) = self.advance() else {
                return Err(self.error_at(ParseError::UnterminatedQuote(String::new()), start));
            };
            match c {
                c if c == quote => break,
                '\r' if quote == '"' => content.push_str("\\r"),
                '\n' if quote == '"' => content.push_str("\\n"),
                c => content.push(c),
            }
        }
        let text = if strip_quotes {
            content.clone()
        } else {
            format!("{}{}{}", quote, content, quote)
        };
        Ok(Word {
            text,
            content,
            quoted: true,
        })
    }

    fn read_bare(&mut self, list_mode: bool) -> Word {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '=' {
                break;
            }
            if list_mode {
                if matches!(c, ',' | '(' | ')' | '{' | '}') {
                    break;
                }
            } else if c.is_ascii_whitespace() {
                break;
            }
            // A trailing `-` joins the word with the next line; a lone `-`
            // is a value.
            if c == '-' && !text.is_empty() {
                let rest = &self.source[self.pos + 1..];
                let newline = if rest.starts_with("\r\n") {
                    2
                } else if rest.starts_with('\n') || rest.starts_with('\r') {
                    1
                } else {
                    0
                };
                if newline > 0 {
                    self.pos += 1 + newline;
                    self.skip_spaces();
                    continue;
                }
            }
            text.push(c);
            self.pos += c.len_utf8();
        }
        if list_mode {
            text.truncate(text.trim_end().len());
        }
        Word::bare(text)
    }
}
