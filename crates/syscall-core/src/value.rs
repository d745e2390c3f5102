//! Structured-value reader - a relaxed JSON superset
//!
//! Used in two places:
//! - the call tokenizer asks for the length of one complete value so that a
//!   quoted phrase or an inline object becomes a single token
//! - argument decoding turns a token's raw text into a `serde_json::Value`
//!
//! Accepted on top of JSON:
//! - single-quoted strings, and `\` before any character
//! - quoteless property names and quoteless strings
//! - optional and trailing commas in objects and arrays
//! - `#`, `//` and `/* */` comments

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Malformed structured value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    /// Character offset of the error, relative to the start of the value
    pub offset: usize,
}

/// Number of characters spanned by the single value starting at the
/// beginning of `text`, including any comments in front of it.
pub fn element_length(text: &str) -> Result<usize, SyntaxError> {
    let chars: Vec<char> = text.chars().collect();
    measure(&chars)
}

/// Decode exactly one value from `text`. Trailing whitespace and comments
/// are allowed, anything else is an error.
pub fn parse(text: &str) -> Result<Value, SyntaxError> {
    let chars: Vec<char> = text.chars().collect();
    let mut reader = Reader::new(&chars);
    let value = reader.read_element(false)?;
    reader.skip_whitespace_and_comments()?;
    if let Some(ch) = reader.peek() {
        return Err(reader.error(format!("Unexpected character after value: '{}'", ch)));
    }
    Ok(value)
}

pub(crate) fn measure(chars: &[char]) -> Result<usize, SyntaxError> {
    let mut reader = Reader::new(chars);
    reader.read_element(false)?;
    Ok(reader.position)
}

struct Reader<'a> {
    input: &'a [char],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a [char]) -> Self {
        Reader { input, position: 0 }
    }

    // ── Character helpers ──────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            offset: self.position,
        }
    }

    // ── Whitespace & Comments ──────────────────────────────

    fn skip_whitespace_and_comments(&mut self) -> Result<(), SyntaxError> {
        loop {
            while let Some(ch) = self.peek() {
                if ch.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            match (self.peek(), self.peek_ahead(1)) {
                (Some('#'), _) | (Some('/'), Some('/')) => {
                    while let Some(ch) = self.peek() {
                        if is_line_break(ch) {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.position;
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            None => {
                                return Err(SyntaxError {
                                    message: "Unterminated block comment".into(),
                                    offset: start,
                                });
                            }
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    // ── Main dispatch ──────────────────────────────────────

    fn read_element(&mut self, in_container: bool) -> Result<Value, SyntaxError> {
        self.skip_whitespace_and_comments()?;

        match self.peek() {
            None => Err(self.error("Expected value, found end of input")),
            Some('"') | Some('\'') => self.read_string().map(Value::String),
            Some('{') => self.read_object(),
            Some('[') => self.read_array(),
            Some('/') => Err(self.error("Unexpected character: '/'")),
            Some(ch @ (':' | ',' | '}' | ']')) => {
                Err(self.error(format!("Unexpected character: '{}'", ch)))
            }
            Some(_) => Ok(self.read_quoteless(in_container)),
        }
    }

    // ── Strings ────────────────────────────────────────────

    fn read_string(&mut self) -> Result<String, SyntaxError> {
        let start = self.position;
        let quote = self.advance().unwrap_or('"');
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(SyntaxError {
                        message: format!("Unterminated string: {}", quote),
                        offset: start,
                    });
                }
                Some(c) if c == quote => break,
                Some('\\') => self.read_escape(&mut value)?,
                Some(c) => value.push(c),
            }
        }

        Ok(value)
    }

    fn read_escape(&mut self, value: &mut String) -> Result<(), SyntaxError> {
        let ch = match self.advance() {
            None => return Err(self.error("Incomplete escape sequence: `\\`")),
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('0') => '\0',
            Some('u') => self.read_unicode_escape()?,
            // Any other escaped character stands for itself
            Some(c) => c,
        };
        value.push(ch);
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u32, SyntaxError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .advance()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("Invalid unicode escape sequence"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn read_unicode_escape(&mut self) -> Result<char, SyntaxError> {
        let high = self.read_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            // Surrogate pair: the low half must follow as another \u escape
            if self.peek() == Some('\\') && self.peek_ahead(1) == Some('u') {
                self.advance();
                self.advance();
                let low = self.read_hex4()?;
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code)
                        .ok_or_else(|| self.error("Invalid unicode escape sequence"));
                }
            }
            return Err(self.error("Unpaired surrogate in unicode escape sequence"));
        }
        char::from_u32(high).ok_or_else(|| self.error("Invalid unicode escape sequence"))
    }

    // ── Containers ─────────────────────────────────────────

    fn read_object(&mut self) -> Result<Value, SyntaxError> {
        let start = self.position;
        self.advance(); // consume {
        let mut map = Map::new();

        loop {
            self.skip_whitespace_and_comments()?;
            match self.peek() {
                None => {
                    return Err(SyntaxError {
                        message: "Unterminated object: '{'".into(),
                        offset: start,
                    });
                }
                Some('}') => {
                    self.advance();
                    break;
                }
                Some(',') => {
                    self.advance();
                    continue;
                }
                Some(_) => {}
            }

            let key = self.read_property_name()?;
            self.skip_whitespace_and_comments()?;
            if self.advance() != Some(':') {
                return Err(self.error(format!("Expected ':' after property name '{}'", key)));
            }
            let value = self.read_element(true)?;
            map.insert(key, value);
        }

        Ok(Value::Object(map))
    }

    fn read_property_name(&mut self) -> Result<String, SyntaxError> {
        if matches!(self.peek(), Some('"') | Some('\'')) {
            return self.read_string();
        }

        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch == ':' {
                break;
            }
            if is_line_break(ch) || matches!(ch, '{' | '}' | '[' | ']' | ',') {
                return Err(self.error(format!("Unexpected character in property name: '{}'", ch)));
            }
            if ch == '\\' {
                self.advance();
                self.read_escape(&mut name)?;
                continue;
            }
            name.push(ch);
            self.advance();
        }

        let name = name.trim_end().to_string();
        if name.is_empty() {
            return Err(self.error("Expected property name"));
        }
        Ok(name)
    }

    fn read_array(&mut self) -> Result<Value, SyntaxError> {
        let start = self.position;
        self.advance(); // consume [
        let mut items = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;
            match self.peek() {
                None => {
                    return Err(SyntaxError {
                        message: "Unterminated array: '['".into(),
                        offset: start,
                    });
                }
                Some(']') => {
                    self.advance();
                    break;
                }
                Some(',') => {
                    self.advance();
                    continue;
                }
                Some(_) => items.push(self.read_element(true)?),
            }
        }

        Ok(Value::Array(items))
    }

    // ── Quoteless primitives ───────────────────────────────

    fn read_quoteless(&mut self, in_container: bool) -> Value {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if is_line_break(ch) || (in_container && matches!(ch, ',' | '}' | ']')) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        quoteless_value(text.trim())
    }
}

/// Interpret quoteless text as a literal, a number, or else a string
fn quoteless_value(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }

    let numeric = text
        .trim_start_matches(['-', '+'])
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    if numeric {
        if let Ok(i) = text.parse::<i64>() {
            return Value::Number(i.into());
        }
        if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }

    Value::String(text.to_string())
}

pub(crate) fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
