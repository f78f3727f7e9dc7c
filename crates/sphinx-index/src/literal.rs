//! Reader for the JavaScript object literal inside `searchindex.js`
//!
//! The payload Sphinx writes is *not* JSON: object keys that are valid
//! JavaScript identifiers are emitted bare (`docnames:`, `sphinx:56`,
//! `terms:{A:2,If:1}`), and strings may be single-quoted. This module
//! tokenizes that dialect and produces a [`serde_json::Value`], which the
//! typed model then deserializes from.

use serde_json::{Map, Number, Value};

use crate::error::ParseError;

/// Maximum nesting depth accepted before the reader gives up.
///
/// Real search indices nest three levels deep; the limit only bounds
/// hostile input.
pub const MAX_DEPTH: usize = 128;

/// Parse a JavaScript object literal into a [`serde_json::Value`].
///
/// Accepts the superset of JSON that Sphinx emits: bare identifier keys,
/// single- or double-quoted strings, and `\uXXXX` escapes (including
/// surrogate pairs). The whole input must be a single value; trailing
/// input is an error.
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] with a line/column position for
/// malformed input, [`ParseError::TrailingInput`] if characters follow
/// the value, and [`ParseError::TooDeep`] past [`MAX_DEPTH`] levels.
pub fn parse_literal(src: &str) -> Result<Value, ParseError> {
    let mut reader = Reader::new(src);
    reader.skip_whitespace();
    let value = reader.parse_value(0)?;
    reader.skip_whitespace();
    if !reader.at_end() {
        return Err(ParseError::TrailingInput {
            line: reader.line,
            column: reader.column,
        });
    }
    Ok(value)
}

/// Character-level reader with line/column tracking.
struct Reader {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Reader {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(message, self.line, self.column)
    }

    /// Consume one expected character or fail.
    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected `{expected}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value, ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { max: MAX_DEPTH });
        }
        match self.peek() {
            Some('{') => self.parse_object(depth),
            Some('[') => self.parse_array(depth),
            Some(q @ ('"' | '\'')) => self.parse_string(q).map(Value::String),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if is_ident_start(c) => self.parse_word(),
            Some(c) => Err(self.error(format!("unexpected character `{c}`"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.expect('{')?;
        let mut map = Map::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_key()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value(depth + 1)?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    return Ok(Value::Object(map));
                }
                Some(c) => return Err(self.error(format!("expected `,` or `}}`, found `{c}`"))),
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    fn parse_array(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(Value::Array(items));
        }
        loop {
            self.skip_whitespace();
            items.push(self.parse_value(depth + 1)?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {
                    self.bump();
                    return Ok(Value::Array(items));
                }
                Some(c) => return Err(self.error(format!("expected `,` or `]`, found `{c}`"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    /// An object key: a quoted string or a bare JavaScript identifier.
    fn parse_key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => self.parse_string(q),
            Some(c) if is_ident_start(c) => {
                let mut key = String::new();
                while let Some(c) = self.peek() {
                    if !is_ident_continue(c) {
                        break;
                    }
                    key.push(c);
                    self.bump();
                }
                Ok(key)
            }
            Some(c) => Err(self.error(format!("expected object key, found `{c}`"))),
            None => Err(self.error("expected object key, found end of input")),
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, ParseError> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape(quote)?),
                Some('\n') => return Err(self.error("unterminated string")),
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_escape(&mut self, quote: char) -> Result<char, ParseError> {
        match self.bump() {
            Some(c) if c == quote => Ok(quote),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{0008}'),
            Some('f') => Ok('\u{000C}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.parse_unicode_escape(),
            Some(c) => Err(self.error(format!("unknown escape `\\{c}`"))),
            None => Err(self.error("unterminated escape sequence")),
        }
    }

    /// `\uXXXX`, pairing a high surrogate with the following `\uXXXX`.
    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let first = self.parse_hex4()?;
        if (0xD800..0xDC00).contains(&first) {
            // High surrogate: the low half must follow immediately.
            if self.bump() != Some('\\') || self.bump() != Some('u') {
                return Err(self.error("high surrogate not followed by `\\u` escape"));
            }
            let second = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&second) {
                return Err(self.error("invalid low surrogate"));
            }
            let code = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
            char::from_u32(code).ok_or_else(|| self.error("invalid surrogate pair"))
        } else if (0xDC00..0xE000).contains(&first) {
            Err(self.error("unpaired low surrogate"))
        } else {
            char::from_u32(first).ok_or_else(|| self.error("invalid unicode escape"))
        }
    }

    fn parse_hex4(&mut self) -> Result<u32, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let c = self
                .bump()
                .ok_or_else(|| self.error("truncated `\\u` escape"))?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| self.error(format!("invalid hex digit `{c}` in `\\u` escape")))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        self.take_digits(&mut text);
        if text.is_empty() || text == "-" {
            return Err(self.error("malformed number"));
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            text.push('.');
            self.bump();
            self.take_digits(&mut text);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            text.push('e');
            self.bump();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.bump();
            }
            self.take_digits(&mut text);
        }
        let number = if is_float {
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| self.error(format!("malformed number `{text}`")))?
        } else if let Ok(n) = text.parse::<i64>() {
            Number::from(n)
        } else {
            return Err(self.error(format!("integer out of range `{text}`")));
        };
        Ok(Value::Number(number))
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.bump();
        }
    }

    /// Bare words in value position: only `true`, `false`, and `null`.
    fn parse_word(&mut self) -> Result<Value, ParseError> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_continue(c) {
                break;
            }
            word.push(c);
            self.bump();
        }
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => Err(self.error(format!(
                "bare identifier `{word}` is only allowed as an object key"
            ))),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_keys_and_mixed_quoting() {
        let value = parse_literal(r#"{docnames:["a"],envversion:{"sphinx.ext":1,sphinx:56}}"#)
            .expect("parse");
        assert_eq!(
            value,
            json!({"docnames": ["a"], "envversion": {"sphinx.ext": 1, "sphinx": 56}})
        );
    }

    #[test]
    fn test_single_quoted_string() {
        let value = parse_literal("{a:'it\\'s'}").expect("parse");
        assert_eq!(value, json!({"a": "it's"}));
    }

    #[test]
    fn test_unicode_escape_and_surrogate_pair() {
        let input = "[\"relay\\u2019s docs\",\"\\ud83d\\ude00\"]";
        let value = parse_literal(input).expect("parse");
        assert_eq!(value, json!(["relay\u{2019}s docs", "\u{1F600}"]));
    }

    #[test]
    fn test_unpaired_surrogate_rejected() {
        let err = parse_literal(r#"["\ud83d"]"#).expect_err("must fail");
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn test_bare_identifier_value_rejected() {
        let err = parse_literal("{a:docnames}").expect_err("must fail");
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn test_trailing_input_rejected() {
        let err = parse_literal("{} junk").expect_err("must fail");
        assert!(matches!(err, ParseError::TrailingInput { .. }));
    }

    #[test]
    fn test_nesting_past_the_depth_limit_rejected() {
        let src = "[".repeat(MAX_DEPTH + 2);
        let err = parse_literal(&src).expect_err("must fail");
        assert!(matches!(err, ParseError::TooDeep { max: MAX_DEPTH }));
    }

    #[test]
    fn test_nesting_at_the_depth_limit_still_errors_on_content() {
        // One level short of the limit: the reader descends fine and
        // fails on the unterminated arrays instead.
        let src = "[".repeat(MAX_DEPTH);
        let err = parse_literal(&src).expect_err("must fail");
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn test_error_position_is_tracked() {
        let err = parse_literal("{a:1,\n  b:}").expect_err("must fail");
        match err {
            ParseError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
