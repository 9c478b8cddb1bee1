//! Recursive-descent RFC 8259 parser (C4).

use crate::document::Document;
use vjson_core::node::{Node, MAX_INT60, MIN_INT60};
use vjson_core::{dispatch, ErrorKind, NodeRef, ParseError};

/// Parse-time knobs. All default to strict RFC 8259 behavior; every
/// deviation is opt-in.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Accept `//` and `/* */` comments between tokens.
    pub allow_comments: bool,
    /// Accept a trailing comma before a closing `]` or `}`.
    pub allow_trailing_commas: bool,
    /// Accept bare `NaN`, `Infinity`, and `-Infinity` literals.
    pub allow_inf_nan: bool,
    /// Maximum container nesting depth. `0` means unbounded.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> ParseOptions {
        ParseOptions {
            allow_comments: false,
            allow_trailing_commas: false,
            allow_inf_nan: false,
            max_depth: 512,
        }
    }
}

impl ParseOptions {
    pub fn new() -> ParseOptions {
        ParseOptions::default()
    }

    pub fn allow_comments(mut self, v: bool) -> ParseOptions {
        self.allow_comments = v;
        self
    }

    pub fn allow_trailing_commas(mut self, v: bool) -> ParseOptions {
        self.allow_trailing_commas = v;
        self
    }

    pub fn allow_inf_nan(mut self, v: bool) -> ParseOptions {
        self.allow_inf_nan = v;
        self
    }

    pub fn max_depth(mut self, v: usize) -> ParseOptions {
        self.max_depth = v;
        self
    }
}

/// Parse a complete JSON document from `input`.
///
/// On success, `document.root()` is always populated (invariant 2) and
/// trailing non-whitespace content after the root value is rejected.
pub fn parse(input: &[u8], opts: &ParseOptions) -> Result<Document, ParseError> {
    let mut p = Parser {
        input,
        pos: 0,
        opts,
        doc: Document::with_capacity(input.len() / 4 + 4),
        depth: 0,
    };
    p.skip_trivia();
    let root = p.parse_value()?;
    p.skip_trivia();
    if p.pos != p.input.len() {
        return Err(p.error(ErrorKind::Syntax, "trailing content after root value"));
    }
    p.doc.root = Some(root);
    Ok(p.doc)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    opts: &'a ParseOptions,
    doc: Document,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        let (line, column) = self.line_col(self.pos);
        let e = ParseError::new(kind, self.pos, line, column, message);
        tracing::debug!(byte = self.pos, kind = ?kind, "vjson: parse error");
        e
    }

    fn line_col(&self, pos: usize) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for &b in &self.input[..pos.min(self.input.len())] {
            if b == b'\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                    self.pos += 1;
                }
                Some(b'/') if self.opts.allow_comments => {
                    if self.input.get(self.pos + 1) == Some(&b'/') {
                        self.pos += 2;
                        while let Some(b) = self.peek() {
                            self.pos += 1;
                            if b == b'\n' {
                                break;
                            }
                        }
                    } else if self.input.get(self.pos + 1) == Some(&b'*') {
                        self.pos += 2;
                        while self.pos < self.input.len() {
                            if self.input[self.pos] == b'*' && self.input.get(self.pos + 1) == Some(&b'/') {
                                self.pos += 2;
                                break;
                            }
                            self.pos += 1;
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn expect(&mut self, literal: &[u8], kind_on_fail: &'static str) -> Result<(), ParseError> {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error(ErrorKind::Syntax, format!("expected {kind_on_fail}")))
        }
    }

    fn push_depth(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.opts.max_depth != 0 && self.depth > self.opts.max_depth {
            return Err(self.error(ErrorKind::Depth, "maximum nesting depth exceeded"));
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<NodeRef, ParseError> {
        self.skip_trivia();
        match self.peek() {
            None => Err(self.error(ErrorKind::Syntax, "unexpected end of input, expected a value")),
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string_value(),
            Some(b't') => {
                self.expect(b"true", "`true`")?;
                Ok(self.doc.nodes.alloc(Node::bool(true)))
            }
            Some(b'f') => {
                self.expect(b"false", "`false`")?;
                Ok(self.doc.nodes.alloc(Node::bool(false)))
            }
            Some(b'n') => {
                self.expect(b"null", "`null`")?;
                Ok(self.doc.nodes.alloc(Node::null()))
            }
            Some(b'N') if self.opts.allow_inf_nan => {
                self.expect(b"NaN", "`NaN`")?;
                Ok(self.doc.nodes.alloc(Node::float(f64::NAN)))
            }
            Some(b'I') if self.opts.allow_inf_nan => {
                self.expect(b"Infinity", "`Infinity`")?;
                Ok(self.doc.nodes.alloc(Node::float(f64::INFINITY)))
            }
            Some(b'-') if self.opts.allow_inf_nan && self.input[self.pos..].starts_with(b"-Infinity") => {
                self.expect(b"-Infinity", "`-Infinity`")?;
                Ok(self.doc.nodes.alloc(Node::float(f64::NEG_INFINITY)))
            }
            Some(b'-') | Some(b'0'..=b'9') => self.parse_number(),
            Some(other) => {
                Err(self.error(ErrorKind::Syntax, format!("unexpected byte 0x{other:02x}")))
            }
        }
    }

    fn parse_number(&mut self) -> Result<NodeRef, ParseError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return Err(self.error(ErrorKind::Number, "leading zero not permitted"));
                }
            }
            Some(b'1'..=b'9') => {
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
            _ => return Err(self.error(ErrorKind::Number, "expected a digit")),
        }

        let mut is_float = false;
        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error(ErrorKind::Number, "expected a digit after decimal point"));
            }
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error(ErrorKind::Number, "expected a digit in exponent"));
            }
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }

        let text = &self.input[start..self.pos];
        if !is_float {
            let (value, consumed) = dispatch::parse_int_lane(text, text.len());
            if consumed == text.len() && (MIN_INT60..=MAX_INT60).contains(&value) {
                return Ok(self.doc.nodes.alloc(Node::int(value)));
            }
            // Overflowed the inline 60-bit range or the fast lane declined:
            // promote to float on overflow rather than truncating or erroring.
        }
        let s = std::str::from_utf8(text).map_err(|_| self.error(ErrorKind::Utf8, "invalid UTF-8 in number"))?;
        let value: f64 = dispatch::parse_float(text)
            .or_else(|| s.parse::<f64>().ok())
            .ok_or_else(|| self.error(ErrorKind::Number, "malformed number literal"))?;
        Ok(self.doc.nodes.alloc(Node::float(value)))
    }

    /// Two-pass string decode: scan ahead with the dispatch-tier scanner for
    /// the common case of a plain run all the way to the closing quote, and
    /// only fall back to decoding escape-by-escape when one is present.
    fn parse_raw_string(&mut self) -> Result<Vec<u8>, ParseError> {
        debug_assert_eq!(self.peek(), Some(b'"'));
        self.pos += 1;
        let scan_start = self.pos;
        let relative_stop = dispatch::scan_string(&self.input[scan_start..]);
        let stop_idx = scan_start + relative_stop;

        if self.input.get(stop_idx) == Some(&b'"') {
            let bytes = self.input[scan_start..stop_idx].to_vec();
            self.pos = stop_idx + 1;
            std::str::from_utf8(&bytes).map_err(|_| self.error(ErrorKind::Utf8, "invalid UTF-8 in string"))?;
            return Ok(bytes);
        }

        let mut out = Vec::with_capacity(relative_stop + 8);
        loop {
            match self.bump() {
                None => return Err(self.error(ErrorKind::String, "unterminated string literal")),
                Some(b'"') => break,
                Some(b'\\') => {
                    let esc = self.bump().ok_or_else(|| {
                        self.error(ErrorKind::String, "unterminated escape sequence")
                    })?;
                    match esc {
                        b'"' => out.push(b'"'),
                        b'\\' => out.push(b'\\'),
                        b'/' => out.push(b'/'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0C),
                        b'n' => out.push(0x0A),
                        b'r' => out.push(0x0D),
                        b't' => out.push(0x09),
                        b'u' => {
                            let cp = self.parse_unicode_escape()?;
                            let ch = if (0xD800..=0xDBFF).contains(&cp) {
                                if self.bump() != Some(b'\\') || self.bump() != Some(b'u') {
                                    return Err(self.error(
                                        ErrorKind::String,
                                        "unpaired high surrogate",
                                    ));
                                }
                                let low = self.parse_unicode_escape()?;
                                if !(0xDC00..=0xDFFF).contains(&low) {
                                    return Err(self.error(
                                        ErrorKind::String,
                                        "expected low surrogate",
                                    ));
                                }
                                let combined =
                                    0x10000 + ((cp - 0xD800) << 10) + (low - 0xDC00);
                                char::from_u32(combined)
                            } else if (0xDC00..=0xDFFF).contains(&cp) {
                                return Err(self.error(
                                    ErrorKind::String,
                                    "unpaired low surrogate",
                                ));
                            } else {
                                char::from_u32(cp)
                            };
                            let ch = ch.ok_or_else(|| {
                                self.error(ErrorKind::String, "invalid unicode escape")
                            })?;
                            let mut buf = [0u8; 4];
                            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                        }
                        other => {
                            return Err(self.error(
                                ErrorKind::String,
                                format!("invalid escape character '\\{}'", other as char),
                            ))
                        }
                    }
                }
                Some(b) if b < 0x20 => {
                    return Err(self.error(ErrorKind::String, "unescaped control character in string"))
                }
                Some(b) => out.push(b),
            }
        }
        std::str::from_utf8(&out).map_err(|_| self.error(ErrorKind::Utf8, "invalid UTF-8 in string"))?;
        Ok(out)
    }

    fn parse_unicode_escape(&mut self) -> Result<u32, ParseError> {
        if self.pos + 4 > self.input.len() {
            return Err(self.error(ErrorKind::String, "truncated \\u escape"));
        }
        let hex = &self.input[self.pos..self.pos + 4];
        let s = std::str::from_utf8(hex).map_err(|_| self.error(ErrorKind::String, "invalid \\u escape"))?;
        let cp = u32::from_str_radix(s, 16).map_err(|_| self.error(ErrorKind::String, "invalid \\u escape"))?;
        self.pos += 4;
        Ok(cp)
    }

    fn parse_string_value(&mut self) -> Result<NodeRef, ParseError> {
        let bytes = self.parse_raw_string()?;
        Ok(self.alloc_string_node(&bytes))
    }

    fn alloc_string_node(&mut self, bytes: &[u8]) -> NodeRef {
        if bytes.len() <= 7 {
            self.doc.nodes.alloc(Node::short_str(bytes))
        } else {
            let r = self.doc.strings.alloc(bytes);
            self.doc.nodes.alloc(Node::long_str(bytes.len(), r))
        }
    }

    fn parse_array(&mut self) -> Result<NodeRef, ParseError> {
        self.push_depth()?;
        self.pos += 1; // '['
        let array_ref = self.doc.nodes.alloc(Node::array());
        self.skip_trivia();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(array_ref);
        }

        let mut last: Option<NodeRef> = None;
        loop {
            self.skip_trivia();
            let element = self.parse_value()?;
            match last {
                None => self.doc.nodes.get_mut(array_ref).set_first_child(element),
                Some(prev) => self.doc.nodes.get_mut(prev).set_next_sibling(element),
            }
            last = Some(element);

            self.skip_trivia();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia();
                    if self.opts.allow_trailing_commas && self.peek() == Some(b']') {
                        break;
                    }
                }
                Some(b']') => break,
                _ => return Err(self.error(ErrorKind::Syntax, "expected ',' or ']'")),
            }
        }
        self.expect(b"]", "']'")?;
        self.depth -= 1;
        Ok(array_ref)
    }

    fn parse_object(&mut self) -> Result<NodeRef, ParseError> {
        self.push_depth()?;
        self.pos += 1; // '{'
        let object_ref = self.doc.nodes.alloc(Node::object());
        self.skip_trivia();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(object_ref);
        }

        let mut last: Option<NodeRef> = None;
        loop {
            self.skip_trivia();
            if self.peek() != Some(b'"') {
                return Err(self.error(ErrorKind::Syntax, "expected a string key"));
            }
            let key_bytes = self.parse_raw_string()?;
            let key_ref = self.alloc_string_node(&key_bytes);

            self.skip_trivia();
            self.expect(b":", "':'")?;
            self.skip_trivia();
            let value_ref = self.parse_value()?;
            self.doc.nodes.get_mut(key_ref).set_value_ref(value_ref);

            match last {
                None => self.doc.nodes.get_mut(object_ref).set_first_child(key_ref),
                Some(prev) => self.doc.nodes.get_mut(prev).set_next_sibling(key_ref),
            }
            last = Some(key_ref);

            self.skip_trivia();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia();
                    if self.opts.allow_trailing_commas && self.peek() == Some(b'}') {
                        break;
                    }
                }
                Some(b'}') => break,
                _ => return Err(self.error(ErrorKind::Syntax, "expected ',' or '}'")),
            }
        }
        self.expect(b"}", "'}'")?;
        self.depth -= 1;
        Ok(object_ref)
    }
}
