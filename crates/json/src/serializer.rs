//! Streaming serializer (C5): walks a [`Value`] tree and writes RFC 8259
//! JSON bytes, with optional pretty-printing.

use crate::document::{Value, ValueType};

/// Stringify-time knobs. All default to compact, strict RFC 8259 output.
#[derive(Debug, Clone)]
pub struct StringifyOptions {
    /// Emit newlines and indentation between container members.
    pub pretty: bool,
    /// Number of spaces per indent level when `pretty` is set.
    pub indent: usize,
    /// Escape `/` as `\/` (off by default; only some JSON producers do this).
    pub escape_slash: bool,
    /// Escape every non-ASCII code point as `\uXXXX` instead of emitting
    /// UTF-8 directly.
    pub escape_unicode: bool,
    /// Emit bare `NaN`/`Infinity`/`-Infinity` for non-finite floats instead
    /// of erroring. When `false`, non-finite floats serialize as `null`,
    /// matching the common JavaScript `JSON.stringify` convention.
    pub allow_inf_nan: bool,
}

impl Default for StringifyOptions {
    fn default() -> StringifyOptions {
        StringifyOptions {
            pretty: false,
            indent: 2,
            escape_slash: false,
            escape_unicode: false,
            allow_inf_nan: false,
        }
    }
}

impl StringifyOptions {
    pub fn new() -> StringifyOptions {
        StringifyOptions::default()
    }

    pub fn pretty(mut self, v: bool) -> StringifyOptions {
        self.pretty = v;
        self
    }

    pub fn indent(mut self, v: usize) -> StringifyOptions {
        self.indent = v;
        self
    }

    pub fn escape_slash(mut self, v: bool) -> StringifyOptions {
        self.escape_slash = v;
        self
    }

    pub fn escape_unicode(mut self, v: bool) -> StringifyOptions {
        self.escape_unicode = v;
        self
    }

    pub fn allow_inf_nan(mut self, v: bool) -> StringifyOptions {
        self.allow_inf_nan = v;
        self
    }
}

/// Serialize `value` to an owned byte buffer. Infallible: there is no JSON
/// tree this crate can build that this function cannot render.
pub fn stringify(value: &Value<'_>, opts: &StringifyOptions) -> Vec<u8> {
    let mut out = Vec::with_capacity(128);
    write_value(&mut out, value, opts, 0);
    out
}

fn push_indent(out: &mut Vec<u8>, opts: &StringifyOptions, depth: usize) {
    if opts.pretty {
        out.push(b'\n');
        out.resize(out.len() + depth * opts.indent, b' ');
    }
}

fn write_value(out: &mut Vec<u8>, value: &Value<'_>, opts: &StringifyOptions, depth: usize) {
    match value.value_type() {
        ValueType::Null => out.extend_from_slice(b"null"),
        ValueType::Bool => out.extend_from_slice(if value.as_bool() { b"true" } else { b"false" }),
        ValueType::Int => {
            let mut buf = itoa_buf();
            out.extend_from_slice(write_i64(&mut buf, value.as_i64()));
        }
        ValueType::Float => write_float(out, value.as_f64(), opts),
        ValueType::String => write_string(out, value.as_str(), opts),
        ValueType::Array => write_array(out, value, opts, depth),
        ValueType::Object => write_object(out, value, opts, depth),
    }
}

fn write_array(out: &mut Vec<u8>, value: &Value<'_>, opts: &StringifyOptions, depth: usize) {
    out.push(b'[');
    let mut first = true;
    for item in value.items() {
        if !first {
            out.push(b',');
        }
        first = false;
        push_indent(out, opts, depth + 1);
        write_value(out, &item, opts, depth + 1);
    }
    if !first {
        push_indent(out, opts, depth);
    }
    out.push(b']');
}

fn write_object(out: &mut Vec<u8>, value: &Value<'_>, opts: &StringifyOptions, depth: usize) {
    out.push(b'{');
    let mut first = true;
    for (key, member) in value.entries() {
        if !first {
            out.push(b',');
        }
        first = false;
        push_indent(out, opts, depth + 1);
        write_string(out, key, opts);
        out.push(b':');
        if opts.pretty {
            out.push(b' ');
        }
        write_value(out, &member, opts, depth + 1);
    }
    if !first {
        push_indent(out, opts, depth);
    }
    out.push(b'}');
}

fn write_float(out: &mut Vec<u8>, v: f64, opts: &StringifyOptions) {
    if v.is_nan() {
        out.extend_from_slice(if opts.allow_inf_nan { b"NaN" } else { b"null" });
        return;
    }
    if v.is_infinite() {
        if opts.allow_inf_nan {
            out.extend_from_slice(if v > 0.0 { b"Infinity" } else { b"-Infinity" });
        } else {
            out.extend_from_slice(b"null");
        }
        return;
    }
    // `f64`'s `Display` never emits exponential notation, so any magnitude
    // whose digits happen to be round (not just small ones like `3.0`, but
    // also e.g. `2e17`'s `200000000000000000`) comes out with no `.`. Such a
    // value would reparse as an Int node instead of the Float node it
    // started as, so decide on the formatted text itself rather than on a
    // magnitude cutoff: append `.0` whenever the text doesn't already carry
    // a `.` (or, on some platforms' formatting, an exponent marker).
    let text = format!("{v}");
    out.extend_from_slice(text.as_bytes());
    if !text.contains('.') && !text.contains('e') && !text.contains('E') {
        out.extend_from_slice(b".0");
    }
}

fn write_string(out: &mut Vec<u8>, s: &str, opts: &StringifyOptions) {
    out.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '/' if opts.escape_slash => out.extend_from_slice(b"\\/"),
            '\u{08}' => out.extend_from_slice(b"\\b"),
            '\u{0C}' => out.extend_from_slice(b"\\f"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                out.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c if opts.escape_unicode && (c as u32) > 0x7F => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    out.extend_from_slice(format!("\\u{unit:04x}").as_bytes());
                }
            }
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.push(b'"');
}

fn itoa_buf() -> [u8; 20] {
    [0u8; 20]
}

fn write_i64(buf: &mut [u8; 20], mut v: i64) -> &[u8] {
    if v == 0 {
        buf[0] = b'0';
        return &buf[..1];
    }
    let negative = v < 0;
    let mut i = buf.len();
    // `i64::MIN` cannot be negated; peel digits off with a widening
    // remainder instead of negating the whole value up front.
    while v != 0 {
        let digit = (v % 10).unsigned_abs() as u8;
        i -= 1;
        buf[i] = b'0' + digit;
        v /= 10;
    }
    if negative {
        i -= 1;
        buf[i] = b'-';
    }
    &buf[i..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOptions};

    fn roundtrip(json: &[u8], opts: &StringifyOptions) -> String {
        let doc = parse(json, &ParseOptions::default()).unwrap();
        String::from_utf8(stringify(&doc.root(), opts)).unwrap()
    }

    #[test]
    fn compact_scalars() {
        assert_eq!(roundtrip(b"null", &StringifyOptions::default()), "null");
        assert_eq!(roundtrip(b"true", &StringifyOptions::default()), "true");
        assert_eq!(roundtrip(b"42", &StringifyOptions::default()), "42");
        assert_eq!(roundtrip(b"-7", &StringifyOptions::default()), "-7");
    }

    #[test]
    fn float_round_numbers_keep_a_decimal_point() {
        assert_eq!(roundtrip(b"3.0", &StringifyOptions::default()), "3.0");
        assert_eq!(roundtrip(b"3.5", &StringifyOptions::default()), "3.5");
    }

    #[test]
    fn large_round_float_keeps_a_decimal_point_so_it_reparses_as_float() {
        use crate::document::ValueType;

        // 2e17 is a whole number well past the old 1e17 cutoff, and is
        // exactly representable as an f64.
        let doc = parse(b"2e17", &ParseOptions::default()).unwrap();
        assert_eq!(doc.root().value_type(), ValueType::Float);

        let out = String::from_utf8(stringify(&doc.root(), &StringifyOptions::default())).unwrap();
        assert!(out.contains('.'), "expected a decimal point in {out:?}");

        let reparsed = parse(out.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(reparsed.root().value_type(), ValueType::Float);
        assert!(crate::document::equals(&doc.root(), &reparsed.root()));
    }

    #[test]
    fn i64_min_does_not_panic() {
        let mut buf = itoa_buf();
        assert_eq!(write_i64(&mut buf, i64::MIN), i64::MIN.to_string().as_bytes());
    }

    #[test]
    fn strings_escape_control_and_quote_and_backslash() {
        let out = roundtrip(b"\"a\\\"b\\\\c\\nd\"", &StringifyOptions::default());
        assert_eq!(out, "\"a\\\"b\\\\c\\nd\"");
    }

    #[test]
    fn compact_array_and_object_have_no_extra_whitespace() {
        assert_eq!(roundtrip(br#"{"a":1,"b":[1,2]}"#, &StringifyOptions::default()), r#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn pretty_printing_indents_members() {
        let out = roundtrip(br#"{"a":1}"#, &StringifyOptions::new().pretty(true).indent(2));
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn pretty_printing_handles_empty_containers_without_blank_lines() {
        let out = roundtrip(b"{}", &StringifyOptions::new().pretty(true));
        assert_eq!(out, "{}");
        let out = roundtrip(b"[]", &StringifyOptions::new().pretty(true));
        assert_eq!(out, "[]");
    }

    #[test]
    fn non_finite_floats_default_to_null_unless_opted_in() {
        // Built directly since RFC 8259 input cannot itself encode NaN.
        let opts_strict = StringifyOptions::default();
        let mut out = Vec::new();
        write_float(&mut out, f64::NAN, &opts_strict);
        assert_eq!(out, b"null");

        let opts_loose = StringifyOptions::new().allow_inf_nan(true);
        let mut out = Vec::new();
        write_float(&mut out, f64::INFINITY, &opts_loose);
        assert_eq!(out, b"Infinity");
    }

    #[test]
    fn escape_slash_option() {
        let opts = StringifyOptions::new().escape_slash(true);
        let doc = parse(br#""a/b""#, &ParseOptions::default()).unwrap();
        assert_eq!(String::from_utf8(stringify(&doc.root(), &opts)).unwrap(), r#""a\/b""#);
    }

    #[test]
    fn escape_unicode_option_emits_uxxxx_for_non_ascii() {
        let opts = StringifyOptions::new().escape_unicode(true);
        let doc = parse("\"café\"".as_bytes(), &ParseOptions::default()).unwrap();
        let out = String::from_utf8(stringify(&doc.root(), &opts)).unwrap();
        assert_eq!(out, "\"caf\\u00e9\"");
    }

    #[test]
    fn escape_unicode_off_by_default_emits_utf8_directly() {
        let doc = parse("\"café\"".as_bytes(), &ParseOptions::default()).unwrap();
        let out = String::from_utf8(stringify(&doc.root(), &StringifyOptions::default())).unwrap();
        assert_eq!(out, "\"café\"");
    }
}
