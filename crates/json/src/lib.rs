//! vjson: a recursive-descent RFC 8259 parser and serializer over the
//! arena-backed tagged value tree defined in `vjson-core`.
//!
//! ```
//! let doc = vjson::parse(br#"{"hello":"world"}"#, &vjson::ParseOptions::default()).unwrap();
//! assert_eq!(doc.root().get("hello").unwrap().as_str(), "world");
//! ```

pub mod document;
pub mod parser;
pub mod serializer;

pub use document::{equals, ArrayIter, Document, ObjectIter, Value, ValueType};
pub use parser::{parse, ParseOptions};
pub use serializer::{stringify, StringifyOptions};

pub use vjson_core::ErrorKind;
pub use vjson_core::ParseError;

/// Convenience wrapper: serialize `value` compactly (no pretty-printing).
pub fn stringify_compact(value: &Value<'_>) -> Vec<u8> {
    stringify(value, &StringifyOptions::default())
}

/// Convenience wrapper: serialize `value` with two-space pretty-printing.
pub fn stringify_pretty(value: &Value<'_>) -> Vec<u8> {
    stringify(value, &StringifyOptions::new().pretty(true))
}

/// Deep-copy a value by serializing and reparsing it into a fresh
/// [`Document`] (§6.2 `clone`). There is no cheaper copy available since
/// values never outlive the arena that owns their bytes.
pub fn clone_value(value: &Value<'_>) -> Document {
    let bytes = stringify_compact(value);
    parse(&bytes, &ParseOptions::default()).expect("serialized output must reparse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_stringify_round_trips_structurally() {
        let src = br#"{"a":1,"b":[true,false,null,"x"],"c":3.5}"#;
        let doc = parse(src, &ParseOptions::default()).unwrap();
        let out = stringify_compact(&doc.root());
        let doc2 = parse(&out, &ParseOptions::default()).unwrap();
        assert!(equals(&doc.root(), &doc2.root()));
    }

    #[test]
    fn clone_value_produces_an_independent_equal_document() {
        let doc = parse(br#"[1,2,{"x":3}]"#, &ParseOptions::default()).unwrap();
        let cloned = clone_value(&doc.root());
        assert!(equals(&doc.root(), &cloned.root()));
    }
}
