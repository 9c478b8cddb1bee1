//! The parsed value tree (§3/§6.2): [`Document`] owns the arenas, [`Value`]
//! is a read-only handle into one.

use vjson_core::{NodeArena, NodeRef, StringArena, Tag};

/// A fully-parsed JSON document.
///
/// Immutable once built. Dropping a `Document` releases both of its arenas
/// as a unit (ordinary Rust `Drop`, no explicit "release" step is required,
/// though [`Document::release`] is provided for callers that want to be
/// explicit about when that happens, matching the C-style API this core
/// sits under).
pub struct Document {
    pub(crate) nodes: NodeArena,
    pub(crate) strings: StringArena,
    pub(crate) root: Option<NodeRef>,
}

impl Document {
    pub(crate) fn empty() -> Document {
        Document { nodes: NodeArena::new(), strings: StringArena::new(), root: None }
    }

    pub(crate) fn with_capacity(estimated_nodes: usize) -> Document {
        Document {
            nodes: NodeArena::with_capacity(estimated_nodes),
            strings: StringArena::new(),
            root: None,
        }
    }

    /// The root value of this document.
    ///
    /// # Panics
    /// Panics if called on a `Document` that was never successfully parsed
    /// (invariant 2: a document with a successful parse always has exactly
    /// one root reference).
    pub fn root(&self) -> Value<'_> {
        let r = self.root.expect("Document::root called on a document with no parsed root");
        Value { doc: self, node: r }
    }

    /// Number of nodes reachable from the root (invariant 7).
    pub fn value_count(&self) -> usize {
        fn count(doc: &Document, r: NodeRef) -> usize {
            let node = doc.nodes.get(r);
            let mut total = 1;
            if node.tag().is_container() {
                let mut child = node.first_child();
                while let Some(c) = child {
                    let child_node = doc.nodes.get(c);
                    if node.tag() == Tag::Object {
                        // Key node: count the key itself plus its value subtree.
                        total += 1;
                        total += count(doc, child_node.value_ref());
                    } else {
                        total += count(doc, c);
                    }
                    child = child_node.next_sibling();
                }
            }
            total
        }
        match self.root {
            Some(r) => count(self, r),
            None => 0,
        }
    }

    /// Explicitly release this document's arenas. Equivalent to dropping it;
    /// provided so callers mirroring the C-style `json_document_release`
    /// interface have a named call site.
    pub fn release(self) {
        drop(self);
    }
}

/// The coarse externally-visible type of a [`Value`] (§6.2 `value.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl From<Tag> for ValueType {
    fn from(tag: Tag) -> ValueType {
        match tag {
            Tag::Null => ValueType::Null,
            Tag::True | Tag::False => ValueType::Bool,
            Tag::Int => ValueType::Int,
            Tag::Float => ValueType::Float,
            Tag::ShortStr | Tag::LongStr => ValueType::String,
            Tag::Array => ValueType::Array,
            Tag::Object => ValueType::Object,
        }
    }
}

/// A read-only handle to a single node inside a [`Document`].
///
/// Accessors never fail (§7 "accessors never fail"): a type-mismatched read
/// returns the documented default rather than an `Option`/`Result`, so
/// traversal code stays branchless-per-access.
#[derive(Clone, Copy)]
pub struct Value<'a> {
    doc: &'a Document,
    node: NodeRef,
}

impl<'a> Value<'a> {
    pub(crate) fn new(doc: &'a Document, node: NodeRef) -> Value<'a> {
        Value { doc, node }
    }

    fn node(&self) -> &'a vjson_core::Node {
        self.doc.nodes.get(self.node)
    }

    pub fn value_type(&self) -> ValueType {
        self.node().tag().into()
    }

    pub fn is_null(&self) -> bool {
        self.value_type() == ValueType::Null
    }

    /// `false` for any non-bool value.
    pub fn as_bool(&self) -> bool {
        matches!(self.node().tag(), Tag::True)
    }

    /// Cross-coerces from float (truncating); `0` for any other non-numeric
    /// value.
    pub fn as_i64(&self) -> i64 {
        match self.node().tag() {
            Tag::Int => self.node().int_value(),
            Tag::Float => self.node().float_value() as i64,
            _ => 0,
        }
    }

    /// Cross-coerces from float/int; `0` for any other non-numeric value.
    /// Negative integers saturate to `0`.
    pub fn as_u64(&self) -> u64 {
        match self.node().tag() {
            Tag::Int => self.node().int_value().max(0) as u64,
            Tag::Float => self.node().float_value().max(0.0) as u64,
            _ => 0,
        }
    }

    /// Cross-coerces from int; `0.0` for any other non-numeric value.
    pub fn as_f64(&self) -> f64 {
        match self.node().tag() {
            Tag::Float => self.node().float_value(),
            Tag::Int => self.node().int_value() as f64,
            _ => 0.0,
        }
    }

    /// Empty string for any non-string value.
    pub fn as_str(&self) -> &'a str {
        match self.node().tag() {
            Tag::ShortStr => {
                let len = self.node().short_str_len();
                let bytes = self.node().short_str_bytes();
                // Safety: short-string bytes are only ever written from a
                // validated UTF-8 span by the parser (see parser.rs).
                std::str::from_utf8(&bytes[..len]).unwrap_or("")
            }
            Tag::LongStr => {
                let r = self.node().long_str_ref();
                std::str::from_utf8(self.doc.strings.get(r)).unwrap_or("")
            }
            _ => "",
        }
    }

    /// `0` for any non-string value.
    pub fn str_len(&self) -> usize {
        match self.node().tag() {
            Tag::ShortStr => self.node().short_str_len(),
            Tag::LongStr => self.node().long_str_len(),
            _ => 0,
        }
    }

    /// Number of members/elements. `0` for any non-container value.
    pub fn size(&self) -> usize {
        if !self.node().tag().is_container() {
            return 0;
        }
        let mut n = 0;
        let mut child = self.node().first_child();
        while let Some(c) = child {
            n += 1;
            child = self.doc.nodes.get(c).next_sibling();
        }
        n
    }

    /// Look up an object member by key via linear sibling-chain search.
    /// `None` if this value is not an object, or has no such member.
    pub fn get(&self, key: &str) -> Option<Value<'a>> {
        if self.node().tag() != Tag::Object {
            return None;
        }
        let mut child = self.node().first_child();
        while let Some(key_ref) = child {
            let key_node = self.doc.nodes.get(key_ref);
            let key_str = Value { doc: self.doc, node: key_ref }.as_str();
            if key_str == key {
                return Some(Value { doc: self.doc, node: key_node.value_ref() });
            }
            child = key_node.next_sibling();
        }
        None
    }

    /// Look up an array element by index. `None` if this value is not an
    /// array, or the index is out of bounds.
    pub fn at(&self, index: usize) -> Option<Value<'a>> {
        if self.node().tag() != Tag::Array {
            return None;
        }
        let mut child = self.node().first_child();
        let mut i = 0;
        while let Some(c) = child {
            if i == index {
                return Some(Value { doc: self.doc, node: c });
            }
            child = self.doc.nodes.get(c).next_sibling();
            i += 1;
        }
        None
    }

    /// Iterate an object's members in insertion order as `(key, value)`
    /// pairs. Empty for any non-object value.
    pub fn entries(&self) -> ObjectIter<'a> {
        let first = if self.node().tag() == Tag::Object { self.node().first_child() } else { None };
        ObjectIter { doc: self.doc, next: first }
    }

    /// Iterate an array's elements in insertion order. Empty for any
    /// non-array value.
    pub fn items(&self) -> ArrayIter<'a> {
        let first = if self.node().tag() == Tag::Array { self.node().first_child() } else { None };
        ArrayIter { doc: self.doc, next: first }
    }
}

pub struct ObjectIter<'a> {
    doc: &'a Document,
    next: Option<NodeRef>,
}

impl<'a> Iterator for ObjectIter<'a> {
    type Item = (&'a str, Value<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let key_ref = self.next?;
        let key_node = self.doc.nodes.get(key_ref);
        let key = Value { doc: self.doc, node: key_ref }.as_str();
        let value = Value { doc: self.doc, node: key_node.value_ref() };
        self.next = key_node.next_sibling();
        Some((key, value))
    }
}

pub struct ArrayIter<'a> {
    doc: &'a Document,
    next: Option<NodeRef>,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = Value<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let r = self.next?;
        let value = Value { doc: self.doc, node: r };
        self.next = self.doc.nodes.get(r).next_sibling();
        Some(value)
    }
}

/// Structural equality between two values, recursing through containers.
/// Object comparison ignores member order (same keys, same values).
pub fn equals(a: &Value<'_>, b: &Value<'_>) -> bool {
    if a.value_type() != b.value_type() {
        // Numeric cross-type equality is intentionally excluded: 1 (Int)
        // and 1.0 (Float) are different nodes with different tags.
        return false;
    }
    match a.value_type() {
        ValueType::Null => true,
        ValueType::Bool => a.as_bool() == b.as_bool(),
        ValueType::Int => a.as_i64() == b.as_i64(),
        ValueType::Float => a.as_f64().to_bits() == b.as_f64().to_bits(),
        ValueType::String => a.as_str() == b.as_str(),
        ValueType::Array => {
            let mut ai = a.items();
            let mut bi = b.items();
            loop {
                match (ai.next(), bi.next()) {
                    (Some(av), Some(bv)) => {
                        if !equals(&av, &bv) {
                            return false;
                        }
                    }
                    (None, None) => return true,
                    _ => return false,
                }
            }
        }
        ValueType::Object => {
            if a.size() != b.size() {
                return false;
            }
            a.entries().all(|(k, av)| match b.get(k) {
                Some(bv) => equals(&av, &bv),
                None => false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOptions};

    #[test]
    fn object_get_and_array_at() {
        let doc = parse(br#"{"a":1,"b":[2,3.5,null,true]}"#, &ParseOptions::default()).unwrap();
        let root = doc.root();
        assert_eq!(root.value_type(), ValueType::Object);
        assert_eq!(root.size(), 2);
        assert_eq!(root.get("a").unwrap().as_i64(), 1);
        let b = root.get("b").unwrap();
        assert_eq!(b.value_type(), ValueType::Array);
        assert_eq!(b.at(1).unwrap().as_f64(), 3.5);
        assert!(b.at(2).unwrap().is_null());
        assert!(b.at(3).unwrap().as_bool());
        assert!(root.get("missing").is_none());
    }

    #[test]
    fn object_entries_preserve_insertion_order() {
        let doc = parse(br#"{"z":1,"a":2,"m":3}"#, &ParseOptions::default()).unwrap();
        let keys: Vec<&str> = doc.root().entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn equals_compares_structurally() {
        let a = parse(br#"{"x":[1,2,3]}"#, &ParseOptions::default()).unwrap();
        let b = parse(br#"{"x":[1,2,3]}"#, &ParseOptions::default()).unwrap();
        let c = parse(br#"{"x":[1,2,4]}"#, &ParseOptions::default()).unwrap();
        assert!(equals(&a.root(), &b.root()));
        assert!(!equals(&a.root(), &c.root()));
    }

    #[test]
    fn numeric_accessors_cross_coerce() {
        let doc = parse(b"3.0", &ParseOptions::default()).unwrap();
        assert_eq!(doc.root().as_i64(), 3);
        let doc = parse(b"3", &ParseOptions::default()).unwrap();
        assert_eq!(doc.root().as_f64(), 3.0);
    }

    #[test]
    fn non_matching_accessors_return_documented_defaults() {
        let doc = parse(b"\"hi\"", &ParseOptions::default()).unwrap();
        let v = doc.root();
        assert!(!v.as_bool());
        assert_eq!(v.as_i64(), 0);
        assert_eq!(v.as_f64(), 0.0);
        assert_eq!(v.size(), 0);
    }
}
