//! Integration tests exercising the public `vjson` API end-to-end: parsing,
//! traversal, and serialization together rather than module-by-module.

use vjson::{clone_value, equals, parse, stringify, ParseOptions, StringifyOptions, ValueType};

#[test]
fn parses_a_realistic_document_and_reads_every_branch() {
    let src = br#"{
        "name": "vjson",
        "version": 1,
        "stable": true,
        "tags": ["json", "parser", "arena"],
        "limits": {"max_depth": 512, "max_size": null},
        "ratio": 0.5
    }"#;
    let doc = parse(src, &ParseOptions::default()).unwrap();
    let root = doc.root();
    assert_eq!(root.get("name").unwrap().as_str(), "vjson");
    assert_eq!(root.get("version").unwrap().as_i64(), 1);
    assert!(root.get("stable").unwrap().as_bool());
    let tags = root.get("tags").unwrap();
    assert_eq!(tags.size(), 3);
    assert_eq!(tags.at(0).unwrap().as_str(), "json");
    let limits = root.get("limits").unwrap();
    assert_eq!(limits.get("max_depth").unwrap().as_i64(), 512);
    assert!(limits.get("max_size").unwrap().is_null());
    assert_eq!(root.get("ratio").unwrap().as_f64(), 0.5);
}

#[test]
fn whitespace_variants_parse_identically() {
    let compact = parse(br#"{"a":1,"b":2}"#, &ParseOptions::default()).unwrap();
    let spread = parse(b"{\n  \"a\" : 1 ,\n  \"b\" : 2\n}\n", &ParseOptions::default()).unwrap();
    assert!(equals(&compact.root(), &spread.root()));
}

#[test]
fn empty_containers_round_trip() {
    for (src, expect_type) in [(&b"{}"[..], ValueType::Object), (&b"[]"[..], ValueType::Array)] {
        let doc = parse(src, &ParseOptions::default()).unwrap();
        assert_eq!(doc.root().value_type(), expect_type);
        assert_eq!(doc.root().size(), 0);
        let out = stringify(&doc.root(), &StringifyOptions::default());
        assert_eq!(out, src);
    }
}

#[test]
fn numbers_covering_boundary_cases() {
    let cases: &[(&[u8], fn(f64) -> bool)] = &[
        (b"0", |v| v == 0.0),
        (b"-0", |v| v == 0.0),
        (b"1e308", |v| v.is_finite()),
        (b"1e-308", |v| v > 0.0),
        (b"9223372036854775807", |v| v > 0.0),
    ];
    for (src, check) in cases {
        let doc = parse(src, &ParseOptions::default()).unwrap();
        assert!(check(doc.root().as_f64()), "failed for {:?}", std::str::from_utf8(src));
    }
}

#[test]
fn malformed_inputs_are_rejected_with_position_information() {
    let bad_inputs: &[&[u8]] = &[
        b"",
        b"{",
        b"[1,]",
        b"{\"a\":}",
        b"\"unterminated",
        b"{\"a\" 1}",
        b"tru",
        b"[1 2]",
        b"1.",
        b".1",
        b"--1",
    ];
    for src in bad_inputs {
        let err = parse(src, &ParseOptions::default()).unwrap_err();
        assert!(err.byte_position <= src.len());
        let msg = err.to_string();
        assert!(msg.contains("line"), "error message should mention a line: {msg}");
    }
}

#[test]
fn clone_value_is_structurally_equal_and_independent() {
    let original = parse(br#"{"nested":{"deep":[1,2,3]}}"#, &ParseOptions::default()).unwrap();
    let copy = clone_value(&original.root());
    assert!(equals(&original.root(), &copy.root()));
    drop(original);
    // `copy` must still be readable after `original` (and its arenas) drop.
    assert_eq!(copy.root().get("nested").unwrap().get("deep").unwrap().size(), 3);
}

#[test]
fn pretty_print_is_reparseable() {
    let doc = parse(br#"{"a":[1,{"b":2}],"c":"x"}"#, &ParseOptions::default()).unwrap();
    let pretty = stringify(&doc.root(), &StringifyOptions::new().pretty(true).indent(4));
    let reparsed = parse(&pretty, &ParseOptions::default()).unwrap();
    assert!(equals(&doc.root(), &reparsed.root()));
}

#[test]
fn deeply_nested_array_within_default_depth_limit_parses() {
    let depth = 400;
    let src = "[".repeat(depth) + &"]".repeat(depth);
    assert!(parse(src.as_bytes(), &ParseOptions::default()).is_ok());
}

#[test]
fn depth_limit_can_be_disabled() {
    let depth = 2000;
    let src = "[".repeat(depth) + &"]".repeat(depth);
    let opts = ParseOptions::new().max_depth(0);
    assert!(parse(src.as_bytes(), &opts).is_ok());
}
