//! Extensive DSL tests: syntax (parse success/failure) and semantics (widths, literals, duplicate names).

use codecspec::{
    parse, parse_with_options, ByteOrder, ByteWidth, CommentStyle, DataValue, Direction, Error,
    ErrorCategory, Expected, ParseOptions, ScanOptions, Signedness, TokenKind, Transformation,
    Value,
};
use pretty_assertions::assert_eq;

fn single_field(src: &str) -> Value {
    let codecs = parse(src).expect("parse");
    assert_eq!(codecs.len(), 1);
    assert_eq!(codecs[0].len(), 1);
    codecs[0].fields()[0].clone()
}

// ==================== Syntax: valid programs ====================

#[test]
fn parse_empty_document() {
    assert!(parse("").expect("empty document parses").is_empty());
    assert!(parse(" \n\t ").expect("whitespace-only document parses").is_empty());
}

#[test]
fn parse_empty_codec() {
    let codecs = parse("upstream Idle {}").expect("parse");
    assert_eq!(codecs[0].name(), "Idle");
    assert_eq!(codecs[0].direction(), Direction::Decoder);
    assert!(codecs[0].is_empty());
}

#[test]
fn parse_all_numeric_types() {
    let src = r#"
downstream AllTypes {
  a: i8
  b: i16
  c: i24
  d: i32
  e: i64
  f: u8
  g: u16
  h: u24
  i: u32
  j: u64
}
"#;
    let codec = &parse(src).expect("parse")[0];
    let types: Vec<_> = codec
        .fields()
        .iter()
        .map(|v| v.as_data().expect("data value").type_name())
        .collect();
    assert_eq!(
        types,
        ["i8", "i16", "i24", "i32", "i64", "u8", "u16", "u24", "u32", "u64"]
    );
}

#[test]
fn parse_every_byte_order_and_transformation() {
    let orders = [
        ("big", ByteOrder::Big),
        ("little", ByteOrder::Little),
        ("middle", ByteOrder::Middle),
        ("inverse", ByteOrder::InverseMiddle),
    ];
    let transformations = [
        ("added", Transformation::Add),
        ("subtracted", Transformation::Subtract),
        ("negated", Transformation::Negate),
    ];
    for (order_kw, order) in orders {
        for (transform_kw, transformation) in transformations {
            let src = format!("upstream T {{ v: {} {} u32 }}", order_kw, transform_kw);
            assert_eq!(
                single_field(&src),
                Value::Data(DataValue::new(
                    "v",
                    Signedness::Unsigned,
                    ByteWidth::Int,
                    transformation,
                    order
                )),
                "{}",
                src
            );
        }
    }
}

#[test]
fn parse_transformation_without_order() {
    let v = single_field("upstream T { v: negated i8 }");
    let data = v.as_data().expect("data");
    assert_eq!(data.order, ByteOrder::Big);
    assert_eq!(data.transformation, Transformation::Negate);
}

#[test]
fn parse_literals_and_base37() {
    let src = r#"
downstream Literals {
  opcode: 1_024
  greeting: "hello, world {}"
  player: base37
}
"#;
    let codec = &parse(src).expect("parse")[0];
    assert_eq!(codec.get("opcode"), Some(&Value::integer("opcode", 1024)));
    assert_eq!(
        codec.get("greeting"),
        Some(&Value::string("greeting", "hello, world {}"))
    );
    assert_eq!(codec.get("player"), Some(&Value::base37("player")));
}

#[test]
fn parse_nested_composites_preserve_order() {
    let src = "upstream N { outer { b: u8 inner { z: u16 a: u16 } a: u8 } }";
    let outer = single_field(src);
    let outer = outer.as_composite().expect("composite");
    let names: Vec<_> = outer.contents.iter().map(Value::name).collect();
    assert_eq!(names, ["b", "inner", "a"]);
    let inner = outer.contents[1].as_composite().expect("inner composite");
    let inner_names: Vec<_> = inner.contents.iter().map(Value::name).collect();
    assert_eq!(inner_names, ["z", "a"]);
}

#[test]
fn parse_composite_may_repeat_names() {
    let v = single_field("upstream N { group { x: u8 x: u8 } }");
    assert_eq!(v.as_composite().map(|c| c.contents.len()), Some(2));
}

#[test]
fn parse_multiple_codecs_keeps_duplicates() {
    let src = "downstream A { x: u8 } upstream A { x: u8 } downstream B {}";
    let codecs = parse(src).expect("parse");
    let names: Vec<_> = codecs.iter().map(|c| (c.name(), c.direction())).collect();
    assert_eq!(
        names,
        [
            ("A", Direction::Encoder),
            ("A", Direction::Decoder),
            ("B", Direction::Encoder)
        ]
    );
}

#[test]
fn parse_hash_marker_is_dropped() {
    let a = parse("downstream A {#\n x: u8 #\n}").expect("parse");
    let b = parse("downstream A { x: u8 }").expect("parse");
    assert_eq!(a, b);
}

#[test]
fn parse_line_comments_when_enabled() {
    let src = "# login packet sent by the client\nupstream Login {\n  user: base37 # packed name\n}\n";
    let options = ParseOptions {
        scan: ScanOptions {
            comments: CommentStyle::Line,
        },
        ..ParseOptions::default()
    };
    let codecs = parse_with_options(src, options).expect("parse");
    assert_eq!(codecs[0].fields(), [Value::base37("user")]);
    // With the default marker style the comment words become tokens.
    assert!(parse(src).is_err());
}

#[test]
fn parse_ignores_stray_characters() {
    let codecs = parse("downstream A { x:; u8 }").expect("parse");
    assert_eq!(codecs[0].len(), 1);
}

// ==================== Syntax: invalid programs ====================

#[test]
fn reject_unknown_codec_keyword() {
    let err = parse("sideways A {}").unwrap_err();
    match err {
        Error::Syntax { expected, found, .. } => {
            assert_eq!(expected, Expected::OneOf(&["upstream", "downstream"]));
            assert_eq!(found, "sideways");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn reject_keyword_as_codec_name() {
    let err = parse("upstream u8 {}").unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax { expected: Expected::Kind(TokenKind::Identifier), ref found, .. } if found == "u8"
    ));
}

#[test]
fn reject_missing_close_brace() {
    let err = parse("downstream Bad { x: i32").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Syntax);
    match err {
        Error::Syntax { expected, found, .. } => {
            assert_eq!(expected, Expected::Kind(TokenKind::CloseBrace));
            assert_eq!(found, "end of file");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn reject_field_without_value() {
    let err = parse("upstream A { x y: u8 }").unwrap_err();
    assert!(matches!(err, Error::Syntax { expected: Expected::Production(_), ref found, .. } if found == "y"));
}

#[test]
fn reject_missing_numeric_type() {
    let err = parse("upstream A { x: little added }").unwrap_err();
    assert!(matches!(err, Error::Syntax { expected: Expected::OneOf(_), ref found, .. } if found == "}"));
}

#[test]
fn reject_order_after_transformation() {
    assert!(parse("upstream A { x: added little u8 }").is_err());
}

#[test]
fn reject_string_keyword_as_unit() {
    assert!(parse("upstream A { x: string }").is_err());
}

#[test]
fn reject_comma_as_unit() {
    let err = parse("upstream A { x: , }").unwrap_err();
    assert!(matches!(err, Error::Syntax { ref found, .. } if found == ","));
}

#[test]
fn reject_unterminated_string() {
    let err = parse("downstream A { x: \"oops }").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Scan);
}

// ==================== Semantics ====================

#[test]
fn reject_unmapped_width() {
    let err = parse("downstream Bad { x: i9 }").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Semantic);
    assert!(matches!(err, Error::UnmappedWidth { ref lexeme, .. } if lexeme == "i9"));
}

#[test]
fn reject_other_unmapped_widths() {
    for ty in ["u0", "i12", "u40", "i128", "u99999999999"] {
        let src = format!("downstream Bad {{ x: {} }}", ty);
        let err = parse(&src).unwrap_err();
        assert!(matches!(err, Error::UnmappedWidth { .. }), "{}: {:?}", ty, err);
    }
}

#[test]
fn reject_integer_out_of_range() {
    let err = parse("downstream Big { x: 9_223_372_036_854_775_808 }").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Semantic);
    assert!(matches!(err, Error::InvalidInteger { .. }));
}

#[test]
fn accept_integer_at_range_limit() {
    let v = single_field("downstream Big { x: 9_223_372_036_854_775_807 }");
    assert_eq!(v, Value::integer("x", i64::MAX));
}

#[test]
fn reject_duplicate_field_names() {
    let src = "upstream Dup {\n  a: u8\n  a: u16\n}";
    let err = parse(src).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Semantic);
    match err {
        Error::DuplicateField { codec, name, span } => {
            assert_eq!(codec, "Dup");
            assert_eq!(name, "a");
            assert_eq!(span.map(|s| s.start), Some(src.rfind("a:").unwrap()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn reject_duplicate_composite_and_unit() {
    let err = parse("upstream Dup { a { x: u8 } a: u8 }").unwrap_err();
    assert!(matches!(err, Error::DuplicateField { .. }));
}

#[test]
fn errors_report_positions() {
    let src = "downstream A {\n  x: u12\n}";
    let err = parse(src).unwrap_err();
    let span = err.span().expect("span");
    assert_eq!(&src[span.start..span.end], "u12");
}
