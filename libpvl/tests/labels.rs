//! End-to-end behavior of the public reader API.

use std::io::Cursor;

use libpvl::{
    parse, parse_with_options, read_label, ContainerKind, ParseError, ParseOptions, Value,
};
use num_bigint::BigInt;

const PROJECTION_LABEL: &str = "TARGET_NAME = MARS\nGROUP = IMAGE_MAP_PROJECTION\n  MAP_PROJECTION_TYPE = \"SINUSOIDAL\"\n  CENTER_LONGITUDE = 0.0\nEND_GROUP\nEND\n";

#[test]
fn test_projection_label() {
    let reader = parse(PROJECTION_LABEL).unwrap();
    assert_eq!(reader.get_keyword("TARGET_NAME", ""), "MARS");
    assert_eq!(
        reader.get_keyword("IMAGE_MAP_PROJECTION.MAP_PROJECTION_TYPE", ""),
        "\"SINUSOIDAL\""
    );
    assert_eq!(
        reader.get_keyword("IMAGE_MAP_PROJECTION.CENTER_LONGITUDE", ""),
        "0.0"
    );
    assert_eq!(reader.get_keyword("END", "absent"), "absent");

    let tree = reader.tree().unwrap();
    let group = tree
        .get("IMAGE_MAP_PROJECTION")
        .and_then(Value::as_group)
        .unwrap();
    assert_eq!(group.kind(), Some(ContainerKind::Group));
    assert_eq!(group.container_name(), Some("IMAGE_MAP_PROJECTION"));
    assert_eq!(
        group.get("MAP_PROJECTION_TYPE").and_then(Value::as_str),
        Some("SINUSOIDAL")
    );
    assert_eq!(
        group.get("CENTER_LONGITUDE").and_then(Value::as_f64),
        Some(0.0)
    );
}

#[test]
fn test_quoted_line_break_is_escaped() {
    let reader = parse("NOTE = \"one\r\ntwo\"\nEND\n").unwrap();
    let text = reader.get_keyword("NOTE", "");
    assert_eq!(text, "\"one\\r\\ntwo\"");
    assert!(!text.contains('\n') && !text.contains('\r'));
}

#[test]
fn test_table_blocks_keyed_by_name() {
    let label = "\
Object = Table
  Name = \"A\"
End_Object
Object = Table
  Name = \"B\"
End_Object
End
";
    let reader = parse(label).unwrap();
    let keys: Vec<&str> = reader.tree().unwrap().keys().collect();
    assert_eq!(keys, vec!["Table_A", "Table_B"]);
}

#[test]
fn test_sibling_blocks_get_suffixes() {
    let label = "GROUP = X\n  A = 1\nEND_GROUP\nGROUP = X\n  A = 2\nEND_GROUP\nGROUP = X\nEND_GROUP\nEND\n";
    let reader = parse(label).unwrap();
    let tree = reader.tree().unwrap();
    let keys: Vec<&str> = tree.keys().collect();
    assert_eq!(keys, vec!["X", "X_2", "X_3"]);
    assert_eq!(tree.lookup("X_2.A").and_then(Value::as_i64), Some(2));
    // The flat table is last-write-wins.
    assert_eq!(reader.get_keyword("X.A", ""), "2");
}

#[test]
fn test_list_element_lookup() {
    let reader = parse("FOO = (1, 2, 3)\nEND\n").unwrap();
    assert_eq!(reader.get_keyword_sub("FOO", 2, ""), "2");
    assert_eq!(reader.get_keyword_sub("FOO", 9, "none"), "none");

    let items = reader.tree().unwrap().get("FOO").and_then(Value::as_list).unwrap();
    assert_eq!(items, &[Value::from(1), Value::from(2), Value::from(3)][..]);
}

#[test]
fn test_nested_lists() {
    let reader = parse("WINDOW = ((1,2),(3,4))\nEND\n").unwrap();
    assert_eq!(reader.get_keyword("WINDOW", ""), "((1,2),(3,4))");
    assert_eq!(reader.get_keyword_sub("WINDOW", 4, ""), "4");

    let value = reader.tree().unwrap().get("WINDOW").unwrap();
    assert_eq!(value.as_list().map(<[Value]>::len), Some(2));
    let flat: Vec<i64> = value.flattened().iter().filter_map(|v| v.as_i64()).collect();
    assert_eq!(flat, vec![1, 2, 3, 4]);
}

#[test]
fn test_quantity() {
    let reader = parse("MAP_SCALE = 4.0 <KM/PIXEL>\nEND\n").unwrap();
    assert_eq!(reader.get_keyword("MAP_SCALE", ""), "4.0 <KM/PIXEL>");

    let value = reader.tree().unwrap().get("MAP_SCALE").unwrap();
    let quantity = value.as_quantity().unwrap();
    assert_eq!(quantity.value.as_f64(), Some(4.0));
    assert_eq!(quantity.unit, "KM/PIXEL");
}

#[test]
fn test_multi_word_unit() {
    let reader = parse("RATE = 12 <PIXELS PER SECOND>\nEND\n").unwrap();
    assert_eq!(reader.get_keyword("RATE", ""), "12 <PIXELS PER SECOND>");
    let quantity = reader.tree().unwrap().get("RATE").and_then(Value::as_quantity).unwrap();
    assert_eq!(quantity.unit, "PIXELS PER SECOND");
    assert_eq!(quantity.value.as_integer(), Some(&BigInt::from(12)));
}

#[test]
fn test_unbalanced_list_fails() {
    let err = parse("X = (1, 2").unwrap_err();
    assert!(matches!(err, ParseError::UnbalancedBracket(_)));
}

#[test]
fn test_eof_inside_group_fails() {
    let err = parse("GROUP = FOO\n A = 1\n").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof(_)));
}

#[test]
fn test_end_requires_no_assignment_but_end_group_tolerates_it() {
    assert!(parse("GROUP = G\n  A = 1\nEnd_Group\nEnd\n").is_ok());
    assert!(parse("OBJECT = O\n  A = 1\nEND_OBJECT\nEND\n").is_ok());
    assert!(parse("A = 1\nEnd\n").is_ok());
}

#[test]
fn test_comments_and_continuation() {
    let label = "\
/* leading comment */ this is ignored
A = 1 # end of line
B = ABC-
    DEF
C = x#y
END
";
    let reader = parse(label).unwrap();
    assert_eq!(reader.get_keyword("A", ""), "1");
    assert_eq!(reader.get_keyword("B", ""), "ABCDEF");
    assert_eq!(reader.get_keyword("C", ""), "x#y");
    assert_eq!(reader.keywords().len(), 3);
}

#[test]
fn test_read_label_from_offset() {
    let mut bytes = vec![0u8; 100];
    bytes.extend_from_slice(PROJECTION_LABEL.as_bytes());
    bytes.extend_from_slice(&[0xff; 600]);
    let mut source = Cursor::new(bytes);

    let reader = read_label(&mut source, 100, ParseOptions::default()).unwrap();
    assert_eq!(reader.get_keyword("TARGET_NAME", ""), "MARS");
    assert_eq!(reader.keywords().len(), 3);
}

#[test]
fn test_read_label_crlf() {
    let label = "A = 1\r\nGROUP = G\r\n  B = 2\r\nEND_GROUP\r\nEND\r\n";
    let mut source = Cursor::new(label.as_bytes().to_vec());
    let reader = read_label(&mut source, 0, ParseOptions::default()).unwrap();
    assert_eq!(reader.get_keyword("G.B", ""), "2");
}

#[test]
fn test_strip_surrounding_quotes() {
    let options = ParseOptions::builder().strip_surrounding_quotes(true).build();
    let reader = parse_with_options(PROJECTION_LABEL, options).unwrap();
    assert_eq!(
        reader.get_keyword("IMAGE_MAP_PROJECTION.MAP_PROJECTION_TYPE", ""),
        "SINUSOIDAL"
    );
}

#[test]
fn test_error_location_names_file() {
    let options = ParseOptions::builder().filename("cube.lbl").build();
    let err = parse_with_options("A = 1\nB 2\nEND\n", options).unwrap_err();
    assert_eq!(err.to_string(), "Expected \"=\" after \"B\" at 2:3 of <cube.lbl>");
}

#[test]
fn test_json_view() {
    let reader = parse(PROJECTION_LABEL).unwrap();
    let json = reader.to_json().unwrap();
    assert_eq!(json["TARGET_NAME"], "MARS");
    assert_eq!(json["IMAGE_MAP_PROJECTION"]["_type"], "group");
    assert_eq!(
        json["IMAGE_MAP_PROJECTION"]["_container_name"],
        "IMAGE_MAP_PROJECTION"
    );
    assert_eq!(json["IMAGE_MAP_PROJECTION"]["CENTER_LONGITUDE"], 0.0);
}

#[test]
fn test_lone_dash_value() {
    let reader = parse("A = -\nB = 1\nEND\n").unwrap();
    assert_eq!(reader.get_keyword("A", ""), "-");
    assert_eq!(reader.get_keyword("B", ""), "1");
    assert_eq!(
        reader.tree().and_then(|t| t.get("A")).and_then(Value::as_str),
        Some("-")
    );
}

#[test]
fn test_non_breaking_space_in_bare_value() {
    let reader = parse("NOTE = A\u{a0}B\nEND\n").unwrap();
    assert_eq!(reader.get_keyword("NOTE", ""), "A\u{a0}B");
}
