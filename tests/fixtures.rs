use std::collections::BTreeMap;

use envline::{Entry, parse_bytes, parse_str};

#[test]
fn parses_basic_fixture() {
    let fixture = include_str!("fixtures/basic.env");
    let entries = parse_str(fixture);

    let pairs = entries
        .iter()
        .map(|entry| (entry.key.as_str(), entry.value.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        pairs,
        vec![
            ("NO_SPACE", "value1"),
            ("SPACED_ENTRY", "value2"),
            ("SINGLE_QUOTED", "single quote text allowed"),
            ("DOUBLE_QUOTED", "double quote text allowed"),
            (
                "SINGLE_QUOTES_MULTILINE",
                "single quotes first line\nanother line but ensure they are wrapped in quotes\n"
            ),
        ]
    );
}

#[test]
fn parses_multiline_fixture() {
    let fixture = include_str!("fixtures/multiline.env");
    let map = to_map(parse_str(fixture));

    assert_eq!(
        map.get("DOUBLE_MULTILINE").expect("DOUBLE_MULTILINE"),
        "-----BEGIN PUBLIC KEY-----\nLINE1\nLINE2\n-----END PUBLIC KEY-----"
    );
    assert_eq!(
        map.get("SINGLE_MULTILINE").expect("SINGLE_MULTILINE"),
        "first line\nmiddle line\nlast line"
    );
    assert_eq!(map.get("AFTER").expect("AFTER"), "after_line");
    assert!(!map.contains_key("NOEQUALS"));
    assert!(!map.contains_key("A"));
    assert_eq!(map.len(), 3);
}

#[test]
fn parses_crlf_fixture() {
    let fixture = include_bytes!("fixtures/crlf.env");
    let map = to_map(parse_bytes(fixture).expect("fixture should parse"));

    assert_eq!(map.get("CRLF_PLAIN").expect("CRLF_PLAIN"), "plain");
    assert_eq!(map.get("CRLF_BLOCK").expect("CRLF_BLOCK"), "one\ntwo");
}

fn to_map(entries: Vec<Entry>) -> BTreeMap<String, String> {
    entries
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect()
}
