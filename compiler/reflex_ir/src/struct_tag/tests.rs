use super::*;
use pretty_assertions::assert_eq;

#[test]
fn lookup_second_key() {
    let tag = StructTag::from(r#"k1:"v1" k2:"v2""#);
    assert_eq!(tag.lookup("k2"), Some("v2".to_owned()));
    assert_eq!(tag.lookup("k1"), Some("v1".to_owned()));
}

#[test]
fn lookup_missing_key() {
    let tag = StructTag::from(r#"k1:"v1""#);
    assert_eq!(tag.lookup("missing"), None);
    assert_eq!(tag.get("missing"), "");
}

#[test]
fn unterminated_value_hides_every_key() {
    let tag = StructTag::from(r#"k1:"v1"#);
    assert_eq!(tag.lookup("k1"), None);
    assert_eq!(tag.lookup("k2"), None);
}

#[test]
fn malformed_tail_keeps_earlier_keys() {
    let tag = StructTag::from(r#"a:"1" b:2 c:"3""#);
    assert_eq!(tag.lookup("a"), Some("1".to_owned()));
    assert_eq!(tag.lookup("b"), None);
    assert_eq!(tag.lookup("c"), None);
}

#[test]
fn empty_value_is_present() {
    let tag = StructTag::from(r#"json:"""#);
    assert_eq!(tag.lookup("json"), Some(String::new()));
}

#[test]
fn escaped_quote_in_value() {
    let tag = StructTag::from(r#"q:"say \"hi\"" z:"end""#);
    assert_eq!(tag.get("q"), "say \"hi\"");
    assert_eq!(tag.get("z"), "end");
}

#[test]
fn extra_spaces_between_pairs() {
    let tag = StructTag::from(r#"   a:"x"    b:"y"  "#);
    assert_eq!(tag.get("b"), "y");
}

#[test]
fn key_with_colon_prefix_not_matched() {
    let tag = StructTag::from(r#":"x""#);
    assert_eq!(tag.lookup(""), None);
}

#[test]
fn empty_tag() {
    let tag = StructTag::default();
    assert!(tag.is_empty());
    assert_eq!(tag.lookup("a"), None);
}
