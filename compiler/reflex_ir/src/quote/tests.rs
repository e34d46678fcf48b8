use super::*;
use pretty_assertions::assert_eq;

#[test]
fn quote_plain() {
    assert_eq!(quote("json"), r#""json""#);
    assert_eq!(quote(""), r#""""#);
}

#[test]
fn quote_escapes() {
    assert_eq!(quote("a\"b"), r#""a\"b""#);
    assert_eq!(quote("tab\there"), r#""tab\there""#);
    assert_eq!(quote("nl\n"), r#""nl\n""#);
    assert_eq!(quote("\x01"), r#""\x01""#);
    assert_eq!(quote("back\\slash"), r#""back\\slash""#);
}

#[test]
fn quote_keeps_printable_unicode() {
    assert_eq!(quote("héllo"), "\"héllo\"");
}

#[test]
fn unquote_simple() {
    assert_eq!(unquote(r#""v1""#), Ok("v1".to_owned()));
    assert_eq!(unquote(r#""a\"b""#), Ok("a\"b".to_owned()));
    assert_eq!(unquote(r#""\x41é\101""#), Ok("AéA".to_owned()));
}

#[test]
fn unquote_raw() {
    assert_eq!(unquote("`a\\nb`"), Ok("a\\nb".to_owned()));
}

#[test]
fn unquote_char() {
    assert_eq!(unquote("'x'"), Ok("x".to_owned()));
    assert_eq!(unquote("'xy'"), Err(UnquoteError::BadCharLiteral));
}

#[test]
fn unquote_rejects_malformed() {
    assert_eq!(unquote("\"abc"), Err(UnquoteError::Unterminated));
    assert_eq!(unquote("\""), Err(UnquoteError::Unterminated));
    assert_eq!(unquote(r#""\q""#), Err(UnquoteError::BadEscape(1)));
    assert_eq!(unquote("\"a\"b\""), Err(UnquoteError::BadChar(2)));
    assert_eq!(unquote(r#""\'""#), Err(UnquoteError::BadEscape(1)));
}

#[test]
fn quote_then_unquote() {
    for s in ["", "plain", "with \"quotes\"", "ctl\x02\x7f", "tab\tnl\n"] {
        assert_eq!(unquote(&quote(s)).as_deref(), Ok(s));
    }
}
