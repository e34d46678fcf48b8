use super::*;
use crate::registry::Registry;
use crate::synth::structs::FieldSpec;
use pretty_assertions::assert_eq;

struct Shapes {
    reg: Registry,
    /// `struct { X int; Y string "json:\"y\"" }`
    inner: Type,
    /// `struct { Inner; Z int; x int }`
    outer: Type,
}

fn shapes() -> Shapes {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let string = reg.basic(Kind::String);
    let inner = reg
        .struct_of(&[
            FieldSpec::new("X", int),
            FieldSpec::new("Y", string).tag(r#"json:"y""#),
        ])
        .unwrap();
    let outer = reg
        .struct_of(&[
            FieldSpec::new("Inner", inner).embed(),
            FieldSpec::new("Z", int),
            FieldSpec::new("x", int).unexported("example.com/m"),
        ])
        .unwrap();
    Shapes { reg, inner, outer }
}

#[test]
fn field_by_position() {
    let s = shapes();
    let f = s.outer.field(0);
    assert_eq!(f.name, "Inner");
    assert!(f.embedded);
    assert_eq!(f.typ, s.inner);
    assert_eq!(f.index.as_slice(), &[0]);

    let z = s.outer.field(1);
    assert_eq!((z.offset, z.is_exported()), (24, true));
    let x = s.outer.field(2);
    assert_eq!(x.pkg_path, "example.com/m");
    assert!(!x.is_exported());
}

#[test]
#[should_panic(expected = "Field index 3 out of range")]
fn field_out_of_range() {
    shapes().outer.field(3);
}

#[test]
fn tags_are_parsed() {
    let s = shapes();
    let y = s.inner.field(1);
    assert_eq!(y.tag.get("json"), "y");
    assert_eq!(y.tag.lookup("xml"), None);
}

#[test]
fn promoted_fields() {
    let s = shapes();
    let x = s.outer.field_by_name("X").unwrap();
    assert_eq!(x.index.as_slice(), &[0, 0]);
    assert_eq!(x.typ, s.reg.basic(Kind::Int));

    let y = s.outer.field_by_name("Y").unwrap();
    assert_eq!(y.index.as_slice(), &[0, 1]);
    assert_eq!(y.offset, 8);
    assert_eq!(y.tag.get("json"), "y");

    assert_eq!(s.outer.field_by_name("Z").unwrap().index.as_slice(), &[1]);
    assert_eq!(s.outer.field_by_name("Nope"), None);
    assert_eq!(s.outer.field_by_name(""), None);
}

#[test]
fn by_index_matches_by_name() {
    let s = shapes();
    let by_name = s.outer.field_by_name("Y").unwrap();
    assert_eq!(s.outer.field_by_index(&[0, 1]), by_name);
}

#[test]
#[should_panic(expected = "FieldByIndex with empty index")]
fn empty_index_panics() {
    shapes().outer.field_by_index(&[]);
}

#[test]
fn shallower_field_shadows() {
    let s = shapes();
    let string = s.reg.basic(Kind::String);
    let t = s
        .reg
        .struct_of(&[
            FieldSpec::new("Inner", s.inner).embed(),
            FieldSpec::new("X", string),
        ])
        .unwrap();
    let x = t.field_by_name("X").unwrap();
    assert_eq!(x.index.as_slice(), &[1]);
    assert_eq!(x.typ, string);
}

#[test]
fn same_depth_matches_cancel() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let string = reg.basic(Kind::String);
    let a = reg.struct_of(&[FieldSpec::new("X", int)]).unwrap();
    let b = reg.struct_of(&[FieldSpec::new("X", string)]).unwrap();
    let c = reg
        .struct_of(&[FieldSpec::new("A", a).embed(), FieldSpec::new("B", b).embed()])
        .unwrap();
    assert_eq!(c.field_by_name("X"), None);
    assert!(c.field_by_name("A").is_some());

    // A deeper copy of the same struct is shadowed by the shallower one.
    let d = reg.struct_of(&[FieldSpec::new("B", a).embed()]).unwrap();
    let twice = reg
        .struct_of(&[FieldSpec::new("A", a).embed(), FieldSpec::new("D", d).embed()])
        .unwrap();
    assert_eq!(twice.field_by_name("X").unwrap().index.as_slice(), &[0, 0]);
}

#[test]
fn embedded_pointers_are_followed() {
    let s = shapes();
    let p = s.reg.pointer_to(s.inner).unwrap();
    let t = s.reg.struct_of(&[FieldSpec::new("Inner", p).embed()]).unwrap();

    let x = t.field_by_name("X").unwrap();
    assert_eq!(x.index.as_slice(), &[0, 0]);
    assert_eq!(t.field_by_index(&[0, 1]).name, "Y");
}

#[test]
fn match_by_predicate() {
    let s = shapes();
    let f = s.outer.field_by_name_func(|n| n.starts_with('Y')).unwrap();
    assert_eq!(f.name, "Y");
    assert_eq!(s.outer.field_by_name_func(|n| n.len() > 10), None);
}
