use super::*;
use pretty_assertions::assert_eq;

#[test]
fn kind_size() {
    assert_eq!(std::mem::size_of::<Kind>(), 1);
}

#[test]
fn scalar_range() {
    assert!(Kind::Bool.is_scalar());
    assert!(Kind::Complex128.is_scalar());
    assert!(!Kind::String.is_scalar());
    assert!(!Kind::Invalid.is_scalar());
    assert!(!Kind::Array.is_scalar());
}

#[test]
fn basic_kinds_cover_string_and_unsafe_pointer() {
    assert!(Kind::String.is_basic());
    assert!(Kind::UnsafePointer.is_basic());
    assert!(!Kind::Slice.is_basic());
    assert!(Kind::BASIC.iter().all(|k| k.is_basic()));
    assert_eq!(Kind::BASIC.len(), 18);
}

#[test]
fn composite_kinds() {
    for k in [
        Kind::Array,
        Kind::Chan,
        Kind::Func,
        Kind::Interface,
        Kind::Map,
        Kind::Pointer,
        Kind::Slice,
        Kind::Struct,
    ] {
        assert!(k.is_composite(), "{k} should be composite");
    }
    assert!(!Kind::String.is_composite());
}

#[test]
fn pointer_shaped() {
    assert!(Kind::Pointer.is_pointer_shaped());
    assert!(Kind::Map.is_pointer_shaped());
    assert!(!Kind::Slice.is_pointer_shaped());
    assert!(!Kind::String.is_pointer_shaped());
}

#[test]
fn names() {
    assert_eq!(Kind::Pointer.to_string(), "ptr");
    assert_eq!(Kind::UnsafePointer.to_string(), "unsafe.Pointer");
    assert_eq!(format!("{:?}", Kind::Map), "Kind::map");
}

#[test]
fn chan_dir_bits() {
    assert_eq!(
        ChanDir::Recv.bits() | ChanDir::Send.bits(),
        ChanDir::Both.bits()
    );
    assert_eq!(ChanDir::Send.prefix(), "chan<- ");
    assert_eq!(ChanDir::Recv.prefix(), "<-chan ");
}
