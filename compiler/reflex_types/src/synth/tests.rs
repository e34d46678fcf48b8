use super::*;
use crate::builder::NamedType;
use crate::registry::Registry;
use crate::RegistryBuilder;
use pretty_assertions::assert_eq;
use reflex_ir::ChanDir;

#[test]
fn fnv1_reference_values() {
    assert_eq!(fnv1(FNV_BASIS, b""), FNV_BASIS);
    // FNV-1 (multiply, then xor) of "a".
    assert_eq!(fnv1(FNV_BASIS, b"a"), 0x050c_5d7e);
}

#[test]
fn child_hash_is_folded_big_endian() {
    assert_eq!(fnv1_hash(7, 0x0102_0304), fnv1(7, &[1, 2, 3, 4]));
}

#[test]
fn align_up_rounds_to_power_of_two() {
    assert_eq!(align_up(0, 8), Some(0));
    assert_eq!(align_up(1, 8), Some(8));
    assert_eq!(align_up(9, 4), Some(12));
    assert_eq!(align_up(5, 1), Some(5));
    assert_eq!(align_up(5, 0), Some(5));
}

#[test]
fn align_up_reports_overflow() {
    assert_eq!(align_up(usize::MAX, 1), Some(usize::MAX));
    assert_eq!(align_up(usize::MAX, 8), None);
    assert_eq!(align_up(usize::MAX - 6, 8), None);
    assert_eq!(align_up(usize::MAX - 7, 8), Some(usize::MAX - 7));
}

#[test]
fn pointer_descriptor() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let p = reg.pointer_to(int).unwrap();

    assert_eq!(p.to_string(), "*int");
    assert_eq!(p.kind(), Kind::Pointer);
    assert_eq!(p.elem(), int);
    assert_eq!((p.size(), p.align(), p.ptr_bytes()), (8, 8, 8));
    assert_eq!(p.gc_data(), &crate::gc::pointer_mask(1));
    assert_eq!(p.hash(), fnv1(int.hash(), b"*"));
    assert!(!p.iface_indir());
    assert!(p.comparable());
    assert_eq!(reg.pointer_to(int).unwrap(), p);
}

#[test]
fn pointer_to_declared_type_uses_its_companion() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    let t = b.named(NamedType::new("example.com/m", "Count", int)).unwrap();
    let reg = b.build();

    let p = reg.pointer_to(t).unwrap();
    assert_eq!(Some(p), t.ptr_to_this());
    assert_eq!(p.to_string(), "*m.Count");
    assert_eq!(reg.stats().pointers, 0);
}

#[test]
fn pointer_chain() {
    let reg = Registry::new();
    let s = reg.basic(Kind::String);
    let pp = reg.pointer_to(reg.pointer_to(s).unwrap()).unwrap();
    assert_eq!(pp.to_string(), "**string");
    assert_eq!(pp.elem().elem(), s);
}

#[test]
fn slice_descriptor() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let s = reg.slice_of(int).unwrap();

    assert_eq!(s.to_string(), "[]int");
    assert_eq!(s.kind(), Kind::Slice);
    assert_eq!(s.elem(), int);
    assert_eq!((s.size(), s.align(), s.ptr_bytes()), (24, 8, 8));
    assert_eq!(s.hash(), fnv1(int.hash(), b"["));
    assert!(!s.comparable());
    assert!(s.iface_indir());
    assert_eq!(reg.slice_of(int).unwrap(), s);
}

#[test]
fn slice_on_32bit_target() {
    let reg = RegistryBuilder::with_config(RegistryConfig::target_32bit())
        .unwrap()
        .build();
    let s = reg.slice_of(reg.basic(Kind::Uint8)).unwrap();
    assert_eq!((s.size(), s.align(), s.ptr_bytes()), (12, 4, 4));
    assert_eq!(reg.basic(Kind::Int).size(), 4);
}

#[test]
fn chan_directions_are_distinct() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let both = reg.chan_of(ChanDir::Both, int).unwrap();
    let send = reg.chan_of(ChanDir::Send, int).unwrap();
    let recv = reg.chan_of(ChanDir::Recv, int).unwrap();

    assert_eq!(both.to_string(), "chan int");
    assert_eq!(send.to_string(), "chan<- int");
    assert_eq!(recv.to_string(), "<-chan int");
    assert_ne!(both, send);
    assert_ne!(send, recv);
    assert_ne!(both.hash(), send.hash());
    assert_eq!(recv.chan_dir(), ChanDir::Recv);
    assert_eq!(both.hash(), fnv1(int.hash(), &[b'c', 3]));
    assert_eq!(reg.chan_of(ChanDir::Send, int).unwrap(), send);
    assert!(both.comparable());
    assert_eq!(both.size(), 8);
}

#[test]
fn chan_element_size_limit() {
    let reg = Registry::new();
    let byte = reg.basic(Kind::Uint8);
    let fits = reg.array_of(65_535, byte).unwrap();
    let too_big = reg.array_of(65_536, byte).unwrap();

    assert!(reg.chan_of(ChanDir::Both, fits).is_ok());
    assert_eq!(
        reg.chan_of(ChanDir::Both, too_big),
        Err(TypeError::ChanElemTooLarge {
            elem: "[65536]uint8".to_owned(),
            size: 65_536,
            limit: 65_536,
        })
    );
}
