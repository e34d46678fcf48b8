use super::*;
use crate::registry::Registry;
use crate::synth::structs::FieldSpec;
use crate::RegistryBuilder;
use pretty_assertions::assert_eq;

fn bits(bv: &BitVec) -> Vec<bool> {
    (0..bv.len()).map(|i| bv.get(i)).collect()
}

#[test]
fn pointer_mask_words() {
    let GcData::Mask(bv) = pointer_mask(3) else {
        panic!("expected a mask");
    };
    assert_eq!(bits(&bv), vec![true, true, true]);
}

#[test]
fn type_bits_at_offset() {
    let reg = Registry::new();
    let mut bv = BitVec::new();
    add_type_bits(&mut bv, 16, &reg.empty_interface(), 8);
    assert_eq!(bits(&bv), vec![false, false, true, true]);

    // Pointer-free types add nothing.
    add_type_bits(&mut bv, 32, &reg.basic(Kind::Int), 8);
    assert_eq!(bv.len(), 4);
}

#[test]
fn struct_bits_follow_fields() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let p = reg.pointer_to(int).unwrap();
    let inner = reg
        .struct_of(&[FieldSpec::new("A", int), FieldSpec::new("P", p)])
        .unwrap();
    let outer = reg
        .struct_of(&[FieldSpec::new("S", reg.basic(Kind::String)), FieldSpec::new("I", inner)])
        .unwrap();

    assert_eq!(struct_ptr_bytes(outer.fields()), 32);
    assert_eq!(outer.ptr_bytes(), 32);
    let mut bv = BitVec::new();
    add_field_bits(&mut bv, 0, outer.fields(), 8);
    assert_eq!(bits(&bv), vec![true, false, false, true]);
    assert_eq!(outer.gc_data(), &GcData::Mask(bv));
}

#[test]
fn array_of_one_reuses_element_map() {
    let reg = Registry::new();
    let s = reg.basic(Kind::String);
    let (gc, ptr_bytes) = array_gc(&s, 1, s.size(), reg.config());
    assert_eq!(gc, s.gc_data().clone());
    assert_eq!(ptr_bytes, 8);
}

#[test]
fn array_mask_repeats_element() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let p = reg.pointer_to(int).unwrap();
    let elem = reg
        .struct_of(&[FieldSpec::new("P", p), FieldSpec::new("A", int)])
        .unwrap();

    let (gc, ptr_bytes) = array_gc(&elem, 3, 3 * elem.size(), reg.config());
    assert_eq!(ptr_bytes, 40);
    let GcData::Mask(bv) = gc else {
        panic!("expected a mask");
    };
    assert_eq!(bits(&bv), vec![true, false, true, false, true]);
}

#[test]
fn pointer_free_array_is_empty() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    assert_eq!(array_gc(&int, 100, 800, reg.config()), (GcData::Empty, 0));
}

#[test]
fn emit_mask_stamps_copies() {
    let reg = Registry::new();
    let s = reg.basic(Kind::String);
    let mut out = BitVec::new();
    emit_mask(&mut out, 1, &s, 3, 8);
    // Words 1, 3 and 5 hold string data pointers.
    assert_eq!(bits(&out), vec![false, true, false, true, false, true]);
}

#[test]
fn program_matches_mask() {
    let cfg = RegistryConfig {
        max_ptrmask_bytes: 1,
        ..RegistryConfig::default()
    };
    let reg = RegistryBuilder::with_config(cfg).unwrap().build();
    let int = reg.basic(Kind::Int);
    let p = reg.pointer_to(int).unwrap();
    let elem = reg
        .struct_of(&[FieldSpec::new("A", int), FieldSpec::new("P", p)])
        .unwrap();

    // 5 x 16 bytes is over the 64-byte mask limit.
    let arr = reg.array_of(5, elem).unwrap();
    let prog = arr.gc_data().program().unwrap();
    let got = prog.expand(10).unwrap();
    assert_eq!(
        bits(&got),
        vec![false, true, false, true, false, true, false, true, false, true]
    );

    let s = reg
        .struct_of(&[FieldSpec::new("N", int), FieldSpec::new("Arr", arr)])
        .unwrap();
    let GcData::Program(prog) = s.gc_data() else {
        panic!("expected a program");
    };
    let mut want = BitVec::new();
    add_field_bits(&mut want, 0, s.fields(), 8);
    let got = prog.expand(want.len()).unwrap();
    assert_eq!(bits(&got), bits(&want));
    assert_eq!(s.ptr_bytes(), 8 + arr.ptr_bytes());
}
