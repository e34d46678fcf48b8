use super::*;
use crate::builder::{NamedType, RegistryBuilder};
use pretty_assertions::assert_eq;

fn bits(bv: &BitVec) -> Vec<bool> {
    (0..bv.len()).map(|i| bv.get(i)).collect()
}

#[test]
fn scalar_frame() {
    let reg = Registry::new();
    let f = reg
        .func_of(
            &[reg.basic(Kind::Int8), reg.basic(Kind::Int64)],
            &[reg.basic(Kind::Int32)],
            false,
        )
        .unwrap();
    let l = reg.func_layout(f, None).unwrap();

    assert_eq!(l.frame().string(), "funcargs(func(int8, int64) int32)");
    assert_eq!((l.arg_size(), l.ret_offset()), (16, 16));
    assert_eq!(l.frame().size(), 24);
    assert!(l.stack_map().is_empty());
    assert_eq!(l.frame().gc_data(), &GcData::Empty);
    assert_eq!(l.frame().ptr_bytes(), 0);
}

#[test]
fn pointer_words_in_frame() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let f = reg
        .func_of(
            &[reg.pointer_to(int).unwrap(), reg.basic(Kind::String)],
            &[reg.slice_of(int).unwrap()],
            false,
        )
        .unwrap();
    let l = reg.func_layout(f, None).unwrap();

    assert_eq!((l.arg_size(), l.ret_offset()), (24, 24));
    assert_eq!(l.frame().size(), 48);
    assert_eq!(bits(l.stack_map()), vec![true, true, false, true]);
    assert_eq!(l.frame().ptr_bytes(), 32);
    assert_eq!(l.frame().gc_data().mask(), Some(l.stack_map()));
}

#[test]
fn results_start_on_a_word() {
    let reg = Registry::new();
    let b = reg.basic(Kind::Bool);
    let f = reg.func_of(&[b], &[b], false).unwrap();
    let l = reg.func_layout(f, None).unwrap();
    assert_eq!((l.arg_size(), l.ret_offset(), l.frame().size()), (1, 8, 16));
}

#[test]
fn receiver_takes_one_word() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    let t = b.named(NamedType::new("example.com/m", "T", int)).unwrap();
    let unit = b.func(&[], &[], false).unwrap();
    let reg = b.build();

    let l = reg.func_layout(unit, Some(t)).unwrap();
    assert_eq!(l.frame().string(), "methodargs(m.T)(func())");
    assert_eq!((l.arg_size(), l.frame().size()), (8, 8));
    // `T` is stored indirectly, so the receiver word is a pointer.
    assert_eq!(bits(l.stack_map()), vec![true]);

    let u8t = reg.basic(Kind::Uint8);
    let arr = reg.array_of(1, reg.pointer_to(u8t).unwrap()).unwrap();
    assert!(!arr.iface_indir());
    let l = reg.func_layout(unit, Some(arr)).unwrap();
    assert_eq!(bits(l.stack_map()), vec![true]);
}

#[test]
fn interface_receiver_is_rejected() {
    let reg = Registry::new();
    let unit = reg.func_of(&[], &[], false).unwrap();
    let e = reg.empty_interface();
    assert_eq!(
        reg.func_layout(unit, Some(e)).map(|_| ()),
        Err(TypeError::InterfaceReceiver {
            typ: "interface {}".to_owned(),
        })
    );
}

#[test]
#[should_panic(expected = "func_layout of non-func type int")]
fn non_func_panics() {
    let reg = Registry::new();
    let _ = reg.func_layout(reg.basic(Kind::Int), None);
}

#[test]
fn layouts_are_cached() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let f = reg.func_of(&[int], &[], false).unwrap();
    let a = reg.func_layout(f, None).unwrap();
    let b = reg.func_layout(f, None).unwrap();
    let m = reg.func_layout(f, Some(int)).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &m));
    assert_eq!(reg.stats().layouts, 2);
}

#[test]
fn frames_are_pooled() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let f = reg.func_of(&[int, int], &[int], false).unwrap();
    let l = reg.func_layout(f, None).unwrap();

    let mut frame = l.get_frame();
    assert_eq!(frame.len(), 24);
    frame[0] = 0xaa;
    l.put_frame(frame);
    let again = l.get_frame();
    assert!(again.iter().all(|&b| b == 0));
    assert_eq!(again.len(), 24);

    // Wrong-sized buffers are dropped.
    l.put_frame(vec![1; 3].into_boxed_slice());
    assert_eq!(l.get_frame().len(), 24);
}

#[test]
fn oversized_frames_are_rejected() {
    let reg = Registry::new();
    let uint8 = reg.basic(Kind::Uint8);
    let int64 = reg.basic(Kind::Int64);
    let half = reg.array_of(usize::MAX / 2 + 1, uint8).unwrap();

    let args = reg.func_of(&[half, half], &[], false).unwrap();
    assert_eq!(
        reg.func_layout(args, None).unwrap_err(),
        TypeError::FrameTooLarge {
            func: args.to_string(),
        }
    );

    // Arguments fit; word-aligning the result area does not.
    let nearly_all = reg.array_of(usize::MAX - 3, uint8).unwrap();
    let results = reg.func_of(&[nearly_all], &[int64], false).unwrap();
    assert_eq!(
        reg.func_layout(results, None).unwrap_err(),
        TypeError::FrameTooLarge {
            func: results.to_string(),
        }
    );
    assert_eq!(reg.stats().layouts, 0);
}
