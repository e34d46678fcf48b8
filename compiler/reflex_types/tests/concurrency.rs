#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Tests can panic"
)]

//! Racing synthesizers must agree on one descriptor per type.

use std::sync::Arc;
use std::thread;

use rayon::prelude::*;
use reflex_types::{ChanDir, FieldSpec, Kind, Registry, Type};

const THREADS: usize = 16;

/// Every type one worker synthesizes, in a fixed order.
fn synthesize(reg: &Registry) -> Vec<Type> {
    let int = reg.basic(Kind::Int);
    let string = reg.basic(Kind::String);
    let p = reg.pointer_to(int).unwrap();
    let s = reg.slice_of(p).unwrap();
    let m = reg.map_of(string, s).unwrap();
    let c = reg.chan_of(ChanDir::Recv, m).unwrap();
    let a = reg.array_of(4, c).unwrap();
    let f = reg.func_of(&[a, s], &[m], false).unwrap();
    let st = reg
        .struct_of(&[
            FieldSpec::new("F", f),
            FieldSpec::new("M", m).tag(r#"json:"m""#),
        ])
        .unwrap();
    vec![p, s, m, c, a, f, st, reg.pointer_to(st).unwrap()]
}

#[test]
fn scoped_threads_converge() {
    let reg = Registry::new();
    let results: Vec<Vec<Type>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|| synthesize(&reg)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = &results[0];
    for r in &results[1..] {
        assert_eq!(r, first);
    }
    assert_eq!(synthesize(&reg), *first);

    let stats = reg.stats();
    assert_eq!(stats.func_hashes, 1);
    assert_eq!(stats.struct_hashes, 1);
    // Pointers to int and to the struct.
    assert_eq!(stats.pointers, 2);
}

#[test]
fn rayon_workers_converge() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let arrays: Vec<(usize, Type)> = (0..2_000usize)
        .into_par_iter()
        .map(|i| {
            let len = i % 10;
            (len, reg.array_of(len, int).unwrap())
        })
        .collect();

    for (len, t) in &arrays {
        assert_eq!(*t, reg.array_of(*len, int).unwrap());
        assert_eq!(t.len(), *len);
    }
    // Ten arrays plus `[]int`.
    assert_eq!(reg.stats().keyed, 11);
}

#[test]
fn structs_with_shared_hash_prefixes() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let names: Vec<String> = (0..64).map(|i| format!("F{i}")).collect();

    let types: Vec<Type> = names
        .par_iter()
        .flat_map_iter(|n| {
            let t = reg.struct_of(&[FieldSpec::new(n.as_str(), int)]).unwrap();
            [t, reg.struct_of(&[FieldSpec::new(n.as_str(), int)]).unwrap()]
        })
        .collect();

    for pair in types.chunks(2) {
        assert_eq!(pair[0], pair[1]);
    }
    let mut distinct = types.clone();
    distinct.sort_by(|a, b| a.string().cmp(b.string()));
    distinct.dedup();
    assert_eq!(distinct.len(), 64);
}

#[test]
fn frame_layouts_are_shared() {
    let reg = Registry::new();
    let int = reg.basic(Kind::Int);
    let f = reg.func_of(&[int, int], &[int], false).unwrap();

    let layouts: Vec<_> = (0..THREADS)
        .into_par_iter()
        .map(|_| reg.func_layout(f, None).unwrap())
        .collect();
    for l in &layouts[1..] {
        assert!(Arc::ptr_eq(l, &layouts[0]));
    }
    assert_eq!(reg.stats().layouts, 1);
}
