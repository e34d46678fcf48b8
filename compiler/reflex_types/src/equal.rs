//! Type-directed value equality and hashing.
//!
//! A descriptor's equality is an [`EqualFn`] tag evaluated over two byte
//! regions of the descriptor's size. Map descriptors hash keys with the same
//! dispatch.

use reflex_ir::{ensure_sufficient_stack, Kind};

use crate::desc::TypeDesc;
use crate::hooks::{hash_bytes, RuntimeHooks};

/// Equality behaviour of a comparable type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EqualFn {
    /// Bytewise.
    Memory,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Delegated to [`RuntimeHooks::strings_equal`].
    String,
    /// Delegated to [`RuntimeHooks::interfaces_equal`].
    Interface,
    /// Element by element.
    Array,
    /// Field by field.
    Struct,
}

impl EqualFn {
    /// Equality of a predefined type of kind `kind`, if it has one.
    pub(crate) fn for_basic(kind: Kind) -> Option<EqualFn> {
        match kind {
            Kind::Float32 => Some(EqualFn::Float32),
            Kind::Float64 => Some(EqualFn::Float64),
            Kind::Complex64 => Some(EqualFn::Complex64),
            Kind::Complex128 => Some(EqualFn::Complex128),
            Kind::String => Some(EqualFn::String),
            Kind::Interface => Some(EqualFn::Interface),
            Kind::Func | Kind::Map | Kind::Slice | Kind::Invalid => None,
            Kind::Array => Some(EqualFn::Array),
            Kind::Struct => Some(EqualFn::Struct),
            _ => Some(EqualFn::Memory),
        }
    }
}

#[track_caller]
fn check_len(t: &TypeDesc, v: &[u8]) {
    assert!(
        v.len() >= t.size(),
        "reflex: value of {} needs {} bytes, got {}",
        t.string(),
        t.size(),
        v.len()
    );
}

/// `a == b` for values of type `t`, or `None` if `t` is not comparable.
pub(crate) fn values_equal(
    hooks: &dyn RuntimeHooks,
    t: &TypeDesc,
    a: &[u8],
    b: &[u8],
) -> Option<bool> {
    let eq = t.equal?;
    check_len(t, a);
    check_len(t, b);
    Some(eval(hooks, t, eq, a, b))
}

fn eval(hooks: &dyn RuntimeHooks, t: &TypeDesc, eq: EqualFn, a: &[u8], b: &[u8]) -> bool {
    let size = t.size();
    match eq {
        EqualFn::Memory => a[..size] == b[..size],
        EqualFn::Float32 => f32_at(a, 0) == f32_at(b, 0),
        EqualFn::Float64 => f64_at(a, 0) == f64_at(b, 0),
        EqualFn::Complex64 => f32_at(a, 0) == f32_at(b, 0) && f32_at(a, 4) == f32_at(b, 4),
        EqualFn::Complex128 => f64_at(a, 0) == f64_at(b, 0) && f64_at(a, 8) == f64_at(b, 8),
        EqualFn::String => hooks.strings_equal(&a[..size], &b[..size]),
        EqualFn::Interface => hooks.interfaces_equal(&a[..size], &b[..size]),
        EqualFn::Array => ensure_sufficient_stack(|| {
            let elem = t.elem();
            let Some(eeq) = elem.equal else {
                return false;
            };
            let es = elem.size();
            (0..t.len()).all(|i| eval(hooks, &elem, eeq, &a[i * es..], &b[i * es..]))
        }),
        EqualFn::Struct => ensure_sufficient_stack(|| {
            t.fields().iter().all(|f| match f.typ.equal {
                Some(feq) => eval(hooks, &f.typ, feq, &a[f.offset..], &b[f.offset..]),
                None => false,
            })
        }),
    }
}

/// Hash a value of type `t` with `seed`. `None` if `t` is not comparable or
/// a contained interface refuses to hash.
pub(crate) fn hash_value(
    hooks: &dyn RuntimeHooks,
    t: &TypeDesc,
    v: &[u8],
    seed: u64,
) -> Option<u64> {
    let eq = t.equal?;
    check_len(t, v);
    hash_eval(hooks, t, eq, v, seed)
}

fn hash_eval(
    hooks: &dyn RuntimeHooks,
    t: &TypeDesc,
    eq: EqualFn,
    v: &[u8],
    seed: u64,
) -> Option<u64> {
    let size = t.size();
    match eq {
        EqualFn::Memory => Some(hash_bytes(&v[..size], seed)),
        EqualFn::Float32 => Some(hash_f32(f32_at(v, 0), seed)),
        EqualFn::Float64 => Some(hash_f64(f64_at(v, 0), seed)),
        EqualFn::Complex64 => Some(hash_f32(f32_at(v, 4), hash_f32(f32_at(v, 0), seed))),
        EqualFn::Complex128 => Some(hash_f64(f64_at(v, 8), hash_f64(f64_at(v, 0), seed))),
        EqualFn::String => Some(hooks.hash_string(&v[..size], seed)),
        EqualFn::Interface => hooks.hash_interface(&v[..size], seed),
        EqualFn::Array => ensure_sufficient_stack(|| {
            let elem = t.elem();
            let eeq = elem.equal?;
            let es = elem.size();
            (0..t.len()).try_fold(seed, |h, i| hash_eval(hooks, &elem, eeq, &v[i * es..], h))
        }),
        EqualFn::Struct => ensure_sufficient_stack(|| {
            t.fields().iter().try_fold(seed, |h, f| {
                hash_eval(hooks, &f.typ, f.typ.equal?, &v[f.offset..], h)
            })
        }),
    }
}

// +0 and -0 compare equal, so they must hash alike.
fn hash_f32(f: f32, seed: u64) -> u64 {
    let bits = if f == 0.0 { 0 } else { f.to_bits() };
    hash_bytes(&bits.to_ne_bytes(), seed)
}

fn hash_f64(f: f64, seed: u64) -> u64 {
    let bits = if f == 0.0 { 0 } else { f.to_bits() };
    hash_bytes(&bits.to_ne_bytes(), seed)
}

fn f32_at(b: &[u8], off: usize) -> f32 {
    let mut w = [0u8; 4];
    w.copy_from_slice(&b[off..off + 4]);
    f32::from_ne_bytes(w)
}

fn f64_at(b: &[u8], off: usize) -> f64 {
    let mut w = [0u8; 8];
    w.copy_from_slice(&b[off..off + 8]);
    f64::from_ne_bytes(w)
}
