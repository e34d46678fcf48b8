//! Type identity, assignability, convertibility and interface
//! satisfaction.
//!
//! These work on descriptors only. Two published types are identical iff
//! they are the same descriptor; the structural comparisons here decide
//! whether a freshly built candidate matches an existing one, and answer
//! the language's assignability questions.

use reflex_ir::{ensure_sufficient_stack, ChanDir, Kind, Name};

use crate::desc::{Type, TypeDesc, TypeExt};

/// `t` and `v` have identical underlying types.
///
/// With `cmp_tags`, struct field tags must match too. Children compare by
/// descriptor identity when `cmp_tags` is set, otherwise by name, kind and
/// (recursively) underlying type.
pub fn identical_underlying(t: &TypeDesc, v: &TypeDesc, cmp_tags: bool) -> bool {
    if std::ptr::eq(t, v) {
        return true;
    }
    if t.kind != v.kind {
        return false;
    }
    if t.kind.is_basic() {
        return true;
    }

    ensure_sufficient_stack(|| match (&t.ext, &v.ext) {
        (
            TypeExt::Array { elem: te, len: tl, .. },
            TypeExt::Array { elem: ve, len: vl, .. },
        ) => tl == vl && identical(*te, *ve, cmp_tags),
        (TypeExt::Chan { elem: te, dir: td }, TypeExt::Chan { elem: ve, dir: vd }) => {
            td == vd && identical(*te, *ve, cmp_tags)
        }
        (
            TypeExt::Func {
                ins: ti,
                outs: to,
                variadic: tv,
            },
            TypeExt::Func {
                ins: vi,
                outs: vo,
                variadic: vv,
            },
        ) => {
            tv == vv
                && ti.len() == vi.len()
                && to.len() == vo.len()
                && ti.iter().zip(vi.iter()).all(|(a, b)| identical(*a, *b, cmp_tags))
                && to.iter().zip(vo.iter()).all(|(a, b)| identical(*a, *b, cmp_tags))
        }
        // Only the empty interface is identical to a distinct descriptor.
        (TypeExt::Interface { methods: tm, .. }, TypeExt::Interface { methods: vm, .. }) => {
            tm.is_empty() && vm.is_empty()
        }
        (TypeExt::Map(tm), TypeExt::Map(vm)) => {
            identical(tm.key, vm.key, cmp_tags) && identical(tm.elem, vm.elem, cmp_tags)
        }
        (TypeExt::Pointer { elem: te }, TypeExt::Pointer { elem: ve })
        | (TypeExt::Slice { elem: te }, TypeExt::Slice { elem: ve }) => {
            identical(*te, *ve, cmp_tags)
        }
        (
            TypeExt::Struct {
                pkg_path: tp,
                fields: tf,
            },
            TypeExt::Struct {
                pkg_path: vp,
                fields: vf,
            },
        ) => {
            tf.len() == vf.len()
                && tp == vp
                && tf.iter().zip(vf.iter()).all(|(a, b)| {
                    a.name() == b.name()
                        && identical(a.typ, b.typ, cmp_tags)
                        && (!cmp_tags || a.tag() == b.tag())
                        && a.offset == b.offset
                        && a.embedded == b.embedded
                })
        }
        _ => false,
    })
}

fn identical(t: Type, v: Type, cmp_tags: bool) -> bool {
    if cmp_tags {
        return t == v;
    }
    if t.name() != v.name() || t.kind != v.kind {
        return false;
    }
    identical_underlying(&t, &v, false)
}

/// A value of `v` is assignable to `t` without an interface conversion.
pub fn directly_assignable(t: &TypeDesc, v: &TypeDesc) -> bool {
    if std::ptr::eq(t, v) {
        return true;
    }
    // At least one must be unnamed and they must share a kind.
    if (t.is_named() && v.is_named()) || t.kind != v.kind {
        return false;
    }
    if t.kind == Kind::Chan && special_channel_assignability(t, v) {
        return true;
    }
    identical_underlying(t, v, true)
}

/// A bidirectional `chan E` is assignable to any channel type with an
/// identical element when at least one side is unnamed.
fn special_channel_assignability(t: &TypeDesc, v: &TypeDesc) -> bool {
    v.chan_dir() == ChanDir::Both
        && (t.name().is_empty() || v.name().is_empty())
        && identical(t.elem(), v.elem(), true)
}

/// Package path governing an unexported method name.
fn method_pkg<'a>(name: &'a Name, fallback: &'a str) -> &'a str {
    name.pkg_path().unwrap_or(fallback)
}

/// `v` has every method of interface `t`.
///
/// Both method lists share one order, so this is a single merge pass.
///
/// # Panics
///
/// If `t` is not an interface type.
pub fn implements(t: &TypeDesc, v: &TypeDesc) -> bool {
    let TypeExt::Interface {
        pkg_path: tpkg,
        methods: tm,
    } = &t.ext
    else {
        panic!("reflex: non-interface type {} passed to Implements", t.string());
    };
    if tm.is_empty() {
        return true;
    }
    let tpkg = tpkg.as_deref().unwrap_or("");

    if let TypeExt::Interface {
        pkg_path: vpkg,
        methods: vm,
    } = &v.ext
    {
        let vpkg = vpkg.as_deref().unwrap_or("");
        let mut i = 0;
        for vmeth in vm.iter() {
            let tmeth = &tm[i];
            if vmeth.name.text() != tmeth.name.text() || vmeth.typ != tmeth.typ {
                continue;
            }
            if !tmeth.is_exported() && method_pkg(&tmeth.name, tpkg) != method_pkg(&vmeth.name, vpkg) {
                continue;
            }
            i += 1;
            if i == tm.len() {
                return true;
            }
        }
        return false;
    }

    let Some(u) = v.uncommon() else {
        return false;
    };
    let mut i = 0;
    for vmeth in &u.methods {
        let tmeth = &tm[i];
        if vmeth.name.text() != tmeth.name.text() || vmeth.mtyp != tmeth.typ {
            continue;
        }
        if !tmeth.is_exported() && method_pkg(&tmeth.name, tpkg) != method_pkg(&vmeth.name, &u.pkg_path) {
            continue;
        }
        i += 1;
        if i == tm.len() {
            return true;
        }
    }
    false
}

/// `[]byte` or `[]rune` with an unnamed-package element.
fn is_bytes_or_runes(t: &TypeDesc) -> bool {
    t.kind == Kind::Slice && {
        let e = t.elem();
        e.pkg_path().is_empty() && matches!(e.kind, Kind::Uint8 | Kind::Int32)
    }
}

fn is_numeric(k: Kind) -> bool {
    k.is_signed_int() || k.is_unsigned_int() || k.is_float()
}

/// A value of `src` can be converted to `dst`.
pub fn convertible(dst: &TypeDesc, src: &TypeDesc) -> bool {
    let (dk, sk) = (dst.kind, src.kind);
    if (sk.is_signed_int() || sk.is_unsigned_int()) && (is_numeric(dk) || dk == Kind::String) {
        return true;
    }
    if sk.is_float() && is_numeric(dk) {
        return true;
    }
    if sk.is_complex() && dk.is_complex() {
        return true;
    }
    if sk == Kind::String && is_bytes_or_runes(dst) {
        return true;
    }
    if dk == Kind::String && is_bytes_or_runes(src) {
        return true;
    }
    if dk == Kind::Chan && sk == Kind::Chan && special_channel_assignability(dst, src) {
        return true;
    }
    if identical_underlying(dst, src, false) {
        return true;
    }
    if dk == Kind::Pointer
        && sk == Kind::Pointer
        && dst.name().is_empty()
        && src.name().is_empty()
        && identical_underlying(&dst.elem(), &src.elem(), false)
    {
        return true;
    }
    dk == Kind::Interface && implements(dst, src)
}

impl TypeDesc {
    /// This type satisfies interface `iface`.
    ///
    /// # Panics
    ///
    /// If `iface` is not an interface type.
    pub fn implements(&self, iface: &TypeDesc) -> bool {
        implements(iface, self)
    }

    /// A value of this type can be assigned to a variable of type `t`.
    pub fn assignable_to(&self, t: &TypeDesc) -> bool {
        directly_assignable(t, self) || (t.kind == Kind::Interface && implements(t, self))
    }

    /// A value of this type can be converted to `t`.
    pub fn convertible_to(&self, t: &TypeDesc) -> bool {
        convertible(t, self)
    }
}
