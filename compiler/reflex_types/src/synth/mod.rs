//! Composite-type synthesis.
//!
//! One module per constructor. Each exposes a `build` routine that turns
//! already-published children into a complete, unpublished [`TypeDesc`]
//! (layout, hash, string form, GC map), plus the `Registry` operation that
//! wraps it in the lookup protocol:
//!
//! 1. probe the interning cache;
//! 2. coalesce with a pre-existing descriptor of the same string form;
//! 3. build a fresh descriptor;
//! 4. insert-if-absent, returning whichever descriptor won.
//!
//! `build` routines are shared with `RegistryBuilder`, which runs them to
//! declare pre-existing types.

use reflex_ir::{Kind, Name};

use crate::config::RegistryConfig;
use crate::desc::{Type, TypeDesc, TypeExt};
use crate::equal::EqualFn;
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::gc::pointer_mask;

pub(crate) mod array;
pub(crate) mod chan;
pub(crate) mod func;
pub(crate) mod map;
pub(crate) mod pointer;
pub(crate) mod slice;
pub(crate) mod structs;

/// FNV-1 offset basis, used to seed string hashes.
pub(crate) const FNV_BASIS: u32 = 0x811c_9dc5;

/// Fold `bytes` into `x` with the FNV-1 step.
#[inline]
pub(crate) fn fnv1(mut x: u32, bytes: &[u8]) -> u32 {
    for &b in bytes {
        x = x.wrapping_mul(16_777_619) ^ u32::from(b);
    }
    x
}

/// Fold a child hash into `x`, most significant byte first.
#[inline]
pub(crate) fn fnv1_hash(x: u32, child: u32) -> u32 {
    fnv1(x, &child.to_be_bytes())
}

/// Round `x` up to a multiple of `align` (a power of two), or `None` if
/// the result does not fit in a `usize`.
#[inline]
pub(crate) fn align_up(x: usize, align: usize) -> Option<usize> {
    let a = align.max(1);
    Some(x.checked_add(a - 1)? & !(a - 1))
}

/// Source of the auxiliary descriptors some constructors reference: the
/// `[]E` of an array and the `*K`/`*V` of an indirect map bucket.
pub(crate) trait Composer {
    fn config(&self) -> &RegistryConfig;
    fn compose_pointer(&self, elem: Type) -> Result<Type, TypeError>;
    fn compose_slice(&self, elem: Type) -> Result<Type, TypeError>;
}

/// Descriptor of a one-word, pointer-shaped value (pointer, chan, map,
/// func).
pub(crate) fn word_desc(
    cfg: &RegistryConfig,
    kind: Kind,
    str: Name,
    hash: u32,
    equal: Option<EqualFn>,
    flags: TypeFlags,
    ext: TypeExt,
) -> TypeDesc {
    let ps = cfg.ptr_size;
    #[expect(clippy::cast_possible_truncation, reason = "ptr_size is 4 or 8")]
    let align = ps as u8;
    TypeDesc {
        size: ps,
        ptr_bytes: ps,
        hash,
        flags: flags | TypeFlags::DIRECT_IFACE,
        align,
        field_align: align,
        kind,
        equal,
        gc: pointer_mask(1),
        str,
        uncommon: None,
        ptr_to_this: std::sync::OnceLock::new(),
        ext,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
