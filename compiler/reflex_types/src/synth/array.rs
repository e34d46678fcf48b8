//! `[N]T`.

use std::sync::OnceLock;

use reflex_ir::{Kind, Name};

use super::{fnv1, Composer};
use crate::cache::CacheKey;
use crate::desc::{Type, TypeDesc, TypeExt};
use crate::equal::EqualFn;
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::gc::array_gc;
use crate::registry::Registry;

pub(crate) fn string_form(len: usize, elem: Type) -> String {
    format!("[{len}]{elem}")
}

pub(crate) fn check(len: usize, elem: Type) -> Result<(), TypeError> {
    if elem.size > 0 && len > usize::MAX / elem.size {
        return Err(TypeError::ArrayTooLarge {
            len,
            elem: elem.to_string(),
        });
    }
    Ok(())
}

/// Structural hash of `[len]elem`: the element hash, `[`, the low 32 bits
/// of the length one byte at a time, `]`.
fn array_hash(len: usize, elem: Type) -> u32 {
    let mut h = fnv1(elem.hash, b"[");
    #[expect(clippy::cast_possible_truncation, reason = "only the low 32 bits are hashed")]
    let mut n = len as u32;
    while n > 0 {
        h = fnv1(h, &[n.to_le_bytes()[0]]);
        n >>= 8;
    }
    fnv1(h, b"]")
}

pub(crate) fn build(c: &impl Composer, len: usize, elem: Type) -> Result<TypeDesc, TypeError> {
    check(len, elem)?;
    let cfg = c.config();
    let size = elem.size * len;
    let (gc, ptr_bytes) = array_gc(&elem, len, size, cfg);

    let mut flags = elem.flags & TypeFlags::REGULAR_MEMORY;
    if len == 1 && !elem.iface_indir() {
        flags |= TypeFlags::DIRECT_IFACE;
    }
    let equal = elem.equal.map(|_| {
        if elem.flags.is_regular_memory() {
            EqualFn::Memory
        } else {
            EqualFn::Array
        }
    });

    Ok(TypeDesc {
        size,
        ptr_bytes,
        hash: array_hash(len, elem),
        flags,
        align: elem.align,
        field_align: elem.field_align,
        kind: Kind::Array,
        equal,
        gc,
        str: Name::plain(&string_form(len, elem))?,
        uncommon: None,
        ptr_to_this: OnceLock::new(),
        ext: TypeExt::Array {
            elem,
            slice: c.compose_slice(elem)?,
            len,
        },
    })
}

impl Registry {
    /// The array type `[len]elem`.
    ///
    /// Fails if the array would not fit in the address space.
    pub fn array_of(&self, len: usize, elem: Type) -> Result<Type, TypeError> {
        let key = CacheKey::new(Kind::Array, elem, None, len);
        self.intern_keyed(
            key,
            &string_form(len, elem),
            |t| t.kind == Kind::Array && t.len() == len && t.elem() == elem,
            || build(self, len, elem),
        )
    }
}
