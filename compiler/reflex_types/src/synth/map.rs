//! `map[K]V` and its bucket layout.
//!
//! A bucket holds `map_bucket_count` keys, then as many values, then an
//! overflow pointer:
//!
//! ```text
//! [tophash x B] [key x B] [value x B] [overflow *bucket]
//! ```
//!
//! Keys or values over the configured slot limit are stored by pointer.

use std::sync::OnceLock;

use reflex_ir::{BitVec, Kind, Name};

use super::{fnv1, fnv1_hash, word_desc, Composer, FNV_BASIS};
use crate::cache::CacheKey;
use crate::config::RegistryConfig;
use crate::desc::{GcData, MapExt, Type, TypeDesc, TypeExt};
use crate::error::TypeError;
use crate::flags::{MapFlags, TypeFlags};
use crate::gc::emit_mask;
use crate::registry::Registry;

pub(crate) fn string_form(key: Type, elem: Type) -> String {
    format!("map[{key}]{elem}")
}

pub(crate) fn check(key: Type) -> Result<(), TypeError> {
    if !key.comparable() {
        return Err(TypeError::InvalidMapKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn build(c: &impl Composer, key: Type, elem: Type) -> Result<TypeDesc, TypeError> {
    check(key)?;
    let cfg = c.config();

    let mut flags = MapFlags::empty();
    #[expect(clippy::cast_possible_truncation, reason = "slot limits are validated to fit a byte")]
    let key_size = if key.size > cfg.max_key_size {
        flags |= MapFlags::INDIRECT_KEY;
        cfg.ptr_size as u8
    } else {
        key.size as u8
    };
    #[expect(clippy::cast_possible_truncation, reason = "slot limits are validated to fit a byte")]
    let value_size = if elem.size > cfg.max_elem_size {
        flags |= MapFlags::INDIRECT_ELEM;
        cfg.ptr_size as u8
    } else {
        elem.size as u8
    };
    if is_reflexive(&key) {
        flags |= MapFlags::REFLEXIVE_KEY;
    }
    if need_key_update(&key) {
        flags |= MapFlags::NEED_KEY_UPDATE;
    }
    if hash_might_panic(&key) {
        flags |= MapFlags::HASH_MIGHT_PANIC;
    }

    let bucket = bucket_of(c, key, elem)?;
    #[expect(clippy::cast_possible_truncation, reason = "bounded by slot limits and bucket count")]
    let bucket_size = bucket.size as u16;

    Ok(word_desc(
        cfg,
        Kind::Map,
        Name::plain(&string_form(key, elem))?,
        fnv1_hash(fnv1(elem.hash, b"m"), key.hash),
        None,
        TypeFlags::empty(),
        TypeExt::Map(Box::new(MapExt {
            key,
            elem,
            bucket,
            key_size,
            value_size,
            bucket_size,
            flags,
        })),
    ))
}

/// Layout descriptor of one bucket of `map[key]elem`.
pub(crate) fn bucket_of(c: &impl Composer, key: Type, elem: Type) -> Result<TypeDesc, TypeError> {
    let cfg: &RegistryConfig = c.config();
    let ps = cfg.ptr_size;
    let count = cfg.map_bucket_count;

    let k = if key.size > cfg.max_key_size {
        c.compose_pointer(key)?
    } else {
        key
    };
    let v = if elem.size > cfg.max_elem_size {
        c.compose_pointer(elem)?
    } else {
        elem
    };

    let size = count * (1 + k.size + v.size) + ps;
    let (gc, ptr_bytes) = if k.pointers() || v.pointers() {
        let mut mask = BitVec::new();
        let mut base = count / ps;
        emit_mask(&mut mask, base, &k, count, ps);
        base += count * k.size / ps;
        emit_mask(&mut mask, base, &v, count, ps);
        base += count * v.size / ps;
        mask.set(base);
        (GcData::Mask(mask), (base + 1) * ps)
    } else {
        (GcData::Empty, 0)
    };

    let s = format!("bucket({key},{elem})");
    #[expect(clippy::cast_possible_truncation, reason = "ptr_size is 4 or 8")]
    let align = ps as u8;
    Ok(TypeDesc {
        size,
        ptr_bytes,
        hash: fnv1(FNV_BASIS, s.as_bytes()),
        flags: TypeFlags::empty(),
        align,
        field_align: align,
        kind: Kind::Struct,
        equal: None,
        gc,
        str: Name::plain(&s)?,
        uncommon: None,
        ptr_to_this: OnceLock::new(),
        ext: TypeExt::Struct {
            pkg_path: None,
            fields: Box::new([]),
        },
    })
}

/// `k == k` for every key value of type `t`.
pub(crate) fn is_reflexive(t: &TypeDesc) -> bool {
    match t.kind {
        Kind::Float32 | Kind::Float64 | Kind::Complex64 | Kind::Complex128 | Kind::Interface => {
            false
        }
        Kind::Array => is_reflexive(&t.elem()),
        Kind::Struct => t.fields().iter().all(|f| is_reflexive(&f.typ)),
        _ => true,
    }
}

/// Overwriting an equal key must replace its bytes: `+0.0` vs `-0.0`, or
/// equal strings with different backing storage.
pub(crate) fn need_key_update(t: &TypeDesc) -> bool {
    match t.kind {
        Kind::Float32
        | Kind::Float64
        | Kind::Complex64
        | Kind::Complex128
        | Kind::Interface
        | Kind::String => true,
        Kind::Array => need_key_update(&t.elem()),
        Kind::Struct => t.fields().iter().any(|f| need_key_update(&f.typ)),
        _ => false,
    }
}

/// Hashing a key of type `t` can fail at run time (an interface holding an
/// unhashable dynamic type).
pub(crate) fn hash_might_panic(t: &TypeDesc) -> bool {
    match t.kind {
        Kind::Interface => true,
        Kind::Array => hash_might_panic(&t.elem()),
        Kind::Struct => t.fields().iter().any(|f| hash_might_panic(&f.typ)),
        _ => false,
    }
}

impl Registry {
    /// The map type `map[key]elem`.
    ///
    /// Fails if `key` is not comparable.
    pub fn map_of(&self, key: Type, elem: Type) -> Result<Type, TypeError> {
        check(key)?;
        let ck = CacheKey::new(Kind::Map, key, Some(elem), 0);
        self.intern_keyed(
            ck,
            &string_form(key, elem),
            |t| t.kind == Kind::Map && t.key() == key && t.elem() == elem,
            || build(self, key, elem),
        )
    }
}
