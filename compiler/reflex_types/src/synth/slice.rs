//! `[]T`.

use std::sync::OnceLock;

use reflex_ir::{Kind, Name};

use super::fnv1;
use crate::cache::CacheKey;
use crate::config::RegistryConfig;
use crate::desc::{Type, TypeDesc, TypeExt};
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::gc::pointer_mask;
use crate::registry::Registry;

pub(crate) fn string_form(elem: Type) -> String {
    format!("[]{elem}")
}

/// A slice header is (data pointer, len, cap); only the first word is a
/// pointer.
pub(crate) fn build(cfg: &RegistryConfig, elem: Type) -> Result<TypeDesc, TypeError> {
    let ps = cfg.ptr_size;
    #[expect(clippy::cast_possible_truncation, reason = "ptr_size is 4 or 8")]
    let align = ps as u8;
    Ok(TypeDesc {
        size: 3 * ps,
        ptr_bytes: ps,
        hash: fnv1(elem.hash, b"["),
        flags: TypeFlags::REGULAR_MEMORY,
        align,
        field_align: align,
        kind: Kind::Slice,
        equal: None,
        gc: pointer_mask(1),
        str: Name::plain(&string_form(elem))?,
        uncommon: None,
        ptr_to_this: OnceLock::new(),
        ext: TypeExt::Slice { elem },
    })
}

impl Registry {
    /// The slice type `[]elem`.
    pub fn slice_of(&self, elem: Type) -> Result<Type, TypeError> {
        let key = CacheKey::new(Kind::Slice, elem, None, 0);
        self.intern_keyed(
            key,
            &string_form(elem),
            |t| t.kind == Kind::Slice && t.elem() == elem,
            || build(&self.config, elem),
        )
    }
}
