//! `*T`.

use reflex_ir::{Kind, Name};
use tracing::{debug, trace};

use super::{fnv1, word_desc};
use crate::config::RegistryConfig;
use crate::desc::{Type, TypeDesc, TypeExt};
use crate::equal::EqualFn;
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::registry::Registry;

pub(crate) fn string_form(elem: Type) -> String {
    format!("*{elem}")
}

pub(crate) fn build(cfg: &RegistryConfig, elem: Type) -> Result<TypeDesc, TypeError> {
    Ok(word_desc(
        cfg,
        Kind::Pointer,
        Name::plain(&string_form(elem))?,
        fnv1(elem.hash, b"*"),
        Some(EqualFn::Memory),
        TypeFlags::REGULAR_MEMORY,
        TypeExt::Pointer { elem },
    ))
}

impl Registry {
    /// The pointer type `*elem`.
    ///
    /// A `*T` declared together with `T` is returned as is; otherwise the
    /// pointer is interned per element.
    pub fn pointer_to(&self, elem: Type) -> Result<Type, TypeError> {
        if let Some(p) = elem.ptr_to_this() {
            return Ok(p);
        }
        if let Some(p) = self.ptrs.get(&elem) {
            trace!(elem = %elem, "pointer cache hit");
            return Ok(p);
        }

        let s = string_form(elem);
        let known = self
            .known
            .by_string(&s)
            .iter()
            .copied()
            .find(|p| p.kind == Kind::Pointer && p.elem() == elem);
        if let Some(p) = known {
            trace!(typ = %s, "coalesced with known type");
            return Ok(self.ptrs.get_or_insert_with(elem, || p).0);
        }

        let desc = build(&self.config, elem)?;
        let (p, inserted) = self.ptrs.get_or_insert_with(elem, || Type::publish(desc));
        if inserted {
            debug!(typ = %p, "published");
        } else {
            debug!(typ = %p, "lost publish race");
        }
        Ok(p)
    }
}
