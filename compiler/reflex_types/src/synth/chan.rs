//! `chan T`, `<-chan T`, `chan<- T`.

use reflex_ir::{ChanDir, Kind, Name};

use super::{fnv1, word_desc};
use crate::cache::CacheKey;
use crate::config::RegistryConfig;
use crate::desc::{Type, TypeDesc, TypeExt};
use crate::equal::EqualFn;
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::registry::Registry;

pub(crate) fn string_form(dir: ChanDir, elem: Type) -> String {
    format!("{}{elem}", dir.prefix())
}

pub(crate) fn check(cfg: &RegistryConfig, elem: Type) -> Result<(), TypeError> {
    if elem.size >= cfg.max_chan_elem_size {
        return Err(TypeError::ChanElemTooLarge {
            elem: elem.to_string(),
            size: elem.size,
            limit: cfg.max_chan_elem_size,
        });
    }
    Ok(())
}

pub(crate) fn build(cfg: &RegistryConfig, dir: ChanDir, elem: Type) -> Result<TypeDesc, TypeError> {
    check(cfg, elem)?;
    Ok(word_desc(
        cfg,
        Kind::Chan,
        Name::plain(&string_form(dir, elem))?,
        fnv1(elem.hash, &[b'c', dir.bits()]),
        Some(EqualFn::Memory),
        TypeFlags::REGULAR_MEMORY,
        TypeExt::Chan { elem, dir },
    ))
}

impl Registry {
    /// The channel type with direction `dir` and element `elem`.
    ///
    /// Fails if `elem` is too large to be a channel element.
    pub fn chan_of(&self, dir: ChanDir, elem: Type) -> Result<Type, TypeError> {
        check(&self.config, elem)?;
        let key = CacheKey::new(Kind::Chan, elem, None, usize::from(dir.bits()));
        self.intern_keyed(
            key,
            &string_form(dir, elem),
            |t| t.kind == Kind::Chan && t.chan_dir() == dir && t.elem() == elem,
            || build(&self.config, dir, elem),
        )
    }
}
