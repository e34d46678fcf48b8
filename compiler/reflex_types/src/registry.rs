//! The registry: canonical descriptors and their interning caches.
//!
//! A `Registry` is built once by [`RegistryBuilder`] with its predefined and
//! declared types, then shared (`&Registry` is `Sync`) by every thread
//! that synthesizes or inspects types. Synthesis operations live next to
//! their constructors in `synth/`.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use reflex_ir::Kind;
use tracing::{debug, trace};

use crate::builder::RegistryBuilder;
use crate::builtin::Basics;
use crate::cache::{CacheKey, HashBuckets, Interned, KnownTypes, ShardedMap};
use crate::config::RegistryConfig;
use crate::desc::{Type, TypeDesc};
use crate::equal;
use crate::error::TypeError;
use crate::hooks::RuntimeHooks;
use crate::layout::FrameLayout;
use crate::synth::Composer;

/// Process-wide store of type descriptors.
pub struct Registry {
    pub(crate) config: RegistryConfig,
    pub(crate) hooks: Arc<dyn RuntimeHooks>,
    pub(crate) basics: Basics,
    pub(crate) known: KnownTypes,
    /// chan, map, slice and array types.
    pub(crate) lookup: ShardedMap<CacheKey, Type>,
    /// `elem -> *elem` for pointers not declared with their element.
    pub(crate) ptrs: ShardedMap<Type, Type>,
    pub(crate) funcs: HashBuckets,
    pub(crate) structs: HashBuckets,
    /// Frame layouts keyed by (function, receiver).
    pub(crate) layouts: DashMap<(Type, Option<Type>), Arc<FrameLayout>>,
}

/// Cache occupancy, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub known: usize,
    pub keyed: usize,
    pub pointers: usize,
    pub func_hashes: usize,
    pub struct_hashes: usize,
    pub layouts: usize,
}

impl Registry {
    /// Registry with the predefined types, the default configuration and
    /// bitwise hooks.
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn from_parts(
        config: RegistryConfig,
        hooks: Arc<dyn RuntimeHooks>,
        basics: Basics,
        known: Vec<Type>,
    ) -> Self {
        let known = KnownTypes::new(known);
        debug!(known = known.len(), ptr_size = config.ptr_size, "registry ready");
        Registry {
            config,
            hooks,
            basics,
            known,
            lookup: ShardedMap::new(),
            ptrs: ShardedMap::new(),
            funcs: HashBuckets::new(),
            structs: HashBuckets::new(),
            layouts: DashMap::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    #[inline]
    pub fn hooks(&self) -> &dyn RuntimeHooks {
        &*self.hooks
    }

    /// The predefined descriptor of a basic kind (`int`, `string`,
    /// `unsafe.Pointer`, ...).
    #[track_caller]
    pub fn basic(&self, kind: Kind) -> Type {
        match self.basics.get(kind) {
            Some(t) => t,
            None => panic!("reflex: no predefined type of kind {kind}"),
        }
    }

    /// `interface {}`.
    #[inline]
    pub fn empty_interface(&self) -> Type {
        self.basics.empty_interface()
    }

    /// `a == b` for two values of type `t`, or `None` if `t` is not
    /// comparable.
    pub fn values_equal(&self, t: Type, a: &[u8], b: &[u8]) -> Option<bool> {
        equal::values_equal(&*self.hooks, &t, a, b)
    }

    /// Hash of a value of type `t`.
    pub fn hash_value(&self, t: Type, v: &[u8], seed: u64) -> Option<u64> {
        equal::hash_value(&*self.hooks, &t, v, seed)
    }

    /// Hash of a key of map type `map`.
    pub fn hash_key(&self, map: Type, key: &[u8], seed: u64) -> Option<u64> {
        self.hash_value(map.key(), key, seed)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            known: self.known.len(),
            keyed: self.lookup.len(),
            pointers: self.ptrs.len(),
            func_hashes: self.funcs.len(),
            struct_hashes: self.structs.len(),
            layouts: self.layouts.len(),
        }
    }

    /// Intern a type identified by `key` through the lookup cache.
    ///
    /// `same` picks a known descriptor with string form `s` that describes
    /// the requested type; `build` runs only if there is none.
    pub(crate) fn intern_keyed(
        &self,
        key: CacheKey,
        s: &str,
        same: impl Fn(Type) -> bool,
        build: impl FnOnce() -> Result<TypeDesc, TypeError>,
    ) -> Result<Type, TypeError> {
        if let Some(t) = self.lookup.get(&key) {
            trace!(typ = %t, "cache hit");
            return Ok(t);
        }

        if let Some(t) = self.known.by_string(s).iter().copied().find(|&t| same(t)) {
            trace!(typ = %t, "coalesced with known type");
            return Ok(self.lookup.get_or_insert_with(key, || t).0);
        }

        let desc = build()?;
        let (t, inserted) = self.lookup.get_or_insert_with(key, || Type::publish(desc));
        if inserted {
            debug!(typ = %t, "published");
        } else {
            debug!(typ = %t, "lost publish race");
        }
        Ok(t)
    }

    /// Intern a func or struct descriptor through its hash buckets.
    pub(crate) fn intern_hashed(&self, buckets: &HashBuckets, desc: TypeDesc) -> Type {
        let (t, how) = buckets.intern(desc, &self.known);
        match how {
            Interned::Cached => trace!(typ = %t, "cache hit"),
            Interned::Known => trace!(typ = %t, "coalesced with known type"),
            Interned::Raced => debug!(typ = %t, "lost publish race"),
            Interned::Published => debug!(typ = %t, "published"),
        }
        t
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl Composer for Registry {
    fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn compose_pointer(&self, elem: Type) -> Result<Type, TypeError> {
        self.pointer_to(elem)
    }

    fn compose_slice(&self, elem: Type) -> Result<Type, TypeError> {
        self.slice_of(elem)
    }
}
