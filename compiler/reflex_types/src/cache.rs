//! Interning caches.
//!
//! Three stores back the registry:
//! - [`ShardedMap`]: `CacheKey -> Type` for kinds whose identity is at most
//!   two children plus a scalar, and `elem -> *elem` for pointers.
//! - [`HashBuckets`]: structural hash -> candidate list for func and struct
//!   types, whose identity does not reduce to a fixed-size key.
//! - [`KnownTypes`]: pre-existing descriptors sorted by string form.
//!
//! Loads take only a shard read lock. Inserts re-check under the write
//! lock (or the bucket insert mutex), so racing synthesizers converge on
//! one published descriptor.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use reflex_ir::Kind;
use rustc_hash::{FxHashMap, FxHasher};

use crate::desc::{Type, TypeDesc};
use crate::identity::identical_underlying;

/// Where an interning call found its descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Interned {
    /// Already in the cache.
    Cached,
    /// Inserted by a concurrent caller between our lookup and our insert.
    Raced,
    /// Coalesced with a pre-existing descriptor.
    Known,
    /// Freshly published.
    Published,
}

/// Structural key for chan, map, slice and array types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub(crate) kind: Kind,
    pub(crate) t1: Type,
    pub(crate) t2: Option<Type>,
    pub(crate) extra: usize,
}

impl CacheKey {
    pub(crate) fn new(kind: Kind, t1: Type, t2: Option<Type>, extra: usize) -> Self {
        CacheKey {
            kind,
            t1,
            t2,
            extra,
        }
    }
}

/// Number of shards per map.
const NUM_SHARDS: usize = 16;

/// Read-mostly concurrent map with per-shard locks.
pub(crate) struct ShardedMap<K, V> {
    shards: [RwLock<FxHashMap<K, V>>; NUM_SHARDS],
}

impl<K: Hash + Eq, V: Clone> ShardedMap<K, V> {
    pub(crate) fn new() -> Self {
        ShardedMap {
            shards: std::array::from_fn(|_| RwLock::new(FxHashMap::default())),
        }
    }

    #[inline]
    fn shard_for(key: &K) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "truncation is fine for hash-based shard selection"
        )]
        let hash = hasher.finish() as usize;
        hash % NUM_SHARDS
    }

    pub(crate) fn get(&self, key: &K) -> Option<V> {
        self.shards[Self::shard_for(key)].read().get(key).cloned()
    }

    /// Return the value for `key`, inserting `make()` if absent.
    ///
    /// `make` runs under the shard's write lock, after a second lookup, so
    /// it runs at most once per key. The flag is true if this call
    /// inserted.
    pub(crate) fn get_or_insert_with(&self, key: K, make: impl FnOnce() -> V) -> (V, bool) {
        let shard = &self.shards[Self::shard_for(&key)];

        // Fast path: already present
        if let Some(v) = shard.read().get(&key) {
            return (v.clone(), false);
        }

        let mut guard = shard.write();

        // Double-check after acquiring write lock
        if let Some(v) = guard.get(&key) {
            return (v.clone(), false);
        }
        let v = make();
        guard.insert(key, v.clone());
        (v, true)
    }

    /// Replace the value for `key`.
    pub(crate) fn insert(&self, key: K, value: V) {
        self.shards[Self::shard_for(&key)].write().insert(key, value);
    }

    pub(crate) fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }
}

/// Hash-keyed candidate lists for func and struct types.
///
/// Stores are serialized by `insert`; loads never take it.
pub(crate) struct HashBuckets {
    map: ShardedMap<u32, Arc<[Type]>>,
    insert: Mutex<()>,
}

impl HashBuckets {
    pub(crate) fn new() -> Self {
        HashBuckets {
            map: ShardedMap::new(),
            insert: Mutex::new(()),
        }
    }

    /// First candidate under `hash` accepted by `matches`.
    fn find(&self, hash: u32, mut matches: impl FnMut(Type) -> bool) -> Option<Type> {
        let list = self.map.get(&hash)?;
        list.iter().copied().find(|&t| matches(t))
    }

    /// Intern `candidate`: return an identical descriptor already filed
    /// under its hash, else one of `known` with the same string form, else
    /// publish `candidate` itself.
    ///
    /// The lookup is repeated under the insert lock, so racing callers
    /// converge on one descriptor.
    pub(crate) fn intern(&self, candidate: TypeDesc, known: &KnownTypes) -> (Type, Interned) {
        let hash = candidate.hash;
        let same = |t: Type| identical_underlying(&candidate, &t, true);
        if let Some(t) = self.find(hash, same) {
            return (t, Interned::Cached);
        }

        let _guard = self.insert.lock();
        if let Some(t) = self.find(hash, same) {
            return (t, Interned::Raced);
        }

        let found = known.by_string(candidate.string()).iter().copied().find(|&t| same(t));
        let (t, how) = match found {
            Some(t) => (t, Interned::Known),
            None => (Type::publish(candidate), Interned::Published),
        };
        let mut list: Vec<Type> = self.map.get(&hash).map(|l| l.to_vec()).unwrap_or_default();
        list.push(t);
        self.map.insert(hash, list.into());
        (t, how)
    }

    /// Number of distinct hashes.
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

/// Pre-existing descriptors, sorted by string form.
pub(crate) struct KnownTypes {
    sorted: Box<[Type]>,
}

impl KnownTypes {
    pub(crate) fn new(mut types: Vec<Type>) -> Self {
        types.sort_by(|a, b| a.string().cmp(b.string()));
        KnownTypes {
            sorted: types.into_boxed_slice(),
        }
    }

    /// All known descriptors whose string form is exactly `s`.
    ///
    /// Strings are not unique: distinct types can render alike.
    pub(crate) fn by_string(&self, s: &str) -> &[Type] {
        let start = self.sorted.partition_point(|t| t.string() < s);
        let len = self.sorted[start..]
            .iter()
            .take_while(|t| t.string() == s)
            .count();
        &self.sorted[start..start + len]
    }

    pub(crate) fn len(&self) -> usize {
        self.sorted.len()
    }
}
