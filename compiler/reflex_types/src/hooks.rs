//! Collaborator hooks.
//!
//! The registry never interprets value memory on its own beyond fixed-size
//! scalars. Strings and interfaces are headers pointing into memory the
//! registry cannot see, so their equality and hashing, and anything that
//! follows a pointer, are delegated to a [`RuntimeHooks`] implementation
//! supplied by the embedding runtime.

use std::hash::Hasher;

use rustc_hash::FxHasher;

use crate::desc::{Type, TypeDesc};

/// Allocation and value-semantics services consumed by the registry.
///
/// Every method has a bitwise default, so an implementation only overrides
/// what its value representation needs.
pub trait RuntimeHooks: Send + Sync {
    /// Zeroed storage for one value of `t`.
    fn allocate(&self, t: &TypeDesc) -> Box<[u8]> {
        vec![0; t.size()].into_boxed_slice()
    }

    /// Compare two string headers.
    fn strings_equal(&self, a: &[u8], b: &[u8]) -> bool {
        a == b
    }

    /// Compare two interface values (type word + data word).
    fn interfaces_equal(&self, a: &[u8], b: &[u8]) -> bool {
        a == b
    }

    fn hash_string(&self, s: &[u8], seed: u64) -> u64 {
        hash_bytes(s, seed)
    }

    /// Hash an interface value. `None` means the dynamic type is not
    /// hashable.
    fn hash_interface(&self, v: &[u8], seed: u64) -> Option<u64> {
        Some(hash_bytes(v, seed))
    }

    /// Resolve an interface value to its dynamic type and value bytes.
    fn interface_target(&self, _v: &[u8]) -> Option<(Type, Vec<u8>)> {
        None
    }

    /// Read `size` bytes through a pointer word.
    fn load(&self, _ptr: &[u8], _size: usize) -> Option<Vec<u8>> {
        None
    }
}

/// Bitwise hooks: headers compare and hash as plain bytes, and nothing can
/// be dereferenced.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultHooks;

impl RuntimeHooks for DefaultHooks {}

/// Seeded `FxHasher` over raw bytes.
pub(crate) fn hash_bytes(bytes: &[u8], seed: u64) -> u64 {
    let mut h = FxHasher::default();
    h.write_u64(seed);
    h.write(bytes);
    h.finish()
}
