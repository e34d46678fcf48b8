//! Stack growth for deep type recursion.
//!
//! Descriptor graphs can nest arbitrarily (`[][][]...T`, structs of arrays of
//! structs), and the comparator, GC bit emitter and field search all recurse
//! over them. Recursive entry points wrap themselves in
//! [`ensure_sufficient_stack`].
//!
//! - Native targets grow the stack with `stacker`.
//! - WASM targets call straight through.

/// If less than this remains, grow the stack.
const RED_ZONE: usize = 100 * 1024;

/// Size of each stack extension.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if fewer than 100KB remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
