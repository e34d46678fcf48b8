//! Leaf vocabulary for the reflex type registry.
//!
//! Everything here is independent of the descriptor graph:
//! - [`Kind`] and [`ChanDir`]: the coarse type discriminants
//! - [`Name`]: the compact identifier + tag + package-path blob
//! - [`StructTag`]: `key:"value"` tag parsing
//! - [`quote`]/[`unquote`]: Go string-literal quoting used by string forms
//! - [`BitVec`], [`GcProgram`]: pointer bitmaps and run-length GC programs
//! - [`ensure_sufficient_stack`]: stack growth for deep type recursion

mod gcbits;
mod kind;
mod name;
mod quote;
mod stack;
mod struct_tag;

pub use gcbits::{append_varint, BitVec, GcProgram, ProgramError, ProgramWriter};
pub use kind::{ChanDir, Kind};
pub use name::{Name, NameError, NameParts, MAX_NAME_LEN};
pub use quote::{quote, unquote, UnquoteError};
pub use stack::ensure_sufficient_stack;
pub use struct_tag::StructTag;
