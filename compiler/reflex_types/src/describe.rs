//! Descriptors for host Rust types.
//!
//! [`Describe`] maps a Rust type onto the registry's type model, so host
//! code can ask for `registry.type_of::<Vec<u32>>()` instead of composing
//! `slice_of(basic(Uint32))` by hand. Only the shape is mapped; Rust's own
//! memory layout of `Vec` or `HashMap` is not modelled.

use std::collections::HashMap;

use reflex_ir::Kind;

use crate::desc::Type;
use crate::error::TypeError;
use crate::registry::Registry;

/// A Rust type with a counterpart in the registry.
pub trait Describe {
    fn describe_in(reg: &Registry) -> Result<Type, TypeError>;
}

macro_rules! describe_basic {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe_in(reg: &Registry) -> Result<Type, TypeError> {
                    Ok(reg.basic(Kind::$kind))
                }
            }
        )*
    };
}

describe_basic! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    isize => Int,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    usize => Uint,
    f32 => Float32,
    f64 => Float64,
    String => String,
    str => String,
    *const () => UnsafePointer,
}

impl<T: Describe> Describe for Vec<T> {
    fn describe_in(reg: &Registry) -> Result<Type, TypeError> {
        reg.slice_of(T::describe_in(reg)?)
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe_in(reg: &Registry) -> Result<Type, TypeError> {
        reg.array_of(N, T::describe_in(reg)?)
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe_in(reg: &Registry) -> Result<Type, TypeError> {
        reg.pointer_to(T::describe_in(reg)?)
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe_in(reg: &Registry) -> Result<Type, TypeError> {
        reg.map_of(K::describe_in(reg)?, V::describe_in(reg)?)
    }
}

impl Describe for () {
    fn describe_in(reg: &Registry) -> Result<Type, TypeError> {
        reg.struct_of(&[])
    }
}

impl Registry {
    /// The descriptor of Rust type `T`.
    pub fn type_of<T: Describe + ?Sized>(&self) -> Result<Type, TypeError> {
        T::describe_in(self)
    }

    /// The descriptor of the type of `_value`.
    pub fn describe<T: Describe + ?Sized>(&self, _value: &T) -> Result<Type, TypeError> {
        T::describe_in(self)
    }
}
