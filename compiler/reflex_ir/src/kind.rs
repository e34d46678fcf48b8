//! Type kind discriminant.
//!
//! Every descriptor carries a `Kind` that identifies which extension record
//! (if any) hangs off it. Kinds are numbered so that the scalar families are
//! contiguous, which keeps the range checks below branch-free.
//!
//! # Kind Ranges
//!
//! - 1-16: Scalars (bool, integers, floats, complex)
//! - 17-25: Composite constructors (plus `String` at 24)
//! - 26: `unsafe.Pointer`

use std::fmt;

/// Coarse category of a type descriptor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Kind {
    /// Placeholder for "no type".
    Invalid = 0,

    // === Scalars (1-16) ===
    Bool = 1,
    Int = 2,
    Int8 = 3,
    Int16 = 4,
    Int32 = 5,
    Int64 = 6,
    Uint = 7,
    Uint8 = 8,
    Uint16 = 9,
    Uint32 = 10,
    Uint64 = 11,
    Uintptr = 12,
    Float32 = 13,
    Float64 = 14,
    Complex64 = 15,
    Complex128 = 16,

    // === Composites (17-25) ===
    /// `[N]T`
    Array = 17,
    /// `chan T`, `chan<- T`, `<-chan T`
    Chan = 18,
    /// `func(A) R`
    Func = 19,
    /// `interface { ... }`
    Interface = 20,
    /// `map[K]V`
    Map = 21,
    /// `*T`
    Pointer = 22,
    /// `[]T`
    Slice = 23,
    /// `string`
    String = 24,
    /// `struct { ... }`
    Struct = 25,

    /// `unsafe.Pointer`
    UnsafePointer = 26,
}

impl Kind {
    /// All scalar kinds plus `String` and `UnsafePointer`, in numeric order.
    ///
    /// These are the kinds that have exactly one predefined descriptor.
    pub const BASIC: [Kind; 18] = [
        Kind::Bool,
        Kind::Int,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint,
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Uintptr,
        Kind::Float32,
        Kind::Float64,
        Kind::Complex64,
        Kind::Complex128,
        Kind::String,
        Kind::UnsafePointer,
    ];

    /// Check if this kind is a boolean, integer, float or complex kind.
    #[inline]
    pub const fn is_scalar(self) -> bool {
        let v = self as u8;
        v >= Kind::Bool as u8 && v <= Kind::Complex128 as u8
    }

    /// Check if this kind has a single predefined descriptor.
    #[inline]
    pub const fn is_basic(self) -> bool {
        self.is_scalar() || matches!(self, Kind::String | Kind::UnsafePointer)
    }

    /// Check if this kind is one of the composite constructors.
    #[inline]
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            Kind::Array
                | Kind::Chan
                | Kind::Func
                | Kind::Interface
                | Kind::Map
                | Kind::Pointer
                | Kind::Slice
                | Kind::Struct
        )
    }

    /// Signed integer kinds.
    #[inline]
    pub const fn is_signed_int(self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64
        )
    }

    /// Unsigned integer kinds, including `Uintptr`.
    #[inline]
    pub const fn is_unsigned_int(self) -> bool {
        matches!(
            self,
            Kind::Uint | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 | Kind::Uintptr
        )
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Kind::Float32 | Kind::Float64)
    }

    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, Kind::Complex64 | Kind::Complex128)
    }

    /// Check if a value of this kind is a single pointer-shaped word.
    ///
    /// Such values are stored directly in an interface data word.
    #[inline]
    pub const fn is_pointer_shaped(self) -> bool {
        matches!(
            self,
            Kind::Chan | Kind::Func | Kind::Map | Kind::Pointer | Kind::UnsafePointer
        )
    }

    /// Get the display name of this kind.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Array => "array",
            Self::Chan => "chan",
            Self::Func => "func",
            Self::Interface => "interface",
            Self::Map => "map",
            Self::Pointer => "ptr",
            Self::Slice => "slice",
            Self::String => "string",
            Self::Struct => "struct",
            Self::UnsafePointer => "unsafe.Pointer",
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind::{}", self.name())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel direction.
///
/// The two single-direction values are bits; `Both` is their union.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ChanDir {
    /// `<-chan T`
    Recv = 1,
    /// `chan<- T`
    Send = 2,
    /// `chan T`
    Both = 3,
}

impl ChanDir {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Prefix written before the element type in a channel's string form.
    #[inline]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Recv => "<-chan ",
            Self::Send => "chan<- ",
            Self::Both => "chan ",
        }
    }
}

impl fmt::Display for ChanDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Recv => "<-chan",
            Self::Send => "chan<-",
            Self::Both => "chan",
        })
    }
}

// Compile-time size assertions: both discriminants must stay one byte
const _: () = assert!(std::mem::size_of::<Kind>() == 1);
const _: () = assert!(std::mem::size_of::<ChanDir>() == 1);

#[cfg(test)]
mod tests;
