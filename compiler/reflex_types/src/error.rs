//! Registry errors.
//!
//! Synthesis requests that describe an impossible or unsupported type fail
//! with [`TypeError`] and install nothing. Misusing an existing descriptor
//! (asking a slice for its key, indexing past the last field) panics
//! instead.

use reflex_ir::NameError;

/// A type construction request that cannot be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("array of {len} x {elem} would exceed the address space")]
    ArrayTooLarge { len: usize, elem: String },

    #[error("channel element type {elem} is too large ({size} bytes, limit {limit})")]
    ChanElemTooLarge {
        elem: String,
        size: usize,
        limit: usize,
    },

    #[error("invalid map key type {key}: not comparable")]
    InvalidMapKey { key: String },

    #[error("last input of a variadic function must be a slice")]
    VariadicWithoutSlice,

    #[error("function has {count} inputs and outputs, limit is {limit}")]
    TooManyArgs { count: usize, limit: usize },

    #[error("field {index} has no name")]
    FieldNoName { index: usize },

    #[error("field {index} has invalid name {name:?}")]
    FieldInvalidName { index: usize, name: String },

    #[error("field {index} has no type")]
    FieldNoType { index: usize },

    #[error("duplicate field {name}")]
    DuplicateField { name: String },

    #[error("field {name:?} is unexported but has no package path")]
    UnexportedWithoutPkgPath { name: String },

    #[error("field {name:?} is embedded but has a package path")]
    EmbeddedWithPkgPath { name: String },

    #[error("fields with different package paths {first} and {second}")]
    MixedPkgPaths { first: String, second: String },

    #[error("illegal embedded field type {typ}")]
    IllegalEmbed { typ: String },

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("struct would exceed the address space at field {field}")]
    StructTooLarge { field: String },

    #[error("call frame of {func} would exceed the address space")]
    FrameTooLarge { func: String },

    #[error("frame layout with interface receiver {typ}")]
    InterfaceReceiver { typ: String },

    #[error("type {name} is already declared")]
    DuplicateType { name: String },

    #[error("method {name} is declared twice on {typ}")]
    DuplicateMethod { name: String, typ: String },

    #[error("method {name} has non-function type {typ}")]
    MethodNotFunc { name: String, typ: String },

    #[error(transparent)]
    Name(#[from] NameError),
}

/// Failure to run a method through its forwarding chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("receiver of {typ} is {have} bytes, need {need}")]
    ShortReceiver {
        typ: String,
        have: usize,
        need: usize,
    },

    #[error("promoted call through nil interface field of {typ}")]
    NilInterface { typ: String },

    #[error("value method of {typ} called through an unresolved pointer")]
    NilPointer { typ: String },

    #[error("dynamic type {typ} has no method {name}")]
    MissingMethod { typ: String, name: String },
}
