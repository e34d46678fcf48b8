//! Runtime type-descriptor registry.
//!
//! Every type is represented by one canonical, immutable [`TypeDesc`],
//! handed out as a [`Type`] whose equality is identity. The [`Registry`]
//! resolves composite types on demand (`pointer_to`, `slice_of`,
//! `array_of`, `map_of`, `chan_of`, `func_of`, `struct_of`), coalescing
//! with pre-existing declarations and interning new ones so concurrent
//! callers always agree on a single descriptor per type.
//!
//! # Example
//!
//! ```
//! use reflex_types::{FieldSpec, Kind, Registry};
//!
//! let reg = Registry::new();
//! let int32 = reg.basic(Kind::Int32);
//! let int64 = reg.basic(Kind::Int64);
//! let s = reg
//!     .struct_of(&[FieldSpec::new("A", int32), FieldSpec::new("B", int64)])
//!     .unwrap();
//! assert_eq!(s.to_string(), "struct { A int32; B int64 }");
//! assert_eq!(s.size(), 16);
//! assert_eq!(s.field(1).offset, 8);
//! ```

mod builder;
mod builtin;
mod cache;
mod config;
mod desc;
mod describe;
mod equal;
mod error;
mod flags;
mod gc;
mod hooks;
mod identity;
mod layout;
mod lookup;
mod method;
mod registry;
mod synth;

use std::sync::Once;

pub use builder::{IMethodDecl, MethodDecl, NamedType, RegistryBuilder};
pub use config::{ConfigError, RegistryConfig};
pub use desc::{
    FieldDesc, GcData, IMethod, MethodEntry, MethodFn, MethodImpl, Thunk, Type, TypeDesc,
};
pub use describe::Describe;
pub use error::{CallError, TypeError};
pub use flags::{MapFlags, TypeFlags};
pub use hooks::{DefaultHooks, RuntimeHooks};
pub use identity::{convertible, directly_assignable, identical_underlying, implements};
pub use layout::FrameLayout;
pub use lookup::{Field, FieldIndex};
pub use method::Method;
pub use registry::{Registry, RegistryStats};
pub use synth::structs::FieldSpec;

pub use reflex_ir::{BitVec, ChanDir, GcProgram, Kind, Name, StructTag};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=reflex_types=debug`
/// (publications, lost races) or `RUST_LOG=reflex_types=trace` (cache hits).
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
