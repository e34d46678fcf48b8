//! Predefined descriptors: the basic kinds and `interface {}`.

use std::sync::OnceLock;

use reflex_ir::{Kind, Name};

use crate::config::RegistryConfig;
use crate::desc::{GcData, Type, TypeDesc, TypeExt, Uncommon};
use crate::equal::EqualFn;
use crate::flags::TypeFlags;
use crate::gc::pointer_mask;
use crate::synth::{fnv1, FNV_BASIS};

/// Number of `Kind` discriminants.
const NUM_KINDS: usize = Kind::UnsafePointer as usize + 1;

/// The predefined types of one registry.
#[derive(Clone, Debug)]
pub(crate) struct Basics {
    by_kind: [Option<Type>; NUM_KINDS],
    empty_iface: Type,
}

impl Basics {
    pub(crate) fn new(cfg: &RegistryConfig) -> Self {
        let mut by_kind = [None; NUM_KINDS];
        for kind in Kind::BASIC {
            by_kind[kind as usize] = Some(Type::publish(basic_desc(cfg, kind)));
        }
        Basics {
            by_kind,
            empty_iface: Type::publish(empty_interface_desc(cfg)),
        }
    }

    #[inline]
    pub(crate) fn get(&self, kind: Kind) -> Option<Type> {
        self.by_kind[kind as usize]
    }

    #[inline]
    pub(crate) fn empty_interface(&self) -> Type {
        self.empty_iface
    }

    pub(crate) fn all(&self) -> impl Iterator<Item = Type> + '_ {
        self.by_kind
            .iter()
            .flatten()
            .copied()
            .chain(std::iter::once(self.empty_iface))
    }
}

/// Predeclared string forms are short literals.
fn universe_name(s: &'static str) -> Name {
    Name::plain(s).unwrap_or_else(|e| unreachable!("predeclared name {s}: {e}"))
}

/// Size of a value of basic kind `kind`.
fn basic_size(cfg: &RegistryConfig, kind: Kind) -> usize {
    match kind {
        Kind::Bool | Kind::Int8 | Kind::Uint8 => 1,
        Kind::Int16 | Kind::Uint16 => 2,
        Kind::Int32 | Kind::Uint32 | Kind::Float32 => 4,
        Kind::Int64 | Kind::Uint64 | Kind::Float64 | Kind::Complex64 => 8,
        Kind::Complex128 => 16,
        Kind::String => 2 * cfg.ptr_size,
        _ => cfg.ptr_size,
    }
}

fn basic_desc(cfg: &RegistryConfig, kind: Kind) -> TypeDesc {
    let ps = cfg.ptr_size;
    let size = basic_size(cfg, kind);
    // Complex numbers align like their components.
    let align = match kind {
        Kind::Complex64 | Kind::Complex128 => size / 2,
        _ => size,
    }
    .min(ps);

    let (ptr_bytes, gc) = match kind {
        Kind::String | Kind::UnsafePointer => (ps, pointer_mask(1)),
        _ => (0, GcData::Empty),
    };
    // Predeclared types are named types of the universe scope.
    let (name, pkg_path) = match kind {
        Kind::UnsafePointer => ("Pointer", "unsafe"),
        _ => (kind.name(), ""),
    };
    let mut flags = TypeFlags::NAMED | TypeFlags::UNCOMMON;
    if !matches!(
        kind,
        Kind::Float32 | Kind::Float64 | Kind::Complex64 | Kind::Complex128 | Kind::String
    ) {
        flags |= TypeFlags::REGULAR_MEMORY;
    }
    if kind == Kind::UnsafePointer {
        flags |= TypeFlags::DIRECT_IFACE;
    }

    #[expect(clippy::cast_possible_truncation, reason = "basic alignments are at most 8")]
    let align = align as u8;
    TypeDesc {
        size,
        ptr_bytes,
        hash: fnv1(FNV_BASIS, kind.name().as_bytes()),
        flags,
        align,
        field_align: align,
        kind,
        equal: EqualFn::for_basic(kind),
        gc,
        str: universe_name(kind.name()),
        uncommon: Some(Box::new(Uncommon {
            name: name.into(),
            pkg_path: pkg_path.into(),
            methods: Vec::new(),
            xcount: 0,
        })),
        ptr_to_this: OnceLock::new(),
        ext: TypeExt::None,
    }
}

/// `interface {}`: a (type, data) word pair, both pointers.
fn empty_interface_desc(cfg: &RegistryConfig) -> TypeDesc {
    let ps = cfg.ptr_size;
    #[expect(clippy::cast_possible_truncation, reason = "ptr_size is 4 or 8")]
    let align = ps as u8;
    let s = "interface {}";
    TypeDesc {
        size: 2 * ps,
        ptr_bytes: 2 * ps,
        hash: fnv1(FNV_BASIS, s.as_bytes()),
        flags: TypeFlags::empty(),
        align,
        field_align: align,
        kind: Kind::Interface,
        equal: Some(EqualFn::Interface),
        gc: pointer_mask(2),
        str: universe_name(s),
        uncommon: None,
        ptr_to_this: OnceLock::new(),
        ext: TypeExt::Interface {
            pkg_path: None,
            methods: Box::new([]),
        },
    }
}
