//! Descriptor model.
//!
//! A [`TypeDesc`] is the canonical record for one type. Every descriptor
//! handed out by the registry is published once, never mutated, and lives
//! for the rest of the process, so it is shared as a [`Type`]: a
//! `&'static TypeDesc` whose equality is pointer identity.
//!
//! Kind-specific accessors (`elem`, `key`, `field`, ...) are only valid for
//! the matching kinds and panic otherwise.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use reflex_ir::{BitVec, ChanDir, GcProgram, Kind, Name};

use crate::equal::EqualFn;
use crate::flags::{MapFlags, TypeFlags};

/// Handle to a published descriptor.
///
/// Two handles are equal iff they refer to the same descriptor, which for
/// interned types means they describe the same type.
#[derive(Clone, Copy)]
pub struct Type(&'static TypeDesc);

impl Type {
    /// Publish a finished descriptor for the rest of the process.
    pub(crate) fn publish(desc: TypeDesc) -> Type {
        Type(Box::leak(Box::new(desc)))
    }

    #[inline]
    pub fn desc(self) -> &'static TypeDesc {
        self.0
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.0, state);
    }
}

impl Deref for Type {
    type Target = TypeDesc;

    #[inline]
    fn deref(&self) -> &TypeDesc {
        self.0
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.string())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.string())
    }
}

/// Pointer map of a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GcData {
    /// No pointers.
    Empty,
    /// One bit per word up to the last pointer word.
    Mask(BitVec),
    /// Program that generates the mask.
    Program(GcProgram),
}

impl GcData {
    #[inline]
    pub fn is_program(&self) -> bool {
        matches!(self, GcData::Program(_))
    }

    pub fn mask(&self) -> Option<&BitVec> {
        match self {
            GcData::Mask(bv) => Some(bv),
            _ => None,
        }
    }

    pub fn program(&self) -> Option<&GcProgram> {
        match self {
            GcData::Program(p) => Some(p),
            _ => None,
        }
    }
}

/// Callable body of a native method: `(receiver, args) -> results`, all as
/// raw value bytes.
pub type MethodFn = Arc<dyn Fn(&[u8], &[&[u8]]) -> Vec<Vec<u8>> + Send + Sync>;

/// How a method-table entry is invoked.
#[derive(Clone)]
pub enum MethodImpl {
    /// Host-provided body.
    Native(MethodFn),
    /// Value method reached through a pointer receiver; `method` indexes the
    /// pointee's method table.
    Indirect { method: usize },
    /// Forwarding thunk into an embedded field.
    Promoted(Thunk),
}

impl fmt::Debug for MethodImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodImpl::Native(_) => f.write_str("Native(..)"),
            MethodImpl::Indirect { method } => write!(f, "Indirect({method})"),
            MethodImpl::Promoted(t) => write!(f, "Promoted({t:?})"),
        }
    }
}

/// Forwarding thunk: project the receiver to field `field_index`, then call
/// method `method_index` of that field's type.
///
/// For an interface field, `method_index` indexes the interface's method
/// list and the call dispatches on the field's dynamic type. With `deref`
/// set, the field is a pointer and the method belongs to its pointee.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thunk {
    pub field_index: usize,
    pub method_index: usize,
    pub deref: bool,
}

/// Entry in a concrete type's method table.
#[derive(Clone, Debug)]
pub struct MethodEntry {
    pub(crate) name: Name,
    pub(crate) mtyp: Type,
    pub(crate) imp: MethodImpl,
}

impl MethodEntry {
    #[inline]
    pub fn name(&self) -> &str {
        self.name.text()
    }

    #[inline]
    pub fn is_exported(&self) -> bool {
        self.name.is_exported()
    }

    /// Signature without the receiver.
    #[inline]
    pub fn mtyp(&self) -> Type {
        self.mtyp
    }

    #[inline]
    pub fn imp(&self) -> &MethodImpl {
        &self.imp
    }
}

/// Interface method: name plus signature.
#[derive(Clone, Debug)]
pub struct IMethod {
    pub(crate) name: Name,
    pub(crate) typ: Type,
}

impl IMethod {
    #[inline]
    pub fn name(&self) -> &str {
        self.name.text()
    }

    #[inline]
    pub fn is_exported(&self) -> bool {
        self.name.is_exported()
    }

    #[inline]
    pub fn typ(&self) -> Type {
        self.typ
    }
}

/// Name and method table of a declared type, or the promoted methods of a
/// synthesized struct.
#[derive(Clone, Debug)]
pub(crate) struct Uncommon {
    pub(crate) name: Box<str>,
    pub(crate) pkg_path: Box<str>,
    /// Exported methods first, each group ordered by name.
    pub(crate) methods: Vec<MethodEntry>,
    pub(crate) xcount: usize,
}

/// Method-table order: exported before unexported, then by name, then by
/// package path.
pub(crate) fn method_order(a: &Name, b: &Name) -> std::cmp::Ordering {
    b.is_exported()
        .cmp(&a.is_exported())
        .then_with(|| a.text().cmp(b.text()))
        .then_with(|| a.pkg_path().cmp(&b.pkg_path()))
}

/// Struct field as stored in a struct descriptor.
#[derive(Clone, Debug)]
pub struct FieldDesc {
    pub(crate) name: Name,
    pub(crate) typ: Type,
    pub(crate) offset: usize,
    pub(crate) embedded: bool,
}

impl FieldDesc {
    #[inline]
    pub fn name(&self) -> &str {
        self.name.text()
    }

    #[inline]
    pub fn typ(&self) -> Type {
        self.typ
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    #[inline]
    pub fn tag(&self) -> &str {
        self.name.tag()
    }
}

/// Map-specific descriptor data.
#[derive(Clone, Debug)]
pub(crate) struct MapExt {
    pub(crate) key: Type,
    pub(crate) elem: Type,
    pub(crate) bucket: TypeDesc,
    pub(crate) key_size: u8,
    pub(crate) value_size: u8,
    pub(crate) bucket_size: u16,
    pub(crate) flags: MapFlags,
}

/// Kind-specific extension record.
#[derive(Clone, Debug)]
pub(crate) enum TypeExt {
    None,
    Array {
        elem: Type,
        slice: Type,
        len: usize,
    },
    Chan {
        elem: Type,
        dir: ChanDir,
    },
    Func {
        ins: Box<[Type]>,
        outs: Box<[Type]>,
        variadic: bool,
    },
    Interface {
        pkg_path: Option<Box<str>>,
        methods: Box<[IMethod]>,
    },
    Map(Box<MapExt>),
    Pointer {
        elem: Type,
    },
    Slice {
        elem: Type,
    },
    Struct {
        pkg_path: Option<Box<str>>,
        fields: Box<[FieldDesc]>,
    },
}

/// Canonical record for one type.
#[derive(Clone)]
pub struct TypeDesc {
    pub(crate) size: usize,
    pub(crate) ptr_bytes: usize,
    pub(crate) hash: u32,
    pub(crate) flags: TypeFlags,
    pub(crate) align: u8,
    pub(crate) field_align: u8,
    pub(crate) kind: Kind,
    pub(crate) equal: Option<EqualFn>,
    pub(crate) gc: GcData,
    pub(crate) str: Name,
    pub(crate) uncommon: Option<Box<Uncommon>>,
    /// `*T`, when declared alongside `T`.
    pub(crate) ptr_to_this: OnceLock<Type>,
    pub(crate) ext: TypeExt,
}

#[cold]
#[track_caller]
fn wrong_kind(op: &str, what: &str, t: &TypeDesc) -> ! {
    panic!("reflex: {op} of non-{what} type {}", t.string())
}

impl TypeDesc {
    // === Queries valid for every kind ===

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn align(&self) -> usize {
        usize::from(self.align)
    }

    #[inline]
    pub fn field_align(&self) -> usize {
        usize::from(self.field_align)
    }

    /// Length of the prefix of a value that can contain pointers.
    #[inline]
    pub fn ptr_bytes(&self) -> usize {
        self.ptr_bytes
    }

    #[inline]
    pub fn pointers(&self) -> bool {
        self.ptr_bytes != 0
    }

    /// Structural hash.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    #[inline]
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// Canonical string form, e.g. `map[string][]int`.
    #[inline]
    pub fn string(&self) -> &str {
        self.str.text()
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        self.flags.is_named()
    }

    /// Declared name, or `""` for structural types.
    pub fn name(&self) -> &str {
        match &self.uncommon {
            Some(u) if self.is_named() => &u.name,
            _ => "",
        }
    }

    /// Package path of a declared type, or `""`.
    pub fn pkg_path(&self) -> &str {
        match &self.uncommon {
            Some(u) if self.is_named() => &u.pkg_path,
            _ => "",
        }
    }

    #[inline]
    pub fn comparable(&self) -> bool {
        self.equal.is_some()
    }

    #[inline]
    pub fn gc_data(&self) -> &GcData {
        &self.gc
    }

    /// Values of this type are stored indirectly in interfaces.
    #[inline]
    pub fn iface_indir(&self) -> bool {
        !self.flags.is_direct_iface()
    }

    /// `*T` for a declared `T`, if one was declared with it.
    #[inline]
    pub fn ptr_to_this(&self) -> Option<Type> {
        self.ptr_to_this.get().copied()
    }

    /// Size in bits of a numeric type.
    pub fn bits(&self) -> usize {
        if !self.kind.is_scalar() || self.kind == Kind::Bool {
            wrong_kind("Bits", "arithmetic", self);
        }
        self.size * 8
    }

    // === Kind-specific queries ===

    /// Element type of an array, chan, map, pointer or slice.
    pub fn elem(&self) -> Type {
        match &self.ext {
            TypeExt::Array { elem, .. }
            | TypeExt::Chan { elem, .. }
            | TypeExt::Pointer { elem }
            | TypeExt::Slice { elem } => *elem,
            TypeExt::Map(m) => m.elem,
            _ => panic!("reflex: Elem of invalid type {}", self.string()),
        }
    }

    pub fn key(&self) -> Type {
        match &self.ext {
            TypeExt::Map(m) => m.key,
            _ => wrong_kind("Key", "map", self),
        }
    }

    /// Length of an array type.
    #[expect(clippy::len_without_is_empty, reason = "array length, not a container")]
    pub fn len(&self) -> usize {
        match &self.ext {
            TypeExt::Array { len, .. } => *len,
            _ => wrong_kind("Len", "array", self),
        }
    }

    /// `[]E` for an array type `[N]E`.
    pub fn array_slice(&self) -> Type {
        match &self.ext {
            TypeExt::Array { slice, .. } => *slice,
            _ => wrong_kind("ArraySlice", "array", self),
        }
    }

    pub fn chan_dir(&self) -> ChanDir {
        match &self.ext {
            TypeExt::Chan { dir, .. } => *dir,
            _ => wrong_kind("ChanDir", "chan", self),
        }
    }

    pub fn is_variadic(&self) -> bool {
        match &self.ext {
            TypeExt::Func { variadic, .. } => *variadic,
            _ => wrong_kind("IsVariadic", "func", self),
        }
    }

    pub fn inputs(&self) -> &[Type] {
        match &self.ext {
            TypeExt::Func { ins, .. } => ins,
            _ => wrong_kind("In", "func", self),
        }
    }

    pub fn outputs(&self) -> &[Type] {
        match &self.ext {
            TypeExt::Func { outs, .. } => outs,
            _ => wrong_kind("Out", "func", self),
        }
    }

    pub fn num_in(&self) -> usize {
        self.inputs().len()
    }

    pub fn num_out(&self) -> usize {
        self.outputs().len()
    }

    #[track_caller]
    pub fn input(&self, i: usize) -> Type {
        let ins = self.inputs();
        match ins.get(i) {
            Some(t) => *t,
            None => panic!("reflex: In index {i} out of range for {}", self.string()),
        }
    }

    #[track_caller]
    pub fn output(&self, i: usize) -> Type {
        let outs = self.outputs();
        match outs.get(i) {
            Some(t) => *t,
            None => panic!("reflex: Out index {i} out of range for {}", self.string()),
        }
    }

    pub fn fields(&self) -> &[FieldDesc] {
        match &self.ext {
            TypeExt::Struct { fields, .. } => fields,
            _ => wrong_kind("Field", "struct", self),
        }
    }

    pub fn num_field(&self) -> usize {
        self.fields().len()
    }

    /// Package path shared by the unexported fields of a struct type, or by
    /// the unexported methods of an interface type.
    pub fn member_pkg_path(&self) -> Option<&str> {
        match &self.ext {
            TypeExt::Struct { pkg_path, .. } | TypeExt::Interface { pkg_path, .. } => {
                pkg_path.as_deref()
            }
            _ => wrong_kind("PkgPath", "struct or interface", self),
        }
    }

    pub fn interface_methods(&self) -> &[IMethod] {
        match &self.ext {
            TypeExt::Interface { methods, .. } => methods,
            _ => wrong_kind("InterfaceMethods", "interface", self),
        }
    }

    /// Number of exported methods, or all methods of an interface.
    pub fn num_method(&self) -> usize {
        match &self.ext {
            TypeExt::Interface { methods, .. } => methods.len(),
            _ => self.exported_methods().len(),
        }
    }

    /// Full method table, exported methods first.
    pub fn methods(&self) -> &[MethodEntry] {
        self.uncommon.as_ref().map_or(&[], |u| &u.methods)
    }

    pub fn exported_methods(&self) -> &[MethodEntry] {
        self.uncommon.as_ref().map_or(&[], |u| &u.methods[..u.xcount])
    }

    fn map_ext(&self, op: &str) -> &MapExt {
        match &self.ext {
            TypeExt::Map(m) => m,
            _ => wrong_kind(op, "map", self),
        }
    }

    /// Internal bucket layout of a map type.
    pub fn bucket(&self) -> &TypeDesc {
        &self.map_ext("Bucket").bucket
    }

    pub fn map_flags(&self) -> MapFlags {
        self.map_ext("MapFlags").flags
    }

    /// Bytes per key slot in a bucket.
    pub fn key_size(&self) -> usize {
        usize::from(self.map_ext("KeySize").key_size)
    }

    /// Bytes per value slot in a bucket.
    pub fn value_size(&self) -> usize {
        usize::from(self.map_ext("ValueSize").value_size)
    }

    pub fn bucket_size(&self) -> usize {
        usize::from(self.map_ext("BucketSize").bucket_size)
    }

    pub(crate) fn uncommon(&self) -> Option<&Uncommon> {
        self.uncommon.as_deref()
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDesc")
            .field("kind", &self.kind)
            .field("str", &self.string())
            .field("size", &self.size)
            .field("align", &self.align)
            .field("ptr_bytes", &self.ptr_bytes)
            .field("hash", &format_args!("{:#010x}", self.hash))
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.string())
    }
}
