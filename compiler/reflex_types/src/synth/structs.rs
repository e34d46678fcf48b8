//! `struct { ... }`.
//!
//! Field layout follows declaration order: each field starts at the next
//! multiple of its alignment, and the struct is padded to its largest
//! field alignment. A zero-size final field gets one byte of padding so
//! that a pointer to it cannot point past the struct.
//!
//! Embedded fields contribute their methods through forwarding thunks.
//! Only the shapes whose thunks can be expressed without wrapper code are
//! accepted; the rest fail with [`TypeError::NotImplemented`].

use std::cmp::Ordering;
use std::sync::OnceLock;

use reflex_ir::{quote, Kind, Name, StructTag};
use rustc_hash::FxHashSet;

use super::{align_up, fnv1, fnv1_hash};
use crate::config::RegistryConfig;
use crate::desc::{
    method_order, FieldDesc, MethodEntry, MethodImpl, Thunk, Type, TypeDesc, TypeExt, Uncommon,
};
use crate::equal::EqualFn;
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::gc::{struct_gc, struct_ptr_bytes};
use crate::registry::Registry;

/// One field of a struct to synthesize.
#[derive(Clone, Debug, Default)]
pub struct FieldSpec {
    pub name: String,
    /// Declaring package of an unexported field. Must be `None` for
    /// exported and embedded fields.
    pub pkg_path: Option<String>,
    pub typ: Option<Type>,
    pub tag: StructTag,
    pub embedded: bool,
}

impl FieldSpec {
    /// An exported, untagged field.
    pub fn new(name: impl Into<String>, typ: Type) -> Self {
        FieldSpec {
            name: name.into(),
            typ: Some(typ),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = StructTag::new(tag);
        self
    }

    /// Mark the field as embedded.
    #[must_use]
    pub fn embed(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Mark the field as unexported, declared in `pkg_path`.
    #[must_use]
    pub fn unexported(mut self, pkg_path: impl Into<String>) -> Self {
        self.pkg_path = Some(pkg_path.into());
        self
    }
}

/// Letters and `_`, then letters, digits and `_`.
fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || is_letter(first))
        && chars.all(|c| c == '_' || is_letter(c) || is_decimal_digit(c))
}

/// Alphabetic but not a letter-like number (`Ⅻ` is alphabetic).
fn is_letter(c: char) -> bool {
    c.is_alphabetic() && !c.is_numeric()
}

/// Decimal digits in any script (general category `Nd`). Other numerics
/// such as `²` or `Ⅻ` are not digits.
fn is_decimal_digit(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_digit();
    }
    let c = u32::from(c);
    NON_ASCII_DIGITS
        .binary_search_by(|&(lo, hi)| {
            if hi < c {
                Ordering::Less
            } else if lo > c {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .is_ok()
}

/// Non-ASCII `Nd` ranges, Unicode 14.
#[rustfmt::skip]
const NON_ASCII_DIGITS: &[(u32, u32)] = &[
    (0x0660, 0x0669), (0x06F0, 0x06F9), (0x07C0, 0x07C9), (0x0966, 0x096F),
    (0x09E6, 0x09EF), (0x0A66, 0x0A6F), (0x0AE6, 0x0AEF), (0x0B66, 0x0B6F),
    (0x0BE6, 0x0BEF), (0x0C66, 0x0C6F), (0x0CE6, 0x0CEF), (0x0D66, 0x0D6F),
    (0x0DE6, 0x0DEF), (0x0E50, 0x0E59), (0x0ED0, 0x0ED9), (0x0F20, 0x0F29),
    (0x1040, 0x1049), (0x1090, 0x1099), (0x17E0, 0x17E9), (0x1810, 0x1819),
    (0x1946, 0x194F), (0x19D0, 0x19D9), (0x1A80, 0x1A89), (0x1A90, 0x1A99),
    (0x1B50, 0x1B59), (0x1BB0, 0x1BB9), (0x1C40, 0x1C49), (0x1C50, 0x1C59),
    (0xA620, 0xA629), (0xA8D0, 0xA8D9), (0xA900, 0xA909), (0xA9D0, 0xA9D9),
    (0xA9F0, 0xA9F9), (0xAA50, 0xAA59), (0xABF0, 0xABF9), (0xFF10, 0xFF19),
    (0x104A0, 0x104A9), (0x10D30, 0x10D39), (0x11066, 0x1106F), (0x110F0, 0x110F9),
    (0x11136, 0x1113F), (0x111D0, 0x111D9), (0x112F0, 0x112F9), (0x11450, 0x11459),
    (0x114D0, 0x114D9), (0x11650, 0x11659), (0x116C0, 0x116C9), (0x11730, 0x11739),
    (0x118E0, 0x118E9), (0x11950, 0x11959), (0x11C50, 0x11C59), (0x11D50, 0x11D59),
    (0x11DA0, 0x11DA9), (0x16A60, 0x16A69), (0x16AC0, 0x16AC9), (0x16B50, 0x16B59),
    (0x1D7CE, 0x1D7FF), (0x1E140, 0x1E149), (0x1E2F0, 0x1E2F9), (0x1E950, 0x1E959),
    (0x1FBF0, 0x1FBF9),
];

/// Exportedness check: an exported field needs an upper-case initial.
fn check_export(spec: &FieldSpec) -> Result<bool, TypeError> {
    if spec.embedded && spec.pkg_path.is_some() {
        return Err(TypeError::EmbeddedWithPkgPath {
            name: spec.name.clone(),
        });
    }
    let exported = spec.pkg_path.is_none();
    if exported {
        let c = spec.name.chars().next().unwrap_or('_');
        if c == '_' || c.is_ascii_lowercase() {
            return Err(TypeError::UnexportedWithoutPkgPath {
                name: spec.name.clone(),
            });
        }
    }
    Ok(exported)
}

fn exported_only(methods: &[MethodEntry]) -> Result<(), TypeError> {
    if methods.iter().any(|m| !m.is_exported()) {
        return Err(TypeError::NotImplemented(
            "embedded type with unexported methods",
        ));
    }
    Ok(())
}

/// Methods promoted from embedded field `i` of type `ft`.
fn promote(
    i: usize,
    ft: Type,
    nfields: usize,
    out: &mut Vec<MethodEntry>,
) -> Result<(), TypeError> {
    match ft.kind {
        Kind::Pointer => {
            let elem = ft.elem();
            if matches!(elem.kind, Kind::Pointer | Kind::Interface) {
                return Err(TypeError::IllegalEmbed {
                    typ: ft.to_string(),
                });
            }
            let own = ft.methods();
            if !own.is_empty() {
                if i > 0 {
                    return Err(TypeError::NotImplemented(
                        "embedded type with methods not implemented if type is not first field",
                    ));
                }
                if nfields > 1 {
                    return Err(TypeError::NotImplemented(
                        "embedded type with methods not implemented if there is more than one field",
                    ));
                }
                exported_only(own)?;
                out.extend(own.iter().enumerate().map(|(mi, m)| MethodEntry {
                    name: m.name.clone(),
                    mtyp: m.mtyp,
                    imp: MethodImpl::Promoted(Thunk {
                        field_index: i,
                        method_index: mi,
                        deref: false,
                    }),
                }));
            }
            // Value methods of the pointee, unless `*T` already lists them.
            let inner = elem.methods();
            exported_only(inner)?;
            for (mi, m) in inner.iter().enumerate() {
                if own.iter().any(|o| o.name() == m.name()) {
                    continue;
                }
                out.push(MethodEntry {
                    name: m.name.clone(),
                    mtyp: m.mtyp,
                    imp: MethodImpl::Promoted(Thunk {
                        field_index: i,
                        method_index: mi,
                        deref: true,
                    }),
                });
            }
        }
        Kind::Interface => {
            for (mi, m) in ft.interface_methods().iter().enumerate() {
                if !m.is_exported() {
                    return Err(TypeError::NotImplemented(
                        "embedded interface with unexported method(s)",
                    ));
                }
                out.push(MethodEntry {
                    name: m.name.clone(),
                    mtyp: m.typ,
                    imp: MethodImpl::Promoted(Thunk {
                        field_index: i,
                        method_index: mi,
                        deref: false,
                    }),
                });
            }
        }
        _ => {
            let own = ft.methods();
            if own.is_empty() {
                return Ok(());
            }
            if i > 0 {
                return Err(TypeError::NotImplemented(
                    "embedded type with methods not implemented if type is not first field",
                ));
            }
            if nfields > 1 && !ft.iface_indir() {
                return Err(TypeError::NotImplemented(
                    "embedded type with methods not implemented for non-pointer type",
                ));
            }
            exported_only(own)?;
            out.extend(own.iter().enumerate().map(|(mi, m)| MethodEntry {
                name: m.name.clone(),
                mtyp: m.mtyp,
                imp: MethodImpl::Promoted(Thunk {
                    field_index: i,
                    method_index: mi,
                    deref: false,
                }),
            }));
        }
    }
    Ok(())
}

/// `struct { A int32; B string "json:\"b\"" }`.
pub(crate) fn string_form(fields: &[FieldDesc]) -> String {
    let mut s = String::from("struct {");
    for (i, f) in fields.iter().enumerate() {
        s.push(' ');
        s.push_str(f.name());
        s.push(' ');
        s.push_str(f.typ.string());
        if f.name.has_tag() {
            s.push(' ');
            s.push_str(&quote(f.tag()));
        }
        if i + 1 < fields.len() {
            s.push(';');
        }
    }
    if !fields.is_empty() {
        s.push(' ');
    }
    s.push('}');
    s
}

pub(crate) fn build(cfg: &RegistryConfig, specs: &[FieldSpec]) -> Result<TypeDesc, TypeError> {
    let mut hash = fnv1(0, b"struct {");
    let mut size = 0usize;
    let mut max_align = 1u8;
    let mut comparable = true;
    let mut regular = true;
    let mut last_zero = 0usize;
    let mut pkg_path: Option<&str> = None;
    let mut seen = FxHashSet::default();
    let mut methods = Vec::new();
    let mut fields = Vec::with_capacity(specs.len());

    for (i, spec) in specs.iter().enumerate() {
        if spec.name.is_empty() {
            return Err(TypeError::FieldNoName { index: i });
        }
        if !is_valid_field_name(&spec.name) {
            return Err(TypeError::FieldInvalidName {
                index: i,
                name: spec.name.clone(),
            });
        }
        let Some(ft) = spec.typ else {
            return Err(TypeError::FieldNoType { index: i });
        };
        let exported = check_export(spec)?;

        if let Some(fp) = spec.pkg_path.as_deref() {
            match pkg_path {
                None => pkg_path = Some(fp),
                Some(p) if p != fp => {
                    return Err(TypeError::MixedPkgPaths {
                        first: p.to_owned(),
                        second: fp.to_owned(),
                    });
                }
                Some(_) => {}
            }
        }

        hash = fnv1(hash, spec.name.as_bytes());
        if spec.embedded {
            promote(i, ft, specs.len(), &mut methods)?;
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(TypeError::DuplicateField {
                name: spec.name.clone(),
            });
        }

        hash = fnv1_hash(hash, ft.hash);
        if !spec.tag.is_empty() {
            hash = fnv1(hash, spec.tag.as_str().as_bytes());
        }

        comparable &= ft.comparable();
        regular &= ft.flags.is_regular_memory();

        let too_large = || TypeError::StructTooLarge {
            field: spec.name.clone(),
        };
        let offset = align_up(size, ft.align()).ok_or_else(too_large)?;
        if offset != size {
            regular = false;
        }
        max_align = max_align.max(ft.align);
        size = offset.checked_add(ft.size).ok_or_else(too_large)?;
        if ft.size == 0 {
            last_zero = size;
        }

        fields.push(FieldDesc {
            name: Name::new(&spec.name, spec.tag.as_str(), exported, None)?,
            typ: ft,
            offset,
            embedded: spec.embedded,
        });
    }
    hash = fnv1(hash, b"}");

    let too_large = || TypeError::StructTooLarge {
        field: specs.last().map(|f| f.name.clone()).unwrap_or_default(),
    };
    if size > 0 && last_zero == size {
        size = size.checked_add(1).ok_or_else(too_large)?;
        regular = false;
    }
    let unpadded = size;
    size = align_up(size, usize::from(max_align)).ok_or_else(too_large)?;
    if size != unpadded {
        regular = false;
    }

    let mut seen_methods = FxHashSet::default();
    if !methods.iter().all(|m| seen_methods.insert(m.name().to_owned())) {
        return Err(TypeError::NotImplemented("ambiguous promoted method"));
    }
    methods.sort_by(|a, b| method_order(&a.name, &b.name));
    let uncommon = (!methods.is_empty()).then(|| {
        Box::new(Uncommon {
            name: "".into(),
            pkg_path: "".into(),
            xcount: methods.len(),
            methods,
        })
    });

    let mut flags = TypeFlags::empty();
    if uncommon.is_some() {
        flags |= TypeFlags::UNCOMMON;
    }
    if regular {
        flags |= TypeFlags::REGULAR_MEMORY;
    }
    if let [only] = fields.as_slice() {
        if !only.typ.iface_indir() {
            flags |= TypeFlags::DIRECT_IFACE;
        }
    }
    let equal = comparable.then_some(if regular {
        EqualFn::Memory
    } else {
        EqualFn::Struct
    });

    Ok(TypeDesc {
        size,
        ptr_bytes: struct_ptr_bytes(&fields),
        hash,
        flags,
        align: max_align,
        field_align: max_align,
        kind: Kind::Struct,
        equal,
        gc: struct_gc(&fields, cfg),
        str: Name::plain(&string_form(&fields))?,
        uncommon,
        ptr_to_this: OnceLock::new(),
        ext: TypeExt::Struct {
            pkg_path: pkg_path.map(Into::into),
            fields: fields.into(),
        },
    })
}

impl Registry {
    /// The struct type with these fields, in order.
    ///
    /// Fails on a missing or invalid field name or type, duplicate names,
    /// unexported fields from different packages, and embedded fields whose
    /// methods cannot be promoted.
    pub fn struct_of(&self, fields: &[FieldSpec]) -> Result<Type, TypeError> {
        let desc = build(&self.config, fields)?;
        Ok(self.intern_hashed(&self.structs, desc))
    }
}
