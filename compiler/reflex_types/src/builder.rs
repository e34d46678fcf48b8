//! Declaring pre-existing types.
//!
//! A [`RegistryBuilder`] plays the part of a compiler's type-section
//! emitter: it creates the predefined types, lets the embedder declare
//! named types (with their method tables and `*T` companions) and any
//! composite types that should count as pre-existing, and then freezes
//! them into a [`Registry`]. Synthesized types later coalesce with these
//! declarations by string form and structure.

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

use reflex_ir::{ChanDir, Kind, Name};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::builtin::Basics;
use crate::config::{ConfigError, RegistryConfig};
use crate::desc::{
    method_order, IMethod, MethodEntry, MethodFn, MethodImpl, Type, TypeDesc, TypeExt, Uncommon,
};
use crate::equal::EqualFn;
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::gc::pointer_mask;
use crate::hooks::{DefaultHooks, RuntimeHooks};
use crate::identity::identical_underlying;
use crate::registry::Registry;
use crate::synth::structs::FieldSpec;
use crate::synth::{array, chan, fnv1, func, map, pointer, slice, structs, Composer, FNV_BASIS};

/// A method declared on a named type.
#[derive(Clone)]
pub struct MethodDecl {
    pub name: String,
    /// Signature without the receiver.
    pub typ: Type,
    pub body: MethodFn,
}

impl MethodDecl {
    pub fn new(
        name: impl Into<String>,
        typ: Type,
        body: impl Fn(&[u8], &[&[u8]]) -> Vec<Vec<u8>> + Send + Sync + 'static,
    ) -> Self {
        MethodDecl {
            name: name.into(),
            typ,
            body: Arc::new(body),
        }
    }
}

impl std::fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDecl")
            .field("name", &self.name)
            .field("typ", &self.typ)
            .finish_non_exhaustive()
    }
}

/// `type Name Underlying` with its methods.
#[derive(Clone, Debug)]
pub struct NamedType {
    pub pkg_path: String,
    pub name: String,
    pub underlying: Type,
    /// Methods with a value receiver. They are also in `*T`'s method set.
    pub methods: Vec<MethodDecl>,
    /// Methods with a pointer receiver.
    pub ptr_methods: Vec<MethodDecl>,
}

impl NamedType {
    pub fn new(pkg_path: impl Into<String>, name: impl Into<String>, underlying: Type) -> Self {
        NamedType {
            pkg_path: pkg_path.into(),
            name: name.into(),
            underlying,
            methods: Vec::new(),
            ptr_methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn method(mut self, m: MethodDecl) -> Self {
        self.methods.push(m);
        self
    }

    #[must_use]
    pub fn ptr_method(mut self, m: MethodDecl) -> Self {
        self.ptr_methods.push(m);
        self
    }
}

/// An interface method: name and signature.
#[derive(Clone, Debug)]
pub struct IMethodDecl {
    pub name: String,
    pub typ: Type,
}

impl IMethodDecl {
    pub fn new(name: impl Into<String>, typ: Type) -> Self {
        IMethodDecl {
            name: name.into(),
            typ,
        }
    }
}

/// Identifiers starting with an upper-case letter are exported.
fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// `pkg.Name`, qualified by the last element of the package path.
fn qualified(pkg_path: &str, name: &str) -> String {
    match pkg_path.rsplit('/').next() {
        Some(last) if !last.is_empty() => format!("{last}.{name}"),
        _ => name.to_owned(),
    }
}

fn method_name(name: &str, pkg_path: &str) -> Result<Name, TypeError> {
    let exported = is_exported(name);
    let pkg = (!exported && !pkg_path.is_empty()).then_some(pkg_path);
    Ok(Name::new(name, "", exported, pkg)?)
}

/// Sort a method table and count its exported prefix.
fn finish_table(mut methods: Vec<MethodEntry>) -> (Vec<MethodEntry>, usize) {
    methods.sort_by(|a, b| method_order(&a.name, &b.name));
    let xcount = methods.iter().take_while(|m| m.is_exported()).count();
    (methods, xcount)
}

/// Collects declarations, then freezes them into a [`Registry`].
pub struct RegistryBuilder {
    config: RegistryConfig,
    hooks: Arc<dyn RuntimeHooks>,
    basics: Basics,
    declared: RefCell<Vec<Type>>,
    names: RefCell<FxHashSet<(String, String)>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::from_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: RegistryConfig) -> Self {
        let basics = Basics::new(&config);
        RegistryBuilder {
            config,
            hooks: Arc::new(DefaultHooks),
            basics,
            declared: RefCell::new(Vec::new()),
            names: RefCell::new(FxHashSet::default()),
        }
    }

    /// Replace the default bitwise hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: Arc<dyn RuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// # Panics
    ///
    /// If `kind` has no predefined type.
    #[track_caller]
    pub fn basic(&self, kind: Kind) -> Type {
        match self.basics.get(kind) {
            Some(t) => t,
            None => panic!("reflex: no predefined type of kind {kind}"),
        }
    }

    pub fn empty_interface(&self) -> Type {
        self.basics.empty_interface()
    }

    fn find_declared(&self, s: &str, same: impl Fn(Type) -> bool) -> Option<Type> {
        self.declared
            .borrow()
            .iter()
            .copied()
            .find(|&t| t.string() == s && same(t))
    }

    fn declare(&self, desc: TypeDesc) -> Type {
        let t = Type::publish(desc);
        debug!(typ = %t, "declared");
        self.declared.borrow_mut().push(t);
        t
    }

    fn find_or_declare(
        &self,
        s: &str,
        same: impl Fn(Type) -> bool,
        build: impl FnOnce() -> Result<TypeDesc, TypeError>,
    ) -> Result<Type, TypeError> {
        if let Some(t) = self.find_declared(s, same) {
            return Ok(t);
        }
        Ok(self.declare(build()?))
    }

    /// Declare `*elem`. It becomes `elem`'s pointer-to-this type.
    pub fn pointer(&self, elem: Type) -> Result<Type, TypeError> {
        if let Some(p) = elem.ptr_to_this() {
            return Ok(p);
        }
        let p = self.declare(pointer::build(&self.config, elem)?);
        let _ = elem.ptr_to_this.set(p);
        Ok(p)
    }

    pub fn slice(&self, elem: Type) -> Result<Type, TypeError> {
        self.find_or_declare(
            &slice::string_form(elem),
            |t| t.kind == Kind::Slice && t.elem() == elem,
            || slice::build(&self.config, elem),
        )
    }

    pub fn array(&self, len: usize, elem: Type) -> Result<Type, TypeError> {
        self.find_or_declare(
            &array::string_form(len, elem),
            |t| t.kind == Kind::Array && t.len() == len && t.elem() == elem,
            || array::build(self, len, elem),
        )
    }

    pub fn chan(&self, dir: ChanDir, elem: Type) -> Result<Type, TypeError> {
        self.find_or_declare(
            &chan::string_form(dir, elem),
            |t| t.kind == Kind::Chan && t.chan_dir() == dir && t.elem() == elem,
            || chan::build(&self.config, dir, elem),
        )
    }

    pub fn map(&self, key: Type, elem: Type) -> Result<Type, TypeError> {
        self.find_or_declare(
            &map::string_form(key, elem),
            |t| t.kind == Kind::Map && t.key() == key && t.elem() == elem,
            || map::build(self, key, elem),
        )
    }

    pub fn func(&self, ins: &[Type], outs: &[Type], variadic: bool) -> Result<Type, TypeError> {
        let desc = func::build(&self.config, ins, outs, variadic)?;
        self.find_or_declare_desc(desc)
    }

    pub fn structure(&self, fields: &[FieldSpec]) -> Result<Type, TypeError> {
        let desc = structs::build(&self.config, fields)?;
        self.find_or_declare_desc(desc)
    }

    fn find_or_declare_desc(&self, desc: TypeDesc) -> Result<Type, TypeError> {
        if let Some(t) = self.find_declared(desc.string(), |t| identical_underlying(&desc, &t, true)) {
            return Ok(t);
        }
        Ok(self.declare(desc))
    }

    /// Declare a named type, its method table and its `*T`.
    ///
    /// Value methods appear in both method sets; pointer methods only in
    /// `*T`'s. The declared type keeps the underlying type's layout.
    pub fn named(&self, decl: NamedType) -> Result<Type, TypeError> {
        let display = qualified(&decl.pkg_path, &decl.name);
        if !self
            .names
            .borrow_mut()
            .insert((decl.pkg_path.clone(), decl.name.clone()))
        {
            return Err(TypeError::DuplicateType { name: display });
        }

        let mut seen = FxHashSet::default();
        for m in decl.methods.iter().chain(&decl.ptr_methods) {
            if m.typ.kind != Kind::Func {
                return Err(TypeError::MethodNotFunc {
                    name: m.name.clone(),
                    typ: m.typ.to_string(),
                });
            }
            if !seen.insert(m.name.as_str()) {
                return Err(TypeError::DuplicateMethod {
                    name: m.name.clone(),
                    typ: display,
                });
            }
        }
        let underlying = decl.underlying;
        if underlying.kind == Kind::Interface && !seen.is_empty() {
            return Err(TypeError::NotImplemented("methods on an interface type"));
        }

        let mut methods = Vec::with_capacity(decl.methods.len());
        for m in &decl.methods {
            methods.push(MethodEntry {
                name: method_name(&m.name, &decl.pkg_path)?,
                mtyp: m.typ,
                imp: MethodImpl::Native(Arc::clone(&m.body)),
            });
        }
        // A structural struct's promoted methods carry over unless shadowed.
        if !underlying.is_named() {
            for m in underlying.methods() {
                if !seen.contains(m.name()) {
                    methods.push(m.clone());
                }
            }
        }
        let (methods, xcount) = finish_table(methods);

        let mut desc = underlying.desc().clone();
        desc.ptr_to_this = OnceLock::new();
        desc.str = Name::plain(&display)?;
        desc.hash = fnv1(
            fnv1(FNV_BASIS, decl.pkg_path.as_bytes()),
            format!(".{}", decl.name).as_bytes(),
        );
        desc.flags |= TypeFlags::NAMED | TypeFlags::UNCOMMON;
        desc.uncommon = Some(Box::new(Uncommon {
            name: decl.name.as_str().into(),
            pkg_path: decl.pkg_path.as_str().into(),
            methods,
            xcount,
        }));
        let t = self.declare(desc);

        let mut ptr_methods = Vec::with_capacity(decl.ptr_methods.len() + t.methods().len());
        for m in &decl.ptr_methods {
            ptr_methods.push(MethodEntry {
                name: method_name(&m.name, &decl.pkg_path)?,
                mtyp: m.typ,
                imp: MethodImpl::Native(Arc::clone(&m.body)),
            });
        }
        for (i, m) in t.methods().iter().enumerate() {
            ptr_methods.push(MethodEntry {
                name: m.name.clone(),
                mtyp: m.mtyp,
                imp: MethodImpl::Indirect { method: i },
            });
        }
        let (ptr_methods, ptr_xcount) = finish_table(ptr_methods);
        let mut pdesc = pointer::build(&self.config, t)?;
        pdesc.flags |= TypeFlags::UNCOMMON;
        pdesc.uncommon = Some(Box::new(Uncommon {
            name: "".into(),
            pkg_path: decl.pkg_path.as_str().into(),
            methods: ptr_methods,
            xcount: ptr_xcount,
        }));
        let p = self.declare(pdesc);
        let _ = t.ptr_to_this.set(p);
        Ok(t)
    }

    /// Declare an interface type. With `name`, the interface is a named type
    /// of `pkg_path`; unexported method names are qualified by `pkg_path`
    /// either way.
    pub fn interface(
        &self,
        pkg_path: &str,
        name: Option<&str>,
        methods: &[IMethodDecl],
    ) -> Result<Type, TypeError> {
        if name.is_none() && methods.is_empty() {
            return Ok(self.basics.empty_interface());
        }

        let mut seen = FxHashSet::default();
        let mut imethods = Vec::with_capacity(methods.len());
        for m in methods {
            if m.typ.kind != Kind::Func {
                return Err(TypeError::MethodNotFunc {
                    name: m.name.clone(),
                    typ: m.typ.to_string(),
                });
            }
            if !seen.insert(m.name.as_str()) {
                return Err(TypeError::DuplicateMethod {
                    name: m.name.clone(),
                    typ: name.unwrap_or("interface").to_owned(),
                });
            }
            imethods.push(IMethod {
                name: method_name(&m.name, pkg_path)?,
                typ: m.typ,
            });
        }
        imethods.sort_by(|a, b| method_order(&a.name, &b.name));

        let s = match name {
            Some(n) => qualified(pkg_path, n),
            None => interface_string(&imethods),
        };
        if let Some(n) = name {
            if !self.names.borrow_mut().insert((pkg_path.to_owned(), n.to_owned())) {
                return Err(TypeError::DuplicateType { name: s });
            }
        } else if let Some(t) = self.find_declared(&s, |t| same_methods(&t, &imethods)) {
            return Ok(t);
        }

        let ps = self.config.ptr_size;
        #[expect(clippy::cast_possible_truncation, reason = "ptr_size is 4 or 8")]
        let align = ps as u8;
        let mut flags = TypeFlags::empty();
        let uncommon = name.map(|n| {
            flags |= TypeFlags::NAMED | TypeFlags::UNCOMMON;
            Box::new(Uncommon {
                name: n.into(),
                pkg_path: pkg_path.into(),
                methods: Vec::new(),
                xcount: 0,
            })
        });
        let hash = match name {
            Some(n) => fnv1(fnv1(FNV_BASIS, pkg_path.as_bytes()), format!(".{n}").as_bytes()),
            None => fnv1(FNV_BASIS, s.as_bytes()),
        };
        Ok(self.declare(TypeDesc {
            size: 2 * ps,
            ptr_bytes: 2 * ps,
            hash,
            flags,
            align,
            field_align: align,
            kind: Kind::Interface,
            equal: Some(EqualFn::Interface),
            gc: pointer_mask(2),
            str: Name::plain(&s)?,
            uncommon,
            ptr_to_this: OnceLock::new(),
            ext: TypeExt::Interface {
                pkg_path: (!pkg_path.is_empty()).then(|| pkg_path.into()),
                methods: imethods.into(),
            },
        }))
    }

    /// Freeze the declarations.
    pub fn build(self) -> Registry {
        let mut known: Vec<Type> = self.basics.all().collect();
        known.extend(self.declared.into_inner());
        Registry::from_parts(self.config, self.hooks, self.basics, known)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `interface { M(int) string; N() }`.
fn interface_string(methods: &[IMethod]) -> String {
    let mut s = String::from("interface {");
    for (i, m) in methods.iter().enumerate() {
        s.push_str(if i == 0 { " " } else { "; " });
        s.push_str(m.name.text());
        s.push_str(m.typ.string().strip_prefix("func").unwrap_or(m.typ.string()));
    }
    if !methods.is_empty() {
        s.push(' ');
    }
    s.push('}');
    s
}

fn same_methods(t: &TypeDesc, methods: &[IMethod]) -> bool {
    t.kind == Kind::Interface
        && !t.is_named()
        && t.interface_methods().len() == methods.len()
        && t
            .interface_methods()
            .iter()
            .zip(methods)
            .all(|(a, b)| a.name == b.name && a.typ == b.typ)
}

impl Composer for RegistryBuilder {
    fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn compose_pointer(&self, elem: Type) -> Result<Type, TypeError> {
        self.pointer(elem)
    }

    fn compose_slice(&self, elem: Type) -> Result<Type, TypeError> {
        self.slice(elem)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
