//! Method sets: enumeration, lookup and invocation.

use reflex_ir::{ensure_sufficient_stack, Kind};

use crate::desc::{MethodEntry, MethodImpl, Type, TypeDesc};
use crate::error::{CallError, TypeError};
use crate::registry::Registry;

/// A method as reported by [`Registry::method`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    /// Declaring package of an unexported method, `""` otherwise.
    pub pkg_path: String,
    /// For a concrete type, the signature with the receiver as its first
    /// input. For an interface, the signature without a receiver.
    pub typ: Type,
    pub index: usize,
}

impl Method {
    pub fn is_exported(&self) -> bool {
        self.pkg_path.is_empty()
    }
}

impl Registry {
    /// The `i`th method of `t`: exported methods of a concrete type, every
    /// method of an interface, both in sorted order.
    ///
    /// # Panics
    ///
    /// If `i >= t.num_method()`.
    #[track_caller]
    pub fn method(&self, t: Type, i: usize) -> Result<Method, TypeError> {
        if t.kind == Kind::Interface {
            let methods = t.interface_methods();
            let Some(m) = methods.get(i) else {
                panic!("reflex: Method index {i} out of range for {t}");
            };
            let pkg_path = if m.is_exported() {
                String::new()
            } else {
                m.name
                    .pkg_path()
                    .or_else(|| t.member_pkg_path())
                    .unwrap_or_default()
                    .to_owned()
            };
            return Ok(Method {
                name: m.name().to_owned(),
                pkg_path,
                typ: m.typ,
                index: i,
            });
        }

        let Some(m) = t.exported_methods().get(i) else {
            panic!("reflex: Method index {i} out of range for {t}");
        };
        let sig = m.mtyp;
        let mut ins = Vec::with_capacity(sig.num_in() + 1);
        ins.push(t);
        ins.extend_from_slice(sig.inputs());
        Ok(Method {
            name: m.name().to_owned(),
            pkg_path: String::new(),
            typ: self.func_of(&ins, sig.outputs(), sig.is_variadic())?,
            index: i,
        })
    }

    /// The method of `t` called `name`, if `t` has one (exported methods
    /// only, for concrete types).
    pub fn method_by_name(&self, t: Type, name: &str) -> Result<Option<Method>, TypeError> {
        let index = if t.kind == Kind::Interface {
            t.interface_methods().iter().position(|m| m.name() == name)
        } else {
            let methods = t.exported_methods();
            methods
                .binary_search_by(|m| m.name().cmp(name))
                .ok()
        };
        index.map(|i| self.method(t, i)).transpose()
    }

    /// Call exported method `i` of concrete type `t` on the receiver bytes
    /// `recv`.
    ///
    /// Promoted methods forward through their embedded fields; value
    /// methods reached through a pointer load the pointee with
    /// [`RuntimeHooks::load`](crate::RuntimeHooks::load).
    ///
    /// # Panics
    ///
    /// If `i >= t.num_method()` or `t` is an interface.
    #[track_caller]
    pub fn call_method(
        &self,
        t: Type,
        i: usize,
        recv: &[u8],
        args: &[&[u8]],
    ) -> Result<Vec<Vec<u8>>, CallError> {
        if t.kind == Kind::Interface {
            panic!("reflex: call_method on interface type {t}");
        }
        let Some(m) = t.exported_methods().get(i) else {
            panic!("reflex: Method index {i} out of range for {t}");
        };
        self.invoke(&t, m, recv, args)
    }

    fn invoke(
        &self,
        t: &TypeDesc,
        m: &MethodEntry,
        recv: &[u8],
        args: &[&[u8]],
    ) -> Result<Vec<Vec<u8>>, CallError> {
        if recv.len() < t.size() {
            return Err(CallError::ShortReceiver {
                typ: t.to_string(),
                have: recv.len(),
                need: t.size(),
            });
        }
        let recv = &recv[..t.size()];

        ensure_sufficient_stack(|| match &m.imp {
            MethodImpl::Native(f) => Ok(f(recv, args)),
            MethodImpl::Indirect { method } => {
                let elem = t.elem();
                let target = self.deref(t, recv)?;
                let inner = entry(&elem, *method, m.name())?;
                self.invoke(&elem, inner, &target, args)
            }
            MethodImpl::Promoted(thunk) => {
                let f = &t.fields()[thunk.field_index];
                let ft = f.typ;
                let fv = &recv[f.offset..f.offset + ft.size()];
                if ft.kind == Kind::Interface {
                    let Some((dt, dv)) = self.hooks.interface_target(fv) else {
                        return Err(CallError::NilInterface { typ: t.to_string() });
                    };
                    let Some(target) = dt.methods().iter().find(|dm| dm.name() == m.name()) else {
                        return Err(CallError::MissingMethod {
                            typ: dt.to_string(),
                            name: m.name().to_owned(),
                        });
                    };
                    self.invoke(&dt, target, &dv, args)
                } else if thunk.deref {
                    let elem = ft.elem();
                    let target = self.deref(&ft, fv)?;
                    let inner = entry(&elem, thunk.method_index, m.name())?;
                    self.invoke(&elem, inner, &target, args)
                } else {
                    let inner = entry(&ft, thunk.method_index, m.name())?;
                    self.invoke(&ft, inner, fv, args)
                }
            }
        })
    }

    /// Load the pointee of pointer value `v` of type `t`.
    fn deref(&self, t: &TypeDesc, v: &[u8]) -> Result<Vec<u8>, CallError> {
        self.hooks
            .load(v, t.elem().size())
            .ok_or_else(|| CallError::NilPointer { typ: t.to_string() })
    }
}

fn entry<'a>(t: &'a TypeDesc, i: usize, name: &str) -> Result<&'a MethodEntry, CallError> {
    t.methods().get(i).ok_or_else(|| CallError::MissingMethod {
        typ: t.to_string(),
        name: name.to_owned(),
    })
}
