//! `func(A, B) R`.

use reflex_ir::{Kind, Name};

use super::{fnv1, fnv1_hash, word_desc};
use crate::config::RegistryConfig;
use crate::desc::{Type, TypeDesc, TypeExt};
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::registry::Registry;

/// `func(A, ...E) R` / `func() (R1, R2)`.
pub(crate) fn string_form(ins: &[Type], outs: &[Type], variadic: bool) -> String {
    let mut s = String::from("func(");
    for (i, t) in ins.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        if variadic && i == ins.len() - 1 {
            s.push_str("...");
            s.push_str(t.elem().string());
        } else {
            s.push_str(t.string());
        }
    }
    s.push(')');
    match outs {
        [] => {}
        [out] => {
            s.push(' ');
            s.push_str(out.string());
        }
        _ => {
            s.push_str(" (");
            for (i, t) in outs.iter().enumerate() {
                if i > 0 {
                    s.push_str(", ");
                }
                s.push_str(t.string());
            }
            s.push(')');
        }
    }
    s
}

pub(crate) fn build(
    cfg: &RegistryConfig,
    ins: &[Type],
    outs: &[Type],
    variadic: bool,
) -> Result<TypeDesc, TypeError> {
    if variadic && ins.last().map_or(true, |t| t.kind != Kind::Slice) {
        return Err(TypeError::VariadicWithoutSlice);
    }
    let count = ins.len() + outs.len();
    if count > cfg.max_func_args {
        return Err(TypeError::TooManyArgs {
            count,
            limit: cfg.max_func_args,
        });
    }

    let mut hash = 0;
    for t in ins {
        hash = fnv1_hash(hash, t.hash);
    }
    if variadic {
        hash = fnv1(hash, b"v");
    }
    hash = fnv1(hash, b".");
    for t in outs {
        hash = fnv1_hash(hash, t.hash);
    }

    Ok(word_desc(
        cfg,
        Kind::Func,
        Name::plain(&string_form(ins, outs, variadic))?,
        hash,
        None,
        TypeFlags::empty(),
        TypeExt::Func {
            ins: ins.into(),
            outs: outs.into(),
            variadic,
        },
    ))
}

impl Registry {
    /// The function type with the given inputs and outputs.
    ///
    /// A variadic function's last input must be a slice `[]E`; it renders
    /// as `...E`.
    pub fn func_of(&self, ins: &[Type], outs: &[Type], variadic: bool) -> Result<Type, TypeError> {
        let desc = build(&self.config, ins, outs, variadic)?;
        Ok(self.intern_hashed(&self.funcs, desc))
    }
}
