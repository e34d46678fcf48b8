//! Call-frame layout of function types.
//!
//! A frame holds the receiver (one word, whatever its size), the arguments
//! each at its own alignment, then the results starting at the next word
//! boundary:
//!
//! ```text
//! [recv] [arg0] [pad] [arg1] ... | [ret0] [pad] [ret1] ... [pad to word]
//!                        arg_size ^ ret_offset
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use reflex_ir::{BitVec, Kind, Name};
use tracing::debug;

use crate::desc::{GcData, Type, TypeDesc, TypeExt};
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::gc::add_type_bits;
use crate::hooks::RuntimeHooks;
use crate::registry::Registry;
use crate::synth::{align_up, fnv1, FNV_BASIS};

/// Frame layout of one (function, receiver) pair.
pub struct FrameLayout {
    frame: TypeDesc,
    arg_size: usize,
    ret_offset: usize,
    stack: BitVec,
    hooks: Arc<dyn RuntimeHooks>,
    pool: Mutex<Vec<Box<[u8]>>>,
}

impl FrameLayout {
    /// Descriptor of the whole frame, named `funcargs(F)` or
    /// `methodargs(R)(F)`.
    pub fn frame(&self) -> &TypeDesc {
        &self.frame
    }

    /// Bytes of receiver and arguments.
    pub fn arg_size(&self) -> usize {
        self.arg_size
    }

    /// Offset of the first result.
    pub fn ret_offset(&self) -> usize {
        self.ret_offset
    }

    /// One bit per frame word, set where the word holds a pointer.
    pub fn stack_map(&self) -> &BitVec {
        &self.stack
    }

    /// A zeroed frame, reused from the pool when possible.
    pub fn get_frame(&self) -> Box<[u8]> {
        self.pool
            .lock()
            .pop()
            .unwrap_or_else(|| self.hooks.allocate(&self.frame))
    }

    /// Return a frame to the pool.
    pub fn put_frame(&self, mut frame: Box<[u8]>) {
        if frame.len() != self.frame.size() {
            return;
        }
        frame.fill(0);
        self.pool.lock().push(frame);
    }
}

impl fmt::Debug for FrameLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLayout")
            .field("frame", &self.frame.string())
            .field("size", &self.frame.size())
            .field("arg_size", &self.arg_size)
            .field("ret_offset", &self.ret_offset)
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Frame layout for calling `func`, as a method of `recv` if given.
    ///
    /// # Panics
    ///
    /// If `func` is not a function type.
    pub fn func_layout(&self, func: Type, recv: Option<Type>) -> Result<Arc<FrameLayout>, TypeError> {
        if func.kind != Kind::Func {
            panic!("reflex: func_layout of non-func type {func}");
        }
        if let Some(r) = recv {
            if r.kind == Kind::Interface {
                return Err(TypeError::InterfaceReceiver { typ: r.to_string() });
            }
        }
        let key = (func, recv);
        if let Some(l) = self.layouts.get(&key) {
            return Ok(Arc::clone(&l));
        }

        let ps = self.config.ptr_size;
        let too_large = || TypeError::FrameTooLarge {
            func: func.to_string(),
        };
        let place = |offset: usize, t: Type| -> Result<(usize, usize), TypeError> {
            let start = align_up(offset, t.align()).ok_or_else(too_large)?;
            let end = start.checked_add(t.size()).ok_or_else(too_large)?;
            Ok((start, end))
        };

        let mut stack = BitVec::new();
        let mut offset = 0;
        if let Some(r) = recv {
            stack.push(r.iface_indir() || r.pointers());
            offset += ps;
        }
        for arg in func.inputs() {
            let (start, end) = place(offset, *arg)?;
            add_type_bits(&mut stack, start, arg, ps);
            offset = end;
        }
        let arg_size = offset;
        offset = align_up(offset, ps).ok_or_else(too_large)?;
        let ret_offset = offset;
        for res in func.outputs() {
            let (start, end) = place(offset, *res)?;
            add_type_bits(&mut stack, start, res, ps);
            offset = end;
        }
        offset = align_up(offset, ps).ok_or_else(too_large)?;

        let s = match recv {
            Some(r) => format!("methodargs({r})({func})"),
            None => format!("funcargs({func})"),
        };
        #[expect(clippy::cast_possible_truncation, reason = "ptr_size is 4 or 8")]
        let align = ps as u8;
        let frame = TypeDesc {
            size: offset,
            ptr_bytes: stack.len() * ps,
            hash: fnv1(FNV_BASIS, s.as_bytes()),
            flags: TypeFlags::empty(),
            align,
            field_align: align,
            kind: Kind::Struct,
            equal: None,
            gc: if stack.is_empty() {
                GcData::Empty
            } else {
                GcData::Mask(stack.clone())
            },
            str: Name::plain(&s)?,
            uncommon: None,
            ptr_to_this: OnceLock::new(),
            ext: TypeExt::Struct {
                pkg_path: None,
                fields: Box::new([]),
            },
        };

        let layout = Arc::new(FrameLayout {
            frame,
            arg_size,
            ret_offset,
            stack,
            hooks: Arc::clone(&self.hooks),
            pool: Mutex::new(Vec::new()),
        });
        let entry = self.layouts.entry(key).or_insert_with(|| {
            debug!(frame = %s, size = offset, "frame layout computed");
            layout
        });
        Ok(Arc::clone(&entry))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
