//! GC pointer-map computation.
//!
//! Pointer maps are built bottom-up from already-published descriptors:
//! a literal [`BitVec`] when the map is small, a [`GcProgram`] when it is
//! large or its parts already carry programs.

use reflex_ir::{ensure_sufficient_stack, BitVec, Kind, ProgramWriter};

use crate::config::RegistryConfig;
use crate::desc::{FieldDesc, GcData, TypeDesc, TypeExt};

/// Mask whose first `words` words are all pointers.
pub(crate) fn pointer_mask(words: usize) -> GcData {
    let mut bv = BitVec::new();
    for _ in 0..words {
        bv.push(true);
    }
    GcData::Mask(bv)
}

/// Append the pointer bits of a `t` stored at byte `offset`.
pub(crate) fn add_type_bits(bv: &mut BitVec, offset: usize, t: &TypeDesc, ptr_size: usize) {
    if t.ptr_bytes == 0 {
        return;
    }

    match t.kind {
        Kind::Chan
        | Kind::Func
        | Kind::Map
        | Kind::Pointer
        | Kind::Slice
        | Kind::String
        | Kind::UnsafePointer => {
            bv.pad_to(offset / ptr_size);
            bv.push(true);
        }
        Kind::Interface => {
            bv.pad_to(offset / ptr_size);
            bv.push(true);
            bv.push(true);
        }
        Kind::Array => ensure_sufficient_stack(|| {
            let elem = t.elem();
            for i in 0..t.len() {
                add_type_bits(bv, offset + i * elem.size, &elem, ptr_size);
            }
        }),
        Kind::Struct => {
            if let TypeExt::Struct { fields, .. } = &t.ext {
                add_field_bits(bv, offset, fields, ptr_size);
            }
        }
        _ => {}
    }
}

/// Append the pointer bits of struct fields laid out from byte `offset`.
pub(crate) fn add_field_bits(bv: &mut BitVec, offset: usize, fields: &[FieldDesc], ptr_size: usize) {
    ensure_sufficient_stack(|| {
        for f in fields {
            add_type_bits(bv, offset + f.offset, &f.typ, ptr_size);
        }
    });
}

/// Stamp `n` consecutive copies of `elem`'s mask into `out` starting at
/// word `base`.
///
/// `elem` must carry a literal mask.
pub(crate) fn emit_mask(out: &mut BitVec, base: usize, elem: &TypeDesc, n: usize, ptr_size: usize) {
    let Some(mask) = elem.gc.mask() else {
        return;
    };
    let ptrs = elem.ptr_bytes / ptr_size;
    let words = elem.size / ptr_size;
    for j in 0..ptrs {
        if mask.get(j) {
            for i in 0..n {
                out.set(base + i * words + j);
            }
        }
    }
}

/// Append instructions that emit the pointer bits of one `t`.
pub(crate) fn append_prog(w: &mut ProgramWriter, t: &TypeDesc, cfg: &RegistryConfig) {
    match &t.gc {
        GcData::Program(prog) => {
            w.append_program(prog);
        }
        GcData::Mask(mask) => {
            w.literal(mask.as_bytes(), t.ptr_bytes / cfg.ptr_size, cfg.prog_chunk_bits);
        }
        GcData::Empty => {}
    }
}

/// Pointer map of `[n]elem`, returned with the array's pointer-prefix
/// length.
pub(crate) fn array_gc(elem: &TypeDesc, n: usize, size: usize, cfg: &RegistryConfig) -> (GcData, usize) {
    let ps = cfg.ptr_size;
    if elem.ptr_bytes == 0 || size == 0 {
        return (GcData::Empty, 0);
    }
    if n == 1 {
        // One element has exactly the element's layout.
        return (elem.gc.clone(), elem.ptr_bytes);
    }

    if !elem.gc.is_program() && size <= cfg.max_ptrmask_bytes * 8 * ps {
        let ptr_bytes = elem.size * (n - 1) + elem.ptr_bytes;
        let mut mask = BitVec::new();
        emit_mask(&mut mask, 0, elem, n, ps);
        mask.pad_to(ptr_bytes / ps);
        return (GcData::Mask(mask), ptr_bytes);
    }

    // Emit one element, pad it to a whole element, then repeat n-1 times.
    let mut w = ProgramWriter::new();
    append_prog(&mut w, elem, cfg);
    let elem_ptrs = elem.ptr_bytes / ps;
    let elem_words = elem.size / ps;
    if elem_ptrs < elem_words {
        w.pad_words(elem_words - elem_ptrs);
    }
    w.repeat(elem_words, n - 1);
    (GcData::Program(w.finish()), size)
}

/// Pointer-prefix length of a struct with these fields.
pub(crate) fn struct_ptr_bytes(fields: &[FieldDesc]) -> usize {
    fields
        .iter()
        .rev()
        .find(|f| f.typ.pointers())
        .map_or(0, |f| f.offset + f.typ.ptr_bytes)
}

/// Pointer map of a struct with these fields.
pub(crate) fn struct_gc(fields: &[FieldDesc], cfg: &RegistryConfig) -> GcData {
    if struct_ptr_bytes(fields) == 0 {
        return GcData::Empty;
    }

    if !fields.iter().any(|f| f.typ.gc.is_program()) {
        let mut bv = BitVec::new();
        add_field_bits(&mut bv, 0, fields, cfg.ptr_size);
        return GcData::Mask(bv);
    }

    let mut w = ProgramWriter::new();
    let mut off = 0;
    for f in fields.iter().filter(|f| f.typ.pointers()) {
        if f.offset > off {
            w.pad_words((f.offset - off) / cfg.ptr_size);
            off = f.offset;
        }
        append_prog(&mut w, &f.typ, cfg);
        off += f.typ.ptr_bytes;
    }
    GcData::Program(w.finish())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
