//! Pointer bitmaps and GC programs.
//!
//! A value's pointer map has one bit per machine word: bit `i` is set when
//! word `i` holds a pointer. Small types carry the bitmap itself. Large or
//! repetitive types carry a *program* that generates it:
//!
//! ```text
//! 00000000              stop
//! 0nnnnnnn b...         emit n literal bits from the next ceil(n/8) bytes
//! 1nnnnnnn c            repeat the previous n bits c more times (c varint)
//! 10000000 n c          same, with n as a varint
//! ```
//!
//! A finished program is prefixed with its body length as a little-endian
//! `u32`.

use std::fmt;

use smallvec::SmallVec;

/// Growable bit vector, least significant bit first within each byte.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitVec {
    len: usize,
    data: SmallVec<[u8; 16]>,
}

impl BitVec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A vector of `len` bits taken from a packed mask.
    pub fn from_mask(mask: &[u8], len: usize) -> Self {
        let mut bv = BitVec::new();
        for i in 0..len {
            bv.push(mask_bit(mask, i));
        }
        bv
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            self.data[self.len / 8] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    /// Append zero bits until the vector holds `len` bits.
    pub fn pad_to(&mut self, len: usize) {
        while self.len < len {
            self.push(false);
        }
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        i < self.len && mask_bit(&self.data, i)
    }

    /// Set bit `i`, growing the vector with zeros as needed.
    pub fn set(&mut self, i: usize) {
        self.pad_to(i + 1);
        self.data[i / 8] |= 1 << (i % 8);
    }

    /// Packed bytes, `ceil(len / 8)` long.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Number of bits up to and including the last set bit.
    pub fn trimmed_len(&self) -> usize {
        (0..self.len).rev().find(|&i| self.get(i)).map_or(0, |i| i + 1)
    }
}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BitVec(")?;
        for i in 0..self.len {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        f.write_str(")")
    }
}

#[inline]
fn mask_bit(mask: &[u8], i: usize) -> bool {
    mask.get(i / 8).is_some_and(|b| b >> (i % 8) & 1 != 0)
}

/// Append `v` as an unsigned LEB128 varint.
#[expect(clippy::cast_possible_truncation, reason = "each byte carries 7 bits")]
pub fn append_varint(dst: &mut Vec<u8>, mut v: usize) {
    while v >= 0x80 {
        dst.push((v & 0x7f) as u8 | 0x80);
        v >>= 7;
    }
    dst.push(v as u8);
}

/// Error interpreting a GC program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("program shorter than its 4-byte length prefix")]
    MissingPrefix,
    #[error("length prefix says {prefix} bytes, body has {body}")]
    LengthMismatch { prefix: usize, body: usize },
    #[error("program ends without a stop opcode")]
    Truncated,
    #[error("varint overflows usize at byte {0}")]
    VarintOverflow(usize),
    #[error("repeat of {n} bits with only {have} bits emitted")]
    BadRepeat { n: usize, have: usize },
    #[error("program expands past {limit} bits")]
    TooLarge { limit: usize },
}

/// Length-prefixed GC program.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GcProgram(Box<[u8]>);

impl GcProgram {
    /// Wrap an encoded program, checking its length prefix.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProgramError> {
        let prefix = read_prefix(bytes)?;
        let body = bytes.len() - 4;
        if prefix != body {
            return Err(ProgramError::LengthMismatch { prefix, body });
        }
        Ok(GcProgram(bytes.into()))
    }

    /// Full encoding including the length prefix.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Opcodes after the prefix, including the stop byte.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.0[4..]
    }

    /// Opcodes without the trailing stop byte, for splicing into another
    /// program.
    #[inline]
    pub fn instructions(&self) -> &[u8] {
        let body = self.body();
        &body[..body.len().saturating_sub(1)]
    }

    /// Run the program and return the bitmap it describes.
    ///
    /// Fails with [`ProgramError::TooLarge`] instead of materialising more
    /// than `limit` bits.
    pub fn expand(&self, limit: usize) -> Result<BitVec, ProgramError> {
        let prog = self.body();
        let mut bits = BitVec::new();
        let mut pos = 0;
        loop {
            let op = *prog.get(pos).ok_or(ProgramError::Truncated)?;
            pos += 1;
            if op == 0 {
                return Ok(bits);
            }

            if op & 0x80 == 0 {
                let n = usize::from(op);
                let nbytes = n.div_ceil(8);
                let lit = prog.get(pos..pos + nbytes).ok_or(ProgramError::Truncated)?;
                pos += nbytes;
                if bits.len() + n > limit {
                    return Err(ProgramError::TooLarge { limit });
                }
                for i in 0..n {
                    bits.push(mask_bit(lit, i));
                }
                continue;
            }

            let mut n = usize::from(op & 0x7f);
            if n == 0 {
                n = read_varint(prog, &mut pos)?;
            }
            let count = read_varint(prog, &mut pos)?;
            if n == 0 || n > bits.len() {
                return Err(ProgramError::BadRepeat {
                    n,
                    have: bits.len(),
                });
            }
            let total = n
                .checked_mul(count)
                .and_then(|t| t.checked_add(bits.len()))
                .ok_or(ProgramError::TooLarge { limit })?;
            if total > limit {
                return Err(ProgramError::TooLarge { limit });
            }
            let start = bits.len() - n;
            for _ in 0..count {
                for i in 0..n {
                    bits.push(bits.get(start + i));
                }
            }
        }
    }
}

impl fmt::Debug for GcProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GcProgram({:02x?})", self.body())
    }
}

fn read_prefix(bytes: &[u8]) -> Result<usize, ProgramError> {
    let prefix: [u8; 4] = bytes
        .get(..4)
        .and_then(|p| p.try_into().ok())
        .ok_or(ProgramError::MissingPrefix)?;
    Ok(u32::from_le_bytes(prefix) as usize)
}

fn read_varint(prog: &[u8], pos: &mut usize) -> Result<usize, ProgramError> {
    let start = *pos;
    let mut v: usize = 0;
    let mut shift = 0u32;
    loop {
        let b = *prog.get(*pos).ok_or(ProgramError::Truncated)?;
        *pos += 1;
        if shift >= usize::BITS {
            return Err(ProgramError::VarintOverflow(start));
        }
        v |= usize::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            return Ok(v);
        }
        shift += 7;
    }
}

/// Incremental GC program encoder.
#[derive(Debug, Clone)]
pub struct ProgramWriter {
    buf: Vec<u8>,
}

impl Default for ProgramWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramWriter {
    pub fn new() -> Self {
        ProgramWriter {
            buf: vec![0, 0, 0, 0],
        }
    }

    /// Splice another program's instructions (without its stop byte).
    pub fn append_program(&mut self, prog: &GcProgram) -> &mut Self {
        self.buf.extend_from_slice(prog.instructions());
        self
    }

    /// Emit `nbits` bits of `mask` as literal chunks of at most
    /// `chunk_bits` bits. `chunk_bits` must be a multiple of 8 below 128.
    #[expect(clippy::cast_possible_truncation, reason = "chunk sizes are below 128")]
    pub fn literal(&mut self, mask: &[u8], mut nbits: usize, chunk_bits: usize) -> &mut Self {
        if nbits == 0 {
            return self;
        }
        let chunk_bytes = chunk_bits / 8;
        let mut mask = mask;
        while nbits > chunk_bits {
            self.buf.push(chunk_bits as u8);
            self.buf.extend_from_slice(&mask[..chunk_bytes]);
            mask = &mask[chunk_bytes..];
            nbits -= chunk_bits;
        }
        self.buf.push(nbits as u8);
        self.buf.extend_from_slice(&mask[..nbits.div_ceil(8).min(mask.len())]);
        self
    }

    /// Emit `words` zero bits.
    pub fn pad_words(&mut self, words: usize) -> &mut Self {
        if words == 0 {
            return self;
        }
        self.buf.extend_from_slice(&[0x01, 0x00]);
        if words > 1 {
            self.buf.push(0x81);
            append_varint(&mut self.buf, words - 1);
        }
        self
    }

    /// Repeat the last `words` bits `count` more times.
    #[expect(clippy::cast_possible_truncation, reason = "checked against 0x80")]
    pub fn repeat(&mut self, words: usize, count: usize) -> &mut Self {
        if words < 0x80 {
            self.buf.push(words as u8 | 0x80);
        } else {
            self.buf.push(0x80);
            append_varint(&mut self.buf, words);
        }
        append_varint(&mut self.buf, count);
        self
    }

    /// Terminate the program and fill in its length prefix.
    #[expect(clippy::cast_possible_truncation, reason = "programs are far smaller than 4GiB")]
    pub fn finish(mut self) -> GcProgram {
        self.buf.push(0);
        let body = (self.buf.len() - 4) as u32;
        self.buf[..4].copy_from_slice(&body.to_le_bytes());
        GcProgram(self.buf.into_boxed_slice())
    }
}

#[cfg(test)]
mod tests;
