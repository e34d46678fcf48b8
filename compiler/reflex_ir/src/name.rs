//! Compact encoding of an identifier with optional tag and package path.
//!
//! A `Name` is a single byte blob:
//!
//! ```text
//! [flags] [len_hi len_lo] [text ...]
//!         [tag_len_hi tag_len_lo] [tag ...]    (if flags & HAS_TAG)
//!         [pkg_len_hi pkg_len_lo] [pkg ...]    (if flags & HAS_PKG_PATH)
//! ```
//!
//! `flags` bit 0 marks an exported identifier. Lengths are big-endian `u16`,
//! so no component may exceed [`MAX_NAME_LEN`] bytes. All components are
//! UTF-8; this is checked once at construction so the accessors never fail.

use std::fmt;

/// Longest text, tag or package path a `Name` can hold.
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

const EXPORTED: u8 = 1 << 0;
const HAS_TAG: u8 = 1 << 1;
const HAS_PKG_PATH: u8 = 1 << 2;

/// Error building or decoding a `Name`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name too long: {len} bytes (max {MAX_NAME_LEN})")]
    TextTooLong { len: usize },
    #[error("tag too long: {len} bytes (max {MAX_NAME_LEN})")]
    TagTooLong { len: usize },
    #[error("package path too long: {len} bytes (max {MAX_NAME_LEN})")]
    PkgPathTooLong { len: usize },
    #[error("name blob truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
    #[error("name blob has {extra} trailing bytes")]
    TrailingBytes { extra: usize },
    #[error("name blob component is not valid UTF-8")]
    InvalidUtf8,
}

/// Decoded view of a `Name`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NameParts<'a> {
    pub text: &'a str,
    pub tag: &'a str,
    pub exported: bool,
    pub pkg_path: Option<&'a str>,
}

/// Encoded identifier + tag + owning package path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Name(Box<[u8]>);

/// Byte ranges of the components inside a blob.
#[derive(Copy, Clone)]
struct Spans {
    text: (usize, usize),
    tag: (usize, usize),
    pkg: Option<(usize, usize)>,
}

impl Name {
    /// Encode `text` with an optional tag and declaring package path.
    ///
    /// An empty `tag` is not stored.
    pub fn new(
        text: &str,
        tag: &str,
        exported: bool,
        pkg_path: Option<&str>,
    ) -> Result<Self, NameError> {
        if text.len() > MAX_NAME_LEN {
            return Err(NameError::TextTooLong { len: text.len() });
        }
        if tag.len() > MAX_NAME_LEN {
            return Err(NameError::TagTooLong { len: tag.len() });
        }
        if let Some(pkg) = pkg_path {
            if pkg.len() > MAX_NAME_LEN {
                return Err(NameError::PkgPathTooLong { len: pkg.len() });
            }
        }

        let mut flags = 0u8;
        let mut len = 3 + text.len();
        if exported {
            flags |= EXPORTED;
        }
        if !tag.is_empty() {
            flags |= HAS_TAG;
            len += 2 + tag.len();
        }
        if let Some(pkg) = pkg_path {
            flags |= HAS_PKG_PATH;
            len += 2 + pkg.len();
        }

        let mut bytes = Vec::with_capacity(len);
        bytes.push(flags);
        push_component(&mut bytes, text);
        if !tag.is_empty() {
            push_component(&mut bytes, tag);
        }
        if let Some(pkg) = pkg_path {
            push_component(&mut bytes, pkg);
        }
        Ok(Name(bytes.into_boxed_slice()))
    }

    /// Encode a plain identifier: not exported, no tag, no package path.
    ///
    /// Used for descriptor string forms.
    pub fn plain(text: &str) -> Result<Self, NameError> {
        Self::new(text, "", false, None)
    }

    /// Decode and validate a blob produced by [`Name::as_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NameError> {
        let spans = Self::scan(bytes)?;
        for (start, len) in [Some(spans.text), Some(spans.tag), spans.pkg]
            .into_iter()
            .flatten()
        {
            std::str::from_utf8(&bytes[start..start + len]).map_err(|_| NameError::InvalidUtf8)?;
        }
        Ok(Name(bytes.into()))
    }

    /// The encoded blob.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn is_exported(&self) -> bool {
        self.0[0] & EXPORTED != 0
    }

    #[inline]
    pub fn has_tag(&self) -> bool {
        self.0[0] & HAS_TAG != 0
    }

    /// Length of the identifier text in bytes.
    #[inline]
    pub fn text_len(&self) -> usize {
        read_len(&self.0, 1)
    }

    /// Length of the tag in bytes (0 if absent).
    pub fn tag_len(&self) -> usize {
        if self.has_tag() {
            read_len(&self.0, 3 + self.text_len())
        } else {
            0
        }
    }

    pub fn text(&self) -> &str {
        self.str_at(3, self.text_len())
    }

    /// The tag, or `""` if none was stored.
    pub fn tag(&self) -> &str {
        if !self.has_tag() {
            return "";
        }
        self.str_at(3 + self.text_len() + 2, self.tag_len())
    }

    /// Package path recorded for an unexported identifier.
    pub fn pkg_path(&self) -> Option<&str> {
        if self.0[0] & HAS_PKG_PATH == 0 {
            return None;
        }
        let mut off = 3 + self.text_len();
        if self.has_tag() {
            off += 2 + self.tag_len();
        }
        Some(self.str_at(off + 2, read_len(&self.0, off)))
    }

    pub fn parts(&self) -> NameParts<'_> {
        NameParts {
            text: self.text(),
            tag: self.tag(),
            exported: self.is_exported(),
            pkg_path: self.pkg_path(),
        }
    }

    /// Blobs are validated on construction, so this slice is always UTF-8.
    fn str_at(&self, start: usize, len: usize) -> &str {
        std::str::from_utf8(&self.0[start..start + len]).unwrap_or_default()
    }

    fn scan(bytes: &[u8]) -> Result<Spans, NameError> {
        let need = |need: usize| -> Result<(), NameError> {
            if bytes.len() < need {
                Err(NameError::Truncated {
                    need,
                    have: bytes.len(),
                })
            } else {
                Ok(())
            }
        };

        need(3)?;
        let flags = bytes[0];
        let text_len = read_len(bytes, 1);
        let mut off = 3 + text_len;
        need(off)?;
        let text = (3, text_len);

        let mut tag = (off, 0);
        if flags & HAS_TAG != 0 {
            need(off + 2)?;
            let len = read_len(bytes, off);
            need(off + 2 + len)?;
            tag = (off + 2, len);
            off += 2 + len;
        }

        let mut pkg = None;
        if flags & HAS_PKG_PATH != 0 {
            need(off + 2)?;
            let len = read_len(bytes, off);
            need(off + 2 + len)?;
            pkg = Some((off + 2, len));
            off += 2 + len;
        }

        if off != bytes.len() {
            return Err(NameError::TrailingBytes {
                extra: bytes.len() - off,
            });
        }
        Ok(Spans { text, tag, pkg })
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "callers check lengths against MAX_NAME_LEN"
)]
fn push_component(bytes: &mut Vec<u8>, s: &str) {
    let len = s.len() as u16;
    bytes.extend_from_slice(&len.to_be_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

#[inline]
fn read_len(bytes: &[u8], off: usize) -> usize {
    usize::from(u16::from_be_bytes([bytes[off], bytes[off + 1]]))
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Name");
        d.field("text", &self.text());
        if self.has_tag() {
            d.field("tag", &self.tag());
        }
        d.field("exported", &self.is_exported());
        if let Some(pkg) = self.pkg_path() {
            d.field("pkg_path", &pkg);
        }
        d.finish()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
