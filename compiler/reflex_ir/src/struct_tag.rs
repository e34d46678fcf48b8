//! Struct field tags.
//!
//! By convention a tag is a space-separated list of `key:"value"` pairs,
//! where each value is a double-quoted Go string literal. Parsing stops at
//! the first malformed pair; keys before it remain visible.

use std::fmt;

use crate::quote::unquote;

/// The tag string attached to a struct field.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructTag(Box<str>);

impl StructTag {
    pub fn new(tag: impl Into<Box<str>>) -> Self {
        StructTag(tag.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value associated with `key`, or `""` if absent.
    pub fn get(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_default()
    }

    /// Value associated with `key`.
    ///
    /// Returns `Some("")` for a key that is present with an empty value and
    /// `None` for a key that is not present.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let mut tag = self.0.as_bytes();
        loop {
            let skip = tag.iter().take_while(|&&b| b == b' ').count();
            tag = &tag[skip..];
            if tag.is_empty() {
                return None;
            }

            // Key: anything up to ':' except space, quote and controls.
            let i = tag
                .iter()
                .take_while(|&&b| b > b' ' && b != b':' && b != b'"' && b != 0x7f)
                .count();
            if i == 0 || i + 1 >= tag.len() || tag[i] != b':' || tag[i + 1] != b'"' {
                return None;
            }
            let name = &tag[..i];
            tag = &tag[i + 1..];

            // Scan the quoted value, honouring backslash escapes.
            let mut j = 1;
            while j < tag.len() && tag[j] != b'"' {
                if tag[j] == b'\\' {
                    j += 1;
                }
                j += 1;
            }
            if j >= tag.len() {
                return None;
            }
            let qvalue = &tag[..=j];
            tag = &tag[j + 1..];

            if name == key.as_bytes() {
                let qvalue = std::str::from_utf8(qvalue).ok()?;
                return unquote(qvalue).ok();
            }
        }
    }
}

impl From<&str> for StructTag {
    fn from(s: &str) -> Self {
        StructTag::new(s)
    }
}

impl fmt::Debug for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructTag({:?})", &*self.0)
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests;
