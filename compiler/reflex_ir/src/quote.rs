//! Go-syntax string literal quoting.
//!
//! String forms render struct tags as double-quoted literals, and tag values
//! are double-quoted literals that must be unescaped on lookup. Both
//! directions follow Go's escape grammar.

use std::fmt::Write as _;

/// Error unquoting a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnquoteError {
    #[error("literal is not enclosed in matching quotes")]
    Unterminated,
    #[error("invalid escape sequence at byte {0}")]
    BadEscape(usize),
    #[error("literal contains a raw newline or quote at byte {0}")]
    BadChar(usize),
    #[error("character literal must hold exactly one character")]
    BadCharLiteral,
    #[error("unquoted bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Render `s` as a double-quoted Go string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0b' => out.push_str("\\v"),
            c if u32::from(c) < 0x20 || c == '\x7f' => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c if c.is_control() => {
                let v = u32::from(c);
                if v < 0x1_0000 {
                    let _ = write!(out, "\\u{v:04x}");
                } else {
                    let _ = write!(out, "\\U{v:08x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Interpret `s` as a Go string, raw string or character literal and return
/// the value it denotes.
pub fn unquote(s: &str) -> Result<String, UnquoteError> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return Err(UnquoteError::Unterminated);
    }
    let q = bytes[0];
    if q != bytes[bytes.len() - 1] {
        return Err(UnquoteError::Unterminated);
    }
    let body = &s[1..s.len() - 1];

    match q {
        b'`' => {
            if body.contains('`') {
                return Err(UnquoteError::BadChar(1 + body.find('`').unwrap_or(0)));
            }
            // Raw strings drop carriage returns.
            Ok(body.replace('\r', ""))
        }
        b'"' | b'\'' => {
            let out = unescape(body, q)?;
            if q == b'\'' && out.chars().count() != 1 {
                return Err(UnquoteError::BadCharLiteral);
            }
            Ok(out)
        }
        _ => Err(UnquoteError::Unterminated),
    }
}

fn unescape(body: &str, quote: u8) -> Result<String, UnquoteError> {
    if !body.contains('\\') && !body.contains(char::from(quote)) && !body.contains('\n') {
        return Ok(body.to_owned());
    }

    let bytes = body.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == quote || b == b'\n' {
            return Err(UnquoteError::BadChar(i + 1));
        }
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }

        let at = i + 1;
        let Some(&e) = bytes.get(i + 1) else {
            return Err(UnquoteError::BadEscape(at));
        };
        i += 2;
        let simple = match e {
            b'a' => Some(0x07),
            b'b' => Some(0x08),
            b'f' => Some(0x0c),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            b'v' => Some(0x0b),
            b'\\' => Some(b'\\'),
            b'\'' | b'"' if e == quote => Some(e),
            _ => None,
        };
        if let Some(v) = simple {
            out.push(v);
            continue;
        }

        match e {
            b'x' => {
                let v = hex(bytes, i, 2).ok_or(UnquoteError::BadEscape(at))?;
                out.push(u8::try_from(v).map_err(|_| UnquoteError::BadEscape(at))?);
                i += 2;
            }
            b'u' | b'U' => {
                let n = if e == b'u' { 4 } else { 8 };
                let v = hex(bytes, i, n).ok_or(UnquoteError::BadEscape(at))?;
                let c = char::from_u32(v).ok_or(UnquoteError::BadEscape(at))?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                i += n;
            }
            b'0'..=b'7' => {
                let digits = bytes.get(i - 1..i + 2).ok_or(UnquoteError::BadEscape(at))?;
                let mut v: u32 = 0;
                for &d in digits {
                    if !(b'0'..=b'7').contains(&d) {
                        return Err(UnquoteError::BadEscape(at));
                    }
                    v = v * 8 + u32::from(d - b'0');
                }
                out.push(u8::try_from(v).map_err(|_| UnquoteError::BadEscape(at))?);
                i += 2;
            }
            _ => return Err(UnquoteError::BadEscape(at)),
        }
    }
    String::from_utf8(out).map_err(|_| UnquoteError::InvalidUtf8)
}

fn hex(bytes: &[u8], start: usize, n: usize) -> Option<u32> {
    let digits = bytes.get(start..start + n)?;
    digits.iter().try_fold(0u32, |acc, &d| {
        let v = char::from(d).to_digit(16)?;
        Some(acc * 16 + v)
    })
}

#[cfg(test)]
mod tests;
