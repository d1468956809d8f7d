//! Parsing of field annotations written as `key:"value"` pairs.
//!
//! The grammar matches Go struct tags: space separated entries, each a key of
//! printable non-colon, non-quote bytes followed immediately by `:` and a
//! double-quoted string literal. Parsing is lenient about syntax and stops at
//! the first entry it cannot read, returning what it has collected so far.
//! Only a value that fails to unescape is reported as an error.

use std::fmt;

use tracing::warn;

use crate::error::{PrettyconfError, PrettyconfResult};

/// A single `key:"value"` annotation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructTag {
    /// Annotation key, for example `json`.
    pub name: String,
    /// Unescaped annotation value.
    pub value: String,
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.name, self.value)
    }
}

/// Ordered annotation entries. Duplicate keys are retained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructTags(Vec<StructTag>);

impl StructTags {
    /// Returns the first entry named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StructTag> {
        self.0.iter().find(|tag| tag.name == name)
    }

    /// Returns `true` when any entry is named `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the entries in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, StructTag> {
        self.0.iter()
    }

    /// Number of parsed entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no entries were parsed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StructTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("`")?;
        for (idx, tag) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str("`")
    }
}

impl<'a> IntoIterator for &'a StructTags {
    type Item = &'a StructTag;
    type IntoIter = std::slice::Iter<'a, StructTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Interpretation of a `json` annotation value such as `name,omitempty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonTag<'a> {
    /// Explicit key, `None` when the first segment is empty.
    pub name: Option<&'a str>,
    /// Whether an `omitempty` option follows the name.
    pub omit_empty: bool,
}

impl<'a> JsonTag<'a> {
    /// Splits a `json` annotation value on commas.
    #[must_use]
    pub fn parse(value: &'a str) -> Self {
        let mut segments = value.split(',');
        let name = segments.next().filter(|segment| !segment.is_empty());
        let omit_empty = segments.any(|segment| segment == "omitempty");
        Self { name, omit_empty }
    }

    /// Returns `true` when the field is excluded from serialization.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.name == Some("-")
    }
}

/// Parses a raw annotation string into its ordered entries.
///
/// # Errors
///
/// Returns [`PrettyconfError::MalformedAnnotation`] when a quoted value
/// contains an invalid escape sequence.
///
/// # Examples
///
/// ```
/// use prettyconf::tag::parse_struct_tags;
///
/// let tags = parse_struct_tags(r#"json:"port,omitempty" yaml:"port""#).unwrap();
/// assert_eq!(tags.len(), 2);
/// assert_eq!(tags.get("json").map(|t| t.value.as_str()), Some("port,omitempty"));
/// ```
pub fn parse_struct_tags(raw: &str) -> PrettyconfResult<StructTags> {
    let mut tags = Vec::new();
    let mut rest = raw;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        let bytes = rest.as_bytes();

        let key_len = bytes
            .iter()
            .position(|&b| !is_key_byte(b))
            .unwrap_or(bytes.len());
        if key_len == 0
            || bytes.get(key_len) != Some(&b':')
            || bytes.get(key_len + 1) != Some(&b'"')
        {
            warn!(tag = raw, remainder = rest, "stopping at malformed struct tag entry");
            break;
        }
        let Some(name) = rest.get(..key_len) else {
            break;
        };
        let Some(quoted_and_rest) = rest.get(key_len + 1..) else {
            break;
        };

        let Some(quoted_len) = quoted_len(quoted_and_rest.as_bytes()) else {
            warn!(tag = raw, "stopping at unterminated struct tag value");
            break;
        };
        let (Some(quoted), Some(remainder)) = (
            quoted_and_rest.get(..quoted_len),
            quoted_and_rest.get(quoted_len..),
        ) else {
            break;
        };

        let value = unquote(quoted).map_err(|message| PrettyconfError::MalformedAnnotation {
            tag: raw.to_owned(),
            message,
        })?;
        tags.push(StructTag {
            name: name.to_owned(),
            value,
        });
        rest = remainder;
    }
    Ok(StructTags(tags))
}

const fn is_key_byte(b: u8) -> bool {
    b > b' ' && b != b':' && b != b'"' && b != 0x7f
}

/// Length of the leading double-quoted literal including both quotes.
fn quoted_len(bytes: &[u8]) -> Option<usize> {
    let mut idx = 1;
    while let Some(&b) = bytes.get(idx) {
        match b {
            b'"' => return Some(idx + 1),
            b'\\' => idx += 2,
            _ => idx += 1,
        }
    }
    None
}

/// Unescapes a double-quoted string literal using Go literal rules.
fn unquote(quoted: &str) -> Result<String, String> {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| "value is not a quoted string".to_owned())?;
    if !inner.contains('\\') {
        if inner.contains('\n') {
            return Err("newline in quoted value".to_owned());
        }
        return Ok(inner.to_owned());
    }

    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut bytes = inner.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'\n' => return Err("newline in quoted value".to_owned()),
            b'"' => return Err("unescaped quote in quoted value".to_owned()),
            b'\\' => unescape_one(&mut bytes, &mut out)?,
            other => out.push(other),
        }
    }
    String::from_utf8(out).map_err(|_| "escaped value is not valid UTF-8".to_owned())
}

fn unescape_one<I>(bytes: &mut I, out: &mut Vec<u8>) -> Result<(), String>
where
    I: Iterator<Item = u8>,
{
    let Some(escape) = bytes.next() else {
        return Err("trailing backslash".to_owned());
    };
    match escape {
        b'a' => out.push(0x07),
        b'b' => out.push(0x08),
        b'f' => out.push(0x0c),
        b'n' => out.push(b'\n'),
        b'r' => out.push(b'\r'),
        b't' => out.push(b'\t'),
        b'v' => out.push(0x0b),
        b'\\' => out.push(b'\\'),
        b'"' => out.push(b'"'),
        b'x' => {
            let value = read_radix(bytes, 2, 16)?;
            out.push(u8::try_from(value).map_err(|_| "hex escape out of range".to_owned())?);
        }
        b'0'..=b'7' => {
            let tail = read_radix(bytes, 2, 8)?;
            let value = u32::from(escape - b'0') * 64 + tail;
            out.push(u8::try_from(value).map_err(|_| "octal escape out of range".to_owned())?);
        }
        b'u' | b'U' => {
            let digits = if escape == b'u' { 4 } else { 8 };
            let value = read_radix(bytes, digits, 16)?;
            let ch = char::from_u32(value)
                .ok_or_else(|| format!("invalid unicode escape {value:#x}"))?;
            let mut buf = [0_u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
        other => return Err(format!("unknown escape sequence \\{}", char::from(other))),
    }
    Ok(())
}

fn read_radix<I>(bytes: &mut I, digits: usize, radix: u32) -> Result<u32, String>
where
    I: Iterator<Item = u8>,
{
    let mut value: u32 = 0;
    for _ in 0..digits {
        let digit = bytes
            .next()
            .and_then(|b| char::from(b).to_digit(radix))
            .ok_or_else(|| format!("malformed base-{radix} escape"))?;
        value = value * radix + digit;
    }
    Ok(value)
}

#[cfg(test)]
mod tests;
