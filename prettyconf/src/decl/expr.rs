//! Unresolved type expressions and their canonical string form.
//!
//! The grammar is small: `*T` for an optional reference, `[]T` for a
//! sequence, `map[K]V` for a mapping, a bare identifier for a builtin or a
//! type in the declaring package, and `path/to/pkg.Name` for a type declared
//! in another package.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A syntactic type reference as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    /// A builtin type or a type declared in the same package.
    Ident(String),
    /// A type declared in another package.
    Qualified {
        /// Package path declaring the type.
        package: String,
        /// Declared type name.
        name: String,
    },
    /// An optional reference to the element type.
    Pointer(Box<TypeExpr>),
    /// An ordered sequence of the element type.
    Slice(Box<TypeExpr>),
    /// A mapping from key type to value type.
    Map(Box<TypeExpr>, Box<TypeExpr>),
}

impl TypeExpr {
    /// Shorthand for [`TypeExpr::Ident`].
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    /// Shorthand for [`TypeExpr::Qualified`].
    #[must_use]
    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Qualified {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Wraps `self` in an optional reference.
    #[must_use]
    pub fn pointer(self) -> Self {
        Self::Pointer(Box::new(self))
    }

    /// Wraps `self` in a sequence.
    #[must_use]
    pub fn slice(self) -> Self {
        Self::Slice(Box::new(self))
    }

    /// Builds a mapping type.
    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => f.write_str(name),
            Self::Qualified { package, name } => write!(f, "{package}.{name}"),
            Self::Pointer(elem) => write!(f, "*{elem}"),
            Self::Slice(elem) => write!(f, "[]{elem}"),
            Self::Map(key, value) => write!(f, "map[{key}]{value}"),
        }
    }
}

/// Failure to parse a type expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type expression '{input}': {message}")]
pub struct TypeExprError {
    input: String,
    message: &'static str,
}

impl FromStr for TypeExpr {
    type Err = TypeExprError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |message| TypeExprError {
            input: input.to_owned(),
            message,
        };
        let (expr, rest) = parse_expr(input.trim()).map_err(fail)?;
        if !rest.is_empty() {
            return Err(fail("unexpected trailing input"));
        }
        Ok(expr)
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = TypeExprError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeExpr> for String {
    fn from(value: TypeExpr) -> Self {
        value.to_string()
    }
}

fn parse_expr(input: &str) -> Result<(TypeExpr, &str), &'static str> {
    if let Some(rest) = input.strip_prefix('*') {
        let (elem, rest) = parse_expr(rest)?;
        return Ok((elem.pointer(), rest));
    }
    if let Some(rest) = input.strip_prefix("[]") {
        let (elem, rest) = parse_expr(rest)?;
        return Ok((elem.slice(), rest));
    }
    if let Some(rest) = input.strip_prefix("map[") {
        let (key, rest) = parse_expr(rest)?;
        let rest = rest.strip_prefix(']').ok_or("unterminated map key")?;
        let (value, rest) = parse_expr(rest)?;
        return Ok((TypeExpr::map(key, value), rest));
    }
    parse_name(input)
}

fn parse_name(input: &str) -> Result<(TypeExpr, &str), &'static str> {
    let end = input
        .find(|c: char| c == ']' || c.is_whitespace())
        .unwrap_or(input.len());
    let (name, rest) = input.split_at(end);
    if name.is_empty() {
        return Err("missing type name");
    }
    if name.contains(['[', '*']) {
        return Err("unexpected bracket in type name");
    }
    let expr = match name.rsplit_once('.') {
        Some((package, ident)) if !package.is_empty() && !ident.is_empty() => {
            TypeExpr::qualified(package, ident)
        }
        Some(_) => return Err("malformed qualified name"),
        None => TypeExpr::ident(name),
    };
    Ok((expr, rest))
}
