//! Declaration-level view of packages consumed by the extractor.
//!
//! A [`DeclarationProvider`] hands out the top-level type declarations of a
//! package in source order, together with their documentation and the raw
//! per-field annotation strings. Three providers ship with the crate:
//!
//! - [`MemoryProvider`] holds declarations built in code.
//! - [`ManifestProvider`] reads declarations from a JSON, YAML or TOML file.
//! - [`SourceProvider`] reads Rust source files and lowers `serde` field
//!   attributes into the annotation language.

mod expr;
mod manifest;
mod source;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PrettyconfError, PrettyconfResult};

pub use expr::{TypeExpr, TypeExprError};
pub use manifest::{Manifest, ManifestProvider};
pub use source::{SourceProvider, normalize_module_path};

/// Supplies the declarations of a package on request.
pub trait DeclarationProvider {
    /// Returns the declarations of the package at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PrettyconfError::PackageNotFound`] when the path cannot be
    /// resolved, or another error when the package cannot be read.
    fn package(&self, path: &str) -> PrettyconfResult<PackageDecl>;

    /// Returns the canonical spelling of a package path.
    ///
    /// The extractor keys the catalog by the canonical path, so callers can
    /// pass shorthand such as `config` for `crate::config`.
    fn canonical_path(&self, path: &str) -> String {
        path.to_owned()
    }
}

/// Top-level declarations of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDecl {
    /// Package path, for example `example.com/app/config` or `crate::config`.
    pub path: String,
    /// Package-level documentation.
    #[serde(default)]
    pub doc: String,
    /// Type declarations in declaration order.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl PackageDecl {
    /// Looks up a declared type by name.
    #[must_use]
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|decl| decl.name == name)
    }
}

/// A named type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Declared type name.
    pub name: String,
    /// Documentation attached to the declaration.
    #[serde(default)]
    pub doc: String,
    /// Explicit visibility; derived from the name when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<bool>,
    /// Underlying shape of the type.
    pub shape: TypeShape,
}

impl TypeDecl {
    /// Returns `true` when the type is visible outside its package.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name, self.exported)
    }
}

/// Underlying shape of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    /// A field record with fields in declaration order.
    Record(Vec<FieldDecl>),
    /// A definition whose underlying type is another type expression.
    Alias(TypeExpr),
    /// A behavioural type with no serializable structure.
    Interface,
}

/// A field inside a record declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Declared field name. Embedded fields use their type name.
    pub name: String,
    /// Documentation attached to the field.
    #[serde(default)]
    pub doc: String,
    /// Whether the field is an anonymous embedding of another type.
    #[serde(default)]
    pub embedded: bool,
    /// Whether the fields of the record type are serialized inline in the
    /// enclosing record instead of under this field's key.
    #[serde(default)]
    pub flatten: bool,
    /// Explicit visibility; derived from the name when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<bool>,
    /// Raw annotation string, for example `json:"port,omitempty"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Declared field type.
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

impl FieldDecl {
    /// Returns `true` when the field is visible outside its package.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name, self.exported)
    }
}

/// Visibility by naming convention: an uppercase first character exports.
fn is_exported(name: &str, explicit: Option<bool>) -> bool {
    explicit.unwrap_or_else(|| name.chars().next().is_some_and(char::is_uppercase))
}

/// Provider backed by declarations held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    packages: BTreeMap<String, PackageDecl>,
}

impl MemoryProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a package, returning the provider for chaining.
    #[must_use]
    pub fn with_package(mut self, package: PackageDecl) -> Self {
        self.insert(package);
        self
    }

    /// Adds or replaces a package.
    pub fn insert(&mut self, package: PackageDecl) {
        self.packages.insert(package.path.clone(), package);
    }
}

impl FromIterator<PackageDecl> for MemoryProvider {
    fn from_iter<I: IntoIterator<Item = PackageDecl>>(iter: I) -> Self {
        let mut provider = Self::new();
        for package in iter {
            provider.insert(package);
        }
        provider
    }
}

impl DeclarationProvider for MemoryProvider {
    fn package(&self, path: &str) -> PrettyconfResult<PackageDecl> {
        self.packages
            .get(path)
            .cloned()
            .ok_or_else(|| PrettyconfError::package_not_found(path))
    }
}
