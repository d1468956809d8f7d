//! Extracted metadata catalog.
//!
//! The catalog is keyed by [`TypeId`] (package path plus type name). Fields
//! refer to nested records through a [`TypeRef`] holding that identity, and
//! the synthesizer resolves the reference by lookup rather than holding a
//! pointer to the nested [`TypeMetadata`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Identity of a declared type: its package path and name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TypeId {
    /// Path of the declaring package.
    pub package: String,
    /// Declared type name.
    pub name: String,
}

impl TypeId {
    /// Builds an identity from its parts.
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// Width and signedness of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntKind {
    /// Platform-width signed integer.
    Int,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// Platform-width unsigned integer.
    Uint,
    /// 8-bit unsigned integer.
    Uint8,
    /// 16-bit unsigned integer.
    Uint16,
    /// 32-bit unsigned integer.
    Uint32,
    /// 64-bit unsigned integer.
    Uint64,
}

impl IntKind {
    /// Maps a builtin identifier such as `uint16` to its kind.
    #[must_use]
    pub fn from_builtin(name: &str) -> Option<Self> {
        let kind = match name {
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" | "rune" => Self::Int32,
            "int64" => Self::Int64,
            "uint" | "uintptr" => Self::Uint,
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            _ => return None,
        };
        Some(kind)
    }

    /// Builtin name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }
}

/// A resolved type identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// Boolean.
    Bool,
    /// Any integer width.
    Int(IntKind),
    /// Floating point of the given bit width.
    Float(u8),
    /// Text.
    String,
    /// Optional reference to the inner type.
    Optional(Box<TypeRef>),
    /// Ordered sequence.
    Sequence(Box<TypeRef>),
    /// Key to value mapping.
    Mapping(Box<TypeRef>, Box<TypeRef>),
    /// Field record; only appears as the underlying type of [`TypeRef::Named`].
    Record,
    /// A declared type and the type it is defined over.
    Named {
        /// Declared identity.
        id: TypeId,
        /// Resolved underlying type.
        underlying: Box<TypeRef>,
    },
    /// A type with no serializable structure, such as an interface.
    Opaque(String),
}

impl TypeRef {
    /// Identity of the record this type nests, directly or through one
    /// optional level.
    #[must_use]
    pub fn record_id(&self) -> Option<&TypeId> {
        match self {
            Self::Optional(inner) => inner.direct_record_id(),
            other => other.direct_record_id(),
        }
    }

    fn direct_record_id(&self) -> Option<&TypeId> {
        match self {
            Self::Named { id, underlying } if **underlying == Self::Record => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int(kind) => f.write_str(kind.as_str()),
            Self::Float(bits) => write!(f, "float{bits}"),
            Self::String => f.write_str("string"),
            Self::Optional(inner) => write!(f, "*{inner}"),
            Self::Sequence(elem) => write!(f, "[]{elem}"),
            Self::Mapping(key, value) => write!(f, "map[{key}]{value}"),
            Self::Record => f.write_str("struct"),
            Self::Named { id, .. } => write!(f, "{id}"),
            Self::Opaque(name) => f.write_str(name),
        }
    }
}

/// Metadata for one serialized field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMetadata {
    /// Declared field name.
    pub name: String,
    /// Field documentation.
    pub doc: String,
    /// Whether the field embeds another type anonymously.
    pub anonymous: bool,
    /// Key the field is serialized under.
    pub serialized_key: String,
    /// Whether the field is always emitted.
    pub required: bool,
    /// Resolved field type.
    pub type_ref: TypeRef,
    /// Display form of the field type.
    pub type_name: String,
}

impl FieldMetadata {
    /// Documentation phrased against the serialized key.
    ///
    /// Documentation that opens with the declared name followed by a space
    /// has that name replaced with the serialized key. Returns `None` when
    /// the field is undocumented.
    #[must_use]
    pub fn comment(&self) -> Option<String> {
        if self.doc.is_empty() {
            return None;
        }
        let tail = self
            .doc
            .strip_prefix(self.name.as_str())
            .filter(|text| text.starts_with(' '));
        Some(tail.map_or_else(
            || self.doc.clone(),
            |text| format!("{}{text}", self.serialized_key),
        ))
    }
}

/// Metadata for one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMetadata {
    /// Declared type name.
    pub name: String,
    /// Path of the declaring package.
    pub package: String,
    /// Type documentation.
    pub doc: String,
    /// Serialized fields in declaration order.
    pub fields: Vec<FieldMetadata>,
}

impl TypeMetadata {
    /// Identity of the type.
    #[must_use]
    pub fn id(&self) -> TypeId {
        TypeId::new(self.package.clone(), self.name.clone())
    }

    /// Finds the field serialized under `key`.
    #[must_use]
    pub fn field_by_key(&self, key: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|field| field.serialized_key == key)
    }
}

/// Metadata for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    /// Package path.
    pub path: String,
    /// Package documentation.
    pub doc: String,
    /// Record types in declaration order.
    pub types: Vec<TypeMetadata>,
}

impl PackageMetadata {
    /// Finds a type by name.
    #[must_use]
    pub fn type_metadata(&self, name: &str) -> Option<&TypeMetadata> {
        self.types.iter().find(|ty| ty.name == name)
    }
}

/// All packages produced by one extraction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    packages: Vec<PackageMetadata>,
    #[serde(skip)]
    index: BTreeMap<TypeId, (usize, usize)>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package, replacing any earlier package with the same path.
    pub fn insert(&mut self, package: PackageMetadata) {
        if let Some(pos) = self.packages.iter().position(|p| p.path == package.path) {
            if let Some(slot) = self.packages.get_mut(pos) {
                *slot = package;
            }
        } else {
            self.packages.push(package);
        }
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .packages
            .iter()
            .enumerate()
            .flat_map(|(pkg_idx, package)| {
                package
                    .types
                    .iter()
                    .enumerate()
                    .map(move |(type_idx, ty)| (ty.id(), (pkg_idx, type_idx)))
            })
            .collect();
    }

    /// Packages in extraction order.
    #[must_use]
    pub fn packages(&self) -> &[PackageMetadata] {
        &self.packages
    }

    /// Finds a package by path.
    #[must_use]
    pub fn package(&self, path: &str) -> Option<&PackageMetadata> {
        self.packages.iter().find(|package| package.path == path)
    }

    /// Finds a type by identity.
    #[must_use]
    pub fn lookup(&self, id: &TypeId) -> Option<&TypeMetadata> {
        let (pkg_idx, type_idx) = *self.index.get(id)?;
        self.packages.get(pkg_idx)?.types.get(type_idx)
    }

    /// Returns `true` when the catalog holds no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<PackageMetadata> for Catalog {
    fn from_iter<I: IntoIterator<Item = PackageMetadata>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for package in iter {
            catalog.insert(package);
        }
        catalog
    }
}
