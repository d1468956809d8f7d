//! Error types produced by extraction, synthesis and rendering.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting metadata or rendering a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PrettyconfError {
    /// The declaration provider could not resolve a package path.
    #[error("package '{package}' could not be found")]
    PackageNotFound {
        /// Requested package path.
        package: String,
    },

    /// A record type referenced during synthesis is missing from the catalog.
    #[error("type {package}.{name} could not be found")]
    TypeNotFound {
        /// Package that should declare the type.
        package: String,
        /// Declared type name.
        name: String,
    },

    /// A field's declared type could not be resolved to a concrete identity.
    #[error("cannot resolve type '{type_name}' of field {package}.{owner}.{field}: {message}")]
    TypeResolution {
        /// Package declaring the field.
        package: String,
        /// Record type owning the field.
        owner: String,
        /// Declared field name.
        field: String,
        /// Display form of the unresolved type.
        type_name: String,
        /// Why resolution failed.
        message: String,
    },

    /// An annotation value could not be unescaped.
    #[error("failed to parse struct tag `{tag}`: {message}")]
    MalformedAnnotation {
        /// Raw annotation string.
        tag: String,
        /// Unescaping failure detail.
        message: String,
    },

    /// The instance tree carries a key that no field of the type serializes to.
    #[error("failed to find field {key} in type {package}.{type_name}")]
    FieldNotFound {
        /// Offending mapping key.
        key: String,
        /// Package declaring the type.
        package: String,
        /// Record type name.
        type_name: String,
    },

    /// Zero-fill cannot classify a field's type.
    #[error("failed to set zero property value for {field}: unhandled field type {type_name}")]
    UnsupportedFieldType {
        /// Declared field name.
        field: String,
        /// Display form of the field type.
        type_name: String,
    },

    /// A record type nests itself.
    #[error("cyclic type nesting detected: {cycle}")]
    CyclicType {
        /// Chain of types participating in the cycle.
        cycle: String,
    },

    /// A record-typed field holds something other than a mapping.
    #[error("field {field} of type {type_name} holds a {found}, expected a mapping")]
    UnexpectedNode {
        /// Serialized key of the field.
        field: String,
        /// Record type owning the field.
        type_name: String,
        /// Kind of node that was found.
        found: &'static str,
    },

    /// A Rust source file could not be parsed.
    #[error("failed to parse source file '{path}': {source}")]
    Source {
        /// File that failed to parse.
        path: Utf8PathBuf,
        /// Underlying parser error.
        #[source]
        source: syn::Error,
    },

    /// A declaration manifest or instance document could not be decoded.
    #[error("failed to decode '{path}': {message}")]
    Decode {
        /// Document that failed to decode.
        path: Utf8PathBuf,
        /// Decoder error message.
        message: String,
    },

    /// Filesystem access failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The rendered document could not be written to its sink.
    #[error("failed to write rendered document: {0}")]
    Write(#[source] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type PrettyconfResult<T> = Result<T, PrettyconfError>;

impl PrettyconfError {
    pub(crate) fn package_not_found(package: impl Into<String>) -> Self {
        Self::PackageNotFound {
            package: package.into(),
        }
    }

    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<Utf8PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
