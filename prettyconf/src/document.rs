//! Format-specific decoding of declaration manifests and instance documents.

use camino::Utf8Path;
use serde::de::DeserializeOwned;

use crate::error::{PrettyconfError, PrettyconfResult};

/// Structured document formats accepted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON documents.
    Json,
    /// YAML documents, decoded with `serde-saphyr`.
    Yaml,
    /// TOML documents.
    Toml,
}

impl DocumentFormat {
    /// Chooses a format from the file extension, defaulting to JSON.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("yaml" | "yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    /// Decodes `contents` into `T`; `path` is only used for error context.
    ///
    /// # Errors
    ///
    /// Returns [`PrettyconfError::Decode`] when the contents fail to parse or
    /// the format's feature is disabled.
    pub fn decode<T: DeserializeOwned>(self, path: &Utf8Path, contents: &str) -> PrettyconfResult<T> {
        match self {
            Self::Json => serde_json::from_str(contents).map_err(|err| PrettyconfError::decode(path, err)),
            Self::Yaml => decode_yaml(path, contents),
            Self::Toml => decode_toml(path, contents),
        }
    }
}

#[cfg(feature = "yaml")]
fn decode_yaml<T: DeserializeOwned>(path: &Utf8Path, contents: &str) -> PrettyconfResult<T> {
    serde_saphyr::from_str_with_options(
        contents,
        serde_saphyr::Options {
            strict_booleans: true,
            ..serde_saphyr::Options::default()
        },
    )
    .map_err(|err| PrettyconfError::decode(path, err))
}

#[cfg(not(feature = "yaml"))]
fn decode_yaml<T: DeserializeOwned>(path: &Utf8Path, _contents: &str) -> PrettyconfResult<T> {
    Err(PrettyconfError::decode(
        path,
        "yaml feature disabled: enable the 'yaml' feature to support this file format",
    ))
}

#[cfg(feature = "toml")]
fn decode_toml<T: DeserializeOwned>(path: &Utf8Path, contents: &str) -> PrettyconfResult<T> {
    toml::from_str(contents).map_err(|err| PrettyconfError::decode(path, err))
}

#[cfg(not(feature = "toml"))]
fn decode_toml<T: DeserializeOwned>(path: &Utf8Path, _contents: &str) -> PrettyconfResult<T> {
    Err(PrettyconfError::decode(
        path,
        "toml feature disabled: enable the 'toml' feature to support this file format",
    ))
}

/// Reads and decodes the document at `path`, choosing the format by extension.
///
/// # Errors
///
/// Returns [`PrettyconfError::Io`] when the file cannot be read and
/// [`PrettyconfError::Decode`] when it fails to parse.
pub fn read_document<T: DeserializeOwned>(path: &Utf8Path) -> PrettyconfResult<T> {
    let contents =
        std::fs::read_to_string(path).map_err(|err| PrettyconfError::io(path, err))?;
    DocumentFormat::from_path(path).decode(path, &contents)
}
