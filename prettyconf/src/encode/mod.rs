//! Text encoders for annotated trees.
//!
//! [`YamlEncoder`] keeps comments and key order; [`JsonEncoder`] keeps key
//! order only, since JSON has no comment syntax.

mod json;
mod yaml;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json::JsonEncoder;
pub use yaml::YamlEncoder;

use crate::error::PrettyconfResult;
use crate::tree::Node;

/// Output formats for rendered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Block-style YAML with comments.
    #[default]
    Yaml,
    /// Pretty-printed JSON without comments.
    Json,
}

impl OutputFormat {
    /// Returns the CLI-friendly string for this output format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// Encodes `node` as text in this format.
    ///
    /// # Errors
    ///
    /// Returns [`PrettyconfError::Json`](crate::PrettyconfError::Json) when
    /// JSON serialization fails.
    pub fn encode(self, node: &Node) -> PrettyconfResult<String> {
        match self {
            Self::Yaml => Ok(YamlEncoder::new().encode(node)),
            Self::Json => JsonEncoder::new().encode(node),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown output format name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format '{0}', expected 'yaml' or 'json'")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}
