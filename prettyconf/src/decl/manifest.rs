//! Declarations loaded from a manifest document.
//!
//! A manifest lists packages with their type declarations:
//!
//! ```yaml
//! packages:
//!   - path: example.com/app/config
//!     types:
//!       - name: Server
//!         doc: Server holds listener settings.
//!         shape:
//!           record:
//!             - name: Port
//!               doc: Port to listen on.
//!               tag: 'json:"port,omitempty"'
//!               type: uint16
//! ```

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DeclarationProvider, MemoryProvider, PackageDecl};
use crate::document::{DocumentFormat, read_document};
use crate::error::PrettyconfResult;

/// Serialized form of a declaration manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Declared packages.
    #[serde(default)]
    pub packages: Vec<PackageDecl>,
}

/// Provider serving the packages listed in a [`Manifest`].
#[derive(Debug, Clone, Default)]
pub struct ManifestProvider {
    inner: MemoryProvider,
}

impl ManifestProvider {
    /// Loads a manifest from `path`, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or decoded.
    pub fn from_path(path: &Utf8Path) -> PrettyconfResult<Self> {
        let manifest: Manifest = read_document(path)?;
        debug!(path = %path, packages = manifest.packages.len(), "loaded declaration manifest");
        Ok(Self::from(manifest))
    }

    /// Decodes a manifest held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error when `contents` cannot be decoded as `format`.
    pub fn from_contents(format: DocumentFormat, contents: &str) -> PrettyconfResult<Self> {
        let manifest: Manifest = format.decode(Utf8Path::new("<inline>"), contents)?;
        Ok(Self::from(manifest))
    }
}

impl From<Manifest> for ManifestProvider {
    fn from(manifest: Manifest) -> Self {
        Self {
            inner: manifest.packages.into_iter().collect(),
        }
    }
}

impl DeclarationProvider for ManifestProvider {
    fn package(&self, path: &str) -> PrettyconfResult<PackageDecl> {
        self.inner.package(path)
    }
}
