//! Layered settings for the `prettyconf` CLI.
//!
//! Settings are merged with `figment`, lowest precedence first:
//!
//! 1. built-in defaults;
//! 2. `prettyconf.toml` in the working directory, or the `--config` file;
//! 3. `PRETTYCONF_*` environment variables (`PRETTYCONF_ROOT_TYPE=Server`);
//! 4. command-line flags.

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use prettyconf::decl::{DeclarationProvider, ManifestProvider, SourceProvider};
use prettyconf::{OutputFormat, TypeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliError;

/// Settings file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "prettyconf.toml";

/// Prefix of the environment variables that override settings.
pub const ENV_PREFIX: &str = "PRETTYCONF_";

/// Package used with `--source` when none is given.
const SOURCE_ROOT_PACKAGE: &str = "crate";

/// Fully merged CLI settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Crate directory read by the source provider.
    pub source: Option<Utf8PathBuf>,
    /// Declaration manifest path.
    pub manifest: Option<Utf8PathBuf>,
    /// Package declaring the root type.
    pub package: Option<String>,
    /// Root type name.
    pub root_type: Option<String>,
    /// Output format.
    pub format: OutputFormat,
    /// Output file; standard output when unset.
    pub output: Option<Utf8PathBuf>,
}

/// Settings given on the command line; unset fields leave lower layers intact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overrides {
    /// See [`Settings::source`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Utf8PathBuf>,
    /// See [`Settings::manifest`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Utf8PathBuf>,
    /// See [`Settings::package`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// See [`Settings::root_type`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_type: Option<String>,
    /// See [`Settings::format`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    /// See [`Settings::output`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Utf8PathBuf>,
}

/// Declaration source chosen by the settings.
enum Declarations<'a> {
    Source(&'a Utf8Path),
    Manifest(&'a Utf8Path),
}

impl Settings {
    /// Merges every settings layer.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::ConfigNotFound`] when an explicit `config` file is
    /// missing and [`CliError::Settings`] when a layer fails to parse.
    pub fn load(config: Option<&Utf8Path>, overrides: &Overrides) -> Result<Self, CliError> {
        let file = match config {
            Some(path) if !path.is_file() => return Err(CliError::ConfigNotFound(path.to_path_buf())),
            Some(path) => path,
            None => Utf8Path::new(DEFAULT_CONFIG_FILE),
        };
        debug!(file = %file, "loading settings");
        let settings: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file.as_std_path()))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
            .extract()
            .map_err(|err| CliError::Settings(Box::new(err)))?;
        Ok(settings)
    }

    fn declarations(&self) -> Result<Declarations<'_>, CliError> {
        match (self.source.as_deref(), self.manifest.as_deref()) {
            (Some(_), Some(_)) => Err(CliError::ConflictingDeclarations),
            (Some(dir), None) => Ok(Declarations::Source(dir)),
            (None, Some(path)) => Ok(Declarations::Manifest(path)),
            (None, None) => Err(CliError::MissingDeclarations),
        }
    }

    /// Builds the declaration provider named by `source` or `manifest`.
    ///
    /// # Errors
    ///
    /// Returns an error when neither or both are set, or when the manifest
    /// cannot be loaded.
    pub fn provider(&self) -> Result<Box<dyn DeclarationProvider>, CliError> {
        let provider: Box<dyn DeclarationProvider> = match self.declarations()? {
            Declarations::Source(dir) => Box::new(SourceProvider::new(dir)),
            Declarations::Manifest(path) => Box::new(ManifestProvider::from_path(path)?),
        };
        Ok(provider)
    }

    /// Package to extract, defaulting to the crate root for source trees.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingPackage`] when a manifest is used without a
    /// package.
    pub fn package_path(&self) -> Result<String, CliError> {
        if let Some(package) = &self.package {
            return Ok(package.clone());
        }
        match self.declarations()? {
            Declarations::Source(_) => Ok(SOURCE_ROOT_PACKAGE.to_owned()),
            Declarations::Manifest(_) => Err(CliError::MissingPackage),
        }
    }

    /// Identity of the root type.
    ///
    /// Without a `package` setting the root type may carry its package:
    /// `crate::net::Listener` or `example.com/app/config.Server`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingRootType`] when no root type is set and
    /// [`CliError::MissingPackage`] when no package can be determined.
    pub fn root_type_id(&self) -> Result<TypeId, CliError> {
        let root = self.root_type.as_deref().ok_or(CliError::MissingRootType)?;
        if self.package.is_none() {
            let qualified = root.rsplit_once("::").or_else(|| root.rsplit_once('.'));
            if let Some((package, name)) = qualified {
                return Ok(TypeId::new(package, name));
            }
        }
        Ok(TypeId::new(self.package_path()?, root))
    }
}
