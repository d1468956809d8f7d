//! Error types for the `prettyconf` CLI.

use camino::Utf8PathBuf;
use prettyconf::PrettyconfError;
use thiserror::Error;

/// Errors surfaced by the `prettyconf` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Extraction, synthesis or rendering failed.
    #[error(transparent)]
    Prettyconf(#[from] PrettyconfError),

    /// A settings layer could not be merged.
    #[error("invalid settings: {0}")]
    Settings(#[source] Box<figment::Error>),

    /// The file passed with `--config` does not exist.
    #[error("settings file {0} not found")]
    ConfigNotFound(Utf8PathBuf),

    /// No declaration source was configured.
    #[error("no declarations given; pass --source or --manifest")]
    MissingDeclarations,

    /// Both declaration sources were configured.
    #[error("--source and --manifest are mutually exclusive")]
    ConflictingDeclarations,

    /// No root type was configured.
    #[error("root type missing; pass --type or set root_type")]
    MissingRootType,

    /// No package could be determined for a manifest.
    #[error("package missing; pass --package or qualify the root type")]
    MissingPackage,

    /// Encoding the catalog failed.
    #[error("failed to encode catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing output failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being written.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing to standard output failed.
    #[error("failed to write to standard output: {0}")]
    Stdout(#[source] std::io::Error),
}
