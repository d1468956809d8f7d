//! Command-line interface definitions for `prettyconf`.

use camino::Utf8PathBuf;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use prettyconf::OutputFormat;

use crate::settings::Overrides;

/// Parsed CLI arguments for `prettyconf`.
#[derive(Debug, Parser)]
#[command(name = "prettyconf")]
#[command(about = "Render configuration values as documented, declaration-ordered files")]
#[command(version)]
pub struct Args {
    /// Raise log verbosity (`-v` for debug, `-vv` for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Settings file to read instead of `prettyconf.toml`.
    #[arg(long, value_name = "path", global = true)]
    pub config: Option<Utf8PathBuf>,
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render an instance document with documentation comments.
    Render(RenderArgs),
    /// Dump the metadata extracted from a package as JSON.
    Catalog(CatalogArgs),
}

impl Command {
    /// Settings supplied on the command line for this subcommand.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        match self {
            Self::Render(render) => Overrides {
                root_type: render.root_type.clone(),
                format: render.format,
                output: render.out.clone(),
                ..render.declarations.overrides()
            },
            Self::Catalog(catalog) => Overrides {
                output: catalog.out.clone(),
                ..catalog.declarations.overrides()
            },
        }
    }
}

/// Where declarations are read from.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct DeclarationArgs {
    /// Crate directory whose Rust sources declare the types.
    #[arg(long, value_name = "dir", conflicts_with = "manifest")]
    pub source: Option<Utf8PathBuf>,
    /// Declaration manifest (JSON, YAML or TOML).
    #[arg(long, value_name = "path")]
    pub manifest: Option<Utf8PathBuf>,
    /// Package declaring the root type, for example `crate::config`.
    #[arg(long, value_name = "path")]
    pub package: Option<String>,
}

impl DeclarationArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            source: self.source.clone(),
            manifest: self.manifest.clone(),
            package: self.package.clone(),
            ..Overrides::default()
        }
    }
}

/// Arguments of `prettyconf render`.
#[derive(Debug, Clone, ClapArgs)]
pub struct RenderArgs {
    /// Declaration source selection.
    #[command(flatten)]
    pub declarations: DeclarationArgs,
    /// Root type name; may be package-qualified (`crate::net::Listener`).
    #[arg(long = "type", value_name = "name")]
    pub root_type: Option<String>,
    /// Instance document to render (JSON, YAML or TOML).
    #[arg(long, value_name = "path")]
    pub instance: Utf8PathBuf,
    /// Output format.
    #[arg(long, value_name = "yaml|json")]
    pub format: Option<OutputFormat>,
    /// File to write instead of standard output.
    #[arg(long, value_name = "path")]
    pub out: Option<Utf8PathBuf>,
}

/// Arguments of `prettyconf catalog`.
#[derive(Debug, Clone, ClapArgs)]
pub struct CatalogArgs {
    /// Declaration source selection.
    #[command(flatten)]
    pub declarations: DeclarationArgs,
    /// Also extract every package reachable through nested records.
    #[arg(long)]
    pub closure: bool,
    /// File to write instead of standard output.
    #[arg(long, value_name = "path")]
    pub out: Option<Utf8PathBuf>,
}
