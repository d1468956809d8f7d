//! Library side of the `prettyconf` command.
//!
//! The binary parses [`cli::Args`], installs logging and hands control to
//! [`run`]. Settings are merged from defaults, a settings file, the
//! environment and the command line (see [`settings`]).

pub mod cli;
pub mod error;
pub mod output;
pub mod settings;

use prettyconf::{Extractor, load_instance, render_value};
use tracing::info;

use crate::cli::{Args, CatalogArgs, Command, RenderArgs};
use crate::error::CliError;
use crate::settings::Settings;

/// Runs the subcommand selected by `args`.
///
/// # Errors
///
/// Returns a [`CliError`] when settings are incomplete or invalid, or when
/// extraction, rendering or writing fails. Nothing is written on failure.
pub fn run(args: &Args) -> Result<(), CliError> {
    let settings = Settings::load(args.config.as_deref(), &args.command.overrides())?;
    match &args.command {
        Command::Render(render) => run_render(&settings, render),
        Command::Catalog(catalog) => run_catalog(&settings, catalog),
    }
}

fn run_render(settings: &Settings, args: &RenderArgs) -> Result<(), CliError> {
    let root = settings.root_type_id()?;
    let provider = settings.provider()?;
    let instance = load_instance(&args.instance)?;
    info!(root = %root, instance = %args.instance, format = %settings.format, "rendering");

    let text = render_value(instance, provider.as_ref(), &root, settings.format)?;
    output::emit(settings.output.as_deref(), &text)
}

fn run_catalog(settings: &Settings, args: &CatalogArgs) -> Result<(), CliError> {
    let package = settings.package_path()?;
    let provider = settings.provider()?;
    let mut extractor = Extractor::new(provider.as_ref());
    let catalog = if args.closure {
        extractor.extract_closure(&[package])?
    } else {
        extractor.extract(&[package])?
    };
    info!(packages = catalog.packages().len(), "extracted catalog");

    let mut text = serde_json::to_string_pretty(&catalog)?;
    text.push('\n');
    output::emit(settings.output.as_deref(), &text)
}
