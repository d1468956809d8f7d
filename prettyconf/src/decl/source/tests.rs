//! Unit tests for the Rust source provider.

use super::*;
use anyhow::{Context, Result, ensure};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const LIB_RS: &str = r#"
//! Service configuration.

use serde::Serialize;
use crate::net::Tls;

pub mod net;

/// Server holds listener settings.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Address to bind.
    pub bind_address: String,
    /// Port to listen on.
    /// +optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip)]
    pub cache: Vec<u8>,
    pub tls: Tls,
    #[serde(rename = "type")]
    pub r#kind: Mode,
}

/// Mode selects the runtime mode.
pub enum Mode {
    Fast,
    Safe,
}

pub enum Plugin {
    Named(String),
}

pub type Labels = std::collections::BTreeMap<String, String>;

pub struct Seconds(u64);

struct Internal {
    value: bool,
}

mod inline {
    /// Inline module type.
    pub struct Nested {
        pub depth: u8,
    }
}
"#;

const NET_RS: &str = r#"
/// Tls settings.
pub struct Tls {
    pub enabled: bool,
    pub ciphers: Vec<super::Cipher>,
}
"#;

#[fixture]
fn crate_root() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    let src = dir.path().join("src");
    std::fs::create_dir_all(src.join("net")).expect("create src tree");
    std::fs::write(src.join("lib.rs"), LIB_RS).expect("write lib.rs");
    std::fs::write(src.join("net").join("mod.rs"), NET_RS).expect("write net/mod.rs");
    dir
}

fn provider(dir: &TempDir) -> Result<SourceProvider> {
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|path| anyhow::anyhow!("non UTF-8 temp dir: {}", path.display()))?;
    Ok(SourceProvider::new(root))
}

fn record_fields(package: &PackageDecl, name: &str) -> Result<Vec<FieldDecl>> {
    let decl = package.type_decl(name).context("type declared")?;
    match &decl.shape {
        TypeShape::Record(fields) => Ok(fields.clone()),
        other => anyhow::bail!("{name} should be a record, got {other:?}"),
    }
}

#[rstest]
fn lowers_crate_root(crate_root: TempDir) -> Result<()> {
    let package = provider(&crate_root)?.package("crate")?;
    ensure!(package.path == "crate");
    ensure!(package.doc == "Service configuration.");

    let names: Vec<&str> = package.types.iter().map(|decl| decl.name.as_str()).collect();
    ensure!(
        names == ["Server", "Mode", "Plugin", "Labels", "Seconds", "Internal"],
        "unexpected declarations {names:?}"
    );

    let server = package.type_decl("Server").context("Server declared")?;
    ensure!(server.doc == "Server holds listener settings.");
    ensure!(server.is_exported());
    let internal = package.type_decl("Internal").context("Internal declared")?;
    ensure!(!internal.is_exported());
    Ok(())
}

#[rstest]
fn lowers_serde_attributes_into_tags(crate_root: TempDir) -> Result<()> {
    let package = provider(&crate_root)?.package("crate")?;
    let fields = record_fields(&package, "Server")?;
    let summary: Vec<(&str, Option<&str>, String)> = fields
        .iter()
        .map(|field| (field.name.as_str(), field.tag.as_deref(), field.ty.to_string()))
        .collect();
    ensure!(
        summary
            == [
                ("bind_address", Some(r#"json:"bindAddress""#), "string".to_owned()),
                ("port", Some(r#"json:"port,omitempty""#), "*uint16".to_owned()),
                ("cache", Some(r#"json:"-""#), "[]uint8".to_owned()),
                ("tls", Some(r#"json:"tls""#), "crate::net.Tls".to_owned()),
                ("kind", Some(r#"json:"type""#), "Mode".to_owned()),
            ],
        "unexpected fields {summary:?}"
    );
    let port = fields.get(1).context("port field")?;
    ensure!(port.doc == "Port to listen on.\n+optional");
    ensure!(fields.iter().all(FieldDecl::is_exported));
    Ok(())
}

#[rstest]
#[case::unit_enum("Mode", TypeShape::Alias(TypeExpr::ident("string")))]
#[case::data_enum("Plugin", TypeShape::Interface)]
#[case::type_alias(
    "Labels",
    TypeShape::Alias(TypeExpr::map(TypeExpr::ident("string"), TypeExpr::ident("string")))
)]
#[case::newtype("Seconds", TypeShape::Alias(TypeExpr::ident("uint64")))]
fn lowers_non_record_shapes(
    crate_root: TempDir,
    #[case] name: &str,
    #[case] expected: TypeShape,
) -> Result<()> {
    let package = provider(&crate_root)?.package("crate")?;
    let decl = package.type_decl(name).context("type declared")?;
    ensure!(decl.shape == expected, "{name}: {:?}", decl.shape);
    Ok(())
}

#[rstest]
fn resolves_submodule_files_and_super_paths(crate_root: TempDir) -> Result<()> {
    let package = provider(&crate_root)?.package("net")?;
    ensure!(package.path == "crate::net");
    let fields = record_fields(&package, "Tls")?;
    let ciphers = fields.get(1).context("ciphers field")?;
    ensure!(ciphers.ty.to_string() == "[]crate.Cipher", "got {}", ciphers.ty);
    Ok(())
}

#[rstest]
fn falls_back_to_inline_modules(crate_root: TempDir) -> Result<()> {
    let package = provider(&crate_root)?.package("crate::inline")?;
    let nested = package.type_decl("Nested").context("Nested declared")?;
    ensure!(nested.doc == "Inline module type.");
    Ok(())
}

#[rstest]
fn reports_missing_modules(crate_root: TempDir) -> Result<()> {
    let err = provider(&crate_root)?
        .package("crate::absent")
        .expect_err("module does not exist");
    ensure!(
        matches!(err, PrettyconfError::PackageNotFound { ref package } if package == "crate::absent"),
        "unexpected error {err:?}"
    );
    Ok(())
}

#[rstest]
fn reports_unparseable_files(crate_root: TempDir) -> Result<()> {
    let broken = crate_root.path().join("src").join("broken.rs");
    std::fs::write(&broken, "pub struct {")?;
    let err = provider(&crate_root)?
        .package("broken")
        .expect_err("file does not parse");
    ensure!(
        matches!(err, PrettyconfError::Source { ref path, .. } if path.ends_with("broken.rs")),
        "unexpected error {err:?}"
    );
    Ok(())
}

#[rstest]
#[case("", "crate")]
#[case("crate", "crate")]
#[case("config", "crate::config")]
#[case("::config::net", "crate::config::net")]
#[case("crate::config", "crate::config")]
fn normalizes_module_paths(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalize_module_path(input), expected);
}
