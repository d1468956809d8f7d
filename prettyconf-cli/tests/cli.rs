//! End-to-end tests driving the CLI through parsed arguments.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use prettyconf_cli::cli::Args;
use prettyconf_cli::error::CliError;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use test_helpers::env::{self, EnvScope};
use test_helpers::fixtures::{PRINTER_MANIFEST, SERVICE_CRATE, write_tree};
use test_helpers::text::dedent;

const SETTINGS_VARS: &[&str] = &[
    "PRETTYCONF_SOURCE",
    "PRETTYCONF_MANIFEST",
    "PRETTYCONF_PACKAGE",
    "PRETTYCONF_ROOT_TYPE",
    "PRETTYCONF_FORMAT",
    "PRETTYCONF_OUTPUT",
];

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn path(&self, relative: &str) -> String {
        self.root.join(relative).into_string()
    }

    fn read(&self, relative: &str) -> Result<String> {
        std::fs::read_to_string(self.root.join(relative)).with_context(|| format!("read {relative}"))
    }
}

#[fixture]
fn workspace() -> Workspace {
    let dir = tempfile::tempdir().expect("create tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 tempdir");
    write_tree(
        &root,
        &[
            ("decls.yaml", PRINTER_MANIFEST),
            (
                "instance.json",
                r#"{"a": {"d": 5, "enested": {"f": "somestring"}}, "cnocomment": {"h": "something new"}}"#,
            ),
        ],
    )
    .expect("write workspace files");
    write_tree(&root.join("service"), SERVICE_CRATE).expect("write service crate");
    Workspace { _dir: dir, root }
}

/// Clears settings variables and holds the environment lock.
fn clean_env() -> EnvScope {
    env::scope_with(|lock| SETTINGS_VARS.iter().map(|key| lock.remove_var(*key)).collect())
}

fn run(args: &[&str]) -> Result<(), CliError> {
    let parsed = Args::try_parse_from(std::iter::once("prettyconf").chain(args.iter().copied()))
        .expect("parse arguments");
    prettyconf_cli::run(&parsed)
}

#[rstest]
fn renders_manifest_instances_to_files(workspace: Workspace) -> Result<()> {
    let _env = clean_env();
    run(&[
        "render",
        "--manifest",
        &workspace.path("decls.yaml"),
        "--type",
        "example.com/app/testdata.TopLevel",
        "--instance",
        &workspace.path("instance.json"),
        "--out",
        &workspace.path("out/config.yaml"),
    ])?;

    let expected = dedent(
        r#"
        # TopLevel holds the details for top level config.

        # a is field for AStruct.
        a:
          # enested comment.
          enested:
            # f comment.
            f: somestring
          # d comment.
          d: 5
        cnocomment:
          # h comment.
          h: something new
        # b holds the comment here.
        b:
          # g comment.
          g: ""
        # bs holds a slice.
        bs: []
        "#,
    );
    assert_eq!(workspace.read("out/config.yaml")?, expected);
    Ok(())
}

#[rstest]
fn environment_selects_the_format(workspace: Workspace) -> Result<()> {
    let _env = clean_env();
    let _format = env::set_var("PRETTYCONF_FORMAT", "json");
    run(&[
        "render",
        "--manifest",
        &workspace.path("decls.yaml"),
        "--package",
        "example.com/app/testdata",
        "--type",
        "TopLevel",
        "--instance",
        &workspace.path("instance.json"),
        "--out",
        &workspace.path("config.json"),
    ])?;

    let value: serde_json::Value = serde_json::from_str(&workspace.read("config.json")?)?;
    assert_eq!(value["b"], serde_json::json!({"g": ""}));
    assert_eq!(value["bs"], serde_json::json!([]));
    Ok(())
}

#[rstest]
fn settings_file_supplies_defaults(workspace: Workspace) -> Result<()> {
    let _env = clean_env();
    let settings = format!(
        "manifest = \"{}\"\npackage = \"example.com/app/testdata\"\nroot_type = \"TopLevel\"\nformat = \"json\"\n",
        workspace.path("decls.yaml")
    );
    write_tree(&workspace.root, &[("settings.toml", settings.as_str())])?;

    run(&[
        "--config",
        &workspace.path("settings.toml"),
        "render",
        "--instance",
        &workspace.path("instance.json"),
        "--format",
        "yaml",
        "--out",
        &workspace.path("config.yaml"),
    ])?;

    let text = workspace.read("config.yaml")?;
    assert!(text.starts_with("# TopLevel holds the details"), "unexpected output:\n{text}");
    Ok(())
}

#[rstest]
fn dumps_catalog_closure_from_sources(workspace: Workspace) -> Result<()> {
    let _env = clean_env();
    run(&[
        "catalog",
        "--source",
        &workspace.path("service"),
        "--closure",
        "--out",
        &workspace.path("catalog.json"),
    ])?;

    let catalog: serde_json::Value = serde_json::from_str(&workspace.read("catalog.json")?)?;
    let packages: Vec<_> = catalog["packages"]
        .as_array()
        .context("packages array")?
        .iter()
        .filter_map(|package| package["path"].as_str())
        .collect();
    assert_eq!(packages, ["crate", "crate::net"]);
    assert_eq!(
        catalog["packages"][0]["types"][0]["fields"][0]["serialized_key"],
        "displayName"
    );
    Ok(())
}

#[rstest]
fn reports_missing_root_type(workspace: Workspace) {
    let _env = clean_env();
    let err = run(&[
        "render",
        "--manifest",
        &workspace.path("decls.yaml"),
        "--instance",
        &workspace.path("instance.json"),
    ])
    .expect_err("no root type given");
    assert!(matches!(err, CliError::MissingRootType), "unexpected error {err:?}");
}

#[rstest]
fn surfaces_rendering_failures(workspace: Workspace) -> Result<()> {
    let _env = clean_env();
    write_tree(&workspace.root, &[("bad.json", r#"{"a": {"zzz": 1}}"#)])?;
    let err = run(&[
        "render",
        "--manifest",
        &workspace.path("decls.yaml"),
        "--type",
        "example.com/app/testdata.TopLevel",
        "--instance",
        &workspace.path("bad.json"),
        "--out",
        &workspace.path("never.yaml"),
    ])
    .expect_err("zzz is not a field");
    assert!(
        err.to_string().contains("failed to find field zzz"),
        "unexpected error {err}"
    );
    assert!(!workspace.root.join("never.yaml").exists());
    Ok(())
}
