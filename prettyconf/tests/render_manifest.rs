//! End-to-end rendering of instances against manifest declarations.

use anyhow::Result;
use camino::Utf8PathBuf;
use prettyconf::decl::ManifestProvider;
use prettyconf::document::DocumentFormat;
use prettyconf::{OutputFormat, TypeId, load_instance, render, render_value};
use rstest::{fixture, rstest};
use serde::Serialize;
use test_helpers::fixtures::{PRINTER_MANIFEST, PRINTER_PATH};
use test_helpers::text::dedent;

#[derive(Serialize)]
struct TopLevel {
    a: AStruct,
    cnocomment: CStruct,
    #[serde(skip_serializing_if = "Option::is_none")]
    b: Option<BStruct>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bs: Vec<BStruct>,
}

#[derive(Serialize)]
struct AStruct {
    enested: NestedStruct,
    d: i64,
}

#[derive(Serialize)]
struct NestedStruct {
    f: String,
}

#[derive(Serialize)]
struct BStruct {
    g: String,
}

#[derive(Serialize)]
struct CStruct {
    h: String,
}

#[fixture]
fn provider() -> ManifestProvider {
    ManifestProvider::from_contents(DocumentFormat::Yaml, PRINTER_MANIFEST)
        .expect("decode printer manifest")
}

#[fixture]
fn instance() -> TopLevel {
    TopLevel {
        a: AStruct {
            enested: NestedStruct {
                f: "somestring".to_owned(),
            },
            d: 5,
        },
        cnocomment: CStruct {
            h: "something new".to_owned(),
        },
        b: None,
        bs: Vec::new(),
    }
}

fn expected_yaml() -> String {
    dedent(
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
    )
}

#[rstest]
fn renders_serializable_values_as_commented_yaml(
    provider: ManifestProvider,
    instance: TopLevel,
) -> Result<()> {
    let mut out = Vec::new();
    render(
        &instance,
        &provider,
        &TypeId::new(PRINTER_PATH, "TopLevel"),
        OutputFormat::Yaml,
        &mut out,
    )?;
    assert_eq!(String::from_utf8(out)?, expected_yaml());
    Ok(())
}

#[rstest]
fn renders_instance_documents(provider: ManifestProvider) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = Utf8PathBuf::from_path_buf(dir.path().join("instance.yaml"))
        .map_err(|path| anyhow::anyhow!("non UTF-8 path {}", path.display()))?;
    std::fs::write(
        &path,
        "cnocomment:\n  h: something new\na:\n  d: 5\n  enested:\n    f: somestring\n",
    )?;

    let text = render_value(
        load_instance(&path)?,
        &provider,
        &TypeId::new(PRINTER_PATH, "TopLevel"),
        OutputFormat::Yaml,
    )?;
    assert_eq!(text, expected_yaml());
    Ok(())
}

#[rstest]
fn renders_json_in_declaration_order(provider: ManifestProvider, instance: TopLevel) -> Result<()> {
    let mut out = Vec::new();
    render(
        &instance,
        &provider,
        &TypeId::new(PRINTER_PATH, "TopLevel"),
        OutputFormat::Json,
        &mut out,
    )?;
    let expected = dedent(
        r#"
        {
          "a": {
            "enested": {
              "f": "somestring"
            },
            "d": 5
          },
          "cnocomment": {
            "h": "something new"
          },
          "b": {
            "g": ""
          },
          "bs": []
        }
        "#,
    );
    assert_eq!(String::from_utf8(out)?, expected);
    Ok(())
}

#[rstest]
fn reports_unknown_root_types(provider: ManifestProvider, instance: TopLevel) {
    let mut out = Vec::new();
    let err = render(
        &instance,
        &provider,
        &TypeId::new(PRINTER_PATH, "Missing"),
        OutputFormat::Yaml,
        &mut out,
    )
    .expect_err("Missing is not declared");
    assert!(
        matches!(err, prettyconf::PrettyconfError::TypeNotFound { ref name, .. } if name == "Missing"),
        "unexpected error {err:?}"
    );
    assert!(out.is_empty());
}
