//! End-to-end rendering: extract, synthesize, encode, write.

use std::io::Write;

use camino::Utf8Path;
use serde::Serialize;
use tracing::debug;

use crate::catalog::TypeId;
use crate::decl::DeclarationProvider;
use crate::document::read_document;
use crate::encode::OutputFormat;
use crate::error::{PrettyconfError, PrettyconfResult};
use crate::extract::Extractor;
use crate::synth::Synthesizer;
use crate::tree::Node;

/// Renders an instance tree of `root` as annotated text.
///
/// The root package and every package its records reach are extracted from
/// `provider` before synthesis.
///
/// # Errors
///
/// Propagates extraction, synthesis and encoding failures.
pub fn render_value(
    node: Node,
    provider: &dyn DeclarationProvider,
    root: &TypeId,
    format: OutputFormat,
) -> PrettyconfResult<String> {
    let package = provider.canonical_path(&root.package);
    let root_id = TypeId::new(package.clone(), root.name.clone());
    debug!(root = %root_id, %format, "rendering instance");

    let catalog = Extractor::new(provider).extract_closure(&[package])?;
    let annotated = Synthesizer::new(&catalog).synthesize(node, &root_id)?;
    format.encode(&annotated)
}

/// Serializes `value`, renders it as annotated text and writes it to
/// `writer`.
///
/// Nothing is written unless rendering succeeds.
///
/// # Errors
///
/// Returns [`PrettyconfError::Json`] when `value` cannot be reduced to a
/// tree, [`PrettyconfError::Write`] when the writer fails, and the errors of
/// [`render_value`].
pub fn render<T, W>(
    value: &T,
    provider: &dyn DeclarationProvider,
    root: &TypeId,
    format: OutputFormat,
    writer: &mut W,
) -> PrettyconfResult<()>
where
    T: Serialize + ?Sized,
    W: Write + ?Sized,
{
    let node = Node::from_serialize(value)?;
    let text = render_value(node, provider, root, format)?;
    writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(PrettyconfError::Write)
}

/// Reads an instance document (JSON, YAML or TOML by extension) as a tree.
///
/// # Errors
///
/// Returns [`PrettyconfError::Io`] or [`PrettyconfError::Decode`] when the
/// document cannot be read.
pub fn load_instance(path: &Utf8Path) -> PrettyconfResult<Node> {
    read_document::<serde_json::Value>(path).map(Node::from)
}

#[cfg(test)]
mod tests {
    //! Unit tests for render sequencing and sink handling.

    use super::*;
    use crate::decl::ManifestProvider;
    use crate::document::DocumentFormat;
    use anyhow::Result;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use test_helpers::fixtures::{OUTER_PATH, PKG1_MANIFEST, PKG1_PATH};

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("sink closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[fixture]
    fn provider() -> ManifestProvider {
        ManifestProvider::from_contents(DocumentFormat::Yaml, PKG1_MANIFEST)
            .expect("decode manifest")
    }

    #[rstest]
    fn resolves_records_from_other_packages(provider: ManifestProvider) -> Result<()> {
        let text = render_value(
            Node::from(json!({"inner": {"t5": 7}})),
            &provider,
            &TypeId::new(OUTER_PATH, "Outer"),
            OutputFormat::Yaml,
        )?;
        let expected = "\
# Outer wraps a type from pkg1.

# inner comes from another package.
inner:
  # Something.
  t5: 7
  # Something else.
  t6: []
# mode selects the run mode.
# +optional
mode: \"\"
";
        anyhow::ensure!(text == expected, "unexpected output:\n{text}");
        Ok(())
    }

    #[rstest]
    fn writes_nothing_when_synthesis_fails(provider: ManifestProvider) {
        let mut sink = Vec::new();
        let err = render(
            &json!({"Field1": 1, "unknown": 2}),
            &provider,
            &TypeId::new(PKG1_PATH, "Type1"),
            OutputFormat::Yaml,
            &mut sink,
        )
        .expect_err("unknown key");
        assert!(matches!(err, PrettyconfError::FieldNotFound { .. }), "unexpected error {err:?}");
        assert!(sink.is_empty());
    }

    #[rstest]
    fn reports_sink_failures(provider: ManifestProvider) {
        let err = render(
            &json!({}),
            &provider,
            &TypeId::new(PKG1_PATH, "Type5"),
            OutputFormat::Json,
            &mut BrokenSink,
        )
        .expect_err("sink rejects writes");
        assert!(matches!(err, PrettyconfError::Write(_)), "unexpected error {err:?}");
    }

    #[test]
    fn loads_instances_by_extension() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("instance.toml"))
            .map_err(|path| anyhow::anyhow!("non UTF-8 path {}", path.display()))?;
        std::fs::write(&path, "name = \"edge\"\n[limits]\nburst = 4\n")?;

        let node = load_instance(&path)?;
        let value = serde_json::to_value(&node)?;
        anyhow::ensure!(value == json!({"name": "edge", "limits": {"burst": 4}}));
        Ok(())
    }
}
