//! Declaration fixtures shared by the library and CLI test suites.
//!
//! Manifests are YAML documents in the declaration manifest format. The Rust
//! crate fixture is a set of source files that [`write_tree`] lays out on
//! disk for the source provider.

use anyhow::{Context, Result};
use camino::Utf8Path;

/// Package path of [`PKG1_MANIFEST`]'s loader fixture package.
pub const PKG1_PATH: &str = "example.com/app/pkg1";

/// Package path of the package in [`PKG1_MANIFEST`] that nests a pkg1 type.
pub const OUTER_PATH: &str = "example.com/app/outer";

/// Loader fixtures: visibility rules, annotation handling, embedding and a
/// cross-package reference.
pub const PKG1_MANIFEST: &str = r#"
packages:
  - path: example.com/app/pkg1
    doc: Package pkg1 holds loader fixtures.
    types:
      - name: Type1
        doc: |-
          Type1 is a normal type
          with a single field and a description.
        shape:
          record:
            - name: Field1
              doc: Some doc.
              type: int
            - name: Field2
              tag: 'json:"f2"'
              type: string
            - name: Field3
              doc: Some more doc.
              tag: 'json:"-"'
              type: "[]string"
            - name: Field4
              doc: Even more doc.
              tag: 'json:",omitempty"'
              type: "[]string"
            - name: Field5
              doc: |-
                And some
                more doc.
              tag: 'json:"f5,omitempty"'
              type: "map[string]bool"
            - name: Type5
              embedded: true
              tag: 'json:",omitempty"'
              type: Type5
            - name: Type5s
              tag: 'json:"t5s,omitempty"'
              type: "[]Type5"
      - name: Type2
        doc: |-
          Type2 is a normal type
          with a single unexported field and a description.
        shape:
          record:
            - name: field1
              type: int
      - name: type3
        doc: type3 is an unexported type with a single unexported field.
        shape:
          record:
            - name: field1
              type: int
      - name: type4
        doc: type4 is an unexported type with a single exported field.
        shape:
          record:
            - name: Field1
              type: int
      - name: Type5
        shape:
          record:
            - name: Type5Field
              doc: Something.
              tag: 'json:"t5"'
              type: uint32
            - name: Type5Field2
              doc: Something else.
              tag: 'json:"t6"'
              type: "[]uint32"
  - path: example.com/app/outer
    doc: Package outer nests types declared in pkg1.
    types:
      - name: Outer
        doc: Outer wraps a type from pkg1.
        shape:
          record:
            - name: Inner
              doc: Inner comes from another package.
              tag: 'json:"inner"'
              type: example.com/app/pkg1.Type5
            - name: Mode
              doc: |-
                Mode selects the run mode.
                +optional
              tag: 'json:"mode"'
              type: Mode
      - name: Mode
        shape:
          alias: string
"#;

/// Package path of [`PRINTER_MANIFEST`].
pub const PRINTER_PATH: &str = "example.com/app/testdata";

/// Nested record fixtures for end-to-end rendering.
pub const PRINTER_MANIFEST: &str = r#"
packages:
  - path: example.com/app/testdata
    types:
      - name: TopLevel
        doc: TopLevel holds the details for top level config.
        shape:
          record:
            - name: A
              doc: A is field for AStruct.
              tag: 'json:"a"'
              type: AStruct
            - name: C
              tag: 'json:"cnocomment"'
              type: CStruct
            - name: B
              doc: B holds the comment here.
              tag: 'json:"b,omitempty"'
              type: "*BStruct"
            - name: I
              doc: I holds a slice.
              tag: 'json:"bs,omitempty"'
              type: "[]*BStruct"
      - name: AStruct
        doc: AStruct holds some fields.
        shape:
          record:
            - name: E
              doc: E comment.
              tag: 'json:"enested"'
              type: NestedStruct
            - name: D
              doc: D comment.
              tag: 'json:"d,omitempty"'
              type: int
      - name: NestedStruct
        doc: NestedStruct holds nested struct fields.
        shape:
          record:
            - name: F
              doc: F comment.
              tag: 'json:"f,omitempty"'
              type: string
      - name: BStruct
        doc: BStruct holds B fields.
        shape:
          record:
            - name: G
              doc: G comment.
              tag: 'json:"g,omitempty"'
              type: string
      - name: CStruct
        doc: CStruct holds C fields.
        shape:
          record:
            - name: H
              doc: H comment.
              tag: 'json:"h,omitempty"'
              type: string
"#;

/// Source files of a small service crate, relative to the crate root.
pub const SERVICE_CRATE: &[(&str, &str)] = &[
    (
        "src/lib.rs",
        r#"//! Demo service configuration.

pub mod net;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::net::Listener;

/// Service configures the demo daemon.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Name shown in logs.
    pub display_name: String,
    /// Worker thread count.
    pub workers: u16,
    /// Network listener.
    pub listener: Listener,
    /// Extra labels attached to metrics.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip)]
    pub runtime_cache: Vec<u8>,
}
"#,
    ),
    (
        "src/net.rs",
        r#"//! Networking settings.

use serde::Serialize;

/// Listener binds a socket.
#[derive(Debug, Serialize)]
pub struct Listener {
    /// Address to bind.
    pub address: String,
    /// Port to listen on.
    pub port: u16,
    /// Enables TLS.
    /// +optional
    pub tls: Option<bool>,
}
"#,
    ),
];

/// Writes `files` (paths relative to `root`) to disk, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns an error when a directory or file cannot be written.
pub fn write_tree(root: &Utf8Path, files: &[(&str, &str)]) -> Result<()> {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory {parent}"))?;
        }
        std::fs::write(&path, contents).with_context(|| format!("write {path}"))?;
    }
    Ok(())
}
