//! Render configuration values as documented, declaration-ordered documents.
//!
//! `prettyconf` reads the record type declarations of a codebase through a
//! [`DeclarationProvider`](decl::DeclarationProvider), extracts per-field
//! metadata (serialized key, requiredness, documentation, nested type
//! identity) into a [`Catalog`], and merges that catalog with a serialized
//! instance. The result is a [`Node`] tree in which every field appears in
//! declaration order, unset fields hold their zero value, and every entry
//! carries its documentation as a comment. [`OutputFormat`] turns the tree
//! into YAML or JSON text.
//!
//! ```
//! use prettyconf::decl::ManifestProvider;
//! use prettyconf::document::DocumentFormat;
//! use prettyconf::{OutputFormat, TypeId, render};
//!
//! let manifest = r#"{"packages": [{"path": "app/config", "types": [{
//!     "name": "Server",
//!     "doc": "Server holds listener settings.",
//!     "shape": {"record": [
//!         {"name": "Host", "doc": "Host to bind.", "tag": "json:\"host\"", "type": "string"},
//!         {"name": "Port", "doc": "Port to listen on.", "tag": "json:\"port\"", "type": "uint16"}
//!     ]}
//! }]}]}"#;
//! let provider = ManifestProvider::from_contents(DocumentFormat::Json, manifest)?;
//!
//! let mut out = Vec::new();
//! render(
//!     &serde_json::json!({"port": 8080}),
//!     &provider,
//!     &TypeId::new("app/config", "Server"),
//!     OutputFormat::Yaml,
//!     &mut out,
//! )?;
//! assert_eq!(
//!     String::from_utf8(out)?,
//!     "# Server holds listener settings.\n\n# host to bind.\nhost: \"\"\n# port to listen on.\nport: 8080\n"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod decl;
pub mod document;
pub mod encode;
mod error;
pub mod extract;
mod render;
pub mod synth;
pub mod tag;
pub mod tree;

pub use catalog::{Catalog, TypeId};
pub use encode::OutputFormat;
pub use error::{PrettyconfError, PrettyconfResult};
pub use extract::Extractor;
pub use render::{load_instance, render, render_value};
pub use synth::Synthesizer;
pub use tree::Node;
