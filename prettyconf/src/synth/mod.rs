//! Annotated tree synthesis.
//!
//! [`Synthesizer::synthesize`] merges a catalog with an instance tree in two
//! passes over each record mapping:
//!
//! 1. zero-fill: every field missing from the mapping (or holding `null`) is
//!    filled with the zero value of its type, then nested records reached
//!    directly or through one optional level are filled the same way;
//! 2. annotate: every entry receives its field's documentation as a comment,
//!    nested record mappings are annotated recursively, and entries are
//!    reordered to field declaration order.
//!
//! The root mapping carries the root type's documentation.

mod annotate;
mod zero;

use tracing::debug;

use crate::catalog::{Catalog, TypeId, TypeMetadata};
use crate::error::{PrettyconfError, PrettyconfResult};
use crate::tree::{Node, NodeValue};

/// Key reported for problems with the root node itself.
const ROOT_FIELD: &str = "<root>";

/// Produces annotated, zero-filled trees from catalog metadata.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'c> {
    catalog: &'c Catalog,
}

impl<'c> Synthesizer<'c> {
    /// Creates a synthesizer reading type metadata from `catalog`.
    #[must_use]
    pub const fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Synthesizes the annotated tree for an instance of `root`.
    ///
    /// A `null` instance is treated as an empty mapping.
    ///
    /// # Errors
    ///
    /// - [`PrettyconfError::TypeNotFound`] when `root` or a nested record is
    ///   missing from the catalog.
    /// - [`PrettyconfError::UnsupportedFieldType`] when a missing field has a
    ///   type without a zero value.
    /// - [`PrettyconfError::FieldNotFound`] when the instance has a key no
    ///   field serializes to.
    /// - [`PrettyconfError::UnexpectedNode`] when a record field does not
    ///   hold a mapping.
    /// - [`PrettyconfError::CyclicType`] when a record nests itself.
    pub fn synthesize(&self, tree: Node, root: &TypeId) -> PrettyconfResult<Node> {
        let root_type = self.lookup(root)?;
        let mut node = tree;
        if node.is_null() {
            node = Node::empty_mapping();
        }
        if !matches!(node.value, NodeValue::Mapping(_)) {
            return Err(PrettyconfError::UnexpectedNode {
                field: ROOT_FIELD.to_owned(),
                type_name: root_type.name.clone(),
                found: node.kind(),
            });
        }

        debug!(root = %root, "zero-filling unset fields");
        self.zero_fill(&mut node, root_type, &mut Vec::new())?;

        if !root_type.doc.is_empty() {
            node.comment = Some(root_type.doc.clone());
        }
        debug!(root = %root, "annotating fields");
        self.annotate(&mut node, root_type, &mut Vec::new())?;
        Ok(node)
    }

    fn lookup(&self, id: &TypeId) -> PrettyconfResult<&'c TypeMetadata> {
        self.catalog
            .lookup(id)
            .ok_or_else(|| PrettyconfError::TypeNotFound {
                package: id.package.clone(),
                name: id.name.clone(),
            })
    }
}

/// Pushes `id` onto the visited path, failing when it is already present.
fn enter(path: &mut Vec<TypeId>, id: TypeId) -> PrettyconfResult<()> {
    if path.contains(&id) {
        let cycle = path
            .iter()
            .chain(std::iter::once(&id))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(PrettyconfError::CyclicType { cycle });
    }
    path.push(id);
    Ok(())
}
