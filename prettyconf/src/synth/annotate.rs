//! Annotate and reorder pass.

use tracing::trace;

use super::{Synthesizer, enter};
use crate::catalog::{TypeId, TypeMetadata};
use crate::error::{PrettyconfError, PrettyconfResult};
use crate::tree::{Entry, Node, NodeValue};

impl Synthesizer<'_> {
    /// Comments every entry of the record mapping `node` and restores field
    /// declaration order.
    pub(super) fn annotate(
        &self,
        node: &mut Node,
        ty: &TypeMetadata,
        path: &mut Vec<TypeId>,
    ) -> PrettyconfResult<()> {
        enter(path, ty.id())?;
        let NodeValue::Mapping(entries) = &mut node.value else {
            return Ok(());
        };

        for entry in entries.iter_mut() {
            let field = ty
                .field_by_key(&entry.key)
                .ok_or_else(|| PrettyconfError::FieldNotFound {
                    key: entry.key.clone(),
                    package: ty.package.clone(),
                    type_name: ty.name.clone(),
                })?;
            entry.comment = field.comment();
            trace!(owner = %ty.name, key = %entry.key, "annotated entry");

            if !matches!(entry.value.value, NodeValue::Mapping(_)) {
                continue;
            }
            // Free-form maps keep their entries uncommented.
            if let Some(nested_id) = field.type_ref.record_id() {
                let nested = self.lookup(nested_id)?;
                self.annotate(&mut entry.value, nested, path)?;
            }
        }

        reorder(entries, ty);
        path.pop();
        Ok(())
    }
}

/// Orders entries by field declaration order, appending unmatched entries.
pub(super) fn reorder(entries: &mut Vec<Entry>, ty: &TypeMetadata) {
    let mut remaining = std::mem::take(entries);
    for field in &ty.fields {
        if let Some(pos) = remaining
            .iter()
            .position(|entry| entry.key == field.serialized_key)
        {
            entries.push(remaining.remove(pos));
        }
    }
    entries.append(&mut remaining);
}
