//! Zero-fill pass.

use tracing::trace;

use super::{Synthesizer, enter};
use crate::catalog::{FieldMetadata, TypeId, TypeMetadata, TypeRef};
use crate::error::{PrettyconfError, PrettyconfResult};
use crate::tree::{Entry, Node, NodeValue, Scalar};

/// Zero value for a field type; `None` when the type has no zero form.
pub(super) fn zero_value(ty: &TypeRef) -> Option<Node> {
    let node = match ty {
        TypeRef::Bool => Node::scalar(Scalar::Bool(false)),
        TypeRef::Int(_) => Node::scalar(Scalar::Int(0)),
        TypeRef::String => Node::string(""),
        TypeRef::Sequence(_) => Node::empty_sequence(),
        TypeRef::Mapping(..) | TypeRef::Record => Node::empty_mapping(),
        TypeRef::Optional(inner) => return zero_value(inner),
        TypeRef::Named { underlying, .. } => return zero_value(underlying),
        TypeRef::Float(_) | TypeRef::Opaque(_) => return None,
    };
    Some(node)
}

fn zero_for_field(field: &FieldMetadata) -> PrettyconfResult<Node> {
    zero_value(&field.type_ref).ok_or_else(|| PrettyconfError::UnsupportedFieldType {
        field: field.name.clone(),
        type_name: field.type_name.clone(),
    })
}

impl Synthesizer<'_> {
    /// Fills unset fields of the record mapping `node` and of nested records.
    pub(super) fn zero_fill(
        &self,
        node: &mut Node,
        ty: &TypeMetadata,
        path: &mut Vec<TypeId>,
    ) -> PrettyconfResult<()> {
        enter(path, ty.id())?;
        let NodeValue::Mapping(entries) = &mut node.value else {
            return Ok(());
        };

        for field in &ty.fields {
            let key = field.serialized_key.as_str();
            match entries.iter_mut().find(|entry| entry.key == key) {
                Some(entry) if !entry.value.is_null() => {}
                Some(entry) => {
                    trace!(owner = %ty.name, key, "replacing null with zero value");
                    entry.value = zero_for_field(field)?;
                }
                None => {
                    trace!(owner = %ty.name, key, "zero-filling unset field");
                    entries.push(Entry::new(key, zero_for_field(field)?));
                }
            }

            let Some(nested_id) = field.type_ref.record_id() else {
                continue;
            };
            let nested = self.lookup(nested_id)?;
            let Some(entry) = entries.iter_mut().find(|entry| entry.key == key) else {
                continue;
            };
            if !matches!(entry.value.value, NodeValue::Mapping(_)) {
                return Err(PrettyconfError::UnexpectedNode {
                    field: key.to_owned(),
                    type_name: ty.name.clone(),
                    found: entry.value.kind(),
                });
            }
            self.zero_fill(&mut entry.value, nested, path)?;
        }

        path.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for zero values.

    use super::*;
    use crate::catalog::IntKind;
    use rstest::rstest;

    fn named(underlying: TypeRef) -> TypeRef {
        TypeRef::Named {
            id: TypeId::new("pkg", "T"),
            underlying: Box::new(underlying),
        }
    }

    #[rstest]
    #[case::bool(TypeRef::Bool, Some(Node::scalar(Scalar::Bool(false))))]
    #[case::int(TypeRef::Int(IntKind::Uint8), Some(Node::scalar(Scalar::Int(0))))]
    #[case::string(TypeRef::String, Some(Node::string("")))]
    #[case::sequence(TypeRef::Sequence(Box::new(TypeRef::Bool)), Some(Node::empty_sequence()))]
    #[case::mapping(
        TypeRef::Mapping(Box::new(TypeRef::String), Box::new(TypeRef::Bool)),
        Some(Node::empty_mapping())
    )]
    #[case::record(named(TypeRef::Record), Some(Node::empty_mapping()))]
    #[case::optional_record(
        TypeRef::Optional(Box::new(named(TypeRef::Record))),
        Some(Node::empty_mapping())
    )]
    #[case::string_alias(named(TypeRef::String), Some(Node::string("")))]
    #[case::optional_int(TypeRef::Optional(Box::new(TypeRef::Int(IntKind::Int))), Some(Node::scalar(Scalar::Int(0))))]
    #[case::float(TypeRef::Float(64), None)]
    #[case::interface(named(TypeRef::Opaque("interface".to_owned())), None)]
    fn zero_values_follow_type_category(#[case] ty: TypeRef, #[case] expected: Option<Node>) {
        assert_eq!(zero_value(&ty), expected);
    }
}
