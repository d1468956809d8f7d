//! Resolution of declared field types into [`TypeRef`] identities.

use tracing::trace;

use super::Extractor;
use crate::catalog::{IntKind, TypeId, TypeRef};
use crate::decl::{TypeExpr, TypeShape};
use crate::error::{PrettyconfError, PrettyconfResult};

/// Field whose type is being resolved, used for error context.
pub(super) struct FieldSite<'a> {
    pub package: &'a str,
    pub owner: &'a str,
    pub field: &'a str,
}

impl FieldSite<'_> {
    pub(super) fn fail(&self, type_name: impl ToString, message: impl Into<String>) -> PrettyconfError {
        PrettyconfError::TypeResolution {
            package: self.package.to_owned(),
            owner: self.owner.to_owned(),
            field: self.field.to_owned(),
            type_name: type_name.to_string(),
            message: message.into(),
        }
    }
}

/// Maps a builtin identifier to its resolved type.
///
/// A `::` path names a type outside the declarations, which is opaque.
fn builtin(name: &str) -> Option<TypeRef> {
    if let Some(kind) = IntKind::from_builtin(name) {
        return Some(TypeRef::Int(kind));
    }
    let ty = match name {
        "bool" => TypeRef::Bool,
        "string" => TypeRef::String,
        "float32" => TypeRef::Float(32),
        "float64" => TypeRef::Float(64),
        "any" | "interface{}" | "error" | "()" => TypeRef::Opaque(name.to_owned()),
        external if external.contains("::") => TypeRef::Opaque(external.to_owned()),
        _ => return None,
    };
    Some(ty)
}

impl Extractor<'_> {
    /// Resolves `expr` as written in `package`.
    ///
    /// `aliases` holds the alias declarations currently being expanded.
    pub(super) fn resolve_expr(
        &mut self,
        site: &FieldSite<'_>,
        package: &str,
        expr: &TypeExpr,
        aliases: &mut Vec<TypeId>,
    ) -> PrettyconfResult<TypeRef> {
        let resolved = match expr {
            TypeExpr::Ident(name) => match builtin(name) {
                Some(ty) => ty,
                None => self.resolve_named(site, TypeId::new(package, name.clone()), aliases)?,
            },
            TypeExpr::Qualified {
                package: qualifier,
                name,
            } => {
                let id = TypeId::new(self.provider.canonical_path(qualifier), name.clone());
                self.resolve_named(site, id, aliases)?
            }
            TypeExpr::Pointer(elem) => {
                TypeRef::Optional(Box::new(self.resolve_expr(site, package, elem, aliases)?))
            }
            TypeExpr::Slice(elem) => {
                TypeRef::Sequence(Box::new(self.resolve_expr(site, package, elem, aliases)?))
            }
            TypeExpr::Map(key, value) => TypeRef::Mapping(
                Box::new(self.resolve_expr(site, package, key, aliases)?),
                Box::new(self.resolve_expr(site, package, value, aliases)?),
            ),
        };
        Ok(resolved)
    }

    fn resolve_named(
        &mut self,
        site: &FieldSite<'_>,
        id: TypeId,
        aliases: &mut Vec<TypeId>,
    ) -> PrettyconfResult<TypeRef> {
        if let Some(cached) = self.resolved.get(&id) {
            return Ok(cached.clone());
        }
        if aliases.contains(&id) {
            let chain: Vec<String> = aliases.iter().map(ToString::to_string).collect();
            return Err(site.fail(&id, format!("alias cycle through {}", chain.join(" -> "))));
        }

        let decl = match self.load(&id.package) {
            Ok(decl) => decl,
            Err(PrettyconfError::PackageNotFound { package }) => {
                return Err(site.fail(&id, format!("package '{package}' could not be found")));
            }
            Err(err) => return Err(err),
        };
        let Some(ty) = decl.type_decl(&id.name) else {
            return Err(site.fail(&id, format!("no type {} declared in package", id.name)));
        };

        let resolved = match &ty.shape {
            TypeShape::Record(_) => TypeRef::Named {
                id: id.clone(),
                underlying: Box::new(TypeRef::Record),
            },
            TypeShape::Interface => TypeRef::Named {
                id: id.clone(),
                underlying: Box::new(TypeRef::Opaque("interface".to_owned())),
            },
            TypeShape::Alias(target) => {
                aliases.push(id.clone());
                let expanded = self.resolve_expr(site, &id.package, target, aliases);
                aliases.pop();
                let underlying = expanded?;
                if underlying.record_id().is_some() && !matches!(underlying, TypeRef::Optional(_)) {
                    // An alias of a record names that record.
                    underlying
                } else {
                    TypeRef::Named {
                        id: id.clone(),
                        underlying: Box::new(underlying),
                    }
                }
            }
        };
        trace!(id = %id, resolved = ?resolved, "resolved named type");
        self.resolved.insert(id, resolved.clone());
        Ok(resolved)
    }
}
