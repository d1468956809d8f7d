//! Metadata extraction from package declarations.
//!
//! The [`Extractor`] walks the exported record types of each requested
//! package, resolves every field's serialized key, requiredness and type
//! identity, and collects the results into a [`Catalog`].

mod resolve;

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use tracing::debug;

use crate::catalog::{Catalog, FieldMetadata, PackageMetadata, TypeId, TypeMetadata, TypeRef};
use crate::decl::{DeclarationProvider, FieldDecl, PackageDecl, TypeDecl, TypeShape};
use crate::error::PrettyconfResult;
use crate::tag::{JsonTag, parse_struct_tags};

use self::resolve::FieldSite;

/// Documentation marker that makes a field optional.
const OPTIONAL_MARKER: &str = "+optional";

/// Path segment whose prefix is dropped from displayed type names.
const VENDOR_SEGMENT: &str = "vendor/";

/// Builds a [`Catalog`] from the declarations served by a provider.
pub struct Extractor<'p> {
    provider: &'p dyn DeclarationProvider,
    packages: HashMap<String, Rc<PackageDecl>>,
    resolved: HashMap<TypeId, TypeRef>,
}

impl<'p> Extractor<'p> {
    /// Creates an extractor reading from `provider`.
    #[must_use]
    pub fn new(provider: &'p dyn DeclarationProvider) -> Self {
        Self {
            provider,
            packages: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    /// Extracts the record types of the requested packages.
    ///
    /// Packages without any exported record type carrying serialized fields
    /// are left out of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PackageNotFound`](crate::PrettyconfError::PackageNotFound)
    /// for an unknown requested package,
    /// [`TypeResolution`](crate::PrettyconfError::TypeResolution) when a field
    /// type cannot be resolved, and
    /// [`MalformedAnnotation`](crate::PrettyconfError::MalformedAnnotation)
    /// when a field annotation cannot be unescaped.
    pub fn extract<S: AsRef<str>>(&mut self, paths: &[S]) -> PrettyconfResult<Catalog> {
        let mut catalog = Catalog::new();
        for path in paths {
            let canonical = self.provider.canonical_path(path.as_ref());
            if let Some(package) = self.extract_package(&canonical)? {
                catalog.insert(package);
            }
        }
        Ok(catalog)
    }

    /// Extracts the requested packages and every package their record
    /// fields reach, so nested records declared elsewhere can be looked up.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Extractor::extract`].
    pub fn extract_closure<S: AsRef<str>>(&mut self, paths: &[S]) -> PrettyconfResult<Catalog> {
        let mut catalog = Catalog::new();
        let mut queue: VecDeque<String> = paths
            .iter()
            .map(|path| self.provider.canonical_path(path.as_ref()))
            .collect();
        let mut seen: BTreeSet<String> = queue.iter().cloned().collect();

        while let Some(path) = queue.pop_front() {
            let Some(package) = self.extract_package(&path)? else {
                continue;
            };
            for field in package.types.iter().flat_map(|ty| &ty.fields) {
                let mut ids = Vec::new();
                collect_record_ids(&field.type_ref, &mut ids);
                for id in ids {
                    if seen.insert(id.package.clone()) {
                        debug!(package = %id.package, via = %field.name, "queueing referenced package");
                        queue.push_back(id.package.clone());
                    }
                }
            }
            catalog.insert(package);
        }
        Ok(catalog)
    }

    fn extract_package(&mut self, path: &str) -> PrettyconfResult<Option<PackageMetadata>> {
        debug!(package = path, "parsing package");
        let decl = self.load(path)?;

        let mut types = Vec::new();
        for ty in &decl.types {
            if !ty.is_exported() {
                continue;
            }
            let TypeShape::Record(fields) = &ty.shape else {
                continue;
            };
            let mut flattening = vec![TypeId::new(decl.path.as_str(), ty.name.as_str())];
            let extracted = self.extract_fields(&decl.path, ty, fields, &mut flattening)?;
            if extracted.is_empty() {
                debug!(package = %decl.path, name = %ty.name, "skipping type - no serialized fields");
                continue;
            }
            debug!(package = %decl.path, name = %ty.name, fields = extracted.len(), "loaded record type");
            types.push(TypeMetadata {
                name: ty.name.clone(),
                package: decl.path.clone(),
                doc: ty.doc.trim().to_owned(),
                fields: extracted,
            });
        }

        if types.is_empty() {
            debug!(package = %decl.path, "skipping package - no exported types");
            return Ok(None);
        }
        Ok(Some(PackageMetadata {
            path: decl.path.clone(),
            doc: decl.doc.trim().to_owned(),
            types,
        }))
    }

    fn extract_fields(
        &mut self,
        package: &str,
        owner: &TypeDecl,
        fields: &[FieldDecl],
        flattening: &mut Vec<TypeId>,
    ) -> PrettyconfResult<Vec<FieldMetadata>> {
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            if !field.is_exported() {
                continue;
            }
            let tags = parse_struct_tags(field.tag.as_deref().unwrap_or_default())?;

            let mut serialized_key = field.name.clone();
            let mut required = true;
            if let Some(entry) = tags.get("json") {
                let json = JsonTag::parse(&entry.value);
                if json.is_skipped() {
                    debug!(owner = %owner.name, field = %field.name, "ignoring field as not serialized");
                    continue;
                }
                if let Some(name) = json.name {
                    serialized_key = name.to_owned();
                }
                required = !json.omit_empty;
            }

            let doc = field.doc.trim();
            if has_optional_marker(doc) {
                required = false;
            }

            let site = FieldSite {
                package,
                owner: &owner.name,
                field: &field.name,
            };
            let type_ref = self.resolve_expr(&site, package, &field.ty, &mut Vec::new())?;
            if field.flatten {
                let inlined = self.flatten_fields(&site, &type_ref, required, flattening)?;
                out.extend(inlined);
                continue;
            }
            let type_name = strip_vendor_prefix(&type_ref.to_string());
            debug!(
                owner = %owner.name,
                field = %field.name,
                key = %serialized_key,
                required,
                type_name = %type_name,
                "adding struct field"
            );
            out.push(FieldMetadata {
                name: field.name.clone(),
                doc: doc.to_owned(),
                anonymous: field.embedded,
                serialized_key,
                required,
                type_ref,
                type_name,
            });
        }
        Ok(out)
    }

    /// Extracts the fields of the record named by `type_ref` for inlining
    /// into the enclosing record. They stay required only when the
    /// flattened field itself is required and not optional.
    fn flatten_fields(
        &mut self,
        site: &FieldSite<'_>,
        type_ref: &TypeRef,
        required: bool,
        flattening: &mut Vec<TypeId>,
    ) -> PrettyconfResult<Vec<FieldMetadata>> {
        let Some(id) = type_ref.record_id().cloned() else {
            return Err(site.fail(type_ref, "only record types can be flattened"));
        };
        if flattening.contains(&id) {
            let chain: Vec<String> = flattening
                .iter()
                .chain(std::iter::once(&id))
                .map(ToString::to_string)
                .collect();
            return Err(site.fail(&id, format!("flatten cycle through {}", chain.join(" -> "))));
        }
        let decl = self.load(&id.package)?;
        let Some(inner) = decl.type_decl(&id.name) else {
            return Err(site.fail(&id, format!("no type {} declared in package", id.name)));
        };
        let TypeShape::Record(inner_fields) = &inner.shape else {
            return Err(site.fail(&id, "only record types can be flattened"));
        };

        flattening.push(id.clone());
        let extracted = self.extract_fields(&id.package, inner, inner_fields, flattening);
        flattening.pop();
        let mut inlined = extracted?;

        let inherit_optional = !required || matches!(type_ref, TypeRef::Optional(_));
        if inherit_optional {
            for field in &mut inlined {
                field.required = false;
            }
        }
        debug!(
            owner = %site.owner,
            field = %site.field,
            inlined = inlined.len(),
            "flattened record fields into owner"
        );
        Ok(inlined)
    }

    fn load(&mut self, path: &str) -> PrettyconfResult<Rc<PackageDecl>> {
        if let Some(decl) = self.packages.get(path) {
            return Ok(Rc::clone(decl));
        }
        let decl = Rc::new(self.provider.package(path)?);
        self.packages.insert(path.to_owned(), Rc::clone(&decl));
        Ok(decl)
    }
}

/// Returns `true` when any documentation line opens with `+optional`.
fn has_optional_marker(doc: &str) -> bool {
    doc.lines()
        .rev()
        .any(|line| line.trim().starts_with(OPTIONAL_MARKER))
}

/// Drops the path up to and including `vendor/` from each package path in a
/// displayed type name, leaving `*`, `[]` and `map[..]` decorations intact.
fn strip_vendor_prefix(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len());
    let mut rest = type_name;
    while let Some(idx) = rest.find(VENDOR_SEGMENT) {
        let (before, after) = rest.split_at(idx);
        let path_start = before
            .rfind(['*', '[', ']'])
            .map_or(0, |pos| pos + 1);
        out.push_str(before.get(..path_start).unwrap_or_default());
        rest = after.get(VENDOR_SEGMENT.len()..).unwrap_or_default();
    }
    out.push_str(rest);
    out
}

/// Collects every record identity nested anywhere inside `ty`.
fn collect_record_ids(ty: &TypeRef, out: &mut Vec<TypeId>) {
    match ty {
        TypeRef::Optional(inner) | TypeRef::Sequence(inner) => collect_record_ids(inner, out),
        TypeRef::Mapping(key, value) => {
            collect_record_ids(key, out);
            collect_record_ids(value, out);
        }
        TypeRef::Named { id, underlying } => {
            if **underlying == TypeRef::Record {
                out.push(id.clone());
            } else {
                collect_record_ids(underlying, out);
            }
        }
        TypeRef::Bool
        | TypeRef::Int(_)
        | TypeRef::Float(_)
        | TypeRef::String
        | TypeRef::Record
        | TypeRef::Opaque(_) => {}
    }
}
