//! Declarations read from Rust source files.
//!
//! A package path names a module of the crate rooted at
//! [`SourceProvider::root`]: `crate` is `src/lib.rs` (or `src/main.rs`) and
//! `crate::a::b` is `src/a/b.rs`, `src/a/b/mod.rs`, or an inline `mod b { }`
//! inside the parent module. Serde attributes are lowered into `json`
//! annotations so the extractor sees the same key and presence rules serde
//! applies when serializing.

mod serde_attrs;
mod type_utils;

use camino::{Utf8Path, Utf8PathBuf};
use syn::ext::IdentExt;
use syn::{Attribute, Expr, Fields, Item, ItemEnum, ItemStruct, Lit, Meta, Visibility};
use tracing::debug;

use self::serde_attrs::{SerdeContainerAttrs, serde_container_attrs, serde_field_attrs};
use self::type_utils::{Scope, lower_type};
use super::{DeclarationProvider, FieldDecl, PackageDecl, TypeDecl, TypeExpr, TypeShape};
use crate::error::{PrettyconfError, PrettyconfResult};

/// Provider that parses the modules of a Rust crate with `syn`.
#[derive(Debug, Clone)]
pub struct SourceProvider {
    root: Utf8PathBuf,
}

/// Parsed contents of one module.
struct ModuleSource {
    file: Utf8PathBuf,
    attrs: Vec<Attribute>,
    items: Vec<Item>,
}

impl SourceProvider {
    /// Creates a provider for the crate whose manifest directory is `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Crate directory containing `src/`.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn load_module(&self, segments: &[String]) -> PrettyconfResult<Option<ModuleSource>> {
        let src = self.root.join("src");
        for candidate in module_files(&src, segments) {
            if candidate.is_file() {
                return parse_module_file(candidate).map(Some);
            }
        }

        let Some((name, parent_segments)) = segments.split_last() else {
            return Ok(None);
        };
        let Some(parent) = self.load_module(parent_segments)? else {
            return Ok(None);
        };
        let file = parent.file;
        Ok(parent.items.into_iter().find_map(|item| match item {
            Item::Mod(module) if module.ident == name => {
                module.content.map(|(_, items)| ModuleSource {
                    file: file.clone(),
                    attrs: module.attrs,
                    items,
                })
            }
            _ => None,
        }))
    }
}

impl DeclarationProvider for SourceProvider {
    fn package(&self, path: &str) -> PrettyconfResult<PackageDecl> {
        let normalized = normalize_module_path(path);
        let segments: Vec<String> = normalized
            .split("::")
            .skip(1)
            .map(str::to_owned)
            .collect();
        let module = self
            .load_module(&segments)?
            .ok_or_else(|| PrettyconfError::package_not_found(path))?;
        debug!(package = %normalized, file = %module.file, "parsed module source");
        let file = module.file.clone();
        lower_module(&normalized, module).map_err(|source| PrettyconfError::Source {
            path: file,
            source,
        })
    }

    fn canonical_path(&self, path: &str) -> String {
        normalize_module_path(path)
    }
}

/// Prefixes `crate::` onto a module path that lacks it.
///
/// ```
/// use prettyconf::decl::normalize_module_path;
///
/// assert_eq!(normalize_module_path("config::net"), "crate::config::net");
/// assert_eq!(normalize_module_path("crate"), "crate");
/// assert_eq!(normalize_module_path(""), "crate");
/// ```
#[must_use]
pub fn normalize_module_path(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches("::");
    if trimmed.is_empty() || trimmed == "crate" {
        return "crate".to_owned();
    }
    if trimmed.starts_with("crate::") {
        return trimmed.to_owned();
    }
    format!("crate::{trimmed}")
}

fn module_files(src: &Utf8Path, segments: &[String]) -> Vec<Utf8PathBuf> {
    if segments.is_empty() {
        return vec![src.join("lib.rs"), src.join("main.rs")];
    }
    let relative = segments.join("/");
    vec![
        src.join(format!("{relative}.rs")),
        src.join(&relative).join("mod.rs"),
    ]
}

fn parse_module_file(file: Utf8PathBuf) -> PrettyconfResult<ModuleSource> {
    let contents =
        std::fs::read_to_string(&file).map_err(|err| PrettyconfError::io(file.clone(), err))?;
    let parsed = syn::parse_file(&contents).map_err(|source| PrettyconfError::Source {
        path: file.clone(),
        source,
    })?;
    Ok(ModuleSource {
        file,
        attrs: parsed.attrs,
        items: parsed.items,
    })
}

fn lower_module(path: &str, module: ModuleSource) -> syn::Result<PackageDecl> {
    let mut scope = Scope::new(path);
    for item in &module.items {
        match item {
            Item::Use(item_use) => scope.add_use(&item_use.tree),
            Item::Mod(child) => scope.add_child(&child.ident),
            _ => {}
        }
    }

    let mut types = Vec::new();
    for item in &module.items {
        let decl = match item {
            Item::Struct(strukt) => lower_struct(strukt, &scope)?,
            Item::Enum(enumeration) => lower_enum(enumeration),
            Item::Type(alias) => TypeDecl {
                name: alias.ident.unraw().to_string(),
                doc: doc_text(&alias.attrs),
                exported: Some(is_public(&alias.vis)),
                shape: TypeShape::Alias(lower_type(&alias.ty, &scope)),
            },
            _ => continue,
        };
        debug!(package = path, name = %decl.name, "lowered type declaration");
        types.push(decl);
    }

    Ok(PackageDecl {
        path: path.to_owned(),
        doc: doc_text(&module.attrs),
        types,
    })
}

fn lower_struct(item: &ItemStruct, scope: &Scope) -> syn::Result<TypeDecl> {
    let shape = match &item.fields {
        Fields::Named(named) => {
            let container = serde_container_attrs(&item.attrs)?;
            let fields = named
                .named
                .iter()
                .map(|field| lower_field(field, container, scope))
                .collect::<syn::Result<Vec<_>>>()?;
            TypeShape::Record(fields)
        }
        // Newtypes serialize as their inner value.
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => unnamed
            .unnamed
            .first()
            .map_or(TypeShape::Interface, |field| {
                TypeShape::Alias(lower_type(&field.ty, scope))
            }),
        _ => TypeShape::Interface,
    };
    Ok(TypeDecl {
        name: item.ident.unraw().to_string(),
        doc: doc_text(&item.attrs),
        exported: Some(is_public(&item.vis)),
        shape,
    })
}

fn lower_field(
    field: &syn::Field,
    container: SerdeContainerAttrs,
    scope: &Scope,
) -> syn::Result<FieldDecl> {
    let name = field
        .ident
        .as_ref()
        .map(|ident| ident.unraw().to_string())
        .unwrap_or_default();
    let attrs = serde_field_attrs(&field.attrs)?;
    let key = attrs.rename.clone().unwrap_or_else(|| {
        container
            .rename_all
            .map_or_else(|| name.clone(), |rule| rule.apply(&name))
    });
    Ok(FieldDecl {
        tag: Some(attrs.to_tag(&key, container)),
        doc: doc_text(&field.attrs),
        embedded: false,
        flatten: attrs.flatten,
        // Serde serializes private fields too.
        exported: Some(true),
        ty: lower_type(&field.ty, scope),
        name,
    })
}

/// Unit-only enums serialize as their variant names; anything else is opaque.
fn lower_enum(item: &ItemEnum) -> TypeDecl {
    let unit_only = item
        .variants
        .iter()
        .all(|variant| matches!(variant.fields, Fields::Unit));
    let shape = if unit_only && !item.variants.is_empty() {
        TypeShape::Alias(TypeExpr::ident("string"))
    } else {
        TypeShape::Interface
    };
    TypeDecl {
        name: item.ident.unraw().to_string(),
        doc: doc_text(&item.attrs),
        exported: Some(is_public(&item.vis)),
        shape,
    }
}

fn is_public(vis: &Visibility) -> bool {
    !matches!(vis, Visibility::Inherited)
}

/// Joins `#[doc]` attributes into trimmed documentation text.
fn doc_text(attrs: &[Attribute]) -> String {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(text) => Some(text.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .flat_map(|text| {
            text.lines()
                .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end().to_owned())
                .collect::<Vec<_>>()
        })
        .collect();
    lines.join("\n").trim().to_owned()
}

#[cfg(test)]
mod tests;
