//! Type lowering helpers.
//!
//! These utilities perform shallow inspection of `syn::Type` values to map
//! wrapper types such as `Option<T>`, collection containers such as `Vec<T>`
//! and `BTreeMap<K, V>`, and primitive types onto [`TypeExpr`].

use std::collections::{BTreeMap, BTreeSet};

use syn::{GenericArgument, PathArguments, Type, UseTree};

use crate::decl::TypeExpr;

/// Name resolution context for one module: its path, its `use` imports and
/// its child modules.
#[derive(Debug, Clone, Default)]
pub(super) struct Scope {
    module: Vec<String>,
    imports: BTreeMap<String, Vec<String>>,
    children: BTreeSet<String>,
}

impl Scope {
    pub(super) fn new(module: &str) -> Self {
        Self {
            module: module.split("::").map(str::to_owned).collect(),
            imports: BTreeMap::new(),
            children: BTreeSet::new(),
        }
    }

    /// Records a `mod` declared in this module.
    pub(super) fn add_child(&mut self, name: &syn::Ident) {
        self.children.insert(name.to_string());
    }

    /// Records the names brought into scope by a `use` tree.
    pub(super) fn add_use(&mut self, tree: &UseTree) {
        let mut prefix = Vec::new();
        self.collect_use(tree, &mut prefix);
    }

    fn collect_use(&mut self, tree: &UseTree, prefix: &mut Vec<String>) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.collect_use(&path.tree, prefix);
                prefix.pop();
            }
            UseTree::Name(name) => self.bind(&name.ident, None, prefix),
            UseTree::Rename(rename) => self.bind(&rename.ident, Some(&rename.rename), prefix),
            UseTree::Group(group) => {
                for item in &group.items {
                    self.collect_use(item, prefix);
                }
            }
            UseTree::Glob(_) => {}
        }
    }

    fn bind(&mut self, ident: &syn::Ident, alias: Option<&syn::Ident>, prefix: &[String]) {
        let mut full = prefix.to_vec();
        if ident != "self" {
            full.push(ident.to_string());
        }
        let Some(last) = full.last().cloned() else {
            return;
        };
        let local = alias.map_or(last, ToString::to_string);
        let absolute = self.absolutize(&full);
        self.imports.insert(local, absolute);
    }

    /// Rewrites `self::` and `super::` prefixes against the module path.
    fn absolutize(&self, segments: &[String]) -> Vec<String> {
        let mut base = self.module.clone();
        let mut rest = segments;
        match rest.first().map(String::as_str) {
            Some("self") => rest = rest.get(1..).unwrap_or_default(),
            Some("super") => {
                while let Some(("super", tail)) = rest.split_first().map(|(h, t)| (h.as_str(), t)) {
                    base.pop();
                    rest = tail;
                }
            }
            _ => return segments.to_vec(),
        }
        base.extend(rest.iter().cloned());
        base
    }

    fn resolve_path(&self, segments: &[String]) -> Vec<String> {
        match segments.split_first() {
            Some((head, _)) if head == "crate" || head == "self" || head == "super" => {
                self.absolutize(segments)
            }
            Some((head, tail)) => match self.imports.get(head) {
                Some(imported) => imported.iter().chain(tail).cloned().collect(),
                None if self.children.contains(head) => {
                    self.module.iter().chain(segments).cloned().collect()
                }
                None => segments.to_vec(),
            },
            None => Vec::new(),
        }
    }
}

/// Extract the type arguments from a `PathArguments` container.
fn type_arguments(args: &PathArguments) -> Vec<&Type> {
    let PathArguments::AngleBracketed(angle_args) = args else {
        return Vec::new();
    };
    angle_args
        .args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        })
        .collect()
}

/// Builtin name for a primitive or string-like type, if `name` is one.
fn builtin_name(name: &str) -> Option<&'static str> {
    let builtin = match name {
        "bool" => "bool",
        "i8" => "int8",
        "i16" => "int16",
        "i32" => "int32",
        "i64" => "int64",
        "isize" => "int",
        "u8" => "uint8",
        "u16" => "uint16",
        "u32" => "uint32",
        "u64" => "uint64",
        "usize" => "uint",
        "f32" => "float32",
        "f64" => "float64",
        "char" | "str" | "String" | "Path" | "PathBuf" | "OsString" | "Utf8Path"
        | "Utf8PathBuf" => "string",
        _ => return None,
    };
    Some(builtin)
}

/// Lowers a Rust type into a [`TypeExpr`].
///
/// Types the lowering does not understand become identifiers that the
/// extractor later fails to resolve, so the error names the offending field.
/// Paths outside the crate stay `::`-joined identifiers, which resolve as
/// opaque types.
pub(super) fn lower_type(ty: &Type, scope: &Scope) -> TypeExpr {
    match ty {
        Type::Reference(reference) => lower_type(&reference.elem, scope),
        Type::Paren(paren) => lower_type(&paren.elem, scope),
        Type::Group(group) => lower_type(&group.elem, scope),
        Type::Slice(slice) => lower_type(&slice.elem, scope).slice(),
        Type::Array(array) => lower_type(&array.elem, scope).slice(),
        Type::Path(path) if path.qself.is_none() => lower_path(&path.path, scope),
        Type::Tuple(tuple) if tuple.elems.is_empty() => TypeExpr::ident("()"),
        _ => TypeExpr::ident("<unsupported>"),
    }
}

fn lower_path(path: &syn::Path, scope: &Scope) -> TypeExpr {
    let Some(last) = path.segments.last() else {
        return TypeExpr::ident("<unsupported>");
    };
    let ident = last.ident.to_string();
    let args = type_arguments(&last.arguments);
    let lower_arg = |idx: usize| {
        args.get(idx)
            .map_or_else(|| TypeExpr::ident("<missing>"), |arg| lower_type(arg, scope))
    };

    match ident.as_str() {
        "Option" => return lower_arg(0).pointer(),
        "Box" | "Rc" | "Arc" | "Cow" => {
            // `Cow<'a, T>` carries its type as the only type argument.
            return lower_arg(0);
        }
        "Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "IndexSet" => return lower_arg(0).slice(),
        "HashMap" | "BTreeMap" | "IndexMap" => return TypeExpr::map(lower_arg(0), lower_arg(1)),
        _ => {}
    }
    if let Some(builtin) = builtin_name(&ident) {
        return TypeExpr::ident(builtin);
    }

    let segments: Vec<String> = path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect();
    let resolved = scope.resolve_path(&segments);
    match resolved.split_last() {
        Some((name, package)) if package.first().is_some_and(|head| head == "crate") => {
            TypeExpr::qualified(package.join("::"), name.clone())
        }
        Some((_, package)) if !package.is_empty() => TypeExpr::ident(resolved.join("::")),
        Some((name, _)) => TypeExpr::ident(name.clone()),
        None => TypeExpr::ident("<unsupported>"),
    }
}
