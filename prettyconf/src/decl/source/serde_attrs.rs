//! Serde attribute parsing helpers.
//!
//! Rust source carries no `key:"value"` annotations, so the provider lowers
//! the serde attributes that decide a field's serialized key and presence
//! into an equivalent `json:"..."` annotation string.

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr, Token, parenthesized};

/// Supported `#[serde(rename_all = "...")]` rules for struct fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SerdeRenameAll {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl SerdeRenameAll {
    fn parse(value: &LitStr) -> syn::Result<Self> {
        match value.value().as_str() {
            "lowercase" => Ok(Self::Lower),
            "UPPERCASE" => Ok(Self::Upper),
            "PascalCase" => Ok(Self::Pascal),
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            "kebab-case" => Ok(Self::Kebab),
            "SCREAMING-KEBAB-CASE" => Ok(Self::ScreamingKebab),
            other => Err(syn::Error::new(
                value.span(),
                format!(
                    "unsupported serde rename_all value '{other}'; expected one of \
\"lowercase\", \"UPPERCASE\", \"PascalCase\", \"camelCase\", \"snake_case\", \
\"SCREAMING_SNAKE_CASE\", \"kebab-case\", or \"SCREAMING-KEBAB-CASE\""
                ),
            )),
        }
    }

    pub(super) fn apply(self, field_name: &str) -> String {
        match self {
            Self::Lower => field_name.to_ascii_lowercase(),
            Self::Upper => field_name.to_ascii_uppercase(),
            Self::Pascal => field_name.to_upper_camel_case(),
            Self::Camel => field_name.to_lower_camel_case(),
            Self::Snake => field_name.to_snake_case(),
            Self::ScreamingSnake => field_name.to_shouty_snake_case(),
            Self::Kebab => field_name.to_kebab_case(),
            Self::ScreamingKebab => field_name.to_shouty_kebab_case(),
        }
    }
}

/// Container-level serde settings that affect every field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct SerdeContainerAttrs {
    pub rename_all: Option<SerdeRenameAll>,
    pub default: bool,
}

/// Field-level serde settings relevant to the serialized shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(super) struct SerdeFieldAttrs {
    pub rename: Option<String>,
    pub skip: bool,
    pub omit_empty: bool,
    pub flatten: bool,
}

impl SerdeFieldAttrs {
    /// Renders the equivalent `json` annotation for a field serialized as `key`.
    pub(super) fn to_tag(&self, key: &str, container: SerdeContainerAttrs) -> String {
        if self.skip {
            return r#"json:"-""#.to_owned();
        }
        let mut value = key.to_owned();
        if self.omit_empty || container.default {
            value.push_str(",omitempty");
        }
        format!("json:{}", quote_tag_value(&value))
    }
}

/// Parse container attributes: `rename_all` (or `rename_all(serialize = ...)`) and `default`.
pub(super) fn serde_container_attrs(attrs: &[Attribute]) -> syn::Result<SerdeContainerAttrs> {
    let mut out = SerdeContainerAttrs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if meta.input.peek(Token![=]) {
                    let value = meta.value()?.parse::<LitStr>()?;
                    out.rename_all = Some(SerdeRenameAll::parse(&value)?);
                    return Ok(());
                }
                return meta.parse_nested_meta(|nested| {
                    if nested.path.is_ident("serialize") {
                        let value = nested.value()?.parse::<LitStr>()?;
                        out.rename_all = Some(SerdeRenameAll::parse(&value)?);
                        return Ok(());
                    }
                    discard_unknown(&nested)
                });
            }
            if meta.path.is_ident("default") {
                out.default = true;
            }
            discard_unknown(&meta)
        })?;
    }
    Ok(out)
}

/// Parse the field attributes that change the serialized key or presence.
pub(super) fn serde_field_attrs(attrs: &[Attribute]) -> syn::Result<SerdeFieldAttrs> {
    let mut out = SerdeFieldAttrs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                return parse_rename(&meta, &mut out.rename);
            }
            if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                out.skip = true;
            } else if meta.path.is_ident("skip_serializing_if") || meta.path.is_ident("default") {
                out.omit_empty = true;
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            }
            discard_unknown(&meta)
        })?;
    }
    Ok(out)
}

fn parse_rename(meta: &ParseNestedMeta, rename: &mut Option<String>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let value = meta.value()?.parse::<LitStr>()?;
        *rename = Some(value.value());
        return Ok(());
    }

    if !meta.input.peek(syn::token::Paren) {
        return Ok(());
    }

    meta.parse_nested_meta(|nested| {
        if !nested.path.is_ident("serialize") {
            return discard_unknown(&nested);
        }
        let value = nested.value()?.parse::<LitStr>()?;
        *rename = Some(value.value());
        Ok(())
    })
}

fn discard_unknown(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<proc_macro2::TokenStream>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

/// Quotes `value` as a double-quoted annotation literal.
fn quote_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
