//! Unit tests for struct tag parsing.

use rstest::rstest;

use super::{JsonTag, StructTag, parse_struct_tags};
use crate::error::PrettyconfError;

fn pairs(raw: &str) -> Vec<(String, String)> {
    parse_struct_tags(raw)
        .expect("parse tags")
        .iter()
        .map(|tag| (tag.name.clone(), tag.value.clone()))
        .collect()
}

#[rstest]
#[case::empty("", &[])]
#[case::single(r#"json:"f2""#, &[("json", "f2")])]
#[case::leading_spaces(r#"   json:"f2""#, &[("json", "f2")])]
#[case::multiple(
    r#"json:"aws,omitempty" yaml:"aws,omitempty""#,
    &[("json", "aws,omitempty"), ("yaml", "aws,omitempty")]
)]
#[case::duplicates(r#"json:"a" json:"b""#, &[("json", "a"), ("json", "b")])]
#[case::empty_value(r#"json:"""#, &[("json", "")])]
#[case::escaped_quote(r#"doc:"say \"hi\"""#, &[("doc", "say \"hi\"")])]
#[case::escapes(r#"doc:"a\tb\nc\\d""#, &[("doc", "a\tb\nc\\d")])]
#[case::hex_and_octal(r#"doc:"\x41\102""#, &[("doc", "AB")])]
#[case::unicode(r#"doc:"é\U0001F600""#, &[("doc", "\u{e9}\u{1F600}")])]
#[case::multibyte_key(r#"clé:"v""#, &[("clé", "v")])]
fn parses_well_formed_tags(#[case] raw: &str, #[case] expected: &[(&str, &str)]) {
    let expected: Vec<(String, String)> = expected
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    assert_eq!(pairs(raw), expected);
}

#[rstest]
#[case::missing_colon(r#"json "f2""#, &[])]
#[case::space_before_quote(r#"json: "f2""#, &[])]
#[case::unquoted_value("json:f2", &[])]
#[case::bare_word(r#"json:"a" trailing"#, &[("json", "a")])]
#[case::colon_first(r#":"value""#, &[])]
#[case::unterminated(r#"json:"a" yaml:"b"#, &[("json", "a")])]
#[case::dangling_escape(r#"json:"a" yaml:"b\"#, &[("json", "a")])]
#[case::delete_byte("js\u{7f}on:\"a\"", &[])]
fn stops_at_first_syntax_anomaly(#[case] raw: &str, #[case] expected: &[(&str, &str)]) {
    let expected: Vec<(String, String)> = expected
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    assert_eq!(pairs(raw), expected);
}

#[rstest]
#[case::unknown_escape(r#"json:"\q""#)]
#[case::single_quote_escape(r#"json:"\'""#)]
#[case::short_hex(r#"json:"\x4""#)]
#[case::octal_overflow(r#"json:"\400""#)]
#[case::surrogate(r#"json:"\ud800""#)]
#[case::invalid_utf8(r#"json:"\xff""#)]
#[case::raw_newline("json:\"a\nb\"")]
fn rejects_values_that_fail_to_unescape(#[case] raw: &str) {
    let err = parse_struct_tags(raw).expect_err("unescape should fail");
    assert!(
        matches!(err, PrettyconfError::MalformedAnnotation { ref tag, .. } if tag == raw),
        "unexpected error: {err:?}"
    );
}

#[test]
fn first_occurrence_wins_on_lookup() {
    let tags = parse_struct_tags(r#"json:"first" json:"second""#).expect("parse tags");
    assert_eq!(tags.len(), 2);
    assert!(tags.has("json"));
    assert!(!tags.has("yaml"));
    assert_eq!(
        tags.get("json"),
        Some(&StructTag {
            name: "json".to_owned(),
            value: "first".to_owned(),
        })
    );
}

#[test]
fn display_requotes_values() {
    let tags = parse_struct_tags(r#"json:"a,omitempty" doc:"x\"y""#).expect("parse tags");
    assert_eq!(tags.to_string(), r#"`json:"a,omitempty" doc:"x\"y"`"#);
}

#[rstest]
#[case::plain("f2", Some("f2"), false)]
#[case::omit_empty("x,omitempty", Some("x"), true)]
#[case::name_defaulted(",omitempty", None, true)]
#[case::inline(",inline", None, false)]
#[case::skipped("-", Some("-"), false)]
#[case::empty("", None, false)]
fn interprets_json_tag_values(
    #[case] value: &str,
    #[case] name: Option<&str>,
    #[case] omit_empty: bool,
) {
    let tag = JsonTag::parse(value);
    assert_eq!(tag.name, name);
    assert_eq!(tag.omit_empty, omit_empty);
    assert_eq!(tag.is_skipped(), name == Some("-"));
}
