//! Block-style YAML encoder.
//!
//! Mapping entries are written one per line with two-space indentation and
//! their comments as `# ` lines directly above the key. Sequence items are
//! indented beneath their key. Empty collections use the flow forms `[]` and
//! `{}`. Strings that a YAML reader would resolve to another type are
//! double-quoted.

use crate::tree::{Entry, Node, NodeValue, Scalar};

const INDENT: usize = 2;

/// First characters that YAML treats as indicators in plain scalars.
const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

/// Plain scalars that resolve to booleans or null.
const RESERVED: &[&str] = &[
    "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~", "<<",
];

/// Dropped by readers when it opens a plain scalar.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Encodes trees as commented block-style YAML.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlEncoder;

impl YamlEncoder {
    /// Creates an encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Encodes `node` as a YAML document.
    ///
    /// A root comment is followed by a blank line before the body.
    ///
    /// # Examples
    ///
    /// ```
    /// use prettyconf::encode::YamlEncoder;
    /// use prettyconf::tree::{Entry, Node, NodeValue};
    ///
    /// let mut entry = Entry::new("port", Node::string("8080"));
    /// entry.comment = Some("port to listen on.".to_owned());
    /// let mut root = Node::new(NodeValue::Mapping(vec![entry]));
    /// root.comment = Some("Server settings.".to_owned());
    ///
    /// assert_eq!(
    ///     YamlEncoder::new().encode(&root),
    ///     "# Server settings.\n\n# port to listen on.\nport: \"8080\"\n"
    /// );
    /// ```
    #[must_use]
    pub fn encode(self, node: &Node) -> String {
        let mut out = String::new();
        if let Some(comment) = &node.comment {
            push_comment(&mut out, comment, 0);
            out.push('\n');
        }
        push_node(&mut out, &node.value, 0);
        out
    }
}

fn push_node(out: &mut String, value: &NodeValue, indent: usize) {
    match value {
        NodeValue::Mapping(entries) if !entries.is_empty() => push_entries(out, entries, indent),
        NodeValue::Sequence(items) if !items.is_empty() => push_items(out, items, indent),
        other => {
            out.push_str(&inline_text(other));
            out.push('\n');
        }
    }
}

fn push_entries(out: &mut String, entries: &[Entry], indent: usize) {
    for entry in entries {
        if let Some(comment) = &entry.comment {
            push_comment(out, comment, indent);
        }
        push_pad(out, indent);
        out.push_str(&string_text(&entry.key));
        out.push(':');
        if is_block(&entry.value.value) {
            out.push('\n');
            push_node(out, &entry.value.value, indent + INDENT);
        } else {
            out.push(' ');
            push_node(out, &entry.value.value, indent);
        }
    }
}

fn push_items(out: &mut String, items: &[Node], indent: usize) {
    let nested_pad = " ".repeat(indent + INDENT);
    for item in items {
        if let Some(comment) = &item.comment {
            push_comment(out, comment, indent);
        }
        push_pad(out, indent);
        out.push_str("- ");
        if is_block(&item.value) {
            // The first nested line moves up beside the dash.
            let mut nested = String::new();
            push_node(&mut nested, &item.value, indent + INDENT);
            out.push_str(nested.strip_prefix(nested_pad.as_str()).unwrap_or(&nested));
        } else {
            out.push_str(&inline_text(&item.value));
            out.push('\n');
        }
    }
}

fn push_comment(out: &mut String, comment: &str, indent: usize) {
    for line in comment.lines() {
        push_pad(out, indent);
        if line.is_empty() {
            out.push('#');
        } else {
            out.push_str("# ");
            out.push_str(line);
        }
        out.push('\n');
    }
}

fn push_pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

const fn is_block(value: &NodeValue) -> bool {
    match value {
        NodeValue::Mapping(entries) => !entries.is_empty(),
        NodeValue::Sequence(items) => !items.is_empty(),
        NodeValue::Scalar(_) => false,
    }
}

fn inline_text(value: &NodeValue) -> String {
    match value {
        NodeValue::Scalar(scalar) => scalar_text(scalar),
        NodeValue::Sequence(_) => "[]".to_owned(),
        NodeValue::Mapping(_) => "{}".to_owned(),
    }
}

fn scalar_text(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Null => "null".to_owned(),
        Scalar::Bool(flag) => flag.to_string(),
        Scalar::Int(int) => int.to_string(),
        Scalar::UInt(uint) => uint.to_string(),
        Scalar::Float(float) => float_text(*float),
        Scalar::String(text) => string_text(text),
    }
}

fn float_text(value: f64) -> String {
    if value.is_nan() {
        return ".nan".to_owned();
    }
    if value.is_infinite() {
        let text = if value.is_sign_negative() { "-.inf" } else { ".inf" };
        return text.to_owned();
    }
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

/// Writes `text` plain when it reads back as the same string, quoted otherwise.
fn string_text(text: &str) -> String {
    if needs_quotes(text) {
        quote(text)
    } else {
        text.to_owned()
    }
}

fn needs_quotes(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return true;
    };
    text != text.trim()
        || RESERVED.iter().any(|word| word.eq_ignore_ascii_case(text))
        || looks_numeric(text)
        || INDICATORS.contains(&first)
        || text.contains(": ")
        || text.contains(" #")
        || text.ends_with(':')
        || text.chars().any(|c| c.is_control() || c == BYTE_ORDER_MARK)
}

fn looks_numeric(text: &str) -> bool {
    let starts_with_digit = text.chars().next().is_some_and(|c| c.is_ascii_digit());
    let special = [".inf", "+.inf", "-.inf", ".nan"]
        .iter()
        .any(|word| word.eq_ignore_ascii_case(text));
    starts_with_digit || special || text.parse::<f64>().is_ok()
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            BYTE_ORDER_MARK => quoted.push_str("\\uFEFF"),
            c if c.is_control() => quoted.push_str(&format!("\\x{:02X}", u32::from(c))),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    //! Unit tests for YAML emission.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn commented(key: &str, comment: &str, value: Node) -> Entry {
        let mut entry = Entry::new(key, value);
        entry.comment = Some(comment.to_owned());
        entry
    }

    fn mapping(entries: Vec<Entry>) -> Node {
        Node::new(NodeValue::Mapping(entries))
    }

    #[rstest]
    #[case::plain("somestring", "somestring")]
    #[case::inner_space("something new", "something new")]
    #[case::empty("", "\"\"")]
    #[case::boolean("true", "\"true\"")]
    #[case::yes("Yes", "\"Yes\"")]
    #[case::null("null", "\"null\"")]
    #[case::tilde("~", "\"~\"")]
    #[case::integer("8080", "\"8080\"")]
    #[case::float("1.5", "\"1.5\"")]
    #[case::exponent("1e3", "\"1e3\"")]
    #[case::infinity(".inf", "\".inf\"")]
    #[case::leading_space(" padded", "\" padded\"")]
    #[case::indicator("*star", "\"*star\"")]
    #[case::dash("-flag", "\"-flag\"")]
    #[case::mapping_like("key: value", "\"key: value\"")]
    #[case::comment_like("value #note", "\"value #note\"")]
    #[case::trailing_colon("host:", "\"host:\"")]
    #[case::newline("two\nlines", "\"two\\nlines\"")]
    #[case::escapes("say \"hi\" \\o/", "say \"hi\" \\o/")]
    #[case::url("https://example.com/a#b", "https://example.com/a#b")]
    #[case::merge_key("<<", "\"<<\"")]
    #[case::byte_order_mark("\u{feff}k", "\"\\uFEFFk\"")]
    fn quotes_strings_that_would_change_type(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(string_text(input), expected);
    }

    #[cfg(feature = "yaml")]
    #[rstest]
    #[case::merge_key("<<")]
    #[case::byte_order_mark("\u{feff}k")]
    #[case::inner_byte_order_mark("a\u{feff}b")]
    #[case::reserved("off")]
    #[case::numeric("0x1F")]
    #[case::indicator("&anchor")]
    fn strings_read_back_unchanged(#[case] text: &str) {
        use crate::document::DocumentFormat;

        let value = serde_json::Value::Object(std::iter::once((text.to_owned(), json!(text))).collect());
        let encoded = YamlEncoder::new().encode(&Node::from(value.clone()));
        let decoded: serde_json::Value = DocumentFormat::Yaml
            .decode(camino::Utf8Path::new("out.yaml"), &encoded)
            .expect("decode encoded document");
        assert_eq!(decoded, value, "encoded as:\n{encoded}");
    }

    #[test]
    fn escapes_quoted_strings() {
        assert_eq!(quote("a\"b\\c\u{1}"), "\"a\\\"b\\\\c\\x01\"");
    }

    #[rstest]
    #[case(1.5, "1.5")]
    #[case(2.0, "2.0")]
    #[case(-0.25, "-0.25")]
    #[case(f64::NAN, ".nan")]
    #[case(f64::NEG_INFINITY, "-.inf")]
    fn formats_floats_as_floats(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(float_text(value), expected);
    }

    #[test]
    fn writes_comments_above_keys_and_after_root() {
        let mut root = mapping(vec![
            commented(
                "a",
                "a is field for AStruct.",
                mapping(vec![
                    commented("d", "d comment.", Node::scalar(Scalar::Int(5))),
                    Entry::new("e", Node::scalar(Scalar::Bool(true))),
                ]),
            ),
            commented("bs", "bs holds\na slice.", Node::empty_sequence()),
            Entry::new("m", Node::empty_mapping()),
        ]);
        root.comment = Some("TopLevel holds config.".to_owned());

        let expected = "\
# TopLevel holds config.

# a is field for AStruct.
a:
  # d comment.
  d: 5
  e: true
# bs holds
# a slice.
bs: []
m: {}
";
        assert_eq!(YamlEncoder::new().encode(&root), expected);
    }

    #[test]
    fn writes_sequences_beneath_keys() {
        let node = Node::from(json!({
            "names": ["a", "", null],
            "pools": [{"name": "x", "size": 2}, {"name": "y", "tags": []}],
            "grid": [[1, 2], []],
        }));
        let expected = "\
names:
  - a
  - \"\"
  - null
pools:
  - name: x
    size: 2
  - name: y
    tags: []
grid:
  - - 1
    - 2
  - []
";
        assert_eq!(YamlEncoder::new().encode(&node), expected);
    }

    #[test]
    fn keeps_comments_on_sequence_mappings() {
        let item = mapping(vec![commented("g", "g comment.", Node::string("v"))]);
        let node = mapping(vec![Entry::new(
            "bs",
            Node::new(NodeValue::Sequence(vec![item])),
        )]);
        assert_eq!(
            YamlEncoder::new().encode(&node),
            "bs:\n  - # g comment.\n    g: v\n"
        );
    }

    #[rstest]
    #[case::empty_mapping(Node::empty_mapping(), "{}\n")]
    #[case::scalar(Node::string("plain"), "plain\n")]
    #[case::null(Node::scalar(Scalar::Null), "null\n")]
    fn writes_flow_roots(#[case] node: Node, #[case] expected: &str) {
        assert_eq!(YamlEncoder::new().encode(&node), expected);
    }

    #[test]
    fn quotes_keys_like_values() {
        let node = mapping(vec![Entry::new("on", Node::string("x"))]);
        assert_eq!(YamlEncoder::new().encode(&node), "\"on\": x\n");
    }
}
