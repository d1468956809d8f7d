//! Generic value tree exchanged between the synthesizer and text encoders.
//!
//! A [`Node`] is a scalar, a sequence or an ordered mapping, optionally
//! carrying a leading comment. Mapping entries keep their own comments so an
//! encoder can emit documentation directly above each key.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::PrettyconfResult;

/// Scalar leaf values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Absent value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer too large for [`Scalar::Int`].
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Text.
    String(String),
}

/// Shape and contents of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// A leaf.
    Scalar(Scalar),
    /// Ordered sequence of nodes.
    Sequence(Vec<Node>),
    /// Ordered key to node mapping.
    Mapping(Vec<Entry>),
}

/// A tree node with an optional leading comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Comment emitted before the node.
    pub comment: Option<String>,
    /// Node contents.
    pub value: NodeValue,
}

/// One key/value pair of a mapping node.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Mapping key.
    pub key: String,
    /// Comment emitted above the key.
    pub comment: Option<String>,
    /// Value node.
    pub value: Node,
}

impl Entry {
    /// Builds an uncommented entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Node) -> Self {
        Self {
            key: key.into(),
            comment: None,
            value,
        }
    }
}

impl Node {
    /// Wraps a value without a comment.
    #[must_use]
    pub const fn new(value: NodeValue) -> Self {
        Self {
            comment: None,
            value,
        }
    }

    /// A scalar node.
    #[must_use]
    pub const fn scalar(value: Scalar) -> Self {
        Self::new(NodeValue::Scalar(value))
    }

    /// A string scalar node.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::scalar(Scalar::String(value.into()))
    }

    /// An empty mapping node.
    #[must_use]
    pub const fn empty_mapping() -> Self {
        Self::new(NodeValue::Mapping(Vec::new()))
    }

    /// An empty sequence node.
    #[must_use]
    pub const fn empty_sequence() -> Self {
        Self::new(NodeValue::Sequence(Vec::new()))
    }

    /// Reduces any serializable value to a tree.
    ///
    /// # Errors
    ///
    /// Returns [`PrettyconfError::Json`](crate::PrettyconfError::Json) when
    /// `value` cannot be represented, for example a map with non-string keys.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> PrettyconfResult<Self> {
        Ok(Self::from(serde_json::to_value(value)?))
    }

    /// Returns `true` for a null scalar.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.value, NodeValue::Scalar(Scalar::Null))
    }

    /// Entries of a mapping node.
    #[must_use]
    pub fn entries(&self) -> Option<&[Entry]> {
        match &self.value {
            NodeValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a mapping entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries()?
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Keys of a mapping node in order; empty for other nodes.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries()
            .map(|entries| entries.iter().map(|entry| entry.key.as_str()).collect())
            .unwrap_or_default()
    }

    /// Kind name used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self.value {
            NodeValue::Scalar(Scalar::Null) => "null",
            NodeValue::Scalar(_) => "scalar",
            NodeValue::Sequence(_) => "sequence",
            NodeValue::Mapping(_) => "mapping",
        }
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        let node_value = match value {
            Value::Null => NodeValue::Scalar(Scalar::Null),
            Value::Bool(flag) => NodeValue::Scalar(Scalar::Bool(flag)),
            Value::Number(number) => NodeValue::Scalar(number_scalar(&number)),
            Value::String(text) => NodeValue::Scalar(Scalar::String(text)),
            Value::Array(items) => NodeValue::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => NodeValue::Mapping(
                map.into_iter()
                    .map(|(key, item)| Entry::new(key, Self::from(item)))
                    .collect(),
            ),
        };
        Self::new(node_value)
    }
}

fn number_scalar(number: &serde_json::Number) -> Scalar {
    if let Some(int) = number.as_i64() {
        Scalar::Int(int)
    } else if let Some(uint) = number.as_u64() {
        Scalar::UInt(uint)
    } else {
        Scalar::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Int(int) => serializer.serialize_i64(*int),
            Self::UInt(uint) => serializer.serialize_u64(*uint),
            Self::Float(float) => serializer.serialize_f64(*float),
            Self::String(text) => serializer.serialize_str(text),
        }
    }
}

/// Serializes the node's data; comments are dropped.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.value {
            NodeValue::Scalar(scalar) => scalar.serialize(serializer),
            NodeValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            NodeValue::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for entry in entries {
                    map.serialize_entry(&entry.key, &entry.value)?;
                }
                map.end()
            }
        }
    }
}
