//! Pretty JSON encoder.

use crate::error::PrettyconfResult;
use crate::tree::Node;

/// Encodes trees as indented JSON, dropping comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl JsonEncoder {
    /// Creates an encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Encodes `node`, terminating the document with a newline.
    ///
    /// # Errors
    ///
    /// Returns [`PrettyconfError::Json`](crate::PrettyconfError::Json) when
    /// serialization fails.
    pub fn encode(self, node: &Node) -> PrettyconfResult<String> {
        let mut text = serde_json::to_string_pretty(node)?;
        text.push('\n');
        Ok(text)
    }
}
