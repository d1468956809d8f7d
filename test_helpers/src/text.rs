//! Text helpers for comparing rendered documents.

/// Removes the common leading indentation from every non-blank line.
///
/// A leading newline is dropped so expected documents can start on the line
/// after the opening quote of a raw string literal, and trailing spaces are
/// dropped so the closing quote can sit at the surrounding indentation.
///
/// # Examples
/// ```
/// use prettyconf_test_helpers::text::dedent;
///
/// let doc = dedent("
///     a:
///       b: 1
/// ");
/// assert_eq!(doc, "a:\n  b: 1\n");
/// ```
#[must_use]
pub fn dedent(value: &str) -> String {
    let body = value
        .strip_prefix('\n')
        .unwrap_or(value)
        .trim_end_matches(' ');
    let indent = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    let mut out = String::with_capacity(body.len());
    for line in body.lines() {
        out.push_str(line.get(indent..).unwrap_or_else(|| line.trim_start()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::dedent;

    #[test]
    fn dedent_strips_common_indentation() {
        assert_eq!(dedent("\n    a: 1\n      b: 2\n"), "a: 1\n  b: 2\n");
    }

    #[test]
    fn dedent_keeps_blank_lines() {
        assert_eq!(dedent("\n  # doc\n\n  a: 1\n"), "# doc\n\na: 1\n");
    }

    #[test]
    fn dedent_ignores_closing_indentation() {
        assert_eq!(dedent("\n        a: 1\n        "), "a: 1\n");
    }
}
