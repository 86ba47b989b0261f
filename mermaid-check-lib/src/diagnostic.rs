//! Parser diagnostics formatted the way Mermaid's generated parsers report them.

use std::fmt;

/// How many characters of context are shown on each side of the error column.
const CONTEXT_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A token was recognised but is not allowed at this position.
    Parse,
    /// The input could not be split into tokens at all.
    Lexical,
}

/// A syntax error located at a line and column of the original input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// 1-based line number in the original input.
    pub line: usize,
    /// 0-based character offset within `source_line`.
    pub column: usize,
    pub source_line: String,
    pub expected: Vec<String>,
    pub found: String,
}

impl SyntaxError {
    pub fn parse(
        line: usize,
        source_line: &str,
        column: usize,
        expected: &[&str],
        found: impl Into<String>,
    ) -> Self {
        Self {
            kind: SyntaxErrorKind::Parse,
            line,
            column,
            source_line: source_line.to_string(),
            expected: expected.iter().map(|token| token.to_string()).collect(),
            found: found.into(),
        }
    }

    pub fn lexical(line: usize, source_line: &str, column: usize) -> Self {
        Self {
            kind: SyntaxErrorKind::Lexical,
            line,
            column,
            source_line: source_line.to_string(),
            expected: Vec::new(),
            found: String::new(),
        }
    }

    /// Returns the excerpt shown under the headline and the pointer offset into it.
    fn excerpt(&self) -> (String, usize) {
        let chars: Vec<char> = self.source_line.chars().collect();
        let column = self.column.min(chars.len());
        let start = column.saturating_sub(CONTEXT_WIDTH);
        let end = (column + CONTEXT_WIDTH).min(chars.len());

        let mut text = String::new();
        if start > 0 {
            text.push_str("...");
        }
        text.extend(&chars[start..end]);
        if end < chars.len() {
            text.push_str("...");
        }

        let lead = if start > 0 { 3 } else { 0 };
        (text, lead + column - start)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (excerpt, offset) = self.excerpt();
        let pointer = format!("{}^", "-".repeat(offset));

        match self.kind {
            SyntaxErrorKind::Lexical => write!(
                f,
                "Lexical error on line {}. Unrecognized text.\n{excerpt}\n{pointer}",
                self.line
            ),
            SyntaxErrorKind::Parse => {
                write!(f, "Parse error on line {}:\n{excerpt}\n{pointer}\n", self.line)?;
                if self.expected.is_empty() {
                    write!(f, "Unexpected '{}'", self.found)
                } else {
                    let expected = self
                        .expected
                        .iter()
                        .map(|token| format!("'{token}'"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "Expecting {expected}, got '{}'", self.found)
                }
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn formats_parse_error_with_pointer() {
        let err = SyntaxError::parse(3, "A -->", 5, &["NODE_STRING"], "NEWLINE");
        assert_snapshot!(err.to_string(), @r"
        Parse error on line 3:
        A -->
        -----^
        Expecting 'NODE_STRING', got 'NEWLINE'
        ");
    }

    #[test]
    fn formats_lexical_error() {
        let err = SyntaxError::lexical(2, "A[\"open", 2);
        assert_snapshot!(err.to_string(), @r#"
        Lexical error on line 2. Unrecognized text.
        A["open
        --^
        "#);
    }

    #[test]
    fn long_lines_are_elided_around_the_column() {
        let line = format!("{}X{}", "a".repeat(30), "b".repeat(30));
        let err = SyntaxError::parse(1, &line, 30, &[], "X");
        let rendered = err.to_string();
        let mut lines = rendered.lines().skip(1);
        let excerpt = lines.next().unwrap();
        let pointer = lines.next().unwrap();

        assert!(excerpt.starts_with("..."));
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().nth(pointer.len() - 1), Some('X'));
        assert!(rendered.ends_with("Unexpected 'X'"));
    }
}
