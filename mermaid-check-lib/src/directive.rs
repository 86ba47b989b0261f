//! Handles `%%{ ... }%%` directives and `%%` comment lines.

use crate::diagnostic::SyntaxError;
use serde_json::Value as JsonValue;

const OPEN: &str = "%%{";
const CLOSE: &str = "}%%";

/// A configuration directive such as `%%{init: {"theme": "dark"}}%%`.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    /// Parsed arguments; `None` when absent or malformed.
    pub args: Option<JsonValue>,
    /// 1-based line on which the directive opens.
    pub line: usize,
}

impl Directive {
    pub fn is_init(&self) -> bool {
        matches!(self.name.as_str(), "init" | "initialize")
    }
}

/// The body with every directive and comment blanked out.
#[derive(Debug, Clone, PartialEq)]
pub struct StrippedBody {
    pub body: String,
    pub directives: Vec<Directive>,
}

/// Removes directives and comment lines, keeping the line count intact.
///
/// A directive may span several lines but must be closed by `}%%`; an
/// unclosed directive is a lexical error. Malformed directive arguments are
/// logged and ignored.
pub fn strip(body: &str) -> Result<StrippedBody, SyntaxError> {
    let lines: Vec<&str> = body.split('\n').collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut directives = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim_start();

        if let Some(after_open) = trimmed.strip_prefix(OPEN) {
            let start = index;
            let mut inner = String::new();
            let mut rest = after_open;

            let remainder = loop {
                if let Some(end) = rest.find(CLOSE) {
                    inner.push_str(&rest[..end]);
                    break Some(&rest[end + CLOSE.len()..]);
                }
                inner.push_str(rest);
                inner.push('\n');
                index += 1;
                match lines.get(index) {
                    Some(next) => rest = next,
                    None => break None,
                }
            };

            let Some(remainder) = remainder else {
                let column = line.len() - trimmed.len();
                return Err(SyntaxError::lexical(start + 1, line, column));
            };

            if let Some(directive) = parse_directive(&inner, start + 1) {
                directives.push(directive);
            }
            kept.extend(std::iter::repeat("").take(index - start));
            kept.push(remainder);
            index += 1;
            continue;
        }

        kept.push(if trimmed.starts_with("%%") { "" } else { line });
        index += 1;
    }

    Ok(StrippedBody {
        body: kept.join("\n"),
        directives,
    })
}

fn parse_directive(inner: &str, line: usize) -> Option<Directive> {
    let (name, raw_args) = match inner.split_once(':') {
        Some((name, args)) => (name.trim(), Some(args.trim())),
        None => (inner.trim(), None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        log::warn!("Ignoring directive with invalid name on line {line}");
        return None;
    }

    let args = raw_args.filter(|args| !args.is_empty()).and_then(|args| {
        match serde_json::from_str::<JsonValue>(&args.replace('\'', "\"")) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Ignoring malformed arguments of `{name}` directive on line {line}: {err}");
                None
            }
        }
    });

    Some(Directive {
        name: name.to_string(),
        args,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_init_directive_and_parses_arguments() {
        let body = "%%{init: {'theme': 'forest'}}%%\ngraph TD\n  A-->B";
        let stripped = strip(body).unwrap();

        assert_eq!(stripped.body, "\ngraph TD\n  A-->B");
        assert_eq!(stripped.directives.len(), 1);
        let directive = &stripped.directives[0];
        assert!(directive.is_init());
        assert_eq!(directive.line, 1);
        assert_eq!(directive.args, Some(json!({"theme": "forest"})));
    }

    #[test]
    fn multi_line_directive_keeps_line_count() {
        let body = "%%{\n  init: {\"theme\": \"dark\"}\n}%%\nsequenceDiagram";
        let stripped = strip(body).unwrap();

        assert_eq!(stripped.body, "\n\n\nsequenceDiagram");
        assert_eq!(stripped.directives[0].args, Some(json!({"theme": "dark"})));
    }

    #[test]
    fn comment_lines_are_blanked() {
        let body = "graph TD\n  %% a comment\n  A-->B";
        let stripped = strip(body).unwrap();

        assert_eq!(stripped.body, "graph TD\n\n  A-->B");
        assert!(stripped.directives.is_empty());
    }

    #[test]
    fn malformed_arguments_are_ignored() {
        let stripped = strip("%%{init: {theme: dark}}%%\npie").unwrap();
        assert_eq!(stripped.directives[0].name, "init");
        assert_eq!(stripped.directives[0].args, None);
    }

    #[test]
    fn argument_free_directive_is_kept() {
        let stripped = strip("%%{wrap}%%\nsequenceDiagram").unwrap();
        assert_eq!(stripped.directives[0].name, "wrap");
        assert_eq!(stripped.directives[0].args, None);
    }

    #[test]
    fn unclosed_directive_is_a_lexical_error() {
        let err = strip("graph TD\n  %%{init: {}\n  A-->B").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 2);
    }
}
