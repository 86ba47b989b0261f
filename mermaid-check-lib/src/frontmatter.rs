//! Splits the optional YAML frontmatter block off the top of a diagram.

use crate::error::CheckError;
use serde_yaml::Value as YamlValue;

const DELIMITER: &str = "---";

/// A diagram with its frontmatter parsed and blanked out of the body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub frontmatter: Option<YamlValue>,
    /// The input with every frontmatter line replaced by an empty line, so
    /// that line numbers in the body still match the original input.
    pub body: String,
}

impl ParsedDocument {
    /// Returns the `title` key of the frontmatter, if it is a string.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|value| value.get("title"))
            .and_then(YamlValue::as_str)
    }

    /// Returns the `config` mapping of the frontmatter, if present.
    pub fn config(&self) -> Option<&YamlValue> {
        self.frontmatter.as_ref().and_then(|value| value.get("config"))
    }
}

/// Parses leading frontmatter.
///
/// The block opens with a `---` line at the very start of the input and ends
/// at the next `---` line. Without a closing delimiter there is no
/// frontmatter and the text is returned untouched.
pub fn parse(content: &str) -> Result<ParsedDocument, CheckError> {
    let lines: Vec<&str> = content.split('\n').collect();
    let unchanged = || ParsedDocument {
        frontmatter: None,
        body: content.to_string(),
    };

    if lines.first().map(|line| line.trim_end()) != Some(DELIMITER) {
        return Ok(unchanged());
    }

    let Some(closing) = lines
        .iter()
        .skip(1)
        .position(|line| line.trim_end() == DELIMITER)
        .map(|offset| offset + 1)
    else {
        return Ok(unchanged());
    };

    let yaml = lines[1..closing].join("\n");
    let value = if yaml.trim().is_empty() {
        YamlValue::Null
    } else {
        serde_yaml::from_str(&yaml).map_err(|err| CheckError::Frontmatter {
            // The opening delimiter sits on line 1.
            line: err.location().map_or(1, |location| location.line() + 1),
            message: err.to_string(),
        })?
    };

    let body = std::iter::repeat("")
        .take(closing + 1)
        .chain(lines[closing + 1..].iter().copied())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ParsedDocument {
        frontmatter: Some(value),
        body,
    })
}
