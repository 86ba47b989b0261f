//! Turns a validation result into an exit code and console output.

use crate::error::CheckError;
use crate::line::extract_line_number;
use serde::{Deserialize, Serialize};
use std::io;

/// Shown when a validator fails without saying why.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown Mermaid parse error.";
pub const NO_DIAGRAM_MESSAGE: &str = "No Mermaid diagram provided.";
pub const VALID_MESSAGE: &str = "OK: diagram is valid.";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Line number on stdout, message on stderr, nothing on success.
    #[default]
    Plain,
    /// One human-readable sentence on stdout.
    Tool,
    /// One JSON object on stdout.
    Json,
}

/// The result of checking one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    Invalid {
        /// `0` when no line could be determined.
        line: usize,
        message: String,
    },
    /// The input held no diagram at all. Only produced in tool mode.
    Missing,
}

/// Text destined for stdout and stderr.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl Outcome {
    pub fn from_result(result: Result<(), CheckError>) -> Self {
        match result {
            Ok(()) => Outcome::Valid,
            Err(err) => Outcome::from_error(&err),
        }
    }

    /// Prefers a line reported by the validator over one found in the message.
    pub fn from_error(err: &CheckError) -> Self {
        let message = err.to_string();
        let line = err
            .line_hint()
            .unwrap_or_else(|| extract_line_number(&message));
        Outcome::Invalid { line, message }
    }

    /// Builds an invalid outcome from a free-form failure message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Outcome::Invalid {
            line: extract_line_number(&message),
            message,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid)
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_valid() {
            0
        } else {
            1
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<Report, CheckError> {
        let report = match format {
            ReportFormat::Plain => self.render_plain(),
            ReportFormat::Tool => Report {
                stdout: format!("{}\n", self.tool_message()),
                stderr: String::new(),
            },
            ReportFormat::Json => Report {
                stdout: format!("{}\n", self.json()?),
                stderr: String::new(),
            },
        };
        Ok(report)
    }

    fn render_plain(&self) -> Report {
        match self {
            Outcome::Valid => Report::default(),
            Outcome::Invalid { line, message } => Report {
                stdout: format!("{line}\n"),
                stderr: format!("{message}\n"),
            },
            Outcome::Missing => Report {
                stdout: "0\n".to_string(),
                stderr: format!("{NO_DIAGRAM_MESSAGE}\n"),
            },
        }
    }

    fn tool_message(&self) -> String {
        match self {
            Outcome::Valid => VALID_MESSAGE.to_string(),
            Outcome::Invalid { line, message } => {
                let message = if message.trim().is_empty() {
                    UNKNOWN_ERROR_MESSAGE
                } else {
                    message.as_str()
                };
                format!("Invalid Mermaid diagram. Line {line}: {message}")
            }
            Outcome::Missing => NO_DIAGRAM_MESSAGE.to_string(),
        }
    }

    fn json(&self) -> Result<String, CheckError> {
        let report = match self {
            Outcome::Valid => JsonReport {
                valid: true,
                line: None,
                message: None,
            },
            Outcome::Invalid { line, message } => JsonReport {
                valid: false,
                line: Some(*line),
                message: Some(message.as_str()),
            },
            Outcome::Missing => JsonReport {
                valid: false,
                line: Some(0),
                message: Some(NO_DIAGRAM_MESSAGE),
            },
        };
        serde_json::to_string(&report).map_err(|err| io::Error::from(err).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::SyntaxError;
    use insta::assert_snapshot;
    use rstest::rstest;

    fn invalid(line: usize, message: &str) -> Outcome {
        Outcome::Invalid {
            line,
            message: message.to_string(),
        }
    }

    #[test]
    fn syntax_errors_use_the_message_heuristic() {
        let err = CheckError::from(SyntaxError::parse(4, "A --", 4, &["LINK"], "NEWLINE"));
        assert_eq!(Outcome::from_error(&err), invalid(4, &err.to_string()));
    }

    #[test]
    fn line_hint_wins_over_the_message() {
        let err = CheckError::Rejected {
            message: "error near line 2".to_string(),
            line: Some(9),
        };
        assert_eq!(Outcome::from_error(&err), invalid(9, "error near line 2"));
    }

    #[test]
    fn free_form_messages_default_to_line_zero() {
        assert_eq!(
            Outcome::from_message("something broke"),
            invalid(0, "something broke")
        );
    }

    #[rstest]
    #[case(Outcome::Valid, 0)]
    #[case(invalid(3, "boom"), 1)]
    #[case(Outcome::Missing, 1)]
    fn exit_codes_are_zero_or_one(#[case] outcome: Outcome, #[case] code: u8) {
        assert_eq!(outcome.exit_code(), code);
    }

    #[test]
    fn plain_prints_line_and_message() {
        let report = invalid(7, "Parse error on line 7:").render(ReportFormat::Plain).unwrap();
        assert_eq!(report.stdout, "7\n");
        assert_eq!(report.stderr, "Parse error on line 7:\n");
        assert_eq!(
            Outcome::Valid.render(ReportFormat::Plain).unwrap(),
            Report::default()
        );
    }

    #[rstest]
    #[case(Outcome::Valid, "OK: diagram is valid.\n")]
    #[case(invalid(2, "Expecting 'TXT'"), "Invalid Mermaid diagram. Line 2: Expecting 'TXT'\n")]
    #[case(invalid(0, " "), "Invalid Mermaid diagram. Line 0: Unknown Mermaid parse error.\n")]
    #[case(Outcome::Missing, "No Mermaid diagram provided.\n")]
    fn tool_sentences(#[case] outcome: Outcome, #[case] expected: &str) {
        let report = outcome.render(ReportFormat::Tool).unwrap();
        assert_eq!(report.stdout, expected);
        assert!(report.stderr.is_empty());
    }

    #[test]
    fn json_objects() {
        let valid = Outcome::Valid.render(ReportFormat::Json).unwrap();
        assert_snapshot!(valid.stdout.trim_end(), @r#"{"valid":true}"#);

        let failed = invalid(5, "bad \"quote\"").render(ReportFormat::Json).unwrap();
        assert_snapshot!(failed.stdout.trim_end(), @r#"{"valid":false,"line":5,"message":"bad \"quote\""}"#);
    }

    #[test]
    fn formats_deserialize_in_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: ReportFormat,
        }
        let wrapper: Wrapper = toml::from_str("format = \"tool\"").unwrap();
        assert_eq!(wrapper.format, ReportFormat::Tool);
    }
}
