//! Defines the error type shared by every validation backend.

use crate::diagnostic::SyntaxError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error type returned when a diagram fails validation or the validator cannot run.
///
/// The `Display` text is the message surfaced to the user; the line-number
/// heuristic in [`crate::line`] searches it for the error location.
pub enum CheckError {
    #[error("{0}")]
    Syntax(#[from] SyntaxError),

    #[error("No diagram type detected matching given configuration for text: {0}")]
    UnknownDiagram(String),

    #[error("Invalid frontmatter on line {line}: {message}")]
    Frontmatter { line: usize, message: String },

    /// The text parsed, but the diagram it describes is inconsistent.
    #[error("{0}")]
    Diagram(String),

    /// An external validator rejected the diagram.
    #[error("{message}")]
    Rejected {
        message: String,
        line: Option<usize>,
    },

    #[error("Failed to launch validator command `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CheckError {
    /// Returns the line reported out-of-band by the validator, if any.
    ///
    /// Only external validators report a line separately from their message;
    /// every other variant leaves it to the message heuristic.
    pub fn line_hint(&self) -> Option<usize> {
        match self {
            CheckError::Rejected { line, .. } => *line,
            _ => None,
        }
    }
}
