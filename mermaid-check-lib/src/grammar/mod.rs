//! Per-diagram grammar checks run by the built-in validator.
//!
//! Each checker walks the body line by line and stops at the first error,
//! mirroring how the JavaScript parsers abort on the first unexpected token.

mod flowchart;
mod gantt;
mod pie;
mod scanner;
mod sequence;
mod structure;

use crate::detect::{DiagramKind, Header};
use crate::diagnostic::SyntaxError;
use crate::error::CheckError;
use scanner::Scanner;

/// One line of the preprocessed body, numbered as in the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

pub(crate) struct Source<'a> {
    lines: Vec<SourceLine<'a>>,
    header: Header<'a>,
}

impl<'a> Source<'a> {
    pub fn new(body: &'a str, header: Header<'a>) -> Self {
        let lines = body
            .split('\n')
            .enumerate()
            .map(|(index, text)| SourceLine {
                number: index + 1,
                text,
            })
            .collect();
        Self { lines, header }
    }

    pub fn kind(&self) -> DiagramKind {
        self.header.kind
    }

    /// A scanner positioned right after the header keyword.
    pub fn header_scanner(&self) -> Scanner<'a> {
        let line = self.lines[self.header.line - 1];
        Scanner::at(line, line.text.len() - self.header.rest.len())
    }

    /// Non-blank lines after the header.
    pub fn statements(&self) -> impl Iterator<Item = SourceLine<'a>> + '_ {
        self.lines[self.header.line..]
            .iter()
            .copied()
            .filter(|line| !line.text.trim().is_empty())
    }

    /// An error for input that ended while `expected` was still pending.
    pub fn eof_error(&self, expected: &[&str]) -> SyntaxError {
        let last = self
            .lines
            .iter()
            .rev()
            .find(|line| !line.text.trim().is_empty())
            .copied()
            .unwrap_or(self.lines[self.header.line - 1]);
        let column = last.text.chars().count();
        SyntaxError::parse(last.number, last.text, column, expected, "EOF")
    }
}

/// Runs the grammar matching the detected diagram kind.
pub(crate) fn check(source: &Source<'_>) -> Result<(), CheckError> {
    match source.kind() {
        DiagramKind::Flowchart => flowchart::check(source),
        DiagramKind::Sequence => sequence::check(source),
        DiagramKind::Pie => pie::check(source),
        DiagramKind::Gantt => gantt::check(source),
        _ => structure::check(source),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::detect::detect;

    /// Runs the grammar for `text`, which must start with a known header.
    pub fn check_text(text: &str) -> Result<(), CheckError> {
        let header = detect(text).expect("test input has a diagram header");
        check(&Source::new(text, header))
    }

    /// Returns the syntax error raised for `text`, panicking on any other outcome.
    pub fn syntax_error(text: &str) -> SyntaxError {
        match check_text(text) {
            Err(CheckError::Syntax(err)) => err,
            other => panic!("expected a syntax error for {text:?}, got {other:?}"),
        }
    }
}
