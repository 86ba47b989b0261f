//! The validation contract and the backends that implement it.
//!
//! Constructing a backend is the equivalent of initializing the diagram
//! library; after that, [`DiagramValidator::validate`] may be called any
//! number of times.

use crate::config::{Backend, ValidatorConfig};
use crate::detect::{detect, DiagramKind};
use crate::directive::{self, Directive};
use crate::error::CheckError;
use crate::frontmatter;
use crate::grammar::{self, Source};
use crate::report::UNKNOWN_ERROR_MESSAGE;
use log::debug;
use serde_yaml::Value as YamlValue;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;

/// A diagram-validation library.
pub trait DiagramValidator {
    /// Short backend name, used in logs.
    fn name(&self) -> &str;

    /// Validates `text`, returning the first error found.
    ///
    /// The error's `Display` text is the message shown to the user.
    fn validate(&self, text: &str) -> Result<(), CheckError>;
}

/// Builds the backend selected by `config`.
pub fn from_config(config: &ValidatorConfig) -> Result<Box<dyn DiagramValidator>, CheckError> {
    let validator: Box<dyn DiagramValidator> = match config.backend {
        Backend::Builtin => Box::new(BuiltinValidator::new()),
        Backend::Command => Box::new(CommandValidator::new(config.command.iter().cloned())?),
    };
    debug!("Using the {} validator", validator.name());
    Ok(validator)
}

/// What the built-in checker found in a valid diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub kind: DiagramKind,
    pub frontmatter: Option<YamlValue>,
    pub directives: Vec<Directive>,
}

/// The in-process Mermaid syntax checker.
///
/// It validates syntax only and never lays out or renders the diagram.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinValidator;

impl BuiltinValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates `text` and returns what was found along the way.
    pub fn inspect(&self, text: &str) -> Result<Inspection, CheckError> {
        let started = Instant::now();
        let text = text.replace("\r\n", "\n");

        let document = frontmatter::parse(&text)?;
        if let Some(title) = document.title() {
            debug!("Frontmatter title: {title}");
        }
        let stripped = directive::strip(&document.body)?;
        for directive in &stripped.directives {
            debug!("Found `{}` directive on line {}", directive.name, directive.line);
        }

        let Some(header) = detect(&stripped.body) else {
            return Err(CheckError::UnknownDiagram(stripped.body.trim().to_string()));
        };
        let kind = header.kind;
        debug!("Detected {kind} diagram (`{}`) on line {}", header.keyword, header.line);

        grammar::check(&Source::new(&stripped.body, header))?;
        debug!("Checked {kind} diagram in {:?}", started.elapsed());

        Ok(Inspection {
            kind,
            frontmatter: document.frontmatter,
            directives: stripped.directives,
        })
    }
}

impl DiagramValidator for BuiltinValidator {
    fn name(&self) -> &str {
        "builtin"
    }

    fn validate(&self, text: &str) -> Result<(), CheckError> {
        self.inspect(text).map(|_| ())
    }
}

/// Delegates validation to an external program.
///
/// The diagram is written to the program's stdin. Exit status zero means the
/// diagram is valid; otherwise stderr carries the message and stdout may
/// carry a bare line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

impl CommandValidator {
    pub fn new<I, S>(argv: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv
            .next()
            .filter(|program| !program.trim().is_empty())
            .ok_or_else(|| CheckError::Config("validator command is empty".to_string()))?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl DiagramValidator for CommandValidator {
    fn name(&self) -> &str {
        "command"
    }

    fn validate(&self, text: &str) -> Result<(), CheckError> {
        let started = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CheckError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("validator stdin is not piped"))?;
        let input = text.to_owned();
        // A validator may exit before reading everything it was sent.
        let writer = thread::spawn(move || match stdin.write_all(input.as_bytes()) {
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            result => result,
        });

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| io::Error::other("validator stdin writer panicked"))??;
        debug!(
            "`{}` exited with {} after {:?}",
            self.program,
            output.status,
            started.elapsed()
        );

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            stderr
        };
        let line = String::from_utf8_lossy(&output.stdout).trim().parse().ok();
        Err(CheckError::Rejected { message, line })
    }
}
