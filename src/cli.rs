//! Defines the command-line interface for the application.

use clap::{Parser, ValueEnum};
use mermaid_check_lib::ReportFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mermaid-check",
    version,
    about = "Validate a Mermaid diagram read from stdin.",
    long_about = "Validate a Mermaid diagram read from stdin.\n\n\
        Exits with 0 when the diagram is valid. Otherwise exits with 1, prints the \
        line of the first error on stdout (0 when unknown) and the error message on stderr."
)]
pub struct Cli {
    /// How to report the result.
    #[arg(long, value_enum, value_name = "FORMAT", env = "MERMAID_CHECK_FORMAT")]
    pub format: Option<FormatArg>,

    /// A TOML file selecting the validator backend and default format.
    #[arg(short, long, value_name = "CONFIG_PATH", env = "MERMAID_CHECK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// Line number on stdout and message on stderr; silent on success.
    Plain,
    /// A single sentence on stdout, as shown to agents.
    Tool,
    /// A JSON object on stdout.
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Plain => ReportFormat::Plain,
            FormatArg::Tool => ReportFormat::Tool,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}
