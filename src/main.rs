//! The mermaid-check command-line executable.

mod app;
mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    app::run()
}
