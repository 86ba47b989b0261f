use crate::cli::Cli;
use anyhow::Context;
use clap::Parser;
use log::debug;
use mermaid_check_lib::{check, validator, CheckError, Config, DiagramValidator, Outcome, ReportFormat};
use std::any::Any;
use std::io::{self, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

/// Everything needed to check one diagram.
struct Session {
    validator: Box<dyn DiagramValidator>,
    format: ReportFormat,
}

pub fn run() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version requests are not failures.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let (format, outcome) = match Session::prepare(&cli) {
        Ok(session) => (session.format, session.run()),
        Err(err) => (
            cli.format.map(ReportFormat::from).unwrap_or_default(),
            Outcome::from_error(&err),
        ),
    };

    if let Err(err) = emit(&outcome, format) {
        debug!("Failed to write the report: {err:#}");
    }
    ExitCode::from(outcome.exit_code())
}

impl Session {
    fn prepare(cli: &Cli) -> Result<Self, CheckError> {
        let config = match &cli.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        let format = cli
            .format
            .map(ReportFormat::from)
            .or(config.output.format)
            .unwrap_or_default();
        let validator = validator::from_config(&config.validator)?;
        Ok(Self { validator, format })
    }

    fn run(&self) -> Outcome {
        let text = match read_input() {
            Ok(text) => text,
            Err(err) => return Outcome::from_message(format!("{err:#}")),
        };

        guarded_check(&text, self.validator.as_ref(), self.format)
    }
}

/// Runs [`check`], turning a panicking backend into an invalid outcome so the
/// exit code stays 0 or 1.
fn guarded_check(text: &str, validator: &dyn DiagramValidator, format: ReportFormat) -> Outcome {
    panic::set_hook(Box::new(|info| debug!("Validator panicked: {info}")));
    let result = panic::catch_unwind(AssertUnwindSafe(|| check(text, validator, format)));
    let _ = panic::take_hook();

    result.unwrap_or_else(|payload| {
        Outcome::from_message(format!("Validator panicked: {}", panic_message(&*payload)))
    })
}

/// Reads all of stdin, replacing invalid UTF-8 rather than rejecting it.
fn read_input() -> anyhow::Result<String> {
    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .context("Failed to read the diagram from stdin")?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn emit(outcome: &Outcome, format: ReportFormat) -> anyhow::Result<()> {
    let report = outcome.render(format)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(report.stdout.as_bytes())?;
    stdout.flush()?;

    let mut stderr = io::stderr().lock();
    stderr.write_all(report.stderr.as_bytes())?;
    stderr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mermaid_check_lib::BuiltinValidator;

    /// A backend that panics on every call.
    struct Panicking(&'static str);

    impl DiagramValidator for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn validate(&self, _text: &str) -> Result<(), CheckError> {
            panic!("{} on line 3", self.0);
        }
    }

    #[test]
    fn panicking_backend_becomes_an_invalid_outcome() {
        let outcome = guarded_check(
            "graph TD",
            &Panicking("grammar blew up"),
            ReportFormat::Plain,
        );

        assert_eq!(
            outcome,
            Outcome::Invalid {
                line: 3,
                message: "Validator panicked: grammar blew up on line 3".to_string(),
            }
        );
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn guarded_check_passes_results_through() {
        let outcome = guarded_check(
            "pie\n  \"A\" : 1",
            &BuiltinValidator::new(),
            ReportFormat::Plain,
        );
        assert_eq!(outcome, Outcome::Valid);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn panic_message_reads_both_payload_kinds() {
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("formatted"));
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_message(&*borrowed), "static");
        assert_eq!(panic_message(&*owned), "formatted");
        assert_eq!(panic_message(&*other), "unknown panic");
    }
}
