use assert_fs::prelude::*;
use mermaid_check_lib::config::Backend;
use mermaid_check_lib::validator::{self, Inspection};
use mermaid_check_lib::{
    check, BuiltinValidator, CheckError, CommandValidator, Config, DiagramValidator, Outcome,
    ReportFormat,
};
use std::cell::RefCell;

/// Records what it was asked to validate and fails with a fixed message.
struct Recording {
    seen: RefCell<Vec<String>>,
    failure: Option<&'static str>,
}

impl Recording {
    fn new(failure: Option<&'static str>) -> Self {
        Self {
            seen: RefCell::new(Vec::new()),
            failure,
        }
    }
}

impl DiagramValidator for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn validate(&self, text: &str) -> Result<(), CheckError> {
        self.seen.borrow_mut().push(text.to_string());
        match self.failure {
            Some(message) => Err(CheckError::Rejected {
                message: message.to_string(),
                line: None,
            }),
            None => Ok(()),
        }
    }
}

#[test]
fn empty_input_is_passed_through_unchanged() {
    let validator = Recording::new(None);
    assert_eq!(check("", &validator, ReportFormat::Plain), Outcome::Valid);
    assert_eq!(check("  \n", &validator, ReportFormat::Json), Outcome::Valid);
    assert_eq!(*validator.seen.borrow(), ["", "  \n"]);
}

#[test]
fn tool_format_trims_and_detects_missing_diagrams() {
    let validator = Recording::new(None);
    assert_eq!(check(" \n\t", &validator, ReportFormat::Tool), Outcome::Missing);
    assert_eq!(check("\n pie \n", &validator, ReportFormat::Tool), Outcome::Valid);
    assert_eq!(*validator.seen.borrow(), ["pie"]);
}

#[test]
fn rejection_line_comes_from_the_message() {
    let validator = Recording::new(Some("Error: LINE : 7 unexpected token"));
    assert_eq!(
        check("graph", &validator, ReportFormat::Plain),
        Outcome::Invalid {
            line: 7,
            message: "Error: LINE : 7 unexpected token".to_string(),
        }
    );

    let validator = Recording::new(Some("something went wrong"));
    match check("graph", &validator, ReportFormat::Plain) {
        Outcome::Invalid { line, .. } => assert_eq!(line, 0),
        other => panic!("expected an invalid outcome, got {other:?}"),
    }
}

#[test]
fn builtin_inspection_exposes_the_diagram() {
    let Inspection {
        kind, frontmatter, ..
    } = BuiltinValidator::new()
        .inspect("---\ntitle: Orders\n---\nerDiagram\n  CUSTOMER ||--o{ ORDER : places\n")
        .expect("diagram is valid");
    assert_eq!(kind.name(), "er");
    assert!(frontmatter.is_some());
}

#[test]
fn builtin_errors_carry_absolute_lines() {
    let text = "---\ntitle: Flow\n---\n\nflowchart LR\n  A --> B\n  B -->\n";
    let outcome = check(text, &BuiltinValidator::new(), ReportFormat::Plain);
    match outcome {
        Outcome::Invalid { line, message } => {
            assert_eq!(line, 7);
            assert!(message.starts_with("Parse error on line 7:"), "{message}");
        }
        other => panic!("expected an invalid outcome, got {other:?}"),
    }
}

#[test]
fn invalid_frontmatter_reports_its_line() {
    let text = "---\ntitle: ok\nbroken: [\n---\ngraph TD\n";
    let err = BuiltinValidator::new().validate(text).unwrap_err();
    assert!(matches!(err, CheckError::Frontmatter { .. }));
    assert!(err.to_string().starts_with("Invalid frontmatter on line"));
}

#[test]
fn config_file_selects_the_command_backend() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("mermaid-check.toml");
    file.write_str("[validator]\nbackend = \"command\"\ncommand = [\"node\", \"validate.js\"]\n")
        .unwrap();

    let config = Config::load(file.path()).expect("config loads");
    assert_eq!(config.validator.backend, Backend::Command);

    let built = validator::from_config(&config.validator).expect("validator builds");
    assert_eq!(built.name(), "command");

    let command = CommandValidator::new(config.validator.command.clone()).unwrap();
    assert_eq!(command.program(), "node");
}

#[test]
fn config_errors_render_as_invalid_outcomes() {
    let err = Config::from_toml_str("[output]\nformat = 3\n").unwrap_err();
    let outcome = Outcome::from_error(&err);
    assert_eq!(outcome.exit_code(), 1);
    let report = outcome.render(ReportFormat::Plain).unwrap();
    assert!(report.stderr.starts_with("Invalid configuration:"));
}
