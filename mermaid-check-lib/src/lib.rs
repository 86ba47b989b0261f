//! `mermaid-check-lib` validates Mermaid diagram text and reports the first
//! error together with its line number.
//!
//! Validation goes through the [`DiagramValidator`] trait. Two backends
//! implement it: [`BuiltinValidator`], an in-process syntax checker, and
//! [`CommandValidator`], which delegates to an external program such as a
//! Node script wrapping the JavaScript library. The result is turned into an
//! [`Outcome`], which knows its exit code and how to render itself.
//!
//! # Example
//!
//! ```rust
//! use mermaid_check_lib::{check, BuiltinValidator, Outcome, ReportFormat};
//!
//! let validator = BuiltinValidator::new();
//!
//! let outcome = check("graph TD\n  A --> B\n", &validator, ReportFormat::Plain);
//! assert_eq!(outcome, Outcome::Valid);
//!
//! let outcome = check("graph TD\n  A -->\n", &validator, ReportFormat::Plain);
//! match outcome {
//!     Outcome::Invalid { line, message } => {
//!         assert_eq!(line, 2);
//!         assert!(message.starts_with("Parse error on line 2:"));
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod config;
pub mod detect;
pub mod diagnostic;
pub mod directive;
pub mod error;
pub mod frontmatter;
mod grammar;
pub mod line;
pub mod report;
pub mod validator;

pub use crate::config::Config;
pub use crate::error::CheckError;
pub use crate::line::extract_line_number;
pub use crate::report::{Outcome, Report, ReportFormat};
pub use crate::validator::{BuiltinValidator, CommandValidator, DiagramValidator};

/// Validates `text` with `validator` and classifies the result.
///
/// In [`ReportFormat::Tool`] the text is trimmed first and whitespace-only
/// input yields [`Outcome::Missing`]. Every other format hands the text over
/// untouched, empty input included.
pub fn check(text: &str, validator: &dyn DiagramValidator, format: ReportFormat) -> Outcome {
    let text = match format {
        ReportFormat::Tool => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Outcome::Missing;
            }
            trimmed
        }
        ReportFormat::Plain | ReportFormat::Json => text,
    };
    log::debug!("Validating {} bytes with the {} validator", text.len(), validator.name());
    Outcome::from_result(validator.validate(text))
}
