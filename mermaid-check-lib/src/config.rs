//! TOML configuration for the validator backend and the report format.

use crate::error::CheckError;
use crate::report::ReportFormat;
use anyhow::{bail, Context};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The whole configuration file. Every section and key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub validator: ValidatorConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    pub backend: Backend,
    /// Program and arguments run by the `command` backend.
    pub command: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// The in-process checker.
    #[default]
    Builtin,
    /// An external program, see [`crate::validator::CommandValidator`].
    Command,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Overridden by the command line when given there.
    pub format: Option<ReportFormat>,
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, CheckError> {
        read_config(path).map_err(|err| CheckError::Config(format!("{err:#}")))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CheckError> {
        parse_config(content).map_err(|err| CheckError::Config(format!("{err:#}")))
    }
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to load {}", path.display()))
}

fn parse_config(content: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(content)?;
    if config.validator.backend == Backend::Command && config.validator.command.is_empty() {
        bail!("`validator.command` must name a program when `backend = \"command\"`");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.validator.backend, Backend::Builtin);
        assert_eq!(config.output.format, None);
    }

    #[test]
    fn parses_every_section() {
        let config = Config::from_toml_str(
            r#"
[validator]
backend = "command"
command = ["node", "mermaid_validator.js"]

[output]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.validator.backend, Backend::Command);
        assert_eq!(config.validator.command, ["node", "mermaid_validator.js"]);
        assert_eq!(config.output.format, Some(ReportFormat::Json));
    }

    #[test]
    fn command_backend_needs_a_command() {
        let err = Config::from_toml_str("[validator]\nbackend = \"command\"\n").unwrap_err();
        assert!(matches!(err, CheckError::Config(_)));
        assert!(err.to_string().contains("`validator.command` must name a program"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[validator]\nengine = \"node\"\n").unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration:"));
        assert!(err.to_string().contains("engine"));
    }

    #[test]
    fn load_names_the_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("mermaid-check.toml");
        file.write_str("[output]\nformat = \"xml\"\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("mermaid-check.toml"));

        let missing = Config::load(&temp.path().join("absent.toml")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read config file"));
    }
}
