//! Settings handling for terrapy.
//! This module locates the optional settings file in the working directory and
//! turns it into an immutable `Settings` value that is passed to every component.

use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Supported settings file names, tried in this order.
pub const CONFIG_FILES: [&str; 3] = ["terrapy.json", "terrapy.yml", "terrapy.yaml"];

/// Process-wide locations and workflow policy.
///
/// Every field has a default, so an empty settings document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Root whose subdirectories are projects.
    pub templates_dir: PathBuf,
    /// Root holding variable documents.
    pub variables_dir: PathBuf,
    /// Root under which rendered projects are materialized.
    pub output_dir: PathBuf,
    /// Shared macro library consulted when a template name is not found.
    pub macros_dir: PathBuf,
    /// File-name suffix marking a template.
    pub template_suffix: String,
    /// Variable file used when none is given.
    pub default_vars: String,
    /// Provisioning tool executable.
    pub binary: String,
    /// Apply without asking the operator.
    pub auto_approve: bool,
    /// Stop the workflow at the first failed step.
    pub halt_on_failure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            variables_dir: PathBuf::from("variables"),
            output_dir: PathBuf::from("terraform"),
            macros_dir: PathBuf::from("macros"),
            template_suffix: ".j2".to_string(),
            default_vars: "terrapy.vars".to_string(),
            binary: "terraform".to_string(),
            auto_approve: true,
            halt_on_failure: true,
        }
    }
}

impl Settings {
    /// Re-roots every directory under `base`. Absolute directories are left alone.
    pub fn rooted_at<P: AsRef<Path>>(mut self, base: P) -> Self {
        let base = base.as_ref();
        for dir in [
            &mut self.templates_dir,
            &mut self.variables_dir,
            &mut self.output_dir,
            &mut self.macros_dir,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }

    /// Rejects suffixes that are empty, lack a leading dot or carry glob metacharacters.
    pub fn validate(&self) -> Result<()> {
        let suffix = &self.template_suffix;
        let valid = suffix.len() > 1
            && suffix.starts_with('.')
            && suffix.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(Error::ConfigError(format!(
                "template_suffix '{suffix}' must start with '.' and contain only letters, digits, '.', '_' or '-'"
            )));
        }
        if self.binary.trim().is_empty() {
            return Err(Error::ConfigError("binary must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Finds the first settings file from `config_files` inside `dir`.
pub fn find_config<P: AsRef<Path>>(dir: P, config_files: &[&str]) -> Option<PathBuf> {
    config_files.iter().map(|file| dir.as_ref().join(file)).find(|path| path.exists())
}

/// Parses settings content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if neither format accepts the content
pub fn parse_settings(content: &str) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings = match serde_json::from_str(content) {
        Ok(settings) => settings,
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid settings format: {e}")))?,
    };
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from an explicit file, or from the first of `CONFIG_FILES`
/// found in `dir`, falling back to defaults when there is none.
///
/// Relative directories are rooted at the settings file's directory, or at
/// `dir` when no file was read.
///
/// # Arguments
/// * `dir` - Directory searched for a settings file
/// * `explicit` - Settings file given on the command line, which must exist
pub fn load_settings<P: AsRef<Path>>(dir: P, explicit: Option<&Path>) -> Result<Settings> {
    let dir = dir.as_ref();
    let path = match explicit {
        Some(path) => {
            let path = dir.join(path);
            if !path.is_file() {
                return Err(Error::ConfigError(format!(
                    "Invalid configuration path: {}",
                    path.display()
                )));
            }
            Some(path)
        }
        None => find_config(dir, &CONFIG_FILES),
    };

    match path {
        Some(path) => {
            debug!("Loading settings from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let base = path.parent().unwrap_or(dir);
            Ok(parse_settings(&content)?.rooted_at(base))
        }
        None => {
            debug!("No settings file found (tried: {}), using defaults", CONFIG_FILES.join(", "));
            Ok(Settings::default().rooted_at(dir))
        }
    }
}
