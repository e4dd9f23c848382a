//! Error handling for terrapy.
//! Defines the error taxonomy shared by the render pipeline and the workflow driver.

use std::io;
use thiserror::Error;

/// Custom error types for terrapy operations.
///
/// Resolver and locator failures abort a render before any template is touched,
/// renderer failures abort it before anything is returned, and
/// `ExternalToolFailure` is only raised when the workflow halts on failure.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested variable file is missing from the variables root.
    #[error("Unable to load variables from {name} as it does not exist at: {path}")]
    VariablesNotFound { name: String, path: String },

    /// The requested project has no directory under the templates root.
    #[error("Template project does not exist at the given path: {path}")]
    ProjectNotFound { path: String },

    /// The variable document is not a plain mapping of scalars, sequences and mappings.
    #[error("Failed to parse variable file {path}: {detail}")]
    VariablesParseError { path: String, detail: String },

    /// The named template does not resolve under the templates (or macros) root.
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    /// A template referenced a key absent from the variable set.
    #[error("Undefined variable in template {name}: {detail}")]
    UndefinedVariable { name: String, detail: String },

    /// Malformed template markup.
    #[error("Syntax error in template {name}: {detail}")]
    TemplateSyntaxError { name: String, detail: String },

    /// Any other failure raised while rendering a template.
    #[error("Failed to render template {name}: {detail}")]
    TemplateError { name: String, detail: String },

    /// A relative path would escape the root it is joined to.
    #[error("Unsafe path '{path}': {reason}")]
    PathSafety { path: String, reason: String },

    /// Two templates would be materialized to the same file.
    #[error("Templates {first} and {second} both render to {target}")]
    DuplicateOutput { target: String, first: String, second: String },

    /// The provisioning tool reported a non-zero status or error output.
    #[error("{step} failed with status {status}: {message}")]
    ExternalToolFailure { step: String, status: i32, message: String },

    /// A workflow step was requested out of order.
    #[error("Cannot run {step} while the workflow is {state}")]
    InvalidTransition { step: String, state: String },

    /// Invalid or unreadable settings.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Operator interaction failed.
    #[error("Prompt error: {0}")]
    PromptError(String),

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Convenience type alias for Results with terrapy's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
