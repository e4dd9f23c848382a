//! terrapy renders Jinja-templated Terraform projects from YAML variable files
//! and drives the provisioning tool through init, plan and apply.

/// Command-line interface module for the terrapy application
pub mod cli;

/// The `templates` and `apply` commands
pub mod commands;

/// Settings loading (terrapy.json, terrapy.yml, terrapy.yaml)
pub mod config;

/// Error types and handling for the terrapy application
pub mod error;

/// Template discovery under the templates root
pub mod locator;

/// Logger setup
pub mod logger;

/// Writing rendered projects to the output root
pub mod materializer;

/// Path normalization, traversal checks and suffix stripping
pub mod paths;

/// Variable resolution, rendering and collection of a whole project
pub mod pipeline;

/// Operator interaction handling
pub mod prompt;

/// MiniJinja template rendering
pub mod renderer;

/// Provisioning tool process invocation
pub mod terraform;

/// YAML variable documents
pub mod variables;

/// Init, validate, plan and apply sequencing
pub mod workflow;
