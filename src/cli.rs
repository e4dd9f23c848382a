//! Command-line interface implementation for terrapy.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for terrapy.
#[derive(Parser, Debug)]
#[command(author, version, about = "terrapy: render templated Terraform projects and apply them", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of terrapy.{json,yml,yaml}
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Provisioning tool executable
    #[arg(long, value_name = "PATH", global = true)]
    pub binary: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a project's templates and print the result
    Templates {
        /// Project directory under the templates root
        #[arg(value_name = "NAME")]
        name: String,

        /// Variable file under the variables root
        #[arg(long, value_name = "FILE")]
        vars: Option<String>,

        /// Run init and validate against the rendered files in a scratch directory
        #[arg(long)]
        validate: bool,

        /// Write the dependency graph (DOT) here when validation succeeds
        #[arg(long, value_name = "FILE", requires = "validate")]
        graph: Option<PathBuf>,
    },

    /// Render a project, write it to the output root and run init, plan and apply
    Apply {
        /// Project directory under the templates root
        #[arg(value_name = "NAME")]
        name: String,

        /// Variable file under the variables root
        #[arg(long, value_name = "FILE")]
        vars: Option<String>,

        /// Keep going after a failed step instead of stopping
        #[arg(long)]
        no_halt: bool,

        /// Ask for confirmation before applying
        #[arg(long)]
        no_auto_approve: bool,
    },
}

/// Writes the help text shown when a required argument or command is missing.
pub fn write_usage<W: std::io::Write>(out: &mut W) -> std::io::Result<()> {
    Args::command()
        .help_template(
            r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
        )
        .write_help(out)
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if a required argument or command is missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::MissingSubcommand
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                if let Err(err) = write_usage(&mut std::io::stdout()) {
                    eprintln!("Failed to print help: {err}");
                }
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
