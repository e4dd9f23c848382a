//! terrapy's main application entry point.
//! Parses arguments, loads settings and dispatches to the commands.

use terrapy::{
    cli::{get_args, Args, Command},
    commands::{self, TemplatesOptions},
    config::load_settings,
    error::{default_error_handler, Result},
    logger::init_logger,
    prompt::DialoguerPrompter,
    renderer::MiniJinjaRenderer,
    terraform::Terraform,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let mut settings = load_settings(&cwd, args.config.as_deref())?;
    if let Some(binary) = args.binary {
        settings.binary = binary;
    }

    match args.command {
        Command::Templates { name, vars, validate, graph } => {
            let renderer = MiniJinjaRenderer::from_settings(&settings);
            let tool = Terraform::new(&settings.binary);
            let options =
                TemplatesOptions { vars: vars.as_deref(), validate, graph: graph.as_deref() };
            commands::templates(
                &settings,
                &renderer,
                &tool,
                &name,
                options,
                &mut std::io::stdout().lock(),
            )
        }
        Command::Apply { name, vars, no_halt, no_auto_approve } => {
            settings.halt_on_failure &= !no_halt;
            settings.auto_approve &= !no_auto_approve;

            let renderer = MiniJinjaRenderer::from_settings(&settings);
            let tool = Terraform::new(&settings.binary);
            let prompt = DialoguerPrompter::new();
            let state =
                commands::apply(&settings, &renderer, &tool, &prompt, &name, vars.as_deref())?;
            println!("Workflow for '{name}' finished: {state}");
            Ok(())
        }
    }
}
