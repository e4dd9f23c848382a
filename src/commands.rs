//! The `templates` and `apply` commands.
//!
//! Both render first and only touch the disk or the provisioning tool once the
//! whole project rendered; a render error is returned before anything is written.

use std::io::Write;
use std::path::Path;

use log::info;

use crate::config::Settings;
use crate::error::Result;
use crate::materializer::Materializer;
use crate::pipeline::RenderPipeline;
use crate::prompt::Prompter;
use crate::renderer::TemplateRenderer;
use crate::terraform::ProvisioningTool;
use crate::workflow::{Workflow, WorkflowState};

const BANNER: &str = "********************";

/// Options for `templates`.
#[derive(Debug, Default, Clone)]
pub struct TemplatesOptions<'a> {
    pub vars: Option<&'a str>,
    pub validate: bool,
    pub graph: Option<&'a Path>,
}

/// Renders `name`, prints each file to `out` and optionally validates the result
/// in a scratch directory.
pub fn templates(
    settings: &Settings,
    renderer: &dyn TemplateRenderer,
    tool: &dyn ProvisioningTool,
    name: &str,
    options: TemplatesOptions<'_>,
    out: &mut dyn Write,
) -> Result<()> {
    let vars = options.vars.unwrap_or(settings.default_vars.as_str());
    let result = RenderPipeline::new(settings, renderer)?.render_project(name, vars)?;

    for file in result.iter() {
        writeln!(out, "{BANNER}")?;
        writeln!(out, "{}:", file.relative)?;
        writeln!(out, "{BANNER}")?;
        writeln!(out, "{}", file.content)?;
    }

    if !options.validate {
        return Ok(());
    }

    let scratch = tempfile::TempDir::new()?;
    let materializer = Materializer::new(scratch.path());
    materializer.materialize(name, &result)?;

    let mut workflow = Workflow::new(tool, materializer.project_dir(name)?)
        .halt_on_failure(settings.halt_on_failure);
    workflow.initialize()?;
    let validation = workflow.validate()?;
    writeln!(out, "Exit Code: {}", validation.status)?;
    writeln!(out, "Message: {}", validation.message.trim_end())?;
    writeln!(out, "Error: {}", validation.error.as_deref().unwrap_or("None"))?;

    if let Some(graph_path) = options.graph {
        if validation.success() {
            let graph = workflow.graph()?;
            if graph.success() {
                std::fs::write(graph_path, &graph.message)?;
                info!("Dependency graph written to {}", graph_path.display());
            }
        } else {
            info!("Skipping the dependency graph because validation failed");
        }
    }

    Ok(())
}

/// Renders `name`, materializes it under the output root and runs init, plan and apply.
///
/// Returns the state the workflow ended in; `Planned` means the operator declined.
pub fn apply(
    settings: &Settings,
    renderer: &dyn TemplateRenderer,
    tool: &dyn ProvisioningTool,
    prompt: &dyn Prompter,
    name: &str,
    vars: Option<&str>,
) -> Result<WorkflowState> {
    let vars = vars.unwrap_or(settings.default_vars.as_str());
    let result = RenderPipeline::new(settings, renderer)?.render_project(name, vars)?;

    let materializer = Materializer::new(&settings.output_dir);
    let written = materializer.materialize(name, &result)?;
    info!("Materialized {} file(s) for project '{name}'", written.len());

    let mut workflow = Workflow::new(tool, materializer.project_dir(name)?)
        .halt_on_failure(settings.halt_on_failure);
    workflow.initialize()?;
    workflow.plan()?;
    workflow.apply(prompt, settings.auto_approve)?;

    Ok(workflow.state())
}
