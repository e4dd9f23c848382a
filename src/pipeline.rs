//! Core render pipeline.
//! Resolves variables once, locates a project's templates and renders each of
//! them, returning either every rendered file or the first error.

use indexmap::IndexMap;
use log::{debug, info};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::locator::TemplateLocator;
use crate::paths::strip_template_suffix;
use crate::renderer::TemplateRenderer;
use crate::variables::VariableResolver;

/// One rendered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Output path relative to the project, template suffix stripped.
    pub relative: String,
    /// Template name relative to the templates root.
    pub source: String,
    pub content: String,
}

/// Rendered files of one project, keyed by output path in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    files: IndexMap<String, RenderedFile>,
}

impl RenderResult {
    /// Builds a result from already rendered files, rejecting duplicate outputs.
    pub fn from_files<I: IntoIterator<Item = RenderedFile>>(files: I) -> Result<Self> {
        let mut result = Self::default();
        for file in files {
            result.insert(file)?;
        }
        result.files.sort_keys();
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, relative: &str) -> Option<&RenderedFile> {
        self.files.get(relative)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedFile> {
        self.files.values()
    }

    /// Flattens the result into output path → content.
    pub fn into_contents(self) -> IndexMap<String, String> {
        self.files.into_iter().map(|(key, file)| (key, file.content)).collect()
    }

    fn insert(&mut self, file: RenderedFile) -> Result<()> {
        if let Some(existing) = self.files.get(&file.relative) {
            return Err(Error::DuplicateOutput {
                target: file.relative,
                first: existing.source.clone(),
                second: file.source,
            });
        }
        self.files.insert(file.relative.clone(), file);
        Ok(())
    }
}

/// Composes the resolver, the locator and a renderer.
pub struct RenderPipeline<'a> {
    resolver: VariableResolver,
    locator: TemplateLocator,
    renderer: &'a dyn TemplateRenderer,
}

impl<'a> RenderPipeline<'a> {
    pub fn new(settings: &Settings, renderer: &'a dyn TemplateRenderer) -> Result<Self> {
        Ok(Self {
            resolver: VariableResolver::new(&settings.variables_dir),
            locator: TemplateLocator::new(&settings.templates_dir, &settings.template_suffix)?,
            renderer,
        })
    }

    /// Renders every template of `project` with the variables from `vars_file`.
    ///
    /// Fails fast: a missing variable file stops the run before templates are
    /// located, and the first render failure discards everything rendered so far.
    pub fn render_project(&self, project: &str, vars_file: &str) -> Result<RenderResult> {
        let vars = self.resolver.resolve(vars_file)?;
        debug!("Resolved {} top-level variables", vars.len());

        info!("Looking for templates of project '{project}'");
        let templates = self.locator.locate(project)?;

        let mut result = RenderResult::default();
        for template in templates {
            let content = self.renderer.render(&template.name, &vars)?;
            result.insert(RenderedFile {
                relative: strip_template_suffix(&template.relative, self.locator.suffix()),
                source: template.name,
                content,
            })?;
        }
        // Stripping the suffix can reorder paths the locator sorted.
        result.files.sort_keys();

        info!("Rendered {} file(s) for project '{project}'", result.len());
        Ok(result)
    }
}
