//! Template discovery.
//! Enumerates every template belonging to one project, in a stable order.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::paths::{is_template_file, normalize_relative, validate_name};

/// One discovered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    /// Location on disk.
    pub path: PathBuf,
    /// Forward-slash path relative to the templates root; what the renderer loads.
    pub name: String,
    /// Forward-slash path relative to the project directory.
    pub relative: String,
}

/// Scans project directories under a fixed templates root.
#[derive(Debug, Clone)]
pub struct TemplateLocator {
    root: PathBuf,
    suffix: String,
    matcher: GlobMatcher,
}

impl TemplateLocator {
    /// Creates a locator matching file names that end with `suffix`.
    pub fn new<P: Into<PathBuf>>(root: P, suffix: &str) -> Result<Self> {
        let matcher = Glob::new(&format!("*{suffix}"))
            .map_err(|e| Error::ConfigError(format!("Invalid template suffix '{suffix}': {e}")))?
            .compile_matcher();
        Ok(Self { root: root.into(), suffix: suffix.to_string(), matcher })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    fn matches(&self, filename: &str) -> bool {
        self.matcher.is_match(filename) && is_template_file(filename, &self.suffix)
    }

    /// Lists every template under `<root>/<project>`, at any depth, sorted by
    /// project-relative path. A project without templates yields an empty list.
    ///
    /// # Errors
    /// * `Error::PathSafety` if `project` is not a plain name
    /// * `Error::ProjectNotFound` if the project directory does not exist
    pub fn locate(&self, project: &str) -> Result<Vec<TemplateRef>> {
        validate_name("project", project)?;

        let project_dir = self.root.join(project);
        if !project_dir.is_dir() {
            return Err(Error::ProjectNotFound { path: project_dir.display().to_string() });
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(&project_dir).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(filename) = entry.file_name().to_str() else {
                debug!("Skipping non UTF-8 file name {}", entry.path().display());
                continue;
            };
            if !self.matches(filename) {
                continue;
            }

            let relative = entry.path().strip_prefix(&project_dir).map_err(|_| {
                Error::PathSafety {
                    path: entry.path().display().to_string(),
                    reason: "template lies outside its project directory".to_string(),
                }
            })?;
            let relative = normalize_relative(relative)?;
            debug!("Found template: {project}/{relative}");

            templates.push(TemplateRef {
                path: entry.path().to_path_buf(),
                name: format!("{project}/{relative}"),
                relative,
            });
        }

        templates.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(templates)
    }
}
