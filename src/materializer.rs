//! Writes a rendered project to disk.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::paths::{safe_join, validate_name};
use crate::pipeline::RenderResult;

/// Materializes render results under a fixed output root.
#[derive(Debug, Clone)]
pub struct Materializer {
    output_root: PathBuf,
}

impl Materializer {
    pub fn new<P: Into<PathBuf>>(output_root: P) -> Self {
        Self { output_root: output_root.into() }
    }

    /// Directory a project is materialized into; also the provisioning tool's working directory.
    pub fn project_dir(&self, project: &str) -> Result<PathBuf> {
        validate_name("project", project)?;
        Ok(self.output_root.join(project))
    }

    /// Writes every file of `result` under `<output_root>/<project>`, creating parent
    /// directories and overwriting existing files.
    ///
    /// All targets are checked before the first write, so an unsafe path leaves the
    /// output root untouched.
    pub fn materialize(&self, project: &str, result: &RenderResult) -> Result<Vec<PathBuf>> {
        let project_dir = self.project_dir(project)?;
        let targets = result
            .iter()
            .map(|file| Ok((safe_join(&project_dir, &file.relative)?, file.content.as_str())))
            .collect::<Result<Vec<_>>>()?;

        let mut written = Vec::with_capacity(targets.len());
        for (target, content) in targets {
            write_file(&target, content)?;
            debug!("Wrote {}", target.display());
            written.push(target);
        }
        Ok(written)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
