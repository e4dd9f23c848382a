//! Path helpers shared by the locator, the renderer's loader and the materializer.
//!
//! Every relative path that crosses a module boundary is kept in forward-slash
//! form and is guaranteed not to climb out of the root it is later joined to.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};

fn unsafe_path(path: impl AsRef<Path>, reason: &str) -> Error {
    Error::PathSafety {
        path: path.as_ref().display().to_string(),
        reason: reason.to_string(),
    }
}

/// Normalizes a relative path into forward-slash form.
///
/// `.` segments are dropped. Absolute paths, drive prefixes and `..` segments are
/// rejected with `Error::PathSafety`, as is a path with no segments at all.
pub fn normalize_relative<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let mut segments = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment
                    .to_str()
                    .ok_or_else(|| unsafe_path(path, "path is not valid UTF-8"))?;
                // A backslash is a separator on some hosts; never let it smuggle `..` through.
                if segment.split('\\').any(|part| part == "..") {
                    return Err(unsafe_path(path, "parent directory segments are not allowed"));
                }
                segments.push(segment);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(unsafe_path(path, "parent directory segments are not allowed"))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path(path, "absolute paths are not allowed"))
            }
        }
    }

    if segments.is_empty() {
        return Err(unsafe_path(path, "path is empty"));
    }

    Ok(segments.join("/"))
}

/// Joins a relative path under `root` after normalizing it.
pub fn safe_join<R: AsRef<Path>, P: AsRef<Path>>(root: R, relative: P) -> Result<PathBuf> {
    let normalized = normalize_relative(relative)?;
    Ok(normalized.split('/').fold(root.as_ref().to_path_buf(), |acc, part| acc.join(part)))
}

/// Returns true when `filename` carries the template suffix and something before it.
pub fn is_template_file(filename: &str, suffix: &str) -> bool {
    match filename.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => true,
        Some(_) => {
            debug!("Ignoring '{filename}': nothing precedes the template suffix");
            false
        }
        None => false,
    }
}

/// Strips the template suffix once from the last segment of a forward-slash path.
///
/// Only the marker is removed, so `service.yaml.j2` becomes `service.yaml`.
/// Paths without the suffix are returned unchanged.
pub fn strip_template_suffix(relative: &str, suffix: &str) -> String {
    let (dir, filename) = match relative.rsplit_once('/') {
        Some((dir, filename)) => (Some(dir), filename),
        None => (None, relative),
    };

    let filename = if is_template_file(filename, suffix) {
        &filename[..filename.len() - suffix.len()]
    } else {
        filename
    };

    match dir {
        Some(dir) => format!("{dir}/{filename}"),
        None => filename.to_string(),
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._-]*$").expect("name pattern is a valid regex")
    })
}

/// Checks that a project or variable-file name is a single plain name, not a path.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name == "." || name == ".." || !name_pattern().is_match(name) {
        return Err(Error::PathSafety {
            path: name.to_string(),
            reason: format!("{kind} must be a plain name without separators"),
        });
    }
    Ok(())
}
