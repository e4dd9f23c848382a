//! Template rendering with MiniJinja.
//! A renderer is configured once per process and shared by reference; it only
//! reads templates and never writes to the filesystem.

use std::path::{Path, PathBuf};

use cruet::Inflector;
use log::debug;
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior, Value};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::paths::safe_join;
use crate::variables::VariableSet;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders the template `name` (relative to the templates root) with `vars`.
    ///
    /// # Errors
    /// * `Error::TemplateNotFound` if the name does not resolve
    /// * `Error::UndefinedVariable` if the template uses a key missing from `vars`
    /// * `Error::TemplateSyntaxError` if the markup is malformed
    fn render(&self, name: &str, vars: &VariableSet) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer loading templates from `templates_root`, falling back to
    /// `macros_root` for names the templates root does not have.
    pub fn new<P: Into<PathBuf>>(templates_root: P, macros_root: Option<PathBuf>) -> Self {
        let templates_root = templates_root.into();
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        // No escaping for any extension, `.yaml.j2` and `.json.j2` included.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_loader(move |name| {
            let roots = std::iter::once(templates_root.as_path()).chain(macros_root.as_deref());
            for root in roots {
                if let Some(source) = load_from(root, name)? {
                    return Ok(Some(source));
                }
            }
            Ok(None)
        });

        env.add_filter("snake_case", |value: String| value.to_snake_case());
        env.add_filter("kebab_case", |value: String| value.to_kebab_case());
        env.add_filter("camel_case", |value: String| value.to_camel_case());
        env.add_filter("pascal_case", |value: String| value.to_pascal_case());
        env.add_filter("tf_string", tf_string);

        Self { env }
    }

    /// Renderer over the configured templates and macros directories.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.templates_dir, Some(settings.macros_dir.clone()))
    }
}

fn load_from(root: &Path, name: &str) -> std::result::Result<Option<String>, minijinja::Error> {
    // Names that would escape the root are simply not found there.
    let Ok(path) = safe_join(root, name) else {
        return Ok(None);
    };
    match std::fs::read_to_string(&path) {
        Ok(source) => {
            debug!("Loaded template source {}", path.display());
            Ok(Some(source))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read template {}", path.display()),
        )
        .with_source(e)),
    }
}

/// Quotes a value as an HCL string literal, escaping interpolation markers.
fn tf_string(value: Value) -> String {
    let raw = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                quoted.push(c);
                quoted.push(c);
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn map_error(name: &str, err: minijinja::Error) -> Error {
    let name = name.to_string();
    let detail = err.to_string();
    match err.kind() {
        ErrorKind::TemplateNotFound => Error::TemplateNotFound { name },
        ErrorKind::UndefinedError => Error::UndefinedVariable { name, detail },
        ErrorKind::SyntaxError => Error::TemplateSyntaxError { name, detail },
        _ => Error::TemplateError { name, detail },
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, name: &str, vars: &VariableSet) -> Result<String> {
        debug!("Rendering template {name}");
        let tmpl = self.env.get_template(name).map_err(|e| map_error(name, e))?;
        tmpl.render(vars).map_err(|e| map_error(name, e))
    }
}
