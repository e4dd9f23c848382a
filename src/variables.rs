//! Variable resolution.
//! Loads a named YAML document from the variables root into a `VariableSet`,
//! the only source of rendering parameters.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::paths::validate_name;

/// A single variable value.
///
/// Only plain data can be represented. Documents are converted from YAML by
/// `VariableSet::from_yaml`, which refuses tags and non-scalar mapping keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Seq(Vec<VarValue>),
    Map(IndexMap<String, VarValue>),
}

impl VarValue {
    /// Converts a parsed YAML node found at `at` (a dotted key path, for messages).
    fn from_yaml(value: Value, at: &str) -> std::result::Result<Self, String> {
        Ok(match value {
            Value::Null => VarValue::Null,
            Value::Bool(b) => VarValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => VarValue::Int(i),
                None => VarValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => VarValue::String(s),
            Value::Sequence(items) => VarValue::Seq(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| VarValue::from_yaml(item, &format!("{at}[{i}]")))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            Value::Mapping(mapping) => VarValue::Map(convert_mapping(mapping, at)?),
            Value::Tagged(tagged) => {
                let at = display_at(at);
                return Err(format!("{at}: tagged value {} is not allowed", tagged.tag));
            }
        })
    }
}

fn display_at(at: &str) -> &str {
    if at.is_empty() {
        "document root"
    } else {
        at
    }
}

/// Scalar keys become strings the way they render: `80`, `true`, `null`.
fn key_to_string(key: Value, at: &str) -> std::result::Result<String, String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Sequence(_) | Value::Mapping(_) => {
            Err(format!("{}: mapping keys must be scalars", display_at(at)))
        }
        Value::Tagged(tagged) => {
            Err(format!("{}: tagged key {} is not allowed", display_at(at), tagged.tag))
        }
    }
}

fn convert_mapping(
    mapping: Mapping,
    at: &str,
) -> std::result::Result<IndexMap<String, VarValue>, String> {
    let mut converted = IndexMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = key_to_string(key, at)?;
        let child = if at.is_empty() { key.clone() } else { format!("{at}.{key}") };
        if converted.contains_key(&key) {
            return Err(format!("{child}: duplicate key after conversion to string"));
        }
        let value = VarValue::from_yaml(value, &child)?;
        converted.insert(key, value);
    }
    Ok(converted)
}

/// Resolved parameters for one render request, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableSet(IndexMap<String, VarValue>);

impl VariableSet {
    pub fn new(values: IndexMap<String, VarValue>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&VarValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Parses a variable document. An empty or null document is an empty set.
    ///
    /// Merge keys (`<<: *anchor`) are resolved before conversion.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self> {
        let parse_error = |detail: String| Error::VariablesParseError {
            path: origin.display().to_string(),
            detail,
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut document: Value =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
        document.apply_merge().map_err(|e| parse_error(e.to_string()))?;

        match document {
            Value::Null => Ok(Self::default()),
            Value::Mapping(mapping) => {
                Ok(Self(convert_mapping(mapping, "").map_err(parse_error)?))
            }
            _ => Err(parse_error("the top level must be a mapping of variable names".into())),
        }
    }
}

/// Reads variable documents from a fixed root. No caching: every call hits the disk.
#[derive(Debug, Clone)]
pub struct VariableResolver {
    root: PathBuf,
}

impl VariableResolver {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads `name` from the variables root.
    ///
    /// # Errors
    /// * `Error::PathSafety` if `name` is not a plain file name
    /// * `Error::VariablesNotFound` if the file does not exist
    /// * `Error::VariablesParseError` if the document is not plain data
    pub fn resolve(&self, name: &str) -> Result<VariableSet> {
        validate_name("variable file", name)?;
        info!("Loading variables from the following variable file: {name}");

        let path = self.root.join(name);
        if !path.is_file() {
            return Err(Error::VariablesNotFound {
                name: name.to_string(),
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        VariableSet::from_yaml(&content, &path)
    }
}
