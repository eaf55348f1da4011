//! # Values Document
//!
//! The values document is the mapping used to fill template placeholders. It
//! is read once per run, either from the file given with `--values` or from
//! standard input when input is piped, and is shared read-only by every
//! render afterwards.
//!
//! Values are held in [`Value`], a recursive sum type, instead of an untyped
//! YAML tree. Template lookups walk it by key and fail with the exact
//! reference that is missing.
//!
//! Standard input is reached through the [`ValuesInput`] trait so that tests
//! can substitute an in-memory stream for the process-wide handle.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};

/// A single value in the values document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`
    Unsigned(u64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Look up a key when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Whether the value counts as "empty" for the `default` template function.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Integer(i) => *i == 0,
            Value::Unsigned(u) => *u == 0,
            Value::Float(f) => *f == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Sequence(seq) => seq.is_empty(),
            Value::Mapping(map) => map.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    /// Scalars print as plain text; sequences and mappings print as JSON,
    /// which is also valid YAML flow syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Unsigned(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Sequence(_) | Value::Mapping(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = Error;

    fn try_from(value: serde_yaml::Value) -> Result<Self> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Unsigned(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(seq) => Value::Sequence(
                seq.into_iter()
                    .map(Value::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut entries = BTreeMap::new();
                for (key, value) in map {
                    entries.insert(mapping_key(key)?, Value::try_from(value)?);
                }
                Value::Mapping(entries)
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

/// Mapping keys are always strings in the values document; scalar keys are
/// converted to their text form.
fn mapping_key(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        other => Err(Error::ValuesParse {
            message: format!("unsupported mapping key: {:?}", other),
        }),
    }
}

/// The parsed values document: a mapping from key to [`Value`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuesDocument {
    root: Value,
}

impl Default for Value {
    fn default() -> Self {
        Value::Mapping(BTreeMap::new())
    }
}

impl ValuesDocument {
    /// Create an empty values document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a values document from raw bytes.
    ///
    /// An empty buffer (or one holding only comments) parses to an empty
    /// mapping. Anything other than a mapping at the top level is rejected.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Self::new());
        }

        let raw: serde_yaml::Value =
            serde_yaml::from_slice(bytes).map_err(|e| Error::ValuesParse {
                message: e.to_string(),
            })?;

        match Value::try_from(raw)? {
            Value::Null => Ok(Self::new()),
            root @ Value::Mapping(_) => Ok(Self { root }),
            other => Err(Error::ValuesParse {
                message: format!(
                    "values document must be a mapping, found {}",
                    type_name(&other)
                ),
            }),
        }
    }

    /// The whole document as a mapping value
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Look up a top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Walk a dotted path (already split into segments) from the root.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.root, |current, segment| current.get(segment))
    }

    pub fn len(&self) -> usize {
        match &self.root {
            Value::Mapping(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Integer(_) | Value::Unsigned(_) | Value::Float(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
    }
}

/// Source of values when no `--values` file is given.
pub trait ValuesInput {
    /// Whether the stream is a pipe or file rather than an interactive terminal.
    fn is_piped(&self) -> bool;

    /// Read the stream to end-of-input.
    fn read_all(&mut self) -> io::Result<Vec<u8>>;
}

/// The process standard input.
#[derive(Debug, Default)]
pub struct StdinInput;

impl ValuesInput for StdinInput {
    fn is_piped(&self) -> bool {
        !io::stdin().is_terminal()
    }

    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// An in-memory or file-backed stream that always reports itself as piped.
#[derive(Debug)]
pub struct PipedInput<R> {
    reader: R,
}

impl<R: Read> PipedInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> ValuesInput for PipedInput<R> {
    fn is_piped(&self) -> bool {
        true
    }

    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// An interactive terminal: never read from.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl ValuesInput for TerminalInput {
    fn is_piped(&self) -> bool {
        false
    }

    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// Resolve the values document for a run.
///
/// With a path, the file is read fully and a missing or unreadable file is a
/// [`Error::ValuesNotFound`]. Without one, `input` is read only when it is
/// piped; an interactive terminal yields an empty document instead of
/// blocking.
pub fn resolve(values_path: Option<&Path>, input: &mut dyn ValuesInput) -> Result<ValuesDocument> {
    let bytes = match values_path {
        Some(path) => std::fs::read(path).map_err(|e| Error::ValuesNotFound {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        None if input.is_piped() => {
            debug!("Reading values from standard input");
            input.read_all()?
        }
        None => Vec::new(),
    };

    let values = ValuesDocument::parse(&bytes)?;
    debug!("Resolved values document with {} top-level keys", values.len());
    Ok(values)
}
