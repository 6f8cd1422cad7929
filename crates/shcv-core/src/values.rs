//! Values trees and values files
//!
//! A values file is loaded into a [`ValuesTree`]: an ordered mapping whose
//! entries are either nested mappings or leaves. Leaves keep whatever YAML
//! value the file held (strings, numbers, booleans, sequences), so writing
//! the tree back only changes what reconciliation inserted.

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;
use std::path::PathBuf;

use crate::error::{Result, ShcvError};
use crate::files::write_atomic;

/// Child entries of a mapping node
pub type Mapping = IndexMap<String, Node>;

/// One entry of a values tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// Any non-mapping value
    Leaf(Value),
    /// Nested mapping
    Map(Mapping),
}

impl Node {
    /// Empty nested mapping
    pub fn map() -> Self {
        Node::Map(Mapping::new())
    }

    /// Convert a parsed YAML value, turning mappings into nested nodes
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Mapping(mapping) => {
                let mut map = Mapping::with_capacity(mapping.len());
                for (key, val) in mapping {
                    map.insert(key_to_string(&key), Node::from_value(val));
                }
                Node::Map(map)
            }
            other => Node::Leaf(other),
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Node::Map(map) => Some(map),
            Node::Leaf(_) => None,
        }
    }

    /// Leaf string content, if this is a string leaf
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Leaf(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Leaf integer content, if this is an integer leaf
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Leaf(Value::Number(n)) => n.as_i64(),
            _ => None,
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Leaf(Value::String(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Leaf(Value::String(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Leaf(Value::Number(value.into()))
    }
}

/// Root mapping of one values file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValuesTree(pub Mapping);

impl ValuesTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a parsed YAML document
    ///
    /// `null` yields an empty tree; any other non-mapping root yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match Node::from_value(value) {
            Node::Map(map) => Some(Self(map)),
            Node::Leaf(Value::Null) => Some(Self::new()),
            Node::Leaf(_) => None,
        }
    }

    /// Parse YAML text; empty or `null` documents yield an empty tree
    ///
    /// Returns `Ok(None)` when the document root is not a mapping.
    pub fn from_yaml(text: &str) -> std::result::Result<Option<Self>, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Some(Self::new()));
        }
        let value: Value = serde_yaml::from_str(text)?;
        Ok(Self::from_value(value))
    }

    /// Serialize to YAML text
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a node by dotted path
    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;

        for part in parts {
            current = current.as_map()?.get(part)?;
        }

        Some(current)
    }

    /// Whether a node exists at `path`, whatever its value
    pub fn contains_path(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set a node by dotted path, creating intermediate mappings
    ///
    /// A leaf sitting where an intermediate mapping is needed is replaced by
    /// an empty mapping; its previous content is lost.
    pub fn set_path(&mut self, path: &str, value: Node) {
        let parts: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = parts.split_last() else {
            return;
        };

        let mut current = &mut self.0;
        for part in parents {
            current = child_map(current, part);
        }
        current.insert((*last).to_string(), value);
    }

    /// Set `path` only when nothing exists there yet
    ///
    /// Returns `true` when the tree changed.
    pub fn insert_if_absent(&mut self, path: &str, value: Node) -> bool {
        if self.contains_path(path) {
            return false;
        }
        self.set_path(path, value);
        true
    }

    /// Top-level mapping under `key`, created (or coerced) when needed
    pub fn ensure_map(&mut self, key: &str) -> &mut Mapping {
        child_map(&mut self.0, key)
    }
}

/// Mapping stored under `key`, replacing a leaf with an empty mapping
pub(crate) fn child_map<'m>(map: &'m mut Mapping, key: &str) -> &'m mut Mapping {
    let entry = map.entry(key.to_string()).or_insert_with(Node::map);
    if let Node::Leaf(previous) = entry {
        tracing::debug!(key, ?previous, "replacing scalar with mapping");
        *entry = Node::map();
    }

    match entry {
        Node::Map(child) => child,
        Node::Leaf(_) => unreachable!("leaf was replaced by a mapping above"),
    }
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

// =============================================================================
// Values files
// =============================================================================

/// A values file on disk together with its loaded tree
#[derive(Debug, Clone)]
pub struct ValuesFile {
    /// Location of the file
    pub path: PathBuf,
    /// Current contents
    pub tree: ValuesTree,
    /// Set when the tree was modified and needs to be written
    pub changed: bool,
}

impl ValuesFile {
    /// An unloaded values file with an empty tree
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tree: ValuesTree::new(),
            changed: false,
        }
    }

    /// Read and parse the file
    ///
    /// A missing or empty file leaves the tree empty.
    pub fn load(&mut self) -> Result<()> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "values file not found, starting empty");
                self.tree = ValuesTree::new();
                return Ok(());
            }
            Err(source) => {
                return Err(ShcvError::ReadValues {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %self.path.display(), "no values found");
            self.tree = ValuesTree::new();
            return Ok(());
        }

        self.tree = ValuesTree::from_yaml(&content)
            .map_err(|source| ShcvError::ParseValues {
                path: self.path.clone(),
                source,
            })?
            .ok_or_else(|| ShcvError::ValuesNotMapping {
                path: self.path.clone(),
            })?;

        tracing::debug!(path = %self.path.display(), "loaded values");
        Ok(())
    }

    /// Write the tree back to disk and clear the dirty flag
    ///
    /// The file is written to a temporary sibling and renamed into place.
    pub fn save(&mut self) -> Result<()> {
        let yaml = self
            .tree
            .to_yaml()
            .map_err(|source| ShcvError::EncodeValues {
                path: self.path.clone(),
                source,
            })?;

        write_atomic(&self.path, yaml.as_bytes()).map_err(|source| ShcvError::WriteValues {
            path: self.path.clone(),
            source,
        })?;

        self.changed = false;
        tracing::info!(path = %self.path.display(), "updated values");
        Ok(())
    }
}
