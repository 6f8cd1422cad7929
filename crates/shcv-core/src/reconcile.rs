//! Reference reconciliation
//!
//! Merges the value references collected from a chart's templates into its
//! values files. Paths that already exist are never touched; missing paths
//! are created with the default discovered in the templates.
//!
//! Resolution rules:
//! - references are deduplicated by path, in order of first appearance
//! - the first reference (in scan order) with a non-empty default wins
//! - without any inline default, the first matching [`DefaultRule`] applies
//! - otherwise the value is an empty string

use std::collections::HashMap;

use crate::reference::ValueRef;
use crate::values::{Node, ValuesFile, ValuesTree};

/// Fallback default for paths ending in a given suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRule {
    /// Final path segment(s) to match, e.g. `enabled` or `image.pullPolicy`
    pub suffix: String,
    /// Value written when the rule applies
    pub value: String,
}

impl DefaultRule {
    pub fn new(suffix: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            value: value.into(),
        }
    }

    /// Matches the whole path or its trailing segments
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_suffix(self.suffix.as_str()) {
            Some("") => true,
            Some(prefix) => prefix.ends_with('.'),
            None => false,
        }
    }
}

/// A distinct path with the value to create it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub path: String,
    pub value: String,
}

/// Merges references into values trees
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    rules: Vec<DefaultRule>,
}

impl Reconciler {
    pub fn new(rules: Vec<DefaultRule>) -> Self {
        Self { rules }
    }

    /// Deduplicate references and pick the default for each path
    pub fn resolve(&self, refs: &[ValueRef]) -> Vec<ResolvedValue> {
        let mut resolved: Vec<ResolvedValue> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for r in refs {
            match index.get(r.path.as_str()) {
                Some(&i) => {
                    if resolved[i].value.is_empty() && r.has_default() {
                        resolved[i].value = r.default_value.clone();
                    }
                }
                None => {
                    index.insert(r.path.as_str(), resolved.len());
                    resolved.push(ResolvedValue {
                        path: r.path.clone(),
                        value: r.default_value.clone(),
                    });
                }
            }
        }

        for entry in resolved.iter_mut().filter(|e| e.value.is_empty()) {
            if let Some(rule) = self.rules.iter().find(|rule| rule.matches(&entry.path)) {
                entry.value = rule.value.clone();
            }
        }

        resolved
    }

    /// Insert every missing path into one tree, returning how many were added
    pub fn apply_to_tree(&self, resolved: &[ResolvedValue], tree: &mut ValuesTree) -> usize {
        let mut added = 0;
        for entry in resolved {
            if tree.insert_if_absent(&entry.path, Node::from(entry.value.as_str())) {
                added += 1;
            }
        }
        added
    }

    /// Insert every missing path into a values file, marking it changed
    pub fn apply(&self, resolved: &[ResolvedValue], file: &mut ValuesFile) -> usize {
        let added = self.apply_to_tree(resolved, &mut file.tree);
        if added > 0 {
            tracing::debug!(path = %file.path.display(), added, "inserted missing values");
            file.changed = true;
        }
        added
    }

    /// Resolve once and apply the same outcome to every file independently
    pub fn reconcile(&self, refs: &[ValueRef], files: &mut [ValuesFile]) -> usize {
        let resolved = self.resolve(refs);
        files.iter_mut().map(|file| self.apply(&resolved, file)).sum()
    }
}
