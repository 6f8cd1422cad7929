//! Deployment strategy injection
//!
//! Deployment templates without an explicit `strategy:` get a rolling-update
//! block wired to `.Values.deployment.strategy`, and every values file gets
//! matching defaults:
//!
//! ```yaml
//! deployment:
//!   strategy:
//!     type: RollingUpdate
//!     rollingUpdate:
//!       maxSurge: 1
//!       maxUnavailable: 0
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use crate::values::{Mapping, Node, ValuesTree};

/// Rolling update defaults written into values files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentStrategy {
    pub strategy_type: &'static str,
    pub max_surge: i64,
    pub max_unavailable: i64,
}

pub const DEFAULT_STRATEGY: DeploymentStrategy = DeploymentStrategy {
    strategy_type: "RollingUpdate",
    max_surge: 1,
    max_unavailable: 0,
};

impl DeploymentStrategy {
    /// Fresh `strategy` subtree
    pub fn to_node(&self) -> Node {
        let mut rolling_update = Mapping::new();
        rolling_update.insert("maxSurge".to_string(), Node::from(self.max_surge));
        rolling_update.insert(
            "maxUnavailable".to_string(),
            Node::from(self.max_unavailable),
        );

        let mut strategy = Mapping::new();
        strategy.insert("type".to_string(), Node::from(self.strategy_type));
        strategy.insert("rollingUpdate".to_string(), Node::Map(rolling_update));
        Node::Map(strategy)
    }
}

/// Deployment template that could not be read or rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyWarning {
    pub file: PathBuf,
    pub message: String,
}

impl fmt::Display for StrategyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to process deployment strategy for {}: {}",
            self.file.display(),
            self.message
        )
    }
}

const DEPLOYMENT_MARKER: &str = "kind: Deployment";
const DEFAULT_INDENT_WIDTH: usize = 2;

#[derive(Deserialize)]
struct ManifestKind {
    #[serde(default)]
    kind: String,
}

/// Whether a template is a Kubernetes Deployment manifest
///
/// Template directive lines are dropped before parsing the first YAML
/// document; content that still fails to parse is treated as not a
/// Deployment.
pub fn is_deployment(content: &str) -> bool {
    if !content.contains(DEPLOYMENT_MARKER) {
        return false;
    }

    let clean = strip_template_lines(content);
    // Only the first document decides; later `---` documents are ignored.
    let Some(document) = serde_yaml::Deserializer::from_str(&clean).next() else {
        return false;
    };
    match ManifestKind::deserialize(document) {
        Ok(manifest) => manifest.kind == "Deployment",
        Err(e) => {
            tracing::debug!(error = %e, "manifest does not parse without template directives");
            false
        }
    }
}

/// Remove every line holding a template delimiter (`{{`, `}}`, `{{-`, `-}}`)
pub fn strip_template_lines(content: &str) -> String {
    content
        .split('\n')
        .filter(|line| !line.contains("{{") && !line.contains("}}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Insert the strategy block under the manifest's root `spec:`
///
/// Returns `None` when there is no root `spec:` or it already declares a
/// `strategy:`.
pub fn inject_strategy(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let (spec_index, spec_indent) = find_root_spec(&lines)?;

    let (child_indent, unit) = lines[spec_index + 1..]
        .iter()
        .map(|line| (*line, line.trim()))
        .find(|(_, trimmed)| !trimmed.is_empty() && !trimmed.starts_with("{{"))
        .and_then(|(line, _)| {
            let indent = indent_of(line);
            (indent > spec_indent).then(|| (line[..indent].to_string(), indent - spec_indent))
        })
        .unwrap_or_else(|| {
            let spec_prefix = &lines[spec_index][..spec_indent];
            (
                format!("{}{}", spec_prefix, " ".repeat(DEFAULT_INDENT_WIDTH)),
                DEFAULT_INDENT_WIDTH,
            )
        });

    // New lines reuse the line ending of `spec:` so CRLF files stay CRLF.
    let eol = if lines[spec_index].ends_with('\r') { "\r" } else { "" };
    let one = format!("{}{}", child_indent, " ".repeat(unit));
    let two = format!("{}{}", child_indent, " ".repeat(unit * 2));
    let block = [
        format!("{child_indent}strategy:{eol}"),
        format!("{one}type: {{{{ .Values.deployment.strategy.type }}}}{eol}"),
        format!("{one}rollingUpdate:{eol}"),
        format!("{two}maxSurge: {{{{ .Values.deployment.strategy.rollingUpdate.maxSurge }}}}{eol}"),
        format!(
            "{two}maxUnavailable: {{{{ .Values.deployment.strategy.rollingUpdate.maxUnavailable }}}}{eol}"
        ),
    ];

    let mut result: Vec<String> = Vec::with_capacity(lines.len() + block.len());
    result.extend(lines[..=spec_index].iter().map(|l| l.to_string()));
    result.extend(block);
    result.extend(lines[spec_index + 1..].iter().map(|l| l.to_string()));

    Some(result.join("\n"))
}

/// Locate the root `spec:` line and its indentation width
///
/// Returns `None` if it is missing or a `strategy:` key already sits directly
/// under it. The pod template's nested `spec:` is never considered.
fn find_root_spec(lines: &[&str]) -> Option<(usize, usize)> {
    let mut root: Option<(usize, usize)> = None;
    let mut in_spec = false;
    let mut template_depth = 0usize;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        // Blank lines and directives say nothing about structure.
        if trimmed.is_empty() || trimmed.starts_with("{{") {
            continue;
        }

        if line.contains("template:") {
            template_depth += 1;
            continue;
        }

        if trimmed == "spec:" {
            if template_depth == 0 && root.is_none() {
                root = Some((i, indent_of(line)));
                in_spec = true;
            }
            continue;
        }

        let Some((_, spec_indent)) = root else {
            continue;
        };
        let indent = indent_of(line);

        if in_spec && template_depth == 0 {
            if trimmed.starts_with("strategy:") {
                return None;
            }
            if indent <= spec_indent {
                in_spec = false;
            }
        }

        if template_depth > 0 && indent <= spec_indent {
            template_depth -= 1;
        }
    }

    root
}

/// Ensure `deployment.strategy` exists, returning `true` if it was added
///
/// Sibling keys under `deployment` are kept; an existing `strategy` is left
/// exactly as it is.
pub fn ensure_strategy_values(tree: &mut ValuesTree) -> bool {
    let deployment = tree.ensure_map("deployment");
    if deployment.contains_key("strategy") {
        return false;
    }
    deployment.insert("strategy".to_string(), DEFAULT_STRATEGY.to_node());
    true
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
