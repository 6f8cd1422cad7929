//! Chart processing options

use crate::reconcile::DefaultRule;

/// Values file used when none is configured
pub const DEFAULT_VALUES_FILE: &str = "values.yaml";

/// Templates subdirectory of a chart
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Options for processing a chart
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Values file names, relative to the chart root
    pub values_files: Vec<String>,
    /// Templates directory, relative to the chart root
    pub templates_dir: String,
    /// Fallback defaults for references without an inline default, in order
    pub default_rules: Vec<DefaultRule>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            values_files: vec![DEFAULT_VALUES_FILE.to_string()],
            templates_dir: DEFAULT_TEMPLATES_DIR.to_string(),
            default_rules: Vec::new(),
        }
    }
}

impl ChartOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add values files after the ones already configured
    pub fn with_values_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values_files.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_templates_dir(mut self, dir: impl Into<String>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Append a fallback rule; earlier rules take precedence
    pub fn with_default_rule(mut self, suffix: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_rules.push(DefaultRule::new(suffix, value));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ChartOptions::default();
        assert_eq!(options.values_files, vec!["values.yaml"]);
        assert_eq!(options.templates_dir, "templates");
        assert!(options.default_rules.is_empty());
    }

    #[test]
    fn test_with_values_files_appends() {
        let options = ChartOptions::new().with_values_files(["values-prod.yaml", "values-dev.yaml"]);
        assert_eq!(
            options.values_files,
            vec!["values.yaml", "values-prod.yaml", "values-dev.yaml"]
        );
    }

    #[test]
    fn test_builders() {
        let options = ChartOptions::new()
            .with_templates_dir("manifests")
            .with_default_rule("enabled", "false")
            .with_default_rule("replicaCount", "1");

        assert_eq!(options.templates_dir, "manifests");
        assert_eq!(
            options.default_rules,
            vec![
                DefaultRule::new("enabled", "false"),
                DefaultRule::new("replicaCount", "1"),
            ]
        );
    }
}
