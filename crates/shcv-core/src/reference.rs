//! Value references found in chart templates

/// A `{{ .Values.<path> }}` occurrence in a template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueRef {
    /// Dot-separated path into the values tree (e.g. `gateway.domain`)
    pub path: String,
    /// Literal from a `| default <literal>` segment, empty when absent
    pub default_value: String,
    /// Template the reference was found in
    pub source_file: String,
    /// 1-based line of the opening delimiter
    pub line_number: usize,
}

impl ValueRef {
    pub fn new(
        path: impl Into<String>,
        default_value: impl Into<String>,
        source_file: impl Into<String>,
        line_number: usize,
    ) -> Self {
        Self {
            path: path.into(),
            default_value: default_value.into(),
            source_file: source_file.into(),
            line_number,
        }
    }

    /// Identity string in the form `path:line:source`
    pub fn id(&self) -> String {
        format!("{}:{}:{}", self.path, self.line_number, self.source_file)
    }

    /// Whether the template supplied a default for this reference
    pub fn has_default(&self) -> bool {
        !self.default_value.is_empty()
    }
}
