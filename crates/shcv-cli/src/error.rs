//! CLI error types
//!
//! Every processing phase has its own variant so the message names the step
//! that failed.

use miette::Diagnostic;
use shcv_core::ShcvError;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("error creating chart: {source}")]
    #[diagnostic(code(shcv::chart), help("pass the path of a Helm chart directory"))]
    CreateChart {
        #[source]
        source: ShcvError,
    },

    #[error("error loading values: {source}")]
    #[diagnostic(code(shcv::values::load))]
    LoadValues {
        #[source]
        source: ShcvError,
    },

    #[error("error finding templates: {source}")]
    #[diagnostic(
        code(shcv::templates::find),
        help("a chart keeps its templates in a `templates/` subdirectory")
    )]
    FindTemplates {
        #[source]
        source: ShcvError,
    },

    #[error("error parsing templates: {source}")]
    #[diagnostic(code(shcv::templates::parse))]
    ParseTemplates {
        #[source]
        source: ShcvError,
    },

    #[error("error updating values: {source}")]
    #[diagnostic(code(shcv::values::update))]
    UpdateValues {
        #[source]
        source: ShcvError,
    },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::CreateChart { .. }
            | CliError::LoadValues { .. }
            | CliError::FindTemplates { .. }
            | CliError::ParseTemplates { .. }
            | CliError::UpdateValues { .. } => exit_codes::ERROR,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_phase_prefixes() {
        let err = CliError::CreateChart {
            source: ShcvError::EmptyChartDir,
        };
        assert_eq!(
            err.to_string(),
            "error creating chart: chart directory cannot be empty"
        );

        let err = CliError::FindTemplates {
            source: ShcvError::TemplatesDirNotFound {
                path: PathBuf::from("chart/templates"),
            },
        };
        assert_eq!(
            err.to_string(),
            "error finding templates: templates directory not found: chart/templates"
        );
    }

    #[test]
    fn test_exit_code() {
        let err = CliError::UpdateValues {
            source: ShcvError::EmptyChartDir,
        };
        assert_eq!(err.exit_code(), exit_codes::ERROR);
    }
}
