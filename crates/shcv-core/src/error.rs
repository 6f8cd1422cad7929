//! Core error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShcvError {
    #[error("chart directory cannot be empty")]
    EmptyChartDir,

    #[error("invalid chart directory: {source}")]
    InvalidChartDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("templates directory not found: {}", path.display())]
    TemplatesDirNotFound { path: PathBuf },

    #[error("walking {}: {source}", path.display())]
    WalkTemplates {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("reading template {}: {source}", path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading values file {}: {source}", path.display())]
    ReadValues {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing values file {}: {source}", path.display())]
    ParseValues {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("parsing values file {}: document root is not a mapping", path.display())]
    ValuesNotMapping { path: PathBuf },

    #[error("encoding values for {}: {source}", path.display())]
    EncodeValues {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("writing values file {}: {source}", path.display())]
    WriteValues {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ShcvError>;
