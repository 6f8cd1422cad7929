//! shcv Core - Keep Helm chart values in sync with their templates
//!
//! This crate scans chart templates for `{{ .Values.* }}` references and makes
//! sure every referenced path exists in the chart's values files:
//! - `scanner`: single-pass extraction of references and inline defaults
//! - `reconcile`: merging references into values trees without overwriting
//! - `deployment`: rolling-update strategy injection for Deployment manifests
//! - `chart`: discovery, processing and writing back of a whole chart
//!
//! # Example
//!
//! ```no_run
//! use shcv_core::{ChartOptions, sync};
//!
//! let options = ChartOptions::default()
//!     .with_values_files(["values-prod.yaml"])
//!     .with_default_rule("enabled", "false");
//!
//! let report = sync("./my-chart", options).unwrap();
//! for reference in &report.references {
//!     println!("{} ({}:{})", reference.path, reference.source_file, reference.line_number);
//! }
//! ```

pub mod chart;
pub mod deployment;
pub mod error;
pub mod files;
pub mod options;
pub mod reconcile;
pub mod reference;
pub mod scanner;
pub mod values;

pub use chart::{Chart, SyncReport, sync};
pub use deployment::{DEFAULT_STRATEGY, DeploymentStrategy, StrategyWarning};
pub use error::{Result, ShcvError};
pub use options::ChartOptions;
pub use reconcile::{DefaultRule, Reconciler, ResolvedValue};
pub use reference::ValueRef;
pub use scanner::scan;
pub use values::{Node, ValuesFile, ValuesTree};
