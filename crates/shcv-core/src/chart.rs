//! Chart processing
//!
//! A [`Chart`] ties the pieces together: it discovers the templates of a
//! chart directory, scans them for value references, injects deployment
//! strategies and reconciles every configured values file.

use std::path::{Path, PathBuf};

use crate::deployment::{StrategyWarning, ensure_strategy_values, inject_strategy, is_deployment};
use crate::error::{Result, ShcvError};
use crate::files::{find_template_files, write_atomic};
use crate::options::ChartOptions;
use crate::reconcile::Reconciler;
use crate::reference::ValueRef;
use crate::scanner::scan;
use crate::values::ValuesFile;

/// A Helm chart being synchronized
#[derive(Debug)]
pub struct Chart {
    dir: PathBuf,
    options: ChartOptions,
    values_files: Vec<ValuesFile>,
    templates: Vec<PathBuf>,
    references: Vec<ValueRef>,
}

/// Outcome of a full [`sync`] run
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Template files that were scanned
    pub templates: Vec<PathBuf>,
    /// References found, in scan order
    pub references: Vec<ValueRef>,
    /// Deployment templates that could not be processed
    pub warnings: Vec<StrategyWarning>,
    /// Values files written back to disk
    pub updated: Vec<PathBuf>,
}

impl Chart {
    /// Open a chart directory
    pub fn new(dir: impl AsRef<Path>, options: ChartOptions) -> Result<Self> {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(ShcvError::EmptyChartDir);
        }

        std::fs::metadata(dir).map_err(|source| ShcvError::InvalidChartDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let values_files = options
            .values_files
            .iter()
            .map(|name| ValuesFile::new(dir.join(name)))
            .collect();

        Ok(Self {
            dir: dir.to_path_buf(),
            options,
            values_files,
            templates: Vec::new(),
            references: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn values_files(&self) -> &[ValuesFile] {
        &self.values_files
    }

    pub fn templates(&self) -> &[PathBuf] {
        &self.templates
    }

    pub fn references(&self) -> &[ValueRef] {
        &self.references
    }

    /// Templates directory of this chart
    pub fn templates_dir(&self) -> PathBuf {
        self.dir.join(&self.options.templates_dir)
    }

    /// Load every configured values file
    pub fn load_values_files(&mut self) -> Result<()> {
        for file in &mut self.values_files {
            file.load()?;
        }
        Ok(())
    }

    /// Discover the template files of the chart
    pub fn find_templates(&mut self) -> Result<()> {
        self.templates = find_template_files(&self.templates_dir())?;
        tracing::info!(count = self.templates.len(), "found template files");
        Ok(())
    }

    /// Scan every discovered template for value references
    pub fn parse_templates(&mut self) -> Result<()> {
        for template in &self.templates {
            tracing::debug!(path = %template.display(), "parsing template");
            let content =
                std::fs::read_to_string(template).map_err(|source| ShcvError::ReadTemplate {
                    path: template.clone(),
                    source,
                })?;
            let source = template.display().to_string();
            self.references.extend(scan(&content, &source));
        }

        tracing::info!(count = self.references.len(), "found value references");
        Ok(())
    }

    /// Inject deployment strategies, then reconcile references into every values file
    pub fn process_references(&mut self) -> Vec<StrategyWarning> {
        let warnings = self.inject_deployment_strategies();
        let reconciler = Reconciler::new(self.options.default_rules.clone());
        let added = reconciler.reconcile(&self.references, &mut self.values_files);
        tracing::debug!(added, "reconciled values");
        warnings
    }

    /// Add a rolling-update strategy to deployment templates lacking one
    ///
    /// Each rewritten template is saved right away and every values file gets
    /// the matching defaults. Templates that cannot be read or written are
    /// reported and skipped.
    pub fn inject_deployment_strategies(&mut self) -> Vec<StrategyWarning> {
        let mut warnings = Vec::new();

        for template in &self.templates {
            let content = match std::fs::read_to_string(template) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %template.display(), error = %e, "skipping deployment template");
                    warnings.push(StrategyWarning {
                        file: template.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if !is_deployment(&content) {
                continue;
            }
            let Some(updated) = inject_strategy(&content) else {
                continue;
            };

            if let Err(e) = write_atomic(template, updated.as_bytes()) {
                tracing::warn!(path = %template.display(), error = %e, "skipping deployment template");
                warnings.push(StrategyWarning {
                    file: template.clone(),
                    message: e.to_string(),
                });
                continue;
            }
            tracing::info!(path = %template.display(), "added deployment strategy");

            for file in &mut self.values_files {
                if ensure_strategy_values(&mut file.tree) {
                    file.changed = true;
                }
            }
        }

        warnings
    }

    /// Write back every values file that changed, returning their paths
    pub fn update_values_files(&mut self) -> Result<Vec<PathBuf>> {
        let mut updated = Vec::new();
        for file in self.values_files.iter_mut().filter(|f| f.changed) {
            file.save()?;
            updated.push(file.path.clone());
        }
        Ok(updated)
    }
}

/// Run every step on a chart directory
pub fn sync(dir: impl AsRef<Path>, options: ChartOptions) -> Result<SyncReport> {
    let mut chart = Chart::new(dir, options)?;
    chart.load_values_files()?;
    chart.find_templates()?;
    chart.parse_templates()?;
    let warnings = chart.process_references();
    let updated = chart.update_values_files()?;

    Ok(SyncReport {
        templates: chart.templates,
        references: chart.references,
        warnings,
        updated,
    })
}
