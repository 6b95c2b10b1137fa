//! Delivering rendered extraction results to the clipboard and/or a file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::model::ExtractionResult;
use crate::infra::clipboard::ClipboardSink;
use crate::infra::config::Config;

/// Runtime options controlling delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub output_path: Option<PathBuf>,
    pub copy_to_clipboard: bool,
}

impl ExportOptions {
    /// Build options from the `[output]` configuration section.
    ///
    /// Relative output paths are resolved against `root`.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self {
            output_path: config.output.path().map(|path| root.join(path)),
            copy_to_clipboard: config.output.copy_to_clipboard(),
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_path: None,
            copy_to_clipboard: true,
        }
    }
}

/// What an export produced and where it went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub rendered: String,
    pub file_count: usize,
    pub output_path: Option<PathBuf>,
    pub copied_to_clipboard: bool,
    pub cancelled: bool,
}

impl ExportReport {
    pub fn bytes(&self) -> usize {
        self.rendered.len()
    }

    /// One-line summary for status bars and stderr.
    pub fn describe(&self) -> String {
        let mut message = if self.copied_to_clipboard {
            format!("Copied {} files", self.file_count)
        } else {
            format!("Extracted {} files", self.file_count)
        };
        if let Some(path) = &self.output_path {
            message.push_str(&format!(" to {}", path.display()));
        }
        if self.cancelled {
            message.push_str(" (cancelled, partial result)");
        }
        message
    }
}

/// Renders extraction results and hands them to their destinations.
pub struct Exporter<C> {
    clipboard: C,
}

impl<C: ClipboardSink> Exporter<C> {
    pub fn new(clipboard: C) -> Self {
        Self { clipboard }
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Render `result` and write/copy it according to `options`.
    pub fn export(
        &mut self,
        result: &ExtractionResult,
        options: &ExportOptions,
    ) -> Result<ExportReport> {
        let rendered = result.render();

        if let Some(path) = &options.output_path {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory: {}", parent.display())
                })?;
            }
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write output to {}", path.display()))?;
            tracing::debug!(path = %path.display(), bytes = rendered.len(), "wrote output file");
        }

        if options.copy_to_clipboard {
            self.clipboard
                .copy(&rendered)
                .context("failed to copy result to clipboard")?;
        }

        Ok(ExportReport {
            rendered,
            file_count: result.file_count,
            output_path: options.output_path.clone(),
            copied_to_clipboard: options.copy_to_clipboard,
            cancelled: result.cancelled,
        })
    }
}
