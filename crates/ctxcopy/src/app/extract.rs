//! Expanding instructions into files and decoding them into ordered sections.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ignore::WalkBuilder;

use crate::app::decode::decode_file;
use crate::app::filter::PathFilter;
use crate::domain::errors::ExtractError;
use crate::domain::model::{ExtractionResult, InstructionKind, Section, SelectionInstruction};

/// Cooperative cancellation signal shared between the UI and a running extraction.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs the expand, dedupe, and decode pipeline for one set of instructions.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    filter: PathFilter,
    cancel: CancelFlag,
}

impl Extractor {
    pub fn new(filter: PathFilter) -> Self {
        Self {
            filter,
            cancel: CancelFlag::new(),
        }
    }

    /// Share an externally owned cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Turn instructions into a deduplicated list of files, first occurrence wins.
    ///
    /// Whole-subtree instructions are walked depth first in file-name order, pruning ignored
    /// directory names below the instruction path and skipping ignored extensions. The list
    /// stops growing once cancellation is requested.
    pub fn expand(
        &self,
        root: &Path,
        instructions: &[SelectionInstruction],
    ) -> Result<Vec<PathBuf>, ExtractError> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for instruction in instructions {
            if self.cancel.is_cancelled() {
                break;
            }
            match instruction.kind {
                InstructionKind::SingleFile => {
                    if seen.insert(instruction.path.clone()) {
                        files.push(instruction.path.clone());
                    }
                }
                InstructionKind::WholeSubtree => {
                    self.walk_subtree(root, &instruction.path, &mut seen, &mut files)?;
                }
            }
        }

        Ok(files)
    }

    fn walk_subtree(
        &self,
        root: &Path,
        dir: &Path,
        seen: &mut HashSet<PathBuf>,
        files: &mut Vec<PathBuf>,
    ) -> Result<(), ExtractError> {
        let prune = self.filter.clone();
        let mut builder = WalkBuilder::new(dir);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_path(|a, b| b.is_dir().cmp(&a.is_dir()).then_with(|| a.cmp(b)))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir && prune.is_ignored_directory_name(&entry.file_name().to_string_lossy()))
            });

        for result in builder.build() {
            if self.cancel.is_cancelled() {
                break;
            }
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    ensure_root(root)?;
                    tracing::debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let is_file = match entry.file_type() {
                Some(ft) if ft.is_file() => true,
                Some(ft) if ft.is_symlink() => entry.path().is_file(),
                _ => false,
            };
            if !is_file || self.filter.is_ignored_extension(entry.path()) {
                continue;
            }

            let path = entry.into_path();
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
        Ok(())
    }

    /// Expand `instructions`, decode every file, and collect the sections in order.
    ///
    /// `on_progress` receives the running count after each file that made it into the result.
    /// Unreadable and binary files are skipped. Cancellation ends the run early with
    /// whatever was gathered so far; only a vanished root is reported as an error.
    pub fn extract<F>(
        &self,
        root: &Path,
        instructions: &[SelectionInstruction],
        mut on_progress: F,
    ) -> Result<ExtractionResult, ExtractError>
    where
        F: FnMut(usize),
    {
        ensure_root(root)?;
        let files = self.expand(root, instructions)?;
        tracing::debug!(files = files.len(), "expanded selection");

        let mut result = ExtractionResult::default();
        for path in files {
            if self.cancel.is_cancelled() {
                break;
            }
            match decode_file(&path) {
                Some(content) => {
                    result.sections.push(Section::new(root, &path, content));
                    result.file_count += 1;
                    on_progress(result.file_count);
                }
                None => ensure_root(root)?,
            }
        }
        result.cancelled = self.cancel.is_cancelled();

        tracing::info!(
            files = result.file_count,
            cancelled = result.cancelled,
            "extraction finished"
        );
        Ok(result)
    }
}

fn ensure_root(root: &Path) -> Result<(), ExtractError> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(ExtractError::RootMissing(root.to_path_buf()))
    }
}
