//! Domain models for tree selections, extraction instructions, and results.

use std::path::{Path, PathBuf};

/// Tri-state checkbox value carried by every tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    #[default]
    Unchecked,
    Checked,
    PartiallyChecked,
}

impl CheckState {
    /// Checkbox glyph used by the terminal UI.
    pub fn glyph(&self) -> &'static str {
        match self {
            CheckState::Unchecked => "[ ]",
            CheckState::Checked => "[x]",
            CheckState::PartiallyChecked => "[~]",
        }
    }

    /// State of a directory derived from the states of its loaded children.
    ///
    /// Returns `None` for an empty child set: an empty loaded directory keeps
    /// whatever state it was given.
    pub fn derive<I>(children: I) -> Option<CheckState>
    where
        I: IntoIterator<Item = CheckState>,
    {
        let mut total = 0usize;
        let mut checked = 0usize;
        let mut partial = 0usize;
        for state in children {
            total += 1;
            match state {
                CheckState::Checked => checked += 1,
                CheckState::PartiallyChecked => partial += 1,
                CheckState::Unchecked => {}
            }
        }

        if total == 0 {
            None
        } else if checked == total {
            Some(CheckState::Checked)
        } else if checked > 0 || partial > 0 {
            Some(CheckState::PartiallyChecked)
        } else {
            Some(CheckState::Unchecked)
        }
    }
}

/// Handle into a [`crate::app::tree::SelectionTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// How an instruction path should be expanded during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    SingleFile,
    WholeSubtree,
}

/// Collapsed selection produced by the collector and consumed once by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionInstruction {
    pub path: PathBuf,
    pub kind: InstructionKind,
}

impl SelectionInstruction {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: InstructionKind::SingleFile,
        }
    }

    pub fn subtree(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: InstructionKind::WholeSubtree,
        }
    }
}

/// One extracted file: its root-relative path and decoded contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub relative_path: PathBuf,
    pub content: String,
}

impl Section {
    /// Build a section, relativising `path` against `root` when possible.
    pub fn new(root: &Path, path: &Path, content: String) -> Self {
        let relative_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        Self {
            relative_path,
            content,
        }
    }

    /// Header line, fenced content, and trailing newline.
    pub fn render(&self) -> String {
        format!(
            "## File: {}\n```\n{}\n```\n",
            self.relative_path.display(),
            self.content
        )
    }
}

/// Ordered output of one extraction run. Immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub sections: Vec<Section>,
    pub file_count: usize,
    /// `true` when the run stopped early on request; `sections` holds the work done so far.
    pub cancelled: bool,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Join every rendered section with a blank line.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(Section::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
