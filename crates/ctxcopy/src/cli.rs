//! Command-line entry point: interactive tree, headless selection, and completions.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};

use crate::app::export::{ExportOptions, Exporter};
use crate::app::filter::PathFilter;
use crate::app::selection::collect_instructions;
use crate::app::tree::SelectionTree;
use crate::app::worker::ExtractionHandle;
use crate::domain::model::CheckState;
use crate::infra::clipboard::SystemClipboard;
use crate::infra::config::Config;
use crate::infra::logging::{self, LogTarget};
use crate::ui::app::UiApp;

/// Pick files from a directory tree and copy them as one pasteable text blob
#[derive(Debug, Parser)]
#[command(name = "ctxcopy", author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to open (defaults to the current directory)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Select the whole root and extract without opening the UI
    #[arg(long, conflicts_with = "select")]
    pub all: bool,

    /// Select a path relative to ROOT ("." selects everything) and extract without opening the UI
    #[arg(short, long, value_name = "PATH")]
    pub select: Vec<PathBuf>,

    /// Also write the result to FILE
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the result to stdout after a headless run
    #[arg(long)]
    pub stdout: bool,

    /// Do not copy the result to the clipboard
    #[arg(long)]
    pub no_clipboard: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        if let Some(shell) = self.completions {
            let mut command = Cli::command();
            let bin_name = command.get_name().to_string();
            generate(shell, &mut command, bin_name, &mut io::stdout());
            return Ok(());
        }

        let headless = self.is_headless();
        logging::init(if headless {
            LogTarget::Stderr
        } else {
            LogTarget::for_tui()
        })?;

        let root = resolve_root(self.root.as_deref())?;
        let config = Config::load(&root)?;
        let filter = PathFilter::from_config(&config);
        let options = self.export_options(&config, &root);
        tracing::debug!(root = %root.display(), headless, "starting");

        if headless {
            self.run_headless(root, filter, options)
        } else {
            UiApp::new(root, filter, options, SystemClipboard::new())?.run()
        }
    }

    fn is_headless(&self) -> bool {
        self.all || !self.select.is_empty()
    }

    fn export_options(&self, config: &Config, root: &Path) -> ExportOptions {
        let mut options = ExportOptions::from_config(config, root);
        if let Some(output) = &self.output {
            options.output_path = Some(output.clone());
        }
        if self.no_clipboard {
            options.copy_to_clipboard = false;
        }
        options
    }

    fn run_headless(&self, root: PathBuf, filter: PathFilter, options: ExportOptions) -> Result<()> {
        let mut tree = SelectionTree::open(&root, filter.clone())?;
        self.apply_selection(&mut tree, &root)?;

        let instructions = collect_instructions(&tree);
        if instructions.is_empty() {
            tracing::warn!("selection is empty; nothing to extract");
        }

        let result = ExtractionHandle::spawn(root, instructions, filter)?
            .wait(|count| tracing::debug!(count, "processed"))?;

        let mut exporter = Exporter::new(SystemClipboard::new());
        let report = exporter.export(&result, &options)?;
        if self.stdout {
            print!("{}", report.rendered);
        }
        eprintln!("{}", report.describe());
        Ok(())
    }

    /// Check `--all` and every `--select` path. A path naming the root checks everything.
    fn apply_selection(&self, tree: &mut SelectionTree, root: &Path) -> Result<()> {
        if self.all {
            tree.set_top_level(CheckState::Checked)?;
        }
        for path in &self.select {
            let id = tree.reveal(&root.join(path)).with_context(|| {
                format!(
                    "{} does not exist under {} or is ignored",
                    path.display(),
                    root.display()
                )
            })?;
            if id == tree.root_id() {
                tree.set_top_level(CheckState::Checked)?;
            } else {
                tree.set_check_state(id, CheckState::Checked)?;
            }
        }
        Ok(())
    }
}

fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => env::current_dir().context("unable to determine working directory")?,
    };
    fs::canonicalize(&root).with_context(|| format!("cannot open {}", root.display()))
}
