//! Fixed ignore lists deciding which entries are materialised or expanded.

use std::collections::BTreeSet;
use std::path::Path;

use crate::infra::config::Config;

/// Version control, dependency, build, and cache directories.
pub const DEFAULT_IGNORED_DIRECTORIES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vscode",
    "__pycache__",
    "node_modules",
    "venv",
    "env",
    "build",
    "dist",
    "bin",
    "obj",
    "target",
    ".mypy_cache",
    ".pytest_cache",
];

/// Binary and media extensions, without the leading dot.
pub const DEFAULT_IGNORED_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "class", "jar", "pyc", "pyo", "png", "jpg", "jpeg", "gif", "bmp",
    "ico", "pdf", "zip", "tar", "gz", "7z", "rar", "svg", "woff", "woff2", "ttf", "eot", "mp4",
    "mp3", "wav",
];

/// Pure membership checks over directory names and file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    directories: BTreeSet<String>,
    extensions: BTreeSet<String>,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_IGNORED_DIRECTORIES.iter().copied(),
            DEFAULT_IGNORED_EXTENSIONS.iter().copied(),
        )
    }
}

impl PathFilter {
    /// Build a filter from explicit sets. Extensions may carry a leading dot and any casing.
    pub fn new<D, E>(directories: D, extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            directories: directories.into_iter().map(Into::into).collect(),
            extensions: extensions
                .into_iter()
                .filter_map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    /// Filter described by the `[ignore]` section of the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ignore.directories.iter().cloned(),
            config.ignore.extensions.iter(),
        )
    }

    /// Exact, case-sensitive match against the ignored directory names.
    pub fn is_ignored_directory_name(&self, name: &str) -> bool {
        self.directories.contains(name)
    }

    /// Lowercased extension of `path` matched against the ignored extensions.
    pub fn is_ignored_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_names_match_exactly() {
        let filter = PathFilter::default();
        assert!(filter.is_ignored_directory_name(".git"));
        assert!(filter.is_ignored_directory_name("node_modules"));
        assert!(!filter.is_ignored_directory_name("Target"));
        assert!(!filter.is_ignored_directory_name("src"));
    }

    #[test]
    fn extensions_are_case_insensitive() {
        let filter = PathFilter::default();
        assert!(filter.is_ignored_extension(Path::new("logo.PNG")));
        assert!(filter.is_ignored_extension(Path::new("dir/archive.tar.gz")));
        assert!(!filter.is_ignored_extension(Path::new("main.rs")));
        assert!(!filter.is_ignored_extension(Path::new("Makefile")));
        assert!(!filter.is_ignored_extension(Path::new(".png")));
    }

    #[test]
    fn custom_extensions_accept_leading_dot() {
        let filter = PathFilter::new(["generated"], [".LOCK", "bin", ""]);
        assert!(filter.is_ignored_extension(Path::new("Cargo.lock")));
        assert!(filter.is_ignored_extension(Path::new("blob.bin")));
        assert!(filter.is_ignored_directory_name("generated"));
        assert_eq!(filter.extensions().count(), 2);
    }
}
