//! Reusable TUI components.

pub mod file_tree;
pub mod summary;
