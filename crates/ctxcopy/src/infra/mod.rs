//! Infrastructure adapters for config, clipboard, and logging.

pub mod clipboard;
pub mod config;
pub mod logging;
