//! Configuration management utilities.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::filter::{DEFAULT_IGNORED_DIRECTORIES, DEFAULT_IGNORED_EXTENSIONS};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static WORKSPACE_CONFIG_PATH: &str = ".ctxcopy/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ignore: Ignore,
    #[serde(default)]
    pub output: Output,
}

/// Directory names and extensions left out of the tree and of subtree expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ignore {
    #[serde(default)]
    pub directories: Vec<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl Default for Ignore {
    fn default() -> Self {
        Self {
            directories: DEFAULT_IGNORED_DIRECTORIES
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
            extensions: DEFAULT_IGNORED_EXTENSIONS
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect(),
        }
    }
}

/// Where the rendered text is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Output {
    #[serde(default)]
    copy_to_clipboard: Option<bool>,
    #[serde(default)]
    path: Option<PathBuf>,
}

impl Output {
    pub fn copy_to_clipboard(&self) -> bool {
        self.copy_to_clipboard.unwrap_or(true)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Environment overrides for delivery settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    output: Option<PathBuf>,
    clipboard: Option<bool>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            output: env::var_os("CTXCOPY_OUTPUT")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            clipboard: env::var("CTXCOPY_CLIPBOARD")
                .ok()
                .map(|value| parse_flag(&value)),
        }
    }

    #[cfg(test)]
    fn for_tests(output: &str, clipboard: bool) -> Self {
        Self {
            output: Some(PathBuf::from(output)),
            clipboard: Some(clipboard),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

impl Config {
    /// Load configuration for `root` from defaults, global config, workspace config, and env.
    pub fn load(root: &Path) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = Some(root.join(WORKSPACE_CONFIG_PATH));
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data).with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            ignore: merge_ignore(self.ignore, other.ignore),
            output: merge_output(self.output, other.output),
        }
    }
}

fn merge_ignore(base: Ignore, overlay: Ignore) -> Ignore {
    let mut directories: BTreeSet<String> = base.directories.into_iter().collect();
    directories.extend(overlay.directories);

    let mut extensions: BTreeSet<String> = base.extensions.into_iter().collect();
    extensions.extend(overlay.extensions);

    Ignore {
        directories: directories.into_iter().collect(),
        extensions: extensions.into_iter().collect(),
    }
}

fn merge_output(mut base: Output, overlay: Output) -> Output {
    if let Some(value) = overlay.copy_to_clipboard {
        base.copy_to_clipboard = Some(value);
    }
    if let Some(path) = overlay.path {
        base.path = Some(path);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("ctxcopy/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(path) = env.output {
        config.output.path = Some(path);
    }
    if let Some(clipboard) = env.clipboard {
        config.output.copy_to_clipboard = Some(clipboard);
    }
    config
}
