use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Persistent defaults, read from `config.toml` in the base directory.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Number of rows visible in the destination selector
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// List every channel instead of only the ones you are a member of
    #[serde(default)]
    pub show_all: bool,
}

fn default_page_size() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            show_all: false,
        }
    }
}

impl Config {
    /// Load `config.toml` from `base_dir`, returning defaults if it doesn't exist
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }
}

/// Everything a run needs, resolved once from flags, environment and
/// `config.toml` and then handed around explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub token: Option<String>,
    pub force_refresh: bool,
    pub show_all: bool,
    pub page_size: usize,
}

/// Directory holding the token, the channel cache and `config.toml`.
///
/// `var` looks up environment variables; pass `|k| std::env::var(k).ok()`.
pub fn base_dir(var: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    let set = |key: &str| var(key).filter(|v| !v.trim().is_empty());
    if let Some(dir) = set("SLACKIT_HOME") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = set("SL_PLUGIN_MOUNT") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = set("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(dir).join("slackit"));
    }
    match set("HOME") {
        Some(home) => Ok(PathBuf::from(home).join(".slackit")),
        None => bail!("HOME not set; set SLACKIT_HOME to choose where slackit keeps its files"),
    }
}
