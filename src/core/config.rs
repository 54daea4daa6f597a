//! Configuration management for Dichokey.
//!
//! Handles loading configuration from TOML files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DICHOKEY_CONFIG";

/// Local config file name, looked up in the working directory.
pub const LOCAL_CONFIG: &str = ".dichokey.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where OCR text and built keys live
    pub paths: PathsConfig,

    /// Build behaviour
    pub build: BuildConfig,

    /// Terminal navigator settings
    pub ui: UiConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `<genus>_ocr.txt` files
    pub ocr_dir: String,

    /// Directory receiving `<genus>_key.json` files
    pub keys_dir: String,
}

/// Build settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Refuse to write a key when the build reports conflicts or dangling
    /// references
    pub strict: bool,
}

/// UI/TUI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Color theme name (default, forest, nord, mono)
    pub theme: String,

    /// Whether to prefix options with their step id
    pub show_ids: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { ocr_dir: "data/ocr".to_string(), keys_dir: "data/keys".to_string() }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { theme: "default".to_string(), show_ids: true }
    }
}

impl PathsConfig {
    /// OCR directory with `~` expanded.
    pub fn ocr_dir(&self) -> PathBuf {
        expand(&self.ocr_dir)
    }

    /// Keys directory with `~` expanded.
    pub fn keys_dir(&self) -> PathBuf {
        expand(&self.keys_dir)
    }

    /// OCR input file for a genus.
    pub fn ocr_file(&self, genus: &str) -> PathBuf {
        self.ocr_dir().join(format!("{}_ocr.txt", genus.to_lowercase()))
    }

    /// Key output file for a genus.
    pub fn key_file(&self, genus: &str) -> PathBuf {
        self.keys_dir().join(format!("{}_key.json", genus.to_lowercase()))
    }

    /// Resolve a key argument: an existing path, a `.json` path, or a genus
    /// name looked up in the keys directory.
    pub fn resolve_key(&self, arg: &str) -> PathBuf {
        let path = Path::new(arg);
        if path.exists() || path.extension().is_some_and(|e| e == "json") {
            path.to_path_buf()
        } else {
            self.key_file(arg)
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

impl Config {
    /// Load configuration.
    ///
    /// Looks for config in:
    /// 1. the explicit path, or `DICHOKEY_CONFIG`
    /// 2. `.dichokey.toml` in current directory
    /// 3. `~/.config/dichokey/config.toml`
    /// 4. Falls back to defaults
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Self::load_from_file(Path::new(&path));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(global_config) = Self::config_dir().map(|d| d.join("config.toml")) {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("dichokey"))
    }
}
