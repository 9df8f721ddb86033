//! Configuration loading and parsing.
//!
//! Reads `ri.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [input]
//! escape_timeout_ms = 100
//! [width]
//! strategy = "probe"   # or "table"
//! [display]
//! key_labels = true
//! ```
//!
//! Every section and field is optional. Unknown fields are ignored. A missing
//! file or one that fails to parse yields the defaults; the parse failure is
//! logged on the `config` target rather than returned, so a bad config never
//! keeps the program from starting. The raw file text is retained for
//! diagnostics.

use anyhow::Result;
use core_text::WidthStrategy;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{debug, info, warn};

pub const FILE_NAME: &str = "ri.toml";
pub const MIN_ESCAPE_TIMEOUT_MS: u64 = 1;
pub const MAX_ESCAPE_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_escape_timeout_ms")]
    pub escape_timeout_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            escape_timeout_ms: Self::default_escape_timeout_ms(),
        }
    }
}

impl InputConfig {
    const fn default_escape_timeout_ms() -> u64 {
        100
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WidthConfig {
    #[serde(default)]
    pub strategy: WidthStrategy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "DisplayConfig::default_key_labels")]
    pub key_labels: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            key_labels: Self::default_key_labels(),
        }
    }
}

impl DisplayConfig {
    const fn default_key_labels() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub width: WidthConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file text, when one was read
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Config path: `./ri.toml` when present, else the platform config dir
/// (XDG / AppData Roaming), else the bare relative name.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("ri").join(FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        debug!(target: "config", path = %path.display(), "config_absent_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                path: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e.message(),
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Per-byte read timeout separating a lone ESC from a sequence start,
    /// clamped into `1..=1000` ms.
    pub fn escape_timeout(&self) -> Duration {
        let raw = self.file.input.escape_timeout_ms;
        let clamped = raw.clamp(MIN_ESCAPE_TIMEOUT_MS, MAX_ESCAPE_TIMEOUT_MS);
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                min = MIN_ESCAPE_TIMEOUT_MS,
                max = MAX_ESCAPE_TIMEOUT_MS,
                "escape_timeout_clamped"
            );
        }
        Duration::from_millis(clamped)
    }

    pub fn width_strategy(&self) -> WidthStrategy {
        self.file.width.strategy
    }

    pub fn key_labels(&self) -> bool {
        self.file.display.key_labels
    }
}
