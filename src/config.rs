//! User configuration for lcdcanvas
//!
//! Defaults for the serial link and for new shapes, persisted as JSON in the
//! user's config directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use lcdcanvas_core::Rgb;
use lcdcanvas_core::shape::TEXT_SIZES;
use lcdcanvas_link::{BaudRate, LinkConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Link delays in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub settle_ms: u64,
    pub clear_settle_ms: u64,
    pub command_delay_ms: u64,
    pub retry_delay_ms: u64,
    pub item_delay_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        let link = LinkConfig::default();
        let ms = |d: Duration| d.as_millis() as u64;
        Self {
            settle_ms: ms(link.settle),
            clear_settle_ms: ms(link.clear_settle),
            command_delay_ms: ms(link.command_delay),
            retry_delay_ms: ms(link.retry_delay),
            item_delay_ms: ms(link.item_delay),
            read_timeout_ms: ms(link.read_timeout),
        }
    }
}

impl Timing {
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            settle: Duration::from_millis(self.settle_ms),
            clear_settle: Duration::from_millis(self.clear_settle_ms),
            command_delay: Duration::from_millis(self.command_delay_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            item_delay: Duration::from_millis(self.item_delay_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial port used when none is given on the command line
    pub port: Option<String>,
    pub baud: BaudRate,
    /// Drawing color for new shapes
    pub color: Rgb,
    /// Size of new text
    pub text_size: u8,
    pub timing: Timing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: None,
            baud: BaudRate::default(),
            color: Rgb::WHITE,
            text_size: 2,
            timing: Timing::default(),
        }
    }
}

impl Config {
    /// Load from the config directory, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from a file. A missing file gives the defaults; an unreadable or
    /// malformed one is reported and also gives the defaults. An unusable
    /// text size falls back to the default size alone.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let mut config: Self = match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from))
        {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                return Self::default();
            }
        };
        if !TEXT_SIZES.contains(&config.text_size) {
            let fallback = Self::default().text_size;
            warn!(
                path = %path.display(),
                text_size = config.text_size,
                fallback,
                "text size outside 1-5, using the default"
            );
            config.text_size = fallback;
        }
        config
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".config")
            });
        config_dir.join("lcdcanvas").join("config.json")
    }

    /// Save to a file, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;
        Ok(())
    }
}
