//! Configuration for the tiling core.
//!
//! The engine only consumes plain numeric parameters; validation and
//! migration of user-facing config files belong to the host application.
//! Every field has a default so a missing or partial file still produces a
//! working setup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Gap between the monitor's visible frame and the outermost containers.
    pub margin: f64,

    /// Gap between adjacent containers.
    pub padding: f64,

    /// Horizontal (or vertical, for transposed containers) peek distance
    /// between stacked accordion windows.
    pub accordion_offset: f64,

    /// Duration of animated retiles. Zero positions instantly.
    pub animation_duration_ms: u64,

    /// Quiet period before a burst of window events triggers one retile.
    pub debounce_delay_ms: u64,

    /// Window after a retile during which focus changes only re-raise the
    /// container that actually changed.
    pub z_order_guard_ms: u64,

    /// Whether the very first tile after start animates.
    pub animate_first_tile: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            margin: 8.0,
            padding: 8.0,
            accordion_offset: 50.0,
            animation_duration_ms: 200,
            debounce_delay_ms: 80,
            z_order_guard_ms: 250,
            animate_first_tile: false,
        }
    }
}

impl Settings {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn debounce_delay(&self) -> Duration { Duration::from_millis(self.debounce_delay_ms) }

    pub fn z_order_guard(&self) -> Duration { Duration::from_millis(self.z_order_guard_ms) }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, Error> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| Error::ConfigRead { path: path.to_owned(), source })?;
        Config::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Config, Error> {
        toml::from_str(contents).map_err(|err| Error::ConfigParse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.settings.accordion_offset, 50.0);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let config = Config::parse(
            r#"
            [settings]
            accordion_offset = 32.0
            debounce_delay_ms = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.accordion_offset, 32.0);
        assert_eq!(config.settings.debounce_delay_ms, 120);
        assert_eq!(config.settings.margin, Settings::default().margin);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Config::parse(
            r#"
            [settings]
            acordion_offset = 32.0
            "#,
        );
        assert!(result.is_err());
    }
}
