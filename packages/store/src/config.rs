//! # Client configuration: `cafelocate.toml`
//!
//! Defines the TOML document the web binary embeds at build time to locate the
//! backend and tune the map page.
//!
//! ## Structure
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000/api"
//!
//! [map]
//! center = [27.7172, 85.3240]
//! zoom = 13
//! default_radius_m = 500
//!
//! [ui]
//! notification_timeout_secs = 5
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`ClientConfig`] | Top-level config. TOML (de)serialisation and the canonical filename. |
//! | [`ApiConfig`] | Backend base address. |
//! | [`MapConfig`] | Initial view, pan bounds, and the analysis radius range. |
//! | [`UiConfig`] | Notification auto-dismiss timeout. |
//!
//! Every field has a default, so a missing or empty file is equivalent to the
//! default configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration stored in `cafelocate.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Backend location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix that every endpoint path is appended to, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Map page configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial `[lat, lng]` of the map view.
    #[serde(default = "default_center")]
    pub center: [f64; 2],
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// `[[south, west], [north, east]]` the map may be panned within.
    #[serde(default = "default_bounds")]
    pub bounds: [[f64; 2]; 2],
    #[serde(default = "default_radius")]
    pub default_radius_m: u32,
    #[serde(default = "default_min_radius")]
    pub min_radius_m: u32,
    #[serde(default = "default_max_radius")]
    pub max_radius_m: u32,
}

fn default_center() -> [f64; 2] {
    [27.7172, 85.3240]
}

fn default_zoom() -> u8 {
    13
}

fn default_bounds() -> [[f64; 2]; 2] {
    [[27.55, 85.10], [27.90, 85.55]]
}

fn default_radius() -> u32 {
    500
}

fn default_min_radius() -> u32 {
    100
}

fn default_max_radius() -> u32 {
    2000
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            bounds: default_bounds(),
            default_radius_m: default_radius(),
            min_radius_m: default_min_radius(),
            max_radius_m: default_max_radius(),
        }
    }
}

/// Notification configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Seconds before a notification dismisses itself.
    #[serde(default = "default_notification_timeout")]
    pub notification_timeout_secs: u64,
}

fn default_notification_timeout() -> u64 {
    5
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_timeout_secs: default_notification_timeout(),
        }
    }
}

impl UiConfig {
    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }
}

impl ClientConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "cafelocate.toml"
    }

    /// Parse from TOML string and check the radius range is usable.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let map = &self.map;
        if map.min_radius_m > map.max_radius_m {
            return Err(ConfigError::Invalid(format!(
                "map.min_radius_m ({}) exceeds map.max_radius_m ({})",
                map.min_radius_m, map.max_radius_m
            )));
        }
        if !(map.min_radius_m..=map.max_radius_m).contains(&map.default_radius_m) {
            return Err(ConfigError::Invalid(format!(
                "map.default_radius_m ({}) is outside {}..={}",
                map.default_radius_m, map.min_radius_m, map.max_radius_m
            )));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = ClientConfig::from_toml("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.map.default_radius_m, 500);
        assert_eq!(config.ui.notification_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = ClientConfig::from_toml(
            r#"
            [api]
            base_url = "https://cafelocate.example/api"

            [map]
            default_radius_m = 800
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://cafelocate.example/api");
        assert_eq!(config.map.default_radius_m, 800);
        assert_eq!(config.map.zoom, 13);
        assert_eq!(config.ui.notification_timeout_secs, 5);
    }

    #[test]
    fn test_default_radius_outside_range_is_rejected() {
        let err = ClientConfig::from_toml("[map]\ndefault_radius_m = 5000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ClientConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(ClientConfig::from_toml(&text).unwrap(), config);
    }
}
