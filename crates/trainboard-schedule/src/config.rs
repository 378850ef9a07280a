#![forbid(unsafe_code)]

//! Builder configuration.
//!
//! Hosts usually pass this as JSON at startup:
//!
//! ```json
//! { "press": { "long_press": 500, "move_tolerance": 10.0 } }
//! ```
//!
//! Every field is optional; omitted fields take their defaults.

use serde::{Deserialize, Serialize};
use trainboard_core::PressConfig;

use crate::error::ConfigError;

/// Settings for a [`crate::builder::ScheduleBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Touch long-press thresholds.
    pub press: PressConfig,
}

impl BuilderConfig {
    #[must_use]
    pub fn with_press(mut self, press: PressConfig) -> Self {
        self.press = press;
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.press.validate()?;
        Ok(())
    }
}
