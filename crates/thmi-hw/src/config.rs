//! Display configuration.

use serde::{Deserialize, Serialize};

use crate::lcd::protocol::{COLOR_MODE_16BIT, COLOR_MODE_65K};
use crate::rotation::{Rotation, DEFAULT_MADCTLS};

/// Settings applied by [`Display::new`](crate::Display::new).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Initial rotation.
    #[serde(default)]
    pub rotation: Rotation,

    /// Custom MADCTL table, indexed by rotation. `None` uses the T-HMI table.
    #[serde(default)]
    pub madctl: Option<[u8; 4]>,

    /// Enable color inversion after init.
    #[serde(default)]
    pub inverted: bool,

    /// COLMOD value sent during init.
    #[serde(default = "default_color_mode")]
    pub color_mode: u8,
}

fn default_color_mode() -> u8 {
    COLOR_MODE_65K | COLOR_MODE_16BIT
}

impl DisplayConfig {
    /// Returns the MADCTL table in effect.
    pub fn madctls(&self) -> [u8; 4] {
        self.madctl.unwrap_or(DEFAULT_MADCTLS)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rotation: Rotation::default(),
            madctl: None,
            inverted: false,
            color_mode: default_color_mode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: DisplayConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DisplayConfig::default());
        assert_eq!(config.color_mode, 0x55);
        assert_eq!(config.madctls(), DEFAULT_MADCTLS);
    }

    #[test]
    fn test_custom_table() {
        let config: DisplayConfig =
            serde_json::from_str(r#"{"rotation":"landscape","madctl":[8,104,200,168]}"#).unwrap();
        assert_eq!(config.rotation, Rotation::Landscape);
        assert_eq!(config.madctls(), [0x08, 0x68, 0xC8, 0xA8]);
    }
}
