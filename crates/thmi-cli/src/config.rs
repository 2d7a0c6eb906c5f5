//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thmi_hw::bus::{DATA_PINS, PULSE};
use thmi_hw::DisplayConfig;
use tracing::info;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Panel settings applied at init
    #[serde(default)]
    pub display: DisplayConfig,

    /// Parallel bus wiring
    #[serde(default)]
    pub bus: BusConfig,

    /// Screenshot output
    #[serde(default)]
    pub output: OutputConfig,
}

/// Parallel bus wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// WR pulse width in strobe ticks
    #[serde(default = "default_pulse")]
    pub pulse: u16,

    /// GPIO numbers of D0..D7, all in the 32..=53 bank
    #[serde(default = "default_data_pins")]
    pub data_pins: [u8; 8],

    #[serde(default = "default_wr")]
    pub wr: u8,

    #[serde(default = "default_dc")]
    pub dc: u8,

    #[serde(default = "default_cs")]
    pub cs: u8,

    #[serde(default = "default_backlight")]
    pub backlight: u8,

    #[serde(default = "default_power")]
    pub power: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            pulse: default_pulse(),
            data_pins: default_data_pins(),
            wr: default_wr(),
            dc: default_dc(),
            cs: default_cs(),
            backlight: default_backlight(),
            power: default_power(),
        }
    }
}

impl BusConfig {
    /// Checks the data pins can be driven through the OUT1 registers.
    pub fn validate(&self) -> Result<()> {
        for pin in self.data_pins {
            if !(32..=53).contains(&pin) {
                anyhow::bail!("Data pin GPIO{} is outside the OUT1 bank (32-53)", pin);
            }
        }
        Ok(())
    }
}

/// Screenshot output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory screenshots are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Integer upscale factor for saved screenshots
    #[serde(default = "default_scale")]
    pub scale: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            scale: default_scale(),
        }
    }
}

// Default value functions
fn default_pulse() -> u16 {
    PULSE
}

fn default_data_pins() -> [u8; 8] {
    DATA_PINS
}

fn default_wr() -> u8 {
    8
}

fn default_dc() -> u8 {
    7
}

fn default_cs() -> u8 {
    6
}

fn default_backlight() -> u8 {
    38
}

fn default_power() -> u8 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_scale() -> u32 {
    1
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        config.bus.validate()?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let config = Self::load(path)?;
            info!("Loaded configuration from: {}", path.display());
            Ok(config)
        } else {
            info!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thmi_hw::Rotation;

    #[test]
    fn test_defaults_match_board() {
        let config = Config::default();
        assert_eq!(config.bus.data_pins, [48, 47, 39, 40, 41, 42, 45, 46]);
        assert_eq!(config.bus.pulse, 16);
        assert_eq!(config.display.rotation, Rotation::Portrait);
        assert_eq!(config.output.scale, 1);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[display]\nrotation = \"landscape\"\ninverted = true\n\n[output]\nscale = 2\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.display.rotation, Rotation::Landscape);
        assert!(config.display.inverted);
        assert_eq!(config.display.color_mode, 0x55);
        assert_eq!(config.output.scale, 2);
        assert_eq!(config.output.dir, PathBuf::from("screenshots"));
        assert_eq!(config.bus.backlight, 38);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.bus.power, 10);
    }

    #[test]
    fn test_rejects_low_bank_data_pin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[bus]\ndata_pins = [1, 47, 39, 40, 41, 42, 45, 46]\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.display.madctl = Some([0x08, 0x68, 0xC8, 0xA8]);
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.display, config.display);
    }
}
