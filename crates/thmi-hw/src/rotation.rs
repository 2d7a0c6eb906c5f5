//! Display rotation support.
//!
//! Rotation is done in hardware: each rotation selects a MADCTL value that
//! tells the controller how to map column/row addresses onto frame memory.
//! The default table suits the T-HMI wiring; panels mounted differently can
//! supply their own four-entry table.

use crate::{Error, Result, PANEL_HEIGHT, PANEL_WIDTH};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// MADCTL values for portrait, landscape, inverted portrait and inverted
/// landscape.
pub const DEFAULT_MADCTLS: [u8; 4] = [0x00, 0x60, 0xC0, 0xA0];

/// Display rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rotation {
    /// Portrait (240x320), native.
    #[default]
    Portrait,
    /// Landscape (320x240), rotated 90°.
    Landscape,
    /// Portrait upside-down (240x320).
    InvertedPortrait,
    /// Landscape upside-down (320x240).
    InvertedLandscape,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Portrait,
        Rotation::Landscape,
        Rotation::InvertedPortrait,
        Rotation::InvertedLandscape,
    ];

    /// Returns the rotation for an index, wrapping modulo 4.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Returns the index of this rotation in a MADCTL table.
    pub fn index(&self) -> usize {
        match self {
            Rotation::Portrait => 0,
            Rotation::Landscape => 1,
            Rotation::InvertedPortrait => 2,
            Rotation::InvertedLandscape => 3,
        }
    }

    /// Returns true if this is a landscape rotation.
    pub fn is_landscape(&self) -> bool {
        matches!(self, Rotation::Landscape | Rotation::InvertedLandscape)
    }

    /// Returns the (width, height) of the display in this rotation.
    pub fn dimensions(&self) -> (u16, u16) {
        if self.is_landscape() {
            (PANEL_HEIGHT, PANEL_WIDTH)
        } else {
            (PANEL_WIDTH, PANEL_HEIGHT)
        }
    }

    /// Returns the MADCTL value for this rotation from `table`.
    pub fn madctl(&self, table: &[u8; 4]) -> u8 {
        table[self.index()]
    }
}

impl FromStr for Rotation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "0" | "portrait" => Ok(Rotation::Portrait),
            "1" | "landscape" => Ok(Rotation::Landscape),
            "2" | "inverted-portrait" | "inverted_portrait" => Ok(Rotation::InvertedPortrait),
            "3" | "inverted-landscape" | "inverted_landscape" => Ok(Rotation::InvertedLandscape),
            _ => Err(Error::InvalidRotation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rotation::Portrait => write!(f, "portrait"),
            Rotation::Landscape => write!(f, "landscape"),
            Rotation::InvertedPortrait => write!(f, "inverted-portrait"),
            Rotation::InvertedLandscape => write!(f, "inverted-landscape"),
        }
    }
}
