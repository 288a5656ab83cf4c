//! Display orientation and the slit-scan axis it implies.

use serde::{Deserialize, Serialize};

/// How the display is held relative to the camera sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn from_landscape_flag(is_landscape: bool) -> Self {
        if is_landscape {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn is_landscape(self) -> bool {
        matches!(self, Orientation::Landscape)
    }

    /// How many frames back pixel `(x, y)` samples from.
    ///
    /// Landscape scans down the rows, portrait scans across the columns.
    /// Either way the scan runs top-to-bottom on the rotated display.
    pub fn scan_offset(self, x: u32, y: u32) -> u32 {
        match self {
            Orientation::Landscape => y,
            Orientation::Portrait => x,
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            other => Err(format!(
                "unknown orientation '{other}' (expected landscape or portrait)"
            )),
        }
    }
}
