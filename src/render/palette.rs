// src/render/palette.rs
//! Named color ramps for the relief surface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Linear RGB triple, each channel in `[0, 1]`.
pub type Rgb = [f32; 3];

/// The seven selectable palettes, in their persisted index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Rainbow,
    Ocean,
    Green,
    Gray,
    Hot,
    Cool,
    Plasma,
}

impl Palette {
    pub const ALL: [Palette; 7] = [
        Palette::Rainbow,
        Palette::Ocean,
        Palette::Green,
        Palette::Gray,
        Palette::Hot,
        Palette::Cool,
        Palette::Plasma,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Palette::Rainbow => "rainbow",
            Palette::Ocean => "ocean",
            Palette::Green => "green",
            Palette::Gray => "gray",
            Palette::Hot => "hot",
            Palette::Cool => "cool",
            Palette::Plasma => "plasma",
        }
    }

    /// Next palette in index order, wrapping after Plasma.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Base color for a normalized intensity (clamped to `[0, 1]`).
    pub fn rgb(self, intensity: f32) -> Rgb {
        let p = intensity.clamp(0.0, 1.0);
        match self {
            Palette::Rainbow => rainbow(p),
            Palette::Ocean => [p * 0.3, 0.5 + p * 0.5, 0.7 + p * 0.3],
            Palette::Green => [p * 0.2, 0.3 + p * 0.7, p * 0.1],
            Palette::Gray => [p, p, p],
            Palette::Hot => hot(p),
            Palette::Cool => [p, 1.0 - p * 0.5, 1.0 - p * 0.5],
            Palette::Plasma => plasma(p),
        }
    }

    /// Color at the far (oldest) end of the surface.
    pub fn terminal(self) -> Rgb {
        self.rgb(1.0)
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Palette {
    type Err = Error;

    /// Accepts either the lowercase name or the numeric index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<i64>() {
            return usize::try_from(index)
                .ok()
                .and_then(Palette::from_index)
                .ok_or(Error::InvalidPalette(index));
        }
        Palette::ALL
            .into_iter()
            .find(|palette| palette.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidSetting {
                key: "palette".to_string(),
                value: s.to_string(),
            })
    }
}

/// Blue → cyan → green → yellow → orange.
fn rainbow(p: f32) -> Rgb {
    if p < 0.25 {
        let t = p / 0.25;
        [0.0, t, 1.0]
    } else if p < 0.5 {
        let t = (p - 0.25) / 0.25;
        [0.0, 1.0, 1.0 - t]
    } else if p < 0.75 {
        let t = (p - 0.5) / 0.25;
        [t, 1.0, 0.0]
    } else {
        let t = (p - 0.75) / 0.25;
        [1.0, 1.0 - t * 0.5, 0.0]
    }
}

/// Black → red → yellow → white.
fn hot(p: f32) -> Rgb {
    if p < 0.33 {
        [p / 0.33, 0.0, 0.0]
    } else if p < 0.66 {
        [1.0, (p - 0.33) / 0.33, 0.0]
    } else {
        [1.0, 1.0, (p - 0.66) / 0.34]
    }
}

/// White → blue → lilac → red. Also used directly over time-depth.
pub fn plasma(p: f32) -> Rgb {
    let p = p.clamp(0.0, 1.0);
    if p < 0.33 {
        let t = p / 0.33;
        [1.0 - t * 0.8, 1.0 - t * 0.6, 1.0]
    } else if p < 0.66 {
        let t = (p - 0.33) / 0.33;
        [0.2 + t * 0.5, 0.4 + t * 0.1, 1.0]
    } else {
        let t = (p - 0.66) / 0.34;
        [0.7 + t * 0.3, 0.5 - t * 0.5, 1.0 - t]
    }
}
