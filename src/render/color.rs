// src/render/color.rs
//! dB → vertex color and surface height.

use crate::history::FLOOR_DB;

use super::palette::{plasma, Palette, Rgb};

/// Normalized level below which a cell is drawn black and flat.
pub const NOISE_THRESHOLD: f32 = 0.35;

/// Multiplier applied to the emphasized signal to get the height.
pub const HEIGHT_GAIN: f32 = 1.8;

/// Automatic mode puts `low` this far below the row mean.
pub const AUTO_FLOOR_MARGIN_DB: f32 = 5.0;

/// Automatic mode window width.
pub const AUTO_SPAN_DB: f32 = 55.0;

/// dB window mapped onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub low_db: f32,
    pub high_db: f32,
}

impl Levels {
    pub fn new(low_db: f32, high_db: f32) -> Self {
        Self { low_db, high_db }
    }

    /// Window derived from a row: mean + calibration − 5 dB, spanning 55 dB.
    pub fn automatic(row: &[f32], calibration_db: f32) -> Self {
        let mean = if row.is_empty() {
            FLOOR_DB
        } else {
            row.iter().sum::<f32>() / row.len() as f32
        };
        let low_db = mean + calibration_db - AUTO_FLOOR_MARGIN_DB;
        Self {
            low_db,
            high_db: low_db + AUTO_SPAN_DB,
        }
    }

    /// Position of `db` inside the window, clamped to `[0, 1]`.
    pub fn normalize(&self, db: f32) -> f32 {
        let span = self.high_db - self.low_db;
        if span.abs() <= f32::EPSILON || !span.is_finite() {
            // Degenerate window acts as a hard step at `high`.
            return if db >= self.high_db { 1.0 } else { 0.0 };
        }
        let p = (db - self.low_db) / span;
        if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
    }
}

impl Default for Levels {
    fn default() -> Self {
        Self::new(-120.0, -60.0)
    }
}

/// Front-end filter board, which decides the per-step attenuation weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterBoard {
    #[default]
    None,
    Alex,
    Charly25,
}

/// Gain-calibration terms reported by the host with each tick.
///
/// [`Calibration::offset_db`] is added to every stored sample and to the
/// automatic window, so an automatic window follows the data unchanged while
/// a manual one is compared against calibrated levels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Calibration {
    /// Receiver calibration minus the band's gain setting
    pub gain_calibration: i32,
    /// ADC attenuation in dB
    pub attenuation: f32,
    /// ADC gain in dB
    pub adc_gain: f32,
    /// Filter-board attenuator steps
    pub alex_attenuation: i32,
    /// Preamp steps
    pub preamp: i32,
    pub dither: i32,
    pub filter_board: FilterBoard,
}

impl Calibration {
    /// Total correction in dB.
    pub fn offset_db(&self) -> f32 {
        let mut offset = self.gain_calibration as f32 + self.attenuation - self.adc_gain;
        match self.filter_board {
            FilterBoard::None => {}
            FilterBoard::Alex => {
                offset += (10 * self.alex_attenuation - 20 * self.preamp) as f32;
            }
            FilterBoard::Charly25 => {
                offset +=
                    (12 * self.alex_attenuation - 18 * self.preamp - 18 * self.dither) as f32;
            }
        }
        offset
    }
}

/// Output of the mapper for one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shade {
    /// RGBA, alpha always 1
    pub color: [f32; 4],
    /// Normalized height in `[0, 1]`
    pub height: f32,
}

impl Shade {
    const FLOOR: Shade = Shade {
        color: [0.0, 0.0, 0.0, 1.0],
        height: 0.0,
    };
}

/// Maps a dB sample and its time-depth to a color and height.
///
/// Below [`NOISE_THRESHOLD`] everything is black and flat. Above it the
/// remaining range is rescaled to `[0, 1]` and squared; that value drives
/// both the brightness and (times [`HEIGHT_GAIN`]) the height.
#[derive(Debug, Clone, Copy)]
pub struct ColorHeightMapper {
    palette: Palette,
    levels: Levels,
    terminal: Rgb,
}

impl ColorHeightMapper {
    pub fn new(palette: Palette, levels: Levels) -> Self {
        Self {
            palette,
            levels,
            terminal: palette.terminal(),
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn levels(&self) -> Levels {
        self.levels
    }

    /// Unshaded color at time-depth `dist01` (0 = newest row).
    pub fn base_color(&self, dist01: f32) -> Rgb {
        let d = dist01.clamp(0.0, 1.0);
        match self.palette {
            Palette::Plasma => plasma(d),
            _ => {
                let [tr, tg, tb] = self.terminal;
                [
                    1.0 + d * (tr - 1.0),
                    1.0 + d * (tg - 1.0),
                    1.0 + d * (tb - 1.0),
                ]
            }
        }
    }

    pub fn map(&self, sample_db: f32, dist01: f32) -> Shade {
        let p = self.levels.normalize(sample_db);
        if p < NOISE_THRESHOLD {
            return Shade::FLOOR;
        }

        let signal = (p - NOISE_THRESHOLD) / (1.0 - NOISE_THRESHOLD);
        let emphasized = signal * signal;
        let height = (emphasized * HEIGHT_GAIN).clamp(0.0, 1.0);

        let [r, g, b] = self.base_color(dist01);
        Shade {
            color: [r * emphasized, g * emphasized, b * emphasized, 1.0],
            height,
        }
    }
}
