// src/render/resample.rs
//! Nearest-neighbor mapping from history bins to display columns.

/// Precomputed column → bin table for one `(width, bins)` pair.
///
/// Both rows of a strip are sampled through the same table, so adjacent
/// history rows always line up column for column.
#[derive(Debug, Clone, Default)]
pub struct Resampler {
    width: usize,
    bins: usize,
    indices: Vec<usize>,
}

impl Resampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the table if the geometry changed. Returns the table.
    ///
    /// Both `width` and `bins` must be at least 2.
    pub fn prepare(&mut self, width: usize, bins: usize) -> &[usize] {
        if self.width != width || self.bins != bins || self.indices.len() != width {
            self.width = width;
            self.bins = bins;
            self.indices.clear();
            self.indices.extend((0..width).map(|x| source_bin(x, width, bins)));
        }
        &self.indices
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Gather `row` through the current table into `out`.
    pub fn resample_into(&self, row: &[f32], out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.indices.iter().map(|&bin| row[bin]));
    }
}

/// Bin sampled by display column `x`: `floor(x / (W-1) * (B-1))`, capped at `B-2`.
pub fn source_bin(x: usize, width: usize, bins: usize) -> usize {
    debug_assert!(width >= 2 && bins >= 2);
    let bin = (x as f32 / (width - 1) as f32 * (bins - 1) as f32) as usize;
    bin.min(bins - 2)
}
