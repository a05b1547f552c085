// src/source/fft.rs
//! FFT stage turning IQ blocks into dB rows for the relief.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::history::FLOOR_DB;

/// Complex FFT with a Hann window and centered (fft-shifted) output.
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    /// Amplitude correction so a full-scale tone reads 0 dBFS
    scale: f32,
    buffer: Vec<Complex<f32>>,
    bins_db: Vec<f32>,
}

impl FftProcessor {
    /// `fft_size` is rounded up to a power of two.
    pub fn new(fft_size: usize) -> Self {
        let fft_size = fft_size.next_power_of_two().max(16);
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        // Hann window to reduce spectral leakage
        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / fft_size as f32).cos())
            })
            .collect();
        let scale = 1.0 / window.iter().sum::<f32>();

        Self {
            fft,
            fft_size,
            window,
            scale,
            buffer: Vec::with_capacity(fft_size),
            bins_db: Vec::with_capacity(fft_size),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Spectrum of the newest `fft_size` samples, lowest frequency first,
    /// averaged down (or sampled up) to `pixels` dB values in `out`.
    ///
    /// Short input is zero padded; silence reads as the floor.
    pub fn compute(&mut self, samples: &[Complex<f32>], pixels: usize, out: &mut Vec<f32>) {
        let n = self.fft_size;
        let start = samples.len().saturating_sub(n);

        self.buffer.clear();
        self.buffer.extend(
            samples[start..]
                .iter()
                .zip(&self.window)
                .map(|(&s, &w)| s * w),
        );
        self.buffer.resize(n, Complex::new(0.0, 0.0));
        self.fft.process(&mut self.buffer);

        // fft-shift: negative frequencies first
        self.bins_db.clear();
        let half = n / 2;
        self.bins_db.extend((0..n).map(|k| {
            let bin = self.buffer[(k + half) % n];
            let mag = bin.norm() * self.scale;
            (20.0 * mag.max(1e-10).log10()).max(FLOOR_DB)
        }));

        group_into_pixels(&self.bins_db, pixels, out);
    }
}

/// Average `bins` into `pixels` equal groups; when there are more pixels
/// than bins each pixel takes the nearest bin below it.
fn group_into_pixels(bins: &[f32], pixels: usize, out: &mut Vec<f32>) {
    out.clear();
    let n = bins.len();
    if n == 0 {
        out.resize(pixels, FLOOR_DB);
        return;
    }
    out.extend((0..pixels).map(|p| {
        let start = p * n / pixels;
        let end = ((p + 1) * n / pixels).clamp(start + 1, n);
        let group = &bins[start..end];
        group.iter().sum::<f32>() / group.len() as f32
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(bin: f32, n: usize) -> Vec<Complex<f32>> {
        (0..n)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * bin * i as f32 / n as f32;
                Complex::new(phase.cos(), phase.sin())
            })
            .collect()
    }

    fn argmax(values: &[f32]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn tone_lands_right_of_center() {
        let mut fft = FftProcessor::new(256);
        let mut row = Vec::new();
        fft.compute(&tone(32.0, 256), 256, &mut row);

        assert_eq!(row.len(), 256);
        assert_eq!(argmax(&row), 128 + 32);
        assert!(row[160] > -1.0, "full-scale tone at {} dB", row[160]);
        assert!(row[10] < -60.0);
    }

    #[test]
    fn negative_offsets_land_left_of_center() {
        let mut fft = FftProcessor::new(256);
        let mut row = Vec::new();
        fft.compute(&tone(-40.0, 256), 256, &mut row);
        assert_eq!(argmax(&row), 128 - 40);
    }

    #[test]
    fn silence_reads_as_floor() {
        let mut fft = FftProcessor::new(64);
        let mut row = Vec::new();
        fft.compute(&[], 10, &mut row);
        assert_eq!(row, vec![FLOOR_DB; 10]);
    }

    #[test]
    fn size_rounds_to_power_of_two() {
        assert_eq!(FftProcessor::new(1000).fft_size(), 1024);
        assert_eq!(FftProcessor::new(1).fft_size(), 16);
    }

    #[test]
    fn grouping_averages_and_stretches() {
        let mut out = Vec::new();
        group_into_pixels(&[0.0, 2.0, 4.0, 6.0], 2, &mut out);
        assert_eq!(out, vec![1.0, 5.0]);

        group_into_pixels(&[1.0, 2.0], 4, &mut out);
        assert_eq!(out, vec![1.0, 1.0, 2.0, 2.0]);

        group_into_pixels(&[], 3, &mut out);
        assert_eq!(out, vec![FLOOR_DB; 3]);
    }
}
