// src/source/synth.rs
//! Synthetic receiver: a background thread producing complex baseband.
//!
//! Carriers live at absolute frequencies, so retuning the receiver moves
//! them across the band the same way a real front end would.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use rustfft::num_complex::Complex;
use tracing::{debug, info};

use super::sample_capture::{IqBuffer, SampleCapture};

/// Baseband sample rate of the synthetic receiver.
pub const SAMPLE_RATE: u32 = 48_000;

/// Samples produced per wake-up of the receiver thread.
const CHUNK_PERIOD: Duration = Duration::from_millis(20);

/// One transmitter on the synthetic band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Carrier {
    /// Absolute frequency in Hz
    pub frequency: i64,
    /// Peak linear amplitude
    pub amplitude: f32,
    /// Period of the slow fade in seconds; zero for a steady carrier
    pub fade_period: f32,
}

impl Carrier {
    pub const fn new(frequency: i64, amplitude: f32, fade_period: f32) -> Self {
        Self {
            frequency,
            amplitude,
            fade_period,
        }
    }
}

/// A handful of carriers around 7.1 MHz.
pub fn default_band() -> Vec<Carrier> {
    vec![
        Carrier::new(7_100_000, 0.30, 0.0),
        Carrier::new(7_094_500, 0.10, 7.0),
        Carrier::new(7_103_200, 0.05, 3.0),
        Carrier::new(7_108_750, 0.02, 11.0),
        Carrier::new(7_089_000, 0.15, 5.0),
        Carrier::new(7_116_000, 0.08, 0.0),
    ]
}

/// Infinite IQ sample source: carriers plus white noise.
pub struct SignalGenerator {
    carriers: Vec<Carrier>,
    phases: Vec<f64>,
    center: Arc<AtomicI64>,
    sample_rate: u32,
    noise: f32,
    sample_index: u64,
    rng: u64,
}

impl SignalGenerator {
    pub fn new(carriers: Vec<Carrier>, center: Arc<AtomicI64>, sample_rate: u32) -> Self {
        let phases = vec![0.0; carriers.len()];
        Self {
            carriers,
            phases,
            center,
            sample_rate: sample_rate.max(1),
            noise: 0.002,
            sample_index: 0,
            rng: 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// Peak amplitude of the noise floor.
    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise;
        self
    }

    fn next_noise(&mut self) -> f32 {
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 7;
        self.rng ^= self.rng << 17;
        ((self.rng as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32 * self.noise
    }
}

impl Iterator for SignalGenerator {
    type Item = Complex<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        let rate = f64::from(self.sample_rate);
        let center = self.center.load(Ordering::Relaxed);
        let t = self.sample_index as f64 / rate;
        let nyquist = i64::from(self.sample_rate / 2);

        let mut sample = Complex::new(0.0f32, 0.0);
        for (carrier, phase) in self.carriers.iter().zip(self.phases.iter_mut()) {
            let offset = carrier.frequency - center;
            if offset.abs() >= nyquist {
                continue;
            }
            *phase = (*phase + TAU * offset as f64 / rate) % TAU;

            let envelope = if carrier.fade_period > 0.0 {
                0.5 * (1.0 + (TAU * t / f64::from(carrier.fade_period)).sin())
            } else {
                1.0
            };
            let amplitude = carrier.amplitude * envelope as f32;
            sample += Complex::new(phase.cos() as f32, phase.sin() as f32) * amplitude;
        }

        sample += Complex::new(self.next_noise(), self.next_noise());
        self.sample_index = self.sample_index.wrapping_add(1);
        Some(sample)
    }
}

/// Runs a [`SignalGenerator`] on its own thread, capturing into a ring.
pub struct SyntheticReceiver {
    center: Arc<AtomicI64>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    buffer: IqBuffer,
    sample_rate: u32,
}

impl SyntheticReceiver {
    /// Start producing at `center_frequency` into `buffer`.
    pub fn start(center_frequency: i64, carriers: Vec<Carrier>, buffer: IqBuffer) -> Result<Self> {
        let center = Arc::new(AtomicI64::new(center_frequency));
        let running = Arc::new(AtomicBool::new(true));
        let generator = SignalGenerator::new(carriers, Arc::clone(&center), SAMPLE_RATE);
        let chunk = (SAMPLE_RATE as u128 * CHUNK_PERIOD.as_millis() / 1000) as usize;

        let handle = {
            let running = Arc::clone(&running);
            let mut capture = SampleCapture::new(generator, Arc::clone(&buffer));
            thread::Builder::new()
                .name("synthetic-rx".into())
                .spawn(move || {
                    debug!("synthetic receiver thread started");
                    while running.load(Ordering::Relaxed) {
                        capture.by_ref().take(chunk).for_each(drop);
                        thread::sleep(CHUNK_PERIOD);
                    }
                    debug!("synthetic receiver thread stopped");
                })
                .context("failed to spawn synthetic receiver thread")?
        };

        info!("synthetic receiver at {center_frequency} Hz, {SAMPLE_RATE} S/s");
        Ok(Self {
            center,
            running,
            handle: Some(handle),
            buffer,
            sample_rate: SAMPLE_RATE,
        })
    }

    pub fn buffer(&self) -> &IqBuffer {
        &self.buffer
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frequency(&self) -> i64 {
        self.center.load(Ordering::Relaxed)
    }

    pub fn set_frequency(&self, frequency: i64) {
        self.center.store(frequency, Ordering::Relaxed);
    }

    /// Stop the thread and wait for it.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SyntheticReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}
