// src/source/mod.rs
//! Demo signal chain: synthetic receiver, IQ capture and FFT.

pub mod fft;
pub mod sample_capture;
pub mod synth;

pub use fft::FftProcessor;
pub use sample_capture::{iq_buffer, read_latest, IqBuffer, SampleCapture};
pub use synth::{default_band, Carrier, SignalGenerator, SyntheticReceiver, SAMPLE_RATE};
