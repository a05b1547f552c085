// src/source/sample_capture.rs
//! A pass-through iterator that copies IQ samples into a circular buffer.

use std::sync::{Arc, Mutex, PoisonError};

use ringbuf::{traits::*, HeapRb};
use rustfft::num_complex::Complex;

/// Shared ring of the most recent IQ samples.
pub type IqBuffer = Arc<Mutex<HeapRb<Complex<f32>>>>;

/// Create an empty ring holding `capacity` samples.
pub fn iq_buffer(capacity: usize) -> IqBuffer {
    Arc::new(Mutex::new(HeapRb::new(capacity.max(1))))
}

/// Wraps a sample source and captures everything it yields.
pub struct SampleCapture<S> {
    source: S,
    buffer: IqBuffer,
}

impl<S> SampleCapture<S> {
    pub fn new(source: S, buffer: IqBuffer) -> Self {
        Self { source, buffer }
    }
}

impl<S> Iterator for SampleCapture<S>
where
    S: Iterator<Item = Complex<f32>>,
{
    type Item = Complex<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.source.next()?;
        let mut buf = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        // Full ring: drop the oldest sample to make room
        if buf.is_full() {
            let _ = buf.try_pop();
        }
        let _ = buf.try_push(sample);
        Some(sample)
    }
}

/// Copy up to `count` of the newest samples into `out`, oldest first,
/// without consuming them. Returns how many were copied.
pub fn read_latest(buffer: &IqBuffer, count: usize, out: &mut Vec<Complex<f32>>) -> usize {
    out.clear();
    let buf = buffer.lock().unwrap_or_else(PoisonError::into_inner);
    let available = buf.occupied_len();
    let take = available.min(count);
    out.extend(buf.iter().skip(available - take).copied());
    take
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> impl Iterator<Item = Complex<f32>> {
        (0..n).map(|i| Complex::new(i as f32, 0.0))
    }

    #[test]
    fn passes_samples_through() {
        let buffer = iq_buffer(16);
        let seen: Vec<f32> = SampleCapture::new(ramp(4), buffer.clone())
            .map(|c| c.re)
            .collect();
        assert_eq!(seen, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(buffer.lock().unwrap().occupied_len(), 4);
    }

    #[test]
    fn full_ring_keeps_newest() {
        let buffer = iq_buffer(4);
        SampleCapture::new(ramp(10), buffer.clone()).for_each(drop);

        let mut out = Vec::new();
        assert_eq!(read_latest(&buffer, 8, &mut out), 4);
        let re: Vec<f32> = out.iter().map(|c| c.re).collect();
        assert_eq!(re, vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn read_latest_takes_the_tail() {
        let buffer = iq_buffer(32);
        SampleCapture::new(ramp(20), buffer.clone()).for_each(drop);

        let mut out = Vec::new();
        assert_eq!(read_latest(&buffer, 3, &mut out), 3);
        assert_eq!(out[0].re, 17.0);
        assert_eq!(out[2].re, 19.0);
        // Nothing was consumed.
        assert_eq!(buffer.lock().unwrap().occupied_len(), 20);
    }
}
