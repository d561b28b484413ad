//! Biquad filter using Audio EQ Cookbook coefficients.

use bb_ir::FilterKind;
use core::f32::consts::TAU;

/// Lowest cutoff the filter will accept, in Hz.
const MIN_CUTOFF: f32 = 1.0;

/// A second-order IIR filter (Direct Form II Transposed).
#[derive(Clone, Debug)]
pub struct BiquadFilter {
    kind: FilterKind,
    cutoff: f32,
    q: f32,
    sample_rate: f32,

    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    z1: f32,
    z2: f32,
}

impl BiquadFilter {
    pub fn new(kind: FilterKind, cutoff: f32, q: f32, sample_rate: u32) -> Self {
        let mut f = Self {
            kind,
            cutoff: 0.0,
            q: q.max(1e-3),
            sample_rate: sample_rate as f32,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        };
        f.set_cutoff(cutoff);
        f
    }

    /// Current cutoff after clamping.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Move the cutoff, recomputing coefficients only when it changed.
    pub fn set_cutoff(&mut self, cutoff: f32) {
        let nyquist = self.sample_rate * 0.5;
        let clamped = cutoff.clamp(MIN_CUTOFF, nyquist * 0.99);
        if clamped != self.cutoff {
            self.cutoff = clamped;
            self.update_coefficients();
        }
    }

    fn update_coefficients(&mut self) {
        let w0 = TAU * self.cutoff / self.sample_rate;
        let cos_w0 = libm::cosf(w0);
        let alpha = libm::sinf(w0) / (2.0 * self.q);

        let (b0, b1, b2) = match self.kind {
            FilterKind::LowPass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            FilterKind::BandPass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = -2.0 * cos_w0 / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    /// Process a single sample.
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator::Oscillator;
    use bb_ir::Waveform;

    fn rms_through(filter: &mut BiquadFilter, freq: f32) -> f32 {
        let mut osc = Oscillator::new(Waveform::Sine, 44_100);
        // Skip the transient.
        for _ in 0..2_000 {
            filter.process(osc.next_sample(freq));
        }
        let n = 4_410;
        let sum: f32 = (0..n)
            .map(|_| {
                let y = filter.process(osc.next_sample(freq));
                y * y
            })
            .sum();
        libm::sqrtf(sum / n as f32)
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut f = BiquadFilter::new(FilterKind::LowPass, 300.0, 1.0, 44_100);
        let mut out = 0.0;
        for _ in 0..5_000 {
            out = f.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-3, "got {}", out);
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        let mut low = BiquadFilter::new(FilterKind::LowPass, 200.0, 1.0, 44_100);
        let mut high = BiquadFilter::new(FilterKind::LowPass, 200.0, 1.0, 44_100);
        assert!(rms_through(&mut high, 4_000.0) < rms_through(&mut low, 50.0) * 0.1);
    }

    #[test]
    fn bandpass_blocks_dc() {
        let mut f = BiquadFilter::new(FilterKind::BandPass, 1_000.0, 1.0, 44_100);
        let mut out = 1.0;
        for _ in 0..10_000 {
            out = f.process(1.0);
        }
        assert!(out.abs() < 1e-3, "got {}", out);
    }

    #[test]
    fn bandpass_peaks_at_center() {
        let mut center = BiquadFilter::new(FilterKind::BandPass, 1_000.0, 1.0, 44_100);
        let mut off = BiquadFilter::new(FilterKind::BandPass, 1_000.0, 1.0, 44_100);
        assert!(rms_through(&mut center, 1_000.0) > rms_through(&mut off, 10_000.0));
    }

    #[test]
    fn cutoff_is_clamped_below_nyquist() {
        let mut f = BiquadFilter::new(FilterKind::LowPass, 100.0, 1.0, 44_100);
        f.set_cutoff(1.0e6);
        assert!(f.cutoff() < 22_050.0);
        f.set_cutoff(-5.0);
        assert_eq!(f.cutoff(), MIN_CUTOFF);
    }
}
