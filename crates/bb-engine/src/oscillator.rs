//! Phase-accumulator oscillator with PolyBLEP band-limiting.

use bb_ir::Waveform;
use core::f32::consts::TAU;

/// A single oscillator. Frequency is supplied per sample so automation
/// can sweep it without touching oscillator state.
#[derive(Clone, Debug)]
pub struct Oscillator {
    waveform: Waveform,
    /// Normalized phase in [0, 1).
    phase: f32,
    sample_rate: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform, sample_rate: u32) -> Self {
        Self { waveform, phase: 0.0, sample_rate: sample_rate as f32 }
    }

    /// Generate the next sample at `frequency` Hz and advance the phase.
    pub fn next_sample(&mut self, frequency: f32) -> f32 {
        let inc = (frequency / self.sample_rate).clamp(0.0, 0.5);
        let p = self.phase;
        let sample = match self.waveform {
            Waveform::Sine => libm::sinf(p * TAU),
            Waveform::Sawtooth => (2.0 * p - 1.0) - poly_blep(p, inc),
            Waveform::Square => {
                let naive = if p < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(p, inc) - poly_blep(wrap(p + 0.5), inc)
            }
            Waveform::Triangle => 1.0 - 4.0 * libm::fabsf(p - 0.5),
        };

        self.phase = wrap(p + inc);
        sample
    }
}

fn wrap(phase: f32) -> f32 {
    if phase >= 1.0 { phase - 1.0 } else { phase }
}

/// Polynomial band-limited step correction around a discontinuity at phase 0.
fn poly_blep(phase: f32, inc: f32) -> f32 {
    if inc <= 0.0 {
        return 0.0;
    }
    if phase < inc {
        let t = phase / inc;
        2.0 * t - t * t - 1.0
    } else if phase > 1.0 - inc {
        let t = (phase - 1.0) / inc;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}
