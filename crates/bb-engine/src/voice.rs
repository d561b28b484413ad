//! Voice: render-side state for one `VoiceRender`.

use bb_ir::{BusId, VoiceRender};

use crate::filter::BiquadFilter;
use crate::oscillator::Oscillator;

/// A single synthesized voice: oscillator, optional filter, gain envelope.
#[derive(Clone, Debug)]
pub struct Voice {
    render: VoiceRender,
    osc: Oscillator,
    filter: Option<BiquadFilter>,
    /// Cleared once the voice's lifetime has passed.
    pub playing: bool,
}

impl Voice {
    /// Build the render-side state for a request.
    pub fn new(render: VoiceRender, sample_rate: u32) -> Self {
        let osc = Oscillator::new(render.waveform, sample_rate);
        let filter = render
            .filter
            .as_ref()
            .map(|f| BiquadFilter::new(f.kind, f.cutoff.value_at(0.0), f.q, sample_rate));
        Self { render, osc, filter, playing: true }
    }

    /// Bus this voice is routed to.
    pub fn bus(&self) -> BusId {
        self.render.bus
    }

    /// Absolute clock time at which the voice is discarded.
    pub fn end(&self) -> f64 {
        self.render.end()
    }

    /// The request this voice was built from.
    pub fn render(&self) -> &VoiceRender {
        &self.render
    }

    /// Produce the sample for clock time `time`.
    ///
    /// Silent before the voice's start; stops playing once its lifetime ends.
    pub fn next_sample(&mut self, time: f64) -> f32 {
        if !self.playing {
            return 0.0;
        }
        let local = time - self.render.start;
        if local < 0.0 {
            return 0.0;
        }
        if local >= self.render.duration as f64 {
            self.playing = false;
            return 0.0;
        }

        let local = local as f32;
        let mut sample = self.osc.next_sample(self.render.frequency.value_at(local));
        if let (Some(filter), Some(shape)) = (self.filter.as_mut(), self.render.filter.as_ref()) {
            filter.set_cutoff(shape.cutoff.value_at(local));
            sample = filter.process(sample);
        }
        sample * self.render.gain.value_at(local)
    }
}
