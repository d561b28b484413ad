//! Deterministic offline rendering of a session.

use bb_audio::OfflineOutput;
use bb_engine::Frame;
use bb_ir::seconds_to_frames;

use crate::wav;
use crate::SoundEngine;

impl SoundEngine<OfflineOutput> {
    /// Render `seconds` of output, draining the scheduler once per
    /// lookahead-sized chunk. Opens the output first if needed.
    pub fn render_seconds(&mut self, seconds: f64) -> Vec<Frame> {
        self.init();
        let Some(sample_rate) = self.sample_rate() else {
            return Vec::new();
        };
        let total = seconds_to_frames(seconds, sample_rate) as usize;
        let lookahead = self.config.sequencer.lookahead().as_secs_f64();
        let chunk = (seconds_to_frames(lookahead, sample_rate) as usize).max(1);

        let mut frames = Vec::with_capacity(total);
        while frames.len() < total {
            self.tick();
            let Some(output) = self.output.as_mut() else {
                break;
            };
            let rendered = output.render(chunk.min(total - frames.len()));
            if rendered.is_empty() {
                break;
            }
            frames.extend(rendered);
        }
        frames
    }

    /// Render `seconds` of output as a WAV file image.
    pub fn render_to_wav(&mut self, seconds: f64) -> Vec<u8> {
        let frames = self.render_seconds(seconds);
        let sample_rate = self.sample_rate().unwrap_or_default();
        wav::encode_wav(&frames, sample_rate)
    }
}
