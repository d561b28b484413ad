//! Audio frame type.

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: i16) -> Self {
        Self { left: value, right: value }
    }

    /// Quantize a mono sample, hard-clipping to [-1.0, 1.0].
    pub fn from_f32(sample: f32) -> Self {
        let clipped = sample.clamp(-1.0, 1.0);
        Self::mono((clipped * i16::MAX as f32) as i16)
    }

    /// Left channel as f32 in [-1.0, 1.0].
    pub fn left_f32(&self) -> f32 {
        self.left as f32 / 32768.0
    }

    /// Right channel as f32 in [-1.0, 1.0].
    pub fn right_f32(&self) -> f32 {
        self.right as f32 / 32768.0
    }

    /// Largest absolute sample of either channel.
    pub fn peak(&self) -> i16 {
        self.left.saturating_abs().max(self.right.saturating_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_f32_clips() {
        assert_eq!(Frame::from_f32(2.0), Frame::mono(i16::MAX));
        assert_eq!(Frame::from_f32(-2.0), Frame::mono(-i16::MAX));
        assert_eq!(Frame::from_f32(0.0), Frame::silence());
    }

    #[test]
    fn peak_uses_louder_channel() {
        let f = Frame { left: -300, right: 200 };
        assert_eq!(f.peak(), 300);
    }
}
