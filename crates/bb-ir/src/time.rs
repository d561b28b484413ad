//! Conversions between the frame counter and clock seconds.

/// Clock time, in seconds, at the start of frame `frames`.
pub fn frames_to_seconds(frames: u64, sample_rate: u32) -> f64 {
    frames as f64 / sample_rate as f64
}

/// Number of whole frames covering `seconds` (rounded up, never negative).
pub fn seconds_to_frames(seconds: f64, sample_rate: u32) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    libm::ceil(seconds * sample_rate as f64) as u64
}
