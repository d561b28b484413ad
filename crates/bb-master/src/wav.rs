//! 16-bit stereo PCM WAV export.

use bb_engine::Frame;
use std::io;
use std::path::Path;

const CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;
/// RIFF header plus the `fmt ` and `data` chunk headers.
pub const HEADER_LEN: usize = 44;

fn header(frame_count: usize, sample_rate: u32) -> [u8; HEADER_LEN] {
    let data_len = (frame_count * BLOCK_ALIGN as usize) as u32;
    let byte_rate = sample_rate * BLOCK_ALIGN as u32;

    let mut h = [0u8; HEADER_LEN];
    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&(HEADER_LEN as u32 - 8 + data_len).to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");
    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes());
    h[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    h[22..24].copy_from_slice(&CHANNELS.to_le_bytes());
    h[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    h[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    h[32..34].copy_from_slice(&BLOCK_ALIGN.to_le_bytes());
    h[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&data_len.to_le_bytes());
    h
}

/// Encode frames as a complete WAV file image.
pub fn encode_wav(frames: &[Frame], sample_rate: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + frames.len() * BLOCK_ALIGN as usize);
    out.extend_from_slice(&header(frames.len(), sample_rate));
    for frame in frames {
        out.extend_from_slice(&frame.left.to_le_bytes());
        out.extend_from_slice(&frame.right.to_le_bytes());
    }
    out
}

/// Encode frames and write them to `path`.
pub fn write_wav(path: impl AsRef<Path>, frames: &[Frame], sample_rate: u32) -> io::Result<()> {
    std::fs::write(path, encode_wav(frames, sample_rate))
}
