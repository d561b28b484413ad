//! Synthesis and scheduling engine for blipbox.
//!
//! The control side (instruments, sequencer) turns musical intent into
//! `VoiceRender` values; the render side (mixer, voices) turns those values
//! into frames. The two meet only at the `AudioClock` trait.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod clock;
mod filter;
mod frame;
pub mod instruments;
mod mixer;
mod oscillator;
pub mod sequencer;
mod voice;
mod voice_pool;

pub use clock::AudioClock;
pub use filter::BiquadFilter;
pub use frame::Frame;
pub use instruments::Sfx;
pub use mixer::{Mixer, MAX_BUSES};
pub use oscillator::Oscillator;
pub use sequencer::{chord_for_beat, Chord, Sequencer, Timing};
pub use voice::Voice;
pub use voice_pool::{VoicePool, MAX_VOICES};
