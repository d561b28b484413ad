//! Audio output devices for blipbox.
//!
//! A device owns the render side of the engine (a `Mixer`) and hands out a
//! cloneable `AudioClock` through which the control side reaches it.

mod cpal_backend;
mod offline;
mod traits;

pub use cpal_backend::{CpalClock, CpalOutput};
pub use offline::{OfflineClock, OfflineOutput, DEFAULT_OFFLINE_SAMPLE_RATE};
pub use traits::{AudioError, AudioOutput, OutputConfig};
