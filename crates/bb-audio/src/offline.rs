//! Offline output: renders on demand instead of on a device callback.
//!
//! Time advances only as frames are pulled with [`OfflineOutput::render`],
//! which makes sessions reproducible for WAV export and for tests.

use bb_engine::{AudioClock, Frame, Mixer};
use bb_ir::Command;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::traits::{AudioError, AudioOutput, OutputConfig};

/// Sample rate used when the config does not name one.
pub const DEFAULT_OFFLINE_SAMPLE_RATE: u32 = 44_100;

/// An output that renders when asked.
pub struct OfflineOutput {
    mixer: Arc<Mutex<Mixer>>,
    suspended: bool,
}

/// Clock handle for an [`OfflineOutput`]. Commands are applied to the mixer
/// immediately.
#[derive(Clone)]
pub struct OfflineClock {
    mixer: Arc<Mutex<Mixer>>,
}

fn lock(mixer: &Mutex<Mixer>) -> MutexGuard<'_, Mixer> {
    mixer.lock().unwrap_or_else(PoisonError::into_inner)
}

impl OfflineOutput {
    /// Render `frames` frames. A suspended output renders nothing and its
    /// clock stays put.
    pub fn render(&mut self, frames: usize) -> Vec<Frame> {
        if self.suspended {
            return Vec::new();
        }
        let mut out = vec![Frame::silence(); frames];
        lock(&self.mixer).render_into(&mut out);
        out
    }

    /// Run `f` against the mixer, for inspection.
    pub fn with_mixer<R>(&self, f: impl FnOnce(&Mixer) -> R) -> R {
        f(&lock(&self.mixer))
    }
}

impl AudioOutput for OfflineOutput {
    type Clock = OfflineClock;

    fn open(config: &OutputConfig) -> Result<Self, AudioError> {
        let sample_rate = config.sample_rate.unwrap_or(DEFAULT_OFFLINE_SAMPLE_RATE);
        if sample_rate == 0 {
            return Err(AudioError::DeviceInit("sample rate must be non-zero".into()));
        }
        let mut mixer = Mixer::new(sample_rate);
        mixer.apply(Command::SetMasterLevel(config.master_level));
        Ok(Self { mixer: Arc::new(Mutex::new(mixer)), suspended: false })
    }

    fn sample_rate(&self) -> u32 {
        lock(&self.mixer).sample_rate()
    }

    fn clock(&self) -> OfflineClock {
        OfflineClock { mixer: self.mixer.clone() }
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        self.suspended = true;
        Ok(())
    }
}

impl AudioClock for OfflineClock {
    fn current_time(&self) -> f64 {
        lock(&self.mixer).current_time()
    }

    fn submit(&self, command: Command) {
        lock(&self.mixer).apply(command);
    }
}
