//! The seam between the control side and an audio device.

use bb_ir::Command;

/// A shared, monotonic audio clock that accepts timestamped commands.
///
/// Implementations hand commands to whatever renders audio. Commands carry
/// absolute times, so submitting early is always safe.
pub trait AudioClock {
    /// Current clock time in seconds. Never decreases.
    fn current_time(&self) -> f64;

    /// Hand a command to the render side. Never blocks.
    fn submit(&self, command: Command);
}

impl<C: AudioClock + ?Sized> AudioClock for &C {
    fn current_time(&self) -> f64 {
        (**self).current_time()
    }

    fn submit(&self, command: Command) {
        (**self).submit(command)
    }
}
