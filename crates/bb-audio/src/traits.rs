//! Audio output trait and error types.

use bb_engine::AudioClock;

/// Error type for audio operations.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// Failed to initialize audio device
    #[error("device init error: {0}")]
    DeviceInit(String),
    /// Failed to create audio stream
    #[error("stream create error: {0}")]
    StreamCreate(String),
    /// Playback error
    #[error("playback error: {0}")]
    Playback(String),
    /// No audio device available
    #[error("no audio device available")]
    NoDevice,
    /// The command queue to the render thread is full
    #[error("command queue full")]
    QueueFull,
}

/// Settings used when opening an output.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputConfig {
    /// Requested sample rate; `None` takes the device default.
    pub sample_rate: Option<u32>,
    /// Initial master level.
    pub master_level: f32,
    /// Capacity of the control-to-render command queue.
    pub command_capacity: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { sample_rate: None, master_level: 0.5, command_capacity: 1024 }
    }
}

/// An opened audio output.
pub trait AudioOutput {
    /// Handle onto the output's clock and command path.
    type Clock: AudioClock + Clone + Send + 'static;

    /// Open the output. Returns with the output running.
    fn open(config: &OutputConfig) -> Result<Self, AudioError>
    where
        Self: Sized;

    /// Get the sample rate.
    fn sample_rate(&self) -> u32;

    /// A new handle onto this output's clock.
    fn clock(&self) -> Self::Clock;

    /// Whether the output is suspended (clock frozen, no sound).
    fn is_suspended(&self) -> bool;

    /// Resume a suspended output.
    fn resume(&mut self) -> Result<(), AudioError>;

    /// Suspend the output.
    fn suspend(&mut self) -> Result<(), AudioError>;
}
