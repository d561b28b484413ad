//! Voice render requests: one fully described, time-bounded sound.

use crate::automation::Automation;

/// Identifies a gain bus on the render side.
///
/// `BusId::MASTER` is the fixed master bus; every other id names a
/// sub-bus that feeds it. Ids are never reused within a process, so a
/// sub-bus that is still fading out cannot be confused with its successor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusId(pub u32);

impl BusId {
    /// The master bus feeding the physical output.
    pub const MASTER: BusId = BusId(0);

    /// Whether this is the master bus.
    pub const fn is_master(self) -> bool {
        self.0 == 0
    }

    /// The id following this one.
    pub const fn next(self) -> BusId {
        BusId(self.0 + 1)
    }
}

/// Oscillator shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Filter response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    BandPass,
}

/// A filter stage with an automated cutoff.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    /// Cutoff (or center) frequency in Hz over the voice's lifetime.
    pub cutoff: Automation,
    pub q: f32,
}

impl FilterSpec {
    /// Default resonance of a filter stage.
    pub const DEFAULT_Q: f32 = 1.0;

    /// Create a filter stage with the default resonance.
    pub fn new(kind: FilterKind, cutoff: Automation) -> Self {
        Self { kind, cutoff, q: Self::DEFAULT_Q }
    }
}

/// A request to synthesize one voice.
///
/// All automation lanes are measured in seconds from `start`. The render
/// side discards the voice once `start + duration` has passed.
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceRender {
    /// Absolute clock time at which the voice begins, in seconds.
    pub start: f64,
    /// Lifetime of the voice in seconds.
    pub duration: f32,
    pub waveform: Waveform,
    /// Oscillator frequency in Hz.
    pub frequency: Automation,
    /// Linear amplitude.
    pub gain: Automation,
    pub filter: Option<FilterSpec>,
    /// Bus the voice is routed to.
    pub bus: BusId,
}

impl VoiceRender {
    /// Absolute clock time at which the voice is discarded.
    pub fn end(&self) -> f64 {
        self.start + self.duration as f64
    }

    /// Amplitude at the moment the voice starts.
    pub fn peak_gain(&self) -> f32 {
        self.gain.value_at(0.0)
    }
}
