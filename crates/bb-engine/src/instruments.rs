//! The fixed instrument set: three loop voices and three sound effects.
//!
//! Each function builds a complete `VoiceRender` from a start time and
//! nothing else that persists. Exponential ramps end on a small positive
//! floor instead of zero, since a constant-ratio curve cannot reach zero.

use bb_ir::{Automation, BusId, FilterKind, FilterSpec, VoiceRender, Waveform};

/// Floor for exponential gain ramps.
pub const GAIN_FLOOR: f32 = 0.01;

/// Floor for the kick's gain ramp.
pub const KICK_GAIN_FLOOR: f32 = 0.001;

/// Kick: sine pitch drop from 150 Hz with a half-second exponential decay.
pub fn kick(time: f64, bus: BusId) -> VoiceRender {
    const LENGTH: f32 = 0.5;
    VoiceRender {
        start: time,
        duration: LENGTH,
        waveform: Waveform::Sine,
        frequency: Automation::constant(150.0).exponential_to(0.01, LENGTH),
        gain: Automation::constant(1.0).exponential_to(KICK_GAIN_FLOOR, LENGTH),
        filter: None,
        bus,
    }
}

/// Bass: sawtooth through a low-pass that closes from 300 Hz to 100 Hz.
pub fn bass(time: f64, frequency: f32, bus: BusId) -> VoiceRender {
    const DECAY: f32 = 0.2;
    VoiceRender {
        start: time,
        duration: 0.25,
        waveform: Waveform::Sawtooth,
        frequency: Automation::constant(frequency),
        gain: Automation::constant(0.8).linear_to(GAIN_FLOOR, DECAY),
        filter: Some(FilterSpec::new(
            FilterKind::LowPass,
            Automation::constant(300.0).linear_to(100.0, DECAY),
        )),
        bus,
    }
}

/// Lead: short square pluck, well below the kick and bass.
pub fn lead(time: f64, frequency: f32, bus: BusId) -> VoiceRender {
    VoiceRender {
        start: time,
        duration: 0.15,
        waveform: Waveform::Square,
        frequency: Automation::constant(frequency),
        gain: Automation::constant(0.15).exponential_to(GAIN_FLOOR, 0.1),
        filter: None,
        bus,
    }
}

/// Shoot: falling sawtooth zap through a sweeping band-pass.
pub fn shoot(time: f64, volume: f32) -> VoiceRender {
    const LENGTH: f32 = 0.15;
    VoiceRender {
        start: time,
        duration: LENGTH,
        waveform: Waveform::Sawtooth,
        frequency: Automation::constant(600.0).exponential_to(100.0, LENGTH),
        gain: Automation::constant(0.2 * volume).exponential_to(GAIN_FLOOR * volume, LENGTH),
        filter: Some(FilterSpec::new(
            FilterKind::BandPass,
            Automation::constant(1000.0).linear_to(100.0, LENGTH),
        )),
        bus: BusId::MASTER,
    }
}

/// Hit: rising sine chirp.
pub fn hit(time: f64, volume: f32) -> VoiceRender {
    const LENGTH: f32 = 0.08;
    VoiceRender {
        start: time,
        duration: LENGTH,
        waveform: Waveform::Sine,
        frequency: Automation::constant(1200.0).exponential_to(1800.0, LENGTH),
        gain: Automation::constant(0.2 * volume).exponential_to(GAIN_FLOOR * volume, LENGTH),
        filter: None,
        bus: BusId::MASTER,
    }
}

/// Miss: falling triangle thud.
pub fn miss(time: f64, volume: f32) -> VoiceRender {
    const LENGTH: f32 = 0.1;
    VoiceRender {
        start: time,
        duration: LENGTH,
        waveform: Waveform::Triangle,
        frequency: Automation::constant(150.0).exponential_to(80.0, LENGTH),
        gain: Automation::constant(0.15 * volume).exponential_to(GAIN_FLOOR * volume, LENGTH),
        filter: None,
        bus: BusId::MASTER,
    }
}

/// One-shot sound effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sfx {
    Shoot,
    Hit,
    Miss,
}

impl Sfx {
    pub const ALL: [Sfx; 3] = [Sfx::Shoot, Sfx::Hit, Sfx::Miss];

    /// Build the render for this effect at `time`, routed to the master bus.
    pub fn render(self, time: f64, volume: f32) -> VoiceRender {
        match self {
            Sfx::Shoot => shoot(time, volume),
            Sfx::Hit => hit(time, volume),
            Sfx::Miss => miss(time, volume),
        }
    }
}
