//! Commands sent from the control side to the render side.

use crate::render::{BusId, VoiceRender};

/// A change to the render-side signal graph.
///
/// Every time carried here is absolute clock time in seconds, so a command
/// may arrive early and still take effect exactly when intended.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Start a voice.
    Voice(VoiceRender),
    /// Create a sub-bus feeding the master at a fixed level.
    OpenBus { bus: BusId, level: f32 },
    /// Ramp a sub-bus linearly from its level at `at` to `to` over `over` seconds.
    FadeBus { bus: BusId, to: f32, at: f64, over: f32 },
    /// Remove a sub-bus, and every voice routed to it, at `at`.
    CloseBus { bus: BusId, at: f64 },
    /// Set the master level immediately.
    SetMasterLevel(f32),
}
