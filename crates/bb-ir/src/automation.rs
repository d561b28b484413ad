//! Piecewise parameter automation for synthesized voices.
//!
//! `Automation` is the one curve primitive the engine knows about. Pitch
//! sweeps, amplitude envelopes and filter cutoff ramps are all encoded as a
//! short list of breakpoints measured in seconds from the voice's start.

use arrayvec::ArrayVec;

/// Maximum breakpoints per automation lane. Every instrument uses at most
/// two; the headroom is for bus fades that start from a held level.
pub const MAX_BREAKPOINTS: usize = 4;

/// A piecewise curve over time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Automation {
    /// Breakpoints in ascending time order.
    pub points: ArrayVec<Breakpoint, MAX_BREAKPOINTS>,
}

/// A breakpoint in an automation lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breakpoint {
    /// Seconds from the start of the lane.
    pub at: f32,
    /// Value at this point.
    pub value: f32,
    /// How to interpolate FROM this point TO the next.
    pub curve: Curve,
}

/// Interpolation curve between two breakpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    /// Hold this value until the next point.
    Hold,
    /// Straight line to the next point.
    Linear,
    /// Constant-ratio curve: `from * (to / from)^t`.
    Exponential,
}

/// Interpolate between two values using the given curve at position `t` (0.0..1.0).
///
/// An exponential segment whose endpoints are zero or of opposite sign has
/// no defined ratio and holds `from` for its whole length.
pub fn interpolate(curve: Curve, from: f32, to: f32, t: f32) -> f32 {
    match curve {
        Curve::Hold => from,
        Curve::Linear => from + (to - from) * t,
        Curve::Exponential => {
            if from * to <= 0.0 {
                from
            } else {
                from * libm::powf(to / from, t)
            }
        }
    }
}

impl Automation {
    /// A lane that holds `value` forever.
    pub fn constant(value: f32) -> Self {
        let mut points = ArrayVec::new();
        points.push(Breakpoint::new(0.0, value, Curve::Hold));
        Self { points }
    }

    /// Append a linear ramp reaching `value` at `at` seconds.
    pub fn linear_to(self, value: f32, at: f32) -> Self {
        self.ramp_to(value, at, Curve::Linear)
    }

    /// Append an exponential ramp reaching `value` at `at` seconds.
    pub fn exponential_to(self, value: f32, at: f32) -> Self {
        self.ramp_to(value, at, Curve::Exponential)
    }

    fn ramp_to(mut self, value: f32, at: f32, curve: Curve) -> Self {
        if let Some(last) = self.points.last_mut() {
            last.curve = curve;
        }
        // Lanes past capacity keep their last reachable shape.
        let _ = self.points.try_push(Breakpoint::new(at, value, Curve::Hold));
        self
    }

    /// Evaluate the lane at `t` seconds.
    pub fn value_at(&self, t: f32) -> f32 {
        let Some(first) = self.points.first() else {
            return 0.0;
        };
        if t <= first.at {
            return first.value;
        }
        for pair in self.points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if t < to.at {
                let span = to.at - from.at;
                let frac = if span > 0.0 { (t - from.at) / span } else { 1.0 };
                return interpolate(from.curve, from.value, to.value, frac);
            }
        }
        self.points.last().map_or(0.0, |p| p.value)
    }

    /// Time of the last breakpoint.
    pub fn end(&self) -> f32 {
        self.points.last().map_or(0.0, |p| p.at)
    }

    /// Number of breakpoints.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the lane has no breakpoints.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Breakpoint {
    /// Create a new breakpoint.
    pub fn new(at: f32, value: f32, curve: Curve) -> Self {
        Self { at, value, curve }
    }
}
