//! Render IR types for the blipbox audio engine.
//!
//! Everything the control side hands to the render side is described here
//! as plain values: automation curves, voice render requests, bus ids and
//! the command type that carries them across the device boundary.
//!
//! Designed to be `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

mod automation;
mod command;
mod render;
mod time;

pub use automation::{interpolate, Automation, Breakpoint, Curve, MAX_BREAKPOINTS};
pub use command::Command;
pub use render::{BusId, FilterKind, FilterSpec, VoiceRender, Waveform};
pub use time::{frames_to_seconds, seconds_to_frames};
