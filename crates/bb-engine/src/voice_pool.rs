//! VoicePool: fixed-capacity voice storage for the render path.

use alloc::vec::Vec;
use bb_ir::BusId;

use crate::voice::Voice;

/// Identifier for a voice slot in the pool.
pub type VoiceId = usize;

/// Maximum number of simultaneous voices.
///
/// The loop keeps at most a kick, four basses and four leads alive at once;
/// the rest is headroom for rapid-fire effects.
pub const MAX_VOICES: usize = 64;

/// Preallocated voice slots. Nothing here allocates after `new`.
pub struct VoicePool {
    slots: Vec<Option<Voice>>,
}

impl VoicePool {
    /// Create a pool with every slot free.
    pub fn new() -> Self {
        Self { slots: (0..MAX_VOICES).map(|_| None).collect() }
    }

    /// Place a voice, stealing the one that ends soonest if the pool is full.
    pub fn allocate(&mut self, voice: Voice) -> VoiceId {
        let id = match self.slots.iter().position(|s| s.is_none()) {
            Some(id) => id,
            None => self.find_steal_candidate(),
        };
        self.slots[id] = Some(voice);
        id
    }

    fn find_steal_candidate(&self) -> VoiceId {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v.end())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Get a reference to a voice.
    pub fn get(&self, id: VoiceId) -> Option<&Voice> {
        self.slots.get(id).and_then(|s| s.as_ref())
    }

    /// Kill every voice routed to `bus`.
    pub fn kill_bus(&mut self, bus: BusId) {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|v| v.bus() == bus) {
                *slot = None;
            }
        }
    }

    /// Remove voices that have stopped playing.
    pub fn reap_finished(&mut self) {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|v| !v.playing) {
                *slot = None;
            }
        }
    }

    /// Count of occupied slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Count of occupied slots routed to `bus`.
    pub fn count_on_bus(&self, bus: BusId) -> usize {
        self.slots.iter().flatten().filter(|v| v.bus() == bus).count()
    }

    /// Iterate mutably over occupied slots.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.slots.iter_mut().flatten()
    }
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new()
    }
}
