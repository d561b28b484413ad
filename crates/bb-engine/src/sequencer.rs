//! Look-ahead sequencing of the background loop.
//!
//! A coarse wake-up (every few tens of milliseconds) asks the sequencer to
//! fill; the sequencer then submits every beat that falls inside the
//! schedule-ahead horizon, each stamped with its exact start time. Jitter in
//! the wake-up only changes *when* a beat is submitted, never when it plays.

use bb_ir::{BusId, Command, VoiceRender};
use heapless::Vec as FixedVec;

use crate::clock::AudioClock;
use crate::instruments;

/// Steps in one bar.
pub const STEPS_PER_BAR: u8 = 16;

/// Steps in the whole loop (four bars).
pub const LOOP_STEPS: u8 = 64;

/// Semitone offsets of the arpeggio, indexed by `beat % 4`.
pub const ARP_PATTERN: [i32; 4] = [0, 4, 7, 12];

/// Root and bass frequencies of one chord region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chord {
    /// Arpeggio root in Hz.
    pub root: f32,
    /// Bass note in Hz, two octaves under the root's pitch class.
    pub bass: f32,
}

/// C#m, A, E, B: one chord per bar.
pub const PROGRESSION: [Chord; 4] = [
    Chord { root: 277.18, bass: 69.30 },
    Chord { root: 220.00, bass: 55.00 },
    Chord { root: 329.63, bass: 82.41 },
    Chord { root: 246.94, bass: 61.74 },
];

/// Chord region for a beat. Regions start at beats 0, 16, 32 and 48.
pub fn chord_for_beat(beat: u8) -> Chord {
    PROGRESSION[((beat % LOOP_STEPS) / STEPS_PER_BAR) as usize]
}

/// Arpeggio frequency for a beat: the region root raised by the pattern offset.
pub fn arp_frequency(beat: u8) -> f32 {
    let offset = ARP_PATTERN[(beat % 4) as usize];
    chord_for_beat(beat).root * libm::powf(2.0, offset as f32 / 12.0)
}

/// Voices that sound on `beat`, starting at `time`, in kick/bass/lead order.
pub fn beat_voices(beat: u8, time: f64, bus: BusId) -> FixedVec<VoiceRender, 3> {
    let mut voices = FixedVec::new();
    let chord = chord_for_beat(beat);

    if beat % 4 == 0 {
        let _ = voices.push(instruments::kick(time, bus));
    }
    if beat % 2 == 0 {
        let _ = voices.push(instruments::bass(time, chord.bass, bus));
    }
    let _ = voices.push(instruments::lead(time, arp_frequency(beat), bus));
    voices
}

/// Tempo and horizon of the sequencer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    /// Quarter notes per minute.
    pub tempo_bpm: f64,
    /// How far past the current clock time a fill reaches, in seconds.
    pub schedule_ahead: f64,
}

impl Timing {
    /// Length of one sixteenth note in seconds.
    pub fn sixteenth(&self) -> f64 {
        0.25 * 60.0 / self.tempo_bpm
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self { tempo_bpm: 110.0, schedule_ahead: 0.1 }
    }
}

/// Position and clock of the running loop.
#[derive(Clone, Debug)]
pub struct Sequencer {
    beat: u8,
    next_event_time: f64,
    timing: Timing,
    bus: BusId,
}

impl Sequencer {
    /// Start at beat 0 with the first event at `first_event_time`.
    pub fn new(first_event_time: f64, bus: BusId, timing: Timing) -> Self {
        Self { beat: 0, next_event_time: first_event_time, timing, bus }
    }

    /// Beat that the next event will render.
    pub fn beat(&self) -> u8 {
        self.beat
    }

    /// Start time of the next event.
    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Bus the loop renders onto.
    pub fn bus(&self) -> BusId {
        self.bus
    }

    /// Submit every event due before `now + schedule_ahead`. Returns the
    /// number of beats submitted.
    pub fn fill<C: AudioClock + ?Sized>(&mut self, clock: &C) -> usize {
        let horizon = clock.current_time() + self.timing.schedule_ahead;
        let mut scheduled = 0;
        while self.next_event_time < horizon {
            for render in beat_voices(self.beat, self.next_event_time, self.bus) {
                clock.submit(Command::Voice(render));
            }
            self.advance();
            scheduled += 1;
        }
        scheduled
    }

    fn advance(&mut self) {
        self.next_event_time += self.timing.sixteenth();
        self.beat = (self.beat + 1) % LOOP_STEPS;
    }
}
