//! Render-side mix graph: master level, sub-buses and the voice pool.

use bb_ir::{frames_to_seconds, Automation, BusId, Command};
use heapless::Vec as FixedVec;

use crate::frame::Frame;
use crate::voice::Voice;
use crate::voice_pool::VoicePool;

/// Maximum number of sub-buses alive at once. One is playing; the others
/// are earlier buses still fading out.
pub const MAX_BUSES: usize = 4;

/// Default master level.
pub const DEFAULT_MASTER_LEVEL: f32 = 0.5;

/// A sub-bus feeding the master.
#[derive(Clone, Debug)]
struct Bus {
    id: BusId,
    /// Clock time the gain lane is measured from.
    origin: f64,
    gain: Automation,
    /// Teardown time, once scheduled.
    closes_at: Option<f64>,
}

impl Bus {
    fn gain_at(&self, time: f64) -> f32 {
        self.gain.value_at((time - self.origin) as f32)
    }
}

/// The render side of the engine.
///
/// Owns the frame clock. Everything the control side wants is applied
/// through [`Mixer::apply`]; [`Mixer::render_frame`] never allocates.
pub struct Mixer {
    sample_rate: u32,
    /// Frames rendered so far; the clock.
    position: u64,
    master_level: f32,
    buses: FixedVec<Bus, MAX_BUSES>,
    voices: VoicePool,
}

impl Mixer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            position: 0,
            master_level: DEFAULT_MASTER_LEVEL,
            buses: FixedVec::new(),
            voices: VoicePool::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Clock time of the next frame to render, in seconds.
    pub fn current_time(&self) -> f64 {
        frames_to_seconds(self.position, self.sample_rate)
    }

    pub fn master_level(&self) -> f32 {
        self.master_level
    }

    /// Number of live sub-buses (including ones fading out).
    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    /// Whether `bus` is live.
    pub fn has_bus(&self, bus: BusId) -> bool {
        bus.is_master() || self.buses.iter().any(|b| b.id == bus)
    }

    /// Gain of a sub-bus at the current clock time.
    pub fn bus_gain(&self, bus: BusId) -> Option<f32> {
        let now = self.current_time();
        self.buses.iter().find(|b| b.id == bus).map(|b| b.gain_at(now))
    }

    /// Number of voices currently held.
    pub fn voice_count(&self) -> usize {
        self.voices.active_count()
    }

    /// Number of voices routed to `bus`.
    pub fn voices_on(&self, bus: BusId) -> usize {
        self.voices.count_on_bus(bus)
    }

    /// Apply a command from the control side.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Voice(render) => {
                // A voice aimed at a torn-down bus would never be heard.
                if self.has_bus(render.bus) {
                    self.voices.allocate(Voice::new(render, self.sample_rate));
                }
            }
            Command::OpenBus { bus, level } => self.open_bus(bus, level),
            Command::FadeBus { bus, to, at, over } => {
                if let Some(b) = self.buses.iter_mut().find(|b| b.id == bus) {
                    let from = b.gain_at(at);
                    b.origin = at;
                    b.gain = Automation::constant(from).linear_to(to, over);
                }
            }
            Command::CloseBus { bus, at } => {
                if let Some(b) = self.buses.iter_mut().find(|b| b.id == bus) {
                    b.closes_at = Some(at);
                }
            }
            Command::SetMasterLevel(level) => self.master_level = level,
        }
    }

    fn open_bus(&mut self, id: BusId, level: f32) {
        if id.is_master() || self.buses.iter().any(|b| b.id == id) {
            return;
        }
        if self.buses.is_full() {
            // Evict the bus closest to teardown.
            let victim = self
                .buses
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    let at = a.1.closes_at.unwrap_or(f64::INFINITY);
                    let bt = b.1.closes_at.unwrap_or(f64::INFINITY);
                    at.total_cmp(&bt)
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            let evicted = self.buses.swap_remove(victim);
            self.voices.kill_bus(evicted.id);
        }
        let bus = Bus { id, origin: self.current_time(), gain: Automation::constant(level), closes_at: None };
        let _ = self.buses.push(bus);
    }

    /// Generate one frame of audio and advance the clock.
    pub fn render_frame(&mut self) -> Frame {
        let now = self.current_time();
        self.close_due_buses(now);

        let mut gains: FixedVec<(BusId, f32), MAX_BUSES> = FixedVec::new();
        for bus in &self.buses {
            let _ = gains.push((bus.id, bus.gain_at(now)));
        }

        let mut mix = 0.0f32;
        for voice in self.voices.iter_mut() {
            let sample = voice.next_sample(now);
            let gain = if voice.bus().is_master() {
                1.0
            } else {
                gains.iter().find(|(id, _)| *id == voice.bus()).map_or(0.0, |(_, g)| *g)
            };
            mix += sample * gain;
        }
        self.voices.reap_finished();

        self.position += 1;
        Frame::from_f32(mix * self.master_level)
    }

    /// Fill `out` with consecutive frames.
    pub fn render_into(&mut self, out: &mut [Frame]) {
        #[cfg(feature = "alloc_check")]
        assert_no_alloc::assert_no_alloc(|| self.fill(out));
        #[cfg(not(feature = "alloc_check"))]
        self.fill(out);
    }

    fn fill(&mut self, out: &mut [Frame]) {
        for frame in out.iter_mut() {
            *frame = self.render_frame();
        }
    }

    fn close_due_buses(&mut self, now: f64) {
        let mut i = 0;
        while i < self.buses.len() {
            if self.buses[i].closes_at.is_some_and(|at| at <= now) {
                let closed = self.buses.swap_remove(i);
                self.voices.kill_bus(closed.id);
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments;

    const SR: u32 = 44_100;

    fn render_seconds(mixer: &mut Mixer, seconds: f64) -> alloc::vec::Vec<Frame> {
        let n = (seconds * SR as f64) as usize;
        (0..n).map(|_| mixer.render_frame()).collect()
    }

    fn peak(frames: &[Frame]) -> i16 {
        frames.iter().map(Frame::peak).max().unwrap_or(0)
    }

    #[test]
    fn idle_mixer_is_silent_and_clock_advances() {
        let mut mixer = Mixer::new(SR);
        let frames = render_seconds(&mut mixer, 0.1);
        assert_eq!(peak(&frames), 0);
        assert_eq!(mixer.position(), 4_410);
        assert!((mixer.current_time() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn master_voice_is_audible() {
        let mut mixer = Mixer::new(SR);
        mixer.apply(Command::Voice(instruments::hit(0.0, 1.0)));
        assert_eq!(mixer.voice_count(), 1);
        let frames = render_seconds(&mut mixer, 0.1);
        assert!(peak(&frames) > 1_000);
        assert_eq!(mixer.voice_count(), 0, "voice should be reaped after its lifetime");
    }

    #[test]
    fn voice_for_unknown_bus_is_dropped() {
        let mut mixer = Mixer::new(SR);
        mixer.apply(Command::Voice(instruments::kick(0.0, BusId(7))));
        assert_eq!(mixer.voice_count(), 0);
    }

    #[test]
    fn open_bus_is_idempotent() {
        let mut mixer = Mixer::new(SR);
        mixer.apply(Command::OpenBus { bus: BusId(1), level: 0.3 });
        mixer.apply(Command::OpenBus { bus: BusId(1), level: 0.9 });
        assert_eq!(mixer.bus_count(), 1);
        assert_eq!(mixer.bus_gain(BusId(1)), Some(0.3));
    }

    #[test]
    fn fade_ramps_linearly_to_target() {
        let mut mixer = Mixer::new(SR);
        mixer.apply(Command::OpenBus { bus: BusId(1), level: 0.8 });
        mixer.apply(Command::FadeBus { bus: BusId(1), to: 0.0, at: 0.0, over: 0.1 });
        render_seconds(&mut mixer, 0.05);
        let mid = mixer.bus_gain(BusId(1)).unwrap_or(-1.0);
        assert!((mid - 0.4).abs() < 0.01, "mid-fade gain {}", mid);
        render_seconds(&mut mixer, 0.06);
        assert_eq!(mixer.bus_gain(BusId(1)), Some(0.0));
    }

    #[test]
    fn close_removes_bus_and_its_voices_at_time() {
        let mut mixer = Mixer::new(SR);
        mixer.apply(Command::OpenBus { bus: BusId(1), level: 1.0 });
        mixer.apply(Command::Voice(instruments::kick(0.0, BusId(1))));
        mixer.apply(Command::Voice(instruments::shoot(0.0, 1.0)));
        mixer.apply(Command::CloseBus { bus: BusId(1), at: 0.05 });

        render_seconds(&mut mixer, 0.04);
        assert_eq!(mixer.bus_count(), 1);
        assert_eq!(mixer.voices_on(BusId(1)), 1);

        render_seconds(&mut mixer, 0.02);
        assert_eq!(mixer.bus_count(), 0);
        assert_eq!(mixer.voices_on(BusId(1)), 0);
        assert_eq!(mixer.voices_on(BusId::MASTER), 1);
    }

    #[test]
    fn bus_level_scales_voices() {
        let mut loud = Mixer::new(SR);
        let mut quiet = Mixer::new(SR);
        loud.apply(Command::OpenBus { bus: BusId(1), level: 1.0 });
        quiet.apply(Command::OpenBus { bus: BusId(1), level: 0.25 });
        loud.apply(Command::Voice(instruments::lead(0.0, 440.0, BusId(1))));
        quiet.apply(Command::Voice(instruments::lead(0.0, 440.0, BusId(1))));
        let l = peak(&render_seconds(&mut loud, 0.05)) as f32;
        let q = peak(&render_seconds(&mut quiet, 0.05)) as f32;
        assert!((q / l - 0.25).abs() < 0.01, "ratio {}", q / l);
    }

    #[test]
    fn master_level_applies_to_everything() {
        let mut mixer = Mixer::new(SR);
        mixer.apply(Command::SetMasterLevel(0.0));
        mixer.apply(Command::Voice(instruments::hit(0.0, 1.0)));
        assert_eq!(peak(&render_seconds(&mut mixer, 0.05)), 0);
        assert_eq!(mixer.master_level(), 0.0);
    }

    #[test]
    fn full_bus_table_evicts_closing_bus() {
        let mut mixer = Mixer::new(SR);
        for id in 1..=MAX_BUSES as u32 {
            mixer.apply(Command::OpenBus { bus: BusId(id), level: 1.0 });
        }
        mixer.apply(Command::CloseBus { bus: BusId(2), at: 10.0 });
        mixer.apply(Command::OpenBus { bus: BusId(9), level: 1.0 });
        assert_eq!(mixer.bus_count(), MAX_BUSES);
        assert!(!mixer.has_bus(BusId(2)));
        assert!(mixer.has_bus(BusId(9)));
    }
}
