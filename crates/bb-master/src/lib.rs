//! Engine facade for blipbox.
//!
//! [`SoundEngine`] owns an audio output, the background-loop sequencer and
//! its wake-up loop. Every playback call is side-effect only: when no device
//! could be opened the calls quietly do nothing.

mod config;
mod offline;
mod wakeup;
pub mod wav;

use bb_audio::{AudioOutput, OutputConfig};
use bb_engine::{AudioClock, Sequencer};
use bb_ir::{BusId, Command};
use std::sync::{Arc, Mutex};

use crate::wakeup::{lock, Wakeup};

pub use bb_audio::{AudioError, CpalOutput, OfflineOutput};
pub use bb_engine::{Frame, Sfx};
pub use config::{ConfigError, EngineConfig, MixConfig, OutputSection, SequencerConfig, WakeupMode};
pub use wav::{encode_wav, write_wav};

/// Lifecycle of a [`SoundEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No output device.
    Uninitialized,
    /// Device open, background loop not running.
    Idle,
    /// Background loop running.
    Playing,
}

/// The procedural audio engine.
pub struct SoundEngine<O: AudioOutput> {
    config: EngineConfig,
    output: Option<O>,
    clock: Option<O::Clock>,
    state: EngineState,
    /// Level applied at the next `init` and on every change.
    master_level: f32,
    /// Last bus handed out; each `play_bgm` takes the next one.
    last_bus: BusId,
    bgm_bus: Option<BusId>,
    sequencer: Option<Arc<Mutex<Sequencer>>>,
    wakeup: Option<Wakeup>,
}

impl<O: AudioOutput> SoundEngine<O> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            master_level: config.mix.master_level,
            config,
            output: None,
            clock: None,
            state: EngineState::Uninitialized,
            last_bus: BusId::MASTER,
            bgm_bus: None,
            sequencer: None,
            wakeup: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The open output, if any.
    pub fn output(&self) -> Option<&O> {
        self.output.as_ref()
    }

    pub fn output_mut(&mut self) -> Option<&mut O> {
        self.output.as_mut()
    }

    /// Sample rate of the open output.
    pub fn sample_rate(&self) -> Option<u32> {
        self.output.as_ref().map(|o| o.sample_rate())
    }

    /// Current device clock time, if a device is open.
    pub fn current_time(&self) -> Option<f64> {
        self.clock.as_ref().map(|c| c.current_time())
    }

    /// Beat the background loop will render next. After `stop_bgm` this is
    /// where the last session stopped, until the next `play_bgm` resets it.
    pub fn beat_index(&self) -> Option<u8> {
        self.sequencer.as_ref().map(|s| lock(s).beat())
    }

    /// Start time of the next background-loop event, or of the event the
    /// last session would have played next once stopped.
    pub fn next_event_time(&self) -> Option<f64> {
        self.sequencer.as_ref().map(|s| lock(s).next_event_time())
    }

    /// Open the output device, or resume it when suspended. Safe to call
    /// any number of times.
    pub fn init(&mut self) {
        match self.output.as_mut() {
            Some(output) => {
                if output.is_suspended() {
                    match output.resume() {
                        Ok(()) => tracing::debug!("audio output resumed"),
                        Err(err) => tracing::warn!("failed to resume audio output: {}", err),
                    }
                }
            }
            None => match O::open(&self.output_config()) {
                Ok(output) => {
                    tracing::info!(sample_rate = output.sample_rate(), "sound engine initialized");
                    self.clock = Some(output.clock());
                    self.output = Some(output);
                    self.state = EngineState::Idle;
                }
                Err(err) => tracing::warn!("audio init failed, engine stays silent: {}", err),
            },
        }
    }

    fn output_config(&self) -> OutputConfig {
        OutputConfig { master_level: self.master_level, ..self.config.output_config() }
    }

    /// Start the background loop at `volume`. Does nothing when already
    /// playing or when no device can be opened.
    pub fn play_bgm(&mut self, volume: f32) {
        if self.output.is_none() {
            self.init();
        }
        if self.state != EngineState::Idle {
            return;
        }
        let Some(clock) = self.clock.clone() else {
            return;
        };

        let bus = self.last_bus.next();
        self.last_bus = bus;
        clock.submit(Command::OpenBus { bus, level: volume });

        let first_event = clock.current_time() + self.config.sequencer.start_offset_s;
        let sequencer = Arc::new(Mutex::new(Sequencer::new(first_event, bus, self.config.sequencer.timing())));
        self.state = EngineState::Playing;
        self.bgm_bus = Some(bus);

        let scheduled = lock(&sequencer).fill(&clock);
        tracing::debug!(bus = bus.0, volume, first_event, scheduled, "background music started");

        if self.config.wakeup == WakeupMode::Thread {
            match Wakeup::spawn(sequencer.clone(), clock, self.config.sequencer.lookahead()) {
                Ok(wakeup) => self.wakeup = Some(wakeup),
                Err(err) => tracing::warn!("failed to spawn sequencer thread, waiting on tick(): {}", err),
            }
        }
        self.sequencer = Some(sequencer);
    }

    /// Start the background loop at the configured default volume.
    pub fn play_bgm_default(&mut self) {
        self.play_bgm(self.config.mix.bgm_volume);
    }

    /// Fade the background loop out and tear its bus down. Does nothing
    /// unless playing.
    pub fn stop_bgm(&mut self) {
        if self.state != EngineState::Playing {
            return;
        }
        if let Some(wakeup) = self.wakeup.take() {
            wakeup.cancel();
        }
        self.state = EngineState::Idle;

        let (Some(clock), Some(bus)) = (self.clock.as_ref(), self.bgm_bus.take()) else {
            return;
        };
        let mix = &self.config.mix;
        let now = clock.current_time();
        clock.submit(Command::FadeBus { bus, to: 0.0, at: now, over: mix.fade_out_s });
        clock.submit(Command::CloseBus { bus, at: now + mix.teardown_delay_s });
        tracing::debug!(bus = bus.0, at = now, "background music stopped");
    }

    /// Run one scheduler drain. In manual wake-up mode the host calls this
    /// from its own loop at roughly the lookahead period.
    pub fn tick(&mut self) {
        if self.state != EngineState::Playing {
            return;
        }
        if let (Some(clock), Some(sequencer)) = (self.clock.as_ref(), self.sequencer.as_ref()) {
            lock(sequencer).fill(clock);
        }
    }

    /// Fire a one-shot effect now on the master bus.
    pub fn play_sfx(&mut self, sfx: Sfx, volume: f32) {
        if let Some(clock) = self.clock.as_ref() {
            clock.submit(Command::Voice(sfx.render(clock.current_time(), volume)));
        }
    }

    pub fn play_shoot(&mut self, volume: f32) {
        self.play_sfx(Sfx::Shoot, volume);
    }

    pub fn play_hit(&mut self, volume: f32) {
        self.play_sfx(Sfx::Hit, volume);
    }

    pub fn play_miss(&mut self, volume: f32) {
        self.play_sfx(Sfx::Miss, volume);
    }

    /// Set the master level now, or for the next `init` when no device is open.
    pub fn set_master_volume(&mut self, level: f32) {
        self.master_level = level;
        if let Some(clock) = self.clock.as_ref() {
            clock.submit(Command::SetMasterLevel(level));
        }
    }

    /// Stop everything and release the device.
    pub fn shutdown(&mut self) {
        self.stop_bgm();
        if let Some(wakeup) = self.wakeup.take() {
            wakeup.cancel();
        }
        self.sequencer = None;
        self.clock = None;
        if self.output.take().is_some() {
            tracing::info!("sound engine shut down");
        }
        self.state = EngineState::Uninitialized;
    }
}

impl<O: AudioOutput> Default for SoundEngine<O> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SoundEngine<OfflineOutput> {
        SoundEngine::new(EngineConfig::manual())
    }

    #[test]
    fn starts_uninitialized() {
        let engine = engine();
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert_eq!(engine.current_time(), None);
        assert_eq!(engine.beat_index(), None);
    }

    #[test]
    fn play_bgm_initializes_implicitly() {
        let mut engine = engine();
        engine.play_bgm_default();
        assert_eq!(engine.state(), EngineState::Playing);
        assert_eq!(engine.output().map(|o| o.with_mixer(|m| m.bus_gain(BusId(1)))), Some(Some(0.05)));
    }

    #[test]
    fn buses_are_never_reused() {
        let mut engine = engine();
        engine.play_bgm(0.1);
        engine.stop_bgm();
        engine.play_bgm(0.1);
        let buses = engine.output().map(|o| o.with_mixer(|m| (m.has_bus(BusId(1)), m.has_bus(BusId(2)))));
        assert_eq!(buses, Some((true, true)));
        assert_eq!(engine.bgm_bus, Some(BusId(2)));
    }

    #[test]
    fn master_volume_before_init_is_kept() {
        let mut engine = engine();
        engine.set_master_volume(0.2);
        engine.init();
        assert_eq!(engine.output().map(|o| o.with_mixer(|m| m.master_level())), Some(0.2));
        engine.set_master_volume(0.7);
        assert_eq!(engine.output().map(|o| o.with_mixer(|m| m.master_level())), Some(0.7));
    }

    #[test]
    fn stopped_session_reports_where_it_stopped() {
        let mut engine = engine();
        engine.play_bgm(0.1);
        engine.render_seconds(1.0);
        let beat = engine.beat_index();
        let next = engine.next_event_time();
        engine.stop_bgm();
        engine.render_seconds(0.5);
        assert_eq!(engine.beat_index(), beat);
        assert_eq!(engine.next_event_time(), next);
        engine.tick();
        assert_eq!(engine.beat_index(), beat, "a stopped session never advances");
    }

    #[test]
    fn shutdown_returns_to_uninitialized() {
        let mut engine = engine();
        engine.play_bgm(0.1);
        engine.shutdown();
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(engine.output().is_none());
        engine.play_hit(1.0);
        engine.tick();
    }

    #[test]
    fn thread_mode_keeps_scheduling() {
        let mut engine: SoundEngine<OfflineOutput> = SoundEngine::default();
        engine.play_bgm(0.1);
        assert!(engine.wakeup.is_some());
        engine.stop_bgm();
        assert!(engine.wakeup.is_none());
        assert_eq!(engine.state(), EngineState::Idle);
    }
}
