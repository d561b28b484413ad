//! Facade behaviour: lifecycle, idempotence and failure handling.

use bb_audio::{AudioError, AudioOutput, OutputConfig};
use bb_engine::AudioClock;
use bb_ir::{BusId, Command};
use bb_master::{EngineConfig, EngineState, Frame, OfflineOutput, SoundEngine};

fn engine() -> SoundEngine<OfflineOutput> {
    SoundEngine::new(EngineConfig::manual())
}

fn bus_count(engine: &SoundEngine<OfflineOutput>) -> usize {
    engine.output().map_or(0, |o| o.with_mixer(|m| m.bus_count()))
}

fn peak(frames: &[Frame]) -> i16 {
    frames.iter().map(Frame::peak).max().unwrap_or(0)
}

/// An output whose device never opens.
struct NoDevice;

#[derive(Clone)]
struct DeadClock;

impl AudioClock for DeadClock {
    fn current_time(&self) -> f64 {
        0.0
    }

    fn submit(&self, _command: Command) {
        panic!("nothing may be submitted without a device");
    }
}

impl AudioOutput for NoDevice {
    type Clock = DeadClock;

    fn open(_config: &OutputConfig) -> Result<Self, AudioError> {
        Err(AudioError::NoDevice)
    }

    fn sample_rate(&self) -> u32 {
        0
    }

    fn clock(&self) -> DeadClock {
        DeadClock
    }

    fn is_suspended(&self) -> bool {
        false
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

#[test]
fn init_is_idempotent() {
    let mut engine = engine();
    engine.init();
    engine.render_seconds(0.1);
    let time = engine.current_time();
    engine.init();
    engine.init();
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(engine.current_time(), time, "re-init must not reopen the device");
}

#[test]
fn double_play_creates_one_bus() {
    let mut engine = engine();
    engine.play_bgm(0.05);
    let beat = engine.beat_index();
    let next = engine.next_event_time();
    engine.play_bgm(0.05);
    assert_eq!(bus_count(&engine), 1);
    assert_eq!(engine.beat_index(), beat);
    assert_eq!(engine.next_event_time(), next);
}

#[test]
fn stop_without_play_is_a_no_op() {
    let mut engine = engine();
    engine.stop_bgm();
    assert_eq!(engine.state(), EngineState::Uninitialized);
    engine.init();
    engine.stop_bgm();
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(bus_count(&engine), 0);
}

#[test]
fn restart_resets_beat_and_first_event() {
    let mut engine = engine();
    engine.play_bgm(0.05);
    engine.render_seconds(1.0);
    assert!(engine.beat_index().unwrap_or(0) > 0);

    engine.stop_bgm();
    engine.render_seconds(0.5);
    let restart = engine.current_time().unwrap_or(-1.0);
    engine.play_bgm(0.05);

    assert_eq!(engine.state(), EngineState::Playing);
    assert_eq!(engine.beat_index(), Some(0));
    let first = engine.next_event_time().unwrap_or(0.0);
    assert!((first - (restart + 0.1)).abs() < 1e-9, "first event at {}", first);
}

#[test]
fn immediate_restart_survives_old_teardown() {
    let mut engine = engine();
    engine.play_bgm(0.5);
    engine.render_seconds(1.0);
    engine.stop_bgm();
    let restart = engine.current_time().unwrap_or(-1.0);
    engine.play_bgm(0.5);

    assert_eq!(engine.beat_index(), Some(0));
    assert_eq!(engine.next_event_time(), Some(restart + 0.1));

    // Past the old bus's teardown at restart + 0.2 s.
    let frames = engine.render_seconds(1.0);
    assert!(peak(&frames[frames.len() / 2..]) > 500, "new session must stay audible");
    let buses = engine.output().map(|o| o.with_mixer(|m| (m.has_bus(BusId(1)), m.has_bus(BusId(2)))));
    assert_eq!(buses, Some((false, true)));
}

#[test]
fn rapid_toggling_leaves_one_live_bus() {
    let mut engine = engine();
    for _ in 0..10 {
        engine.play_bgm(0.5);
        engine.stop_bgm();
    }
    engine.play_bgm(0.5);
    let frames = engine.render_seconds(1.0);
    assert!(peak(&frames[frames.len() / 2..]) > 500);
    assert_eq!(bus_count(&engine), 1);
}

#[test]
fn stop_fades_and_tears_down_the_bus() {
    let mut engine = engine();
    engine.play_bgm(0.05);
    engine.render_seconds(0.5);
    engine.stop_bgm();
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(bus_count(&engine), 1, "bus lives on while fading");

    engine.render_seconds(0.25);
    assert_eq!(bus_count(&engine), 0);
    let music = engine.output().map_or(usize::MAX, |o| o.with_mixer(|m| m.voices_on(BusId(1))));
    assert_eq!(music, 0);
}

#[test]
fn failed_init_leaves_every_call_silent() {
    let mut engine = SoundEngine::<NoDevice>::new(EngineConfig::manual());
    engine.init();
    assert_eq!(engine.state(), EngineState::Uninitialized);

    engine.play_bgm(0.05);
    engine.play_bgm_default();
    engine.play_shoot(1.0);
    engine.play_hit(1.0);
    engine.play_miss(1.0);
    engine.set_master_volume(0.3);
    engine.tick();
    engine.stop_bgm();
    engine.shutdown();

    assert_eq!(engine.state(), EngineState::Uninitialized);
    assert_eq!(engine.beat_index(), None);
}

#[test]
fn sfx_before_init_is_dropped() {
    let mut engine = engine();
    engine.play_hit(1.0);
    engine.play_shoot(1.0);
    assert!(engine.output().is_none());
    let frames = engine.render_seconds(0.2);
    assert_eq!(peak(&frames), 0);
}

#[test]
fn sfx_volume_scales_output() {
    let render = |volume: f32| {
        let mut engine = engine();
        engine.init();
        engine.play_hit(volume);
        peak(&engine.render_seconds(0.1)) as f32
    };
    let full = render(1.0);
    let half = render(0.5);
    assert!(full > 0.0);
    assert!((half / full - 0.5).abs() < 0.01, "ratio {}", half / full);
}

#[test]
fn sfx_play_alongside_music() {
    let mut engine = engine();
    engine.play_bgm(0.05);
    engine.play_miss(1.0);
    assert_eq!(engine.output().map(|o| o.with_mixer(|m| m.voices_on(BusId::MASTER))), Some(1));
    assert_eq!(engine.state(), EngineState::Playing);
}

#[test]
fn init_resumes_a_suspended_output() {
    let mut engine = engine();
    engine.init();
    if let Some(output) = engine.output_mut() {
        output.suspend().expect("suspend offline output");
    }
    assert_eq!(engine.output().map(|o| o.is_suspended()), Some(true));

    engine.init();
    assert_eq!(engine.output().map(|o| o.is_suspended()), Some(false));
    assert_eq!(engine.render_seconds(0.05).len(), 2_205);
}

#[test]
fn shutdown_releases_the_device() {
    let mut engine = engine();
    engine.play_bgm(0.05);
    engine.shutdown();
    assert_eq!(engine.state(), EngineState::Uninitialized);
    assert!(engine.output().is_none());
    engine.init();
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(engine.current_time(), Some(0.0), "a fresh device starts its clock at zero");
}
