//! CPAL-based audio output backend.
//!
//! The device callback owns the `Mixer`. The control side reaches it only
//! through a lock-free command ring and reads the clock from a shared frame
//! counter, so the callback never waits on anything.

use bb_engine::{AudioClock, Mixer};
use bb_ir::{frames_to_seconds, Command};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::{AudioError, AudioOutput, OutputConfig};

/// CPAL-based audio output.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Stream,
    clock: CpalClock,
    suspended: bool,
}

/// Clock handle for a [`CpalOutput`].
#[derive(Clone)]
pub struct CpalClock {
    producer: Arc<Mutex<HeapProd<Command>>>,
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl CpalOutput {
    /// Name of the device in use, if the host reports one.
    pub fn device_name(&self) -> Option<String> {
        self.device.name().ok()
    }
}

/// Build the device callback: apply pending commands, then render.
fn build_stream(
    device: &Device,
    config: &StreamConfig,
    mut mixer: Mixer,
    mut commands: HeapCons<Command>,
    frames: Arc<AtomicU64>,
) -> Result<Stream, AudioError> {
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                while let Some(command) = commands.try_pop() {
                    mixer.apply(command);
                }

                for chunk in data.chunks_mut(channels) {
                    let frame = mixer.render_frame();
                    let left = frame.left_f32();
                    let right = frame.right_f32();
                    // Write stereo pair; zero-fill any extra channels
                    for (i, sample) in chunk.iter_mut().enumerate() {
                        *sample = match i {
                            0 => left,
                            1 => right,
                            _ => 0.0,
                        };
                    }
                }

                frames.store(mixer.position(), Ordering::Release);
            },
            |err| tracing::error!("audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::StreamCreate(e.to_string()))
}

impl AudioOutput for CpalOutput {
    type Clock = CpalClock;

    fn open(config: &OutputConfig) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let default_config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut stream_config: StreamConfig = default_config.into();
        // Force stereo output — the stream callback assumes 2-channel interleaving
        stream_config.channels = 2;
        if let Some(rate) = config.sample_rate {
            stream_config.sample_rate = cpal::SampleRate(rate);
        }
        let sample_rate = stream_config.sample_rate.0;

        let mut mixer = Mixer::new(sample_rate);
        mixer.apply(Command::SetMasterLevel(config.master_level));

        let rb = HeapRb::<Command>::new(config.command_capacity.max(1));
        let (producer, consumer) = rb.split();
        let frames = Arc::new(AtomicU64::new(0));

        let stream = build_stream(&device, &stream_config, mixer, consumer, frames.clone())?;
        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;

        tracing::info!(
            device = %device.name().unwrap_or_default(),
            sample_rate,
            "audio output opened"
        );

        Ok(Self {
            device,
            config: stream_config,
            stream,
            clock: CpalClock { producer: Arc::new(Mutex::new(producer)), frames, sample_rate },
            suspended: false,
        })
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn clock(&self) -> CpalClock {
        self.clock.clone()
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        self.stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.suspended = true;
        Ok(())
    }
}

impl CpalClock {
    /// Push a command, reporting a full queue instead of waiting.
    pub fn try_submit(&self, command: Command) -> Result<(), AudioError> {
        let mut producer = self.producer.lock().unwrap_or_else(PoisonError::into_inner);
        producer.try_push(command).map_err(|_| AudioError::QueueFull)
    }
}

impl AudioClock for CpalClock {
    fn current_time(&self) -> f64 {
        frames_to_seconds(self.frames.load(Ordering::Acquire), self.sample_rate)
    }

    fn submit(&self, command: Command) {
        if let Err(e) = self.try_submit(command) {
            tracing::warn!("dropping audio command: {}", e);
        }
    }
}
