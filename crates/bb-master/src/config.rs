//! Engine configuration, loadable from TOML.

use bb_audio::OutputConfig;
use bb_engine::Timing;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Errors raised while loading or checking a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequencerConfig {
    #[serde(default = "SequencerConfig::default_tempo_bpm")]
    pub tempo_bpm: f64,
    /// Wake-up period of the scheduler loop.
    #[serde(default = "SequencerConfig::default_lookahead_ms")]
    pub lookahead_ms: u64,
    /// How far ahead of the clock each wake-up schedules.
    #[serde(default = "SequencerConfig::default_schedule_ahead_s")]
    pub schedule_ahead_s: f64,
    /// Delay between `play_bgm` and the first beat.
    #[serde(default = "SequencerConfig::default_start_offset_s")]
    pub start_offset_s: f64,
}

impl SequencerConfig {
    fn default_tempo_bpm() -> f64 {
        110.0
    }
    fn default_lookahead_ms() -> u64 {
        25
    }
    fn default_schedule_ahead_s() -> f64 {
        0.1
    }
    fn default_start_offset_s() -> f64 {
        0.1
    }

    pub fn lookahead(&self) -> Duration {
        Duration::from_millis(self.lookahead_ms)
    }

    pub fn timing(&self) -> Timing {
        Timing { tempo_bpm: self.tempo_bpm, schedule_ahead: self.schedule_ahead_s }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: Self::default_tempo_bpm(),
            lookahead_ms: Self::default_lookahead_ms(),
            schedule_ahead_s: Self::default_schedule_ahead_s(),
            start_offset_s: Self::default_start_offset_s(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MixConfig {
    #[serde(default = "MixConfig::default_master_level")]
    pub master_level: f32,
    /// Music level used when the caller does not pick one.
    #[serde(default = "MixConfig::default_bgm_volume")]
    pub bgm_volume: f32,
    #[serde(default = "MixConfig::default_fade_out_s")]
    pub fade_out_s: f32,
    /// Delay after `stop_bgm` before the music bus is torn down.
    #[serde(default = "MixConfig::default_teardown_delay_s")]
    pub teardown_delay_s: f64,
}

impl MixConfig {
    fn default_master_level() -> f32 {
        0.5
    }
    fn default_bgm_volume() -> f32 {
        0.05
    }
    fn default_fade_out_s() -> f32 {
        0.1
    }
    fn default_teardown_delay_s() -> f64 {
        0.2
    }
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            master_level: Self::default_master_level(),
            bgm_volume: Self::default_bgm_volume(),
            fade_out_s: Self::default_fade_out_s(),
            teardown_delay_s: Self::default_teardown_delay_s(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSection {
    /// Device sample rate; the device default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default = "OutputSection::default_command_capacity")]
    pub command_capacity: usize,
}

impl OutputSection {
    fn default_command_capacity() -> usize {
        1024
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self { sample_rate: None, command_capacity: Self::default_command_capacity() }
    }
}

/// Who drives the scheduler's wake-ups.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WakeupMode {
    /// A background thread wakes every `lookahead_ms`.
    #[default]
    Thread,
    /// The host calls `SoundEngine::tick` from its own loop.
    Manual,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub sequencer: SequencerConfig,
    #[serde(default)]
    pub mix: MixConfig,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub wakeup: WakeupMode,
}

impl EngineConfig {
    /// Default settings driven by `tick` instead of a thread.
    pub fn manual() -> Self {
        Self { wakeup: WakeupMode::Manual, ..Self::default() }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path`, falling back to defaults when it is missing or broken.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("no config at {}. Using defaults.", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!("{}. Using defaults.", err);
                Self::default()
            }
        }
    }

    /// Check the invariants the scheduler depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let seq = &self.sequencer;
        if !seq.tempo_bpm.is_finite() || seq.tempo_bpm <= 0.0 {
            return Err(ConfigError::Invalid(format!("tempo_bpm must be positive, got {}", seq.tempo_bpm)));
        }
        if seq.lookahead_ms == 0 {
            return Err(ConfigError::Invalid("lookahead_ms must be non-zero".into()));
        }
        if seq.schedule_ahead_s <= seq.lookahead().as_secs_f64() {
            return Err(ConfigError::Invalid(format!(
                "schedule_ahead_s ({}) must exceed the lookahead period ({} ms)",
                seq.schedule_ahead_s, seq.lookahead_ms
            )));
        }
        if seq.start_offset_s < 0.0 {
            return Err(ConfigError::Invalid("start_offset_s must not be negative".into()));
        }
        if self.output.command_capacity == 0 {
            return Err(ConfigError::Invalid("command_capacity must be non-zero".into()));
        }
        Ok(())
    }

    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            sample_rate: self.output.sample_rate,
            master_level: self.mix.master_level,
            command_capacity: self.output.command_capacity,
        }
    }
}
