//! Audio configuration types
//!
//! Pure data with no synthesis logic: playback presets, the note envelope
//! shape and the user's volume settings. The synthesizer lives in the
//! front-end crate and only reads these.

use std::time::Duration;

/// Duration and peak gain for one kind of playback
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackPreset {
    pub duration_secs: f32,
    pub gain: f32,
}

impl PlaybackPreset {
    /// Quiz question / learn mode chord
    pub const CHORD: PlaybackPreset = PlaybackPreset {
        duration_secs: 0.8,
        gain: 0.5,
    };

    /// Key press feedback
    pub const SINGLE_NOTE: PlaybackPreset = PlaybackPreset {
        duration_secs: 0.2,
        gain: 0.4,
    };

    pub fn new(duration_secs: f32, gain: f32) -> Self {
        Self {
            duration_secs: duration_secs.max(0.0),
            gain: gain.clamp(0.0, 1.0),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f32(self.duration_secs)
    }
}

/// Attack/release shape applied to every voice.
///
/// The level starts at `floor`, ramps linearly to the peak gain over
/// `attack_secs`, then ramps linearly back to `floor` at the end of the
/// preset duration. The voice is dropped `tail_secs` after that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack_secs: f32,
    pub floor: f32,
    pub tail_secs: f32,
}

impl Envelope {
    /// Amplitude at `t` seconds into a note of `duration` seconds
    pub fn level_at(&self, t: f32, duration: f32, peak: f32) -> f32 {
        if t < 0.0 || t >= duration + self.tail_secs {
            return 0.0;
        }
        if t < self.attack_secs {
            return self.floor + (peak - self.floor) * (t / self.attack_secs);
        }
        if t < duration {
            let release_len = (duration - self.attack_secs).max(f32::EPSILON);
            let progress = (t - self.attack_secs) / release_len;
            return peak + (self.floor - peak) * progress;
        }
        self.floor
    }

    /// Total lifetime of a voice playing for `duration` seconds
    pub fn lifetime(&self, duration: f32) -> f32 {
        duration + self.tail_secs
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack_secs: 0.02,
            floor: 0.001,
            tail_secs: 0.1,
        }
    }
}

/// User-facing audio settings, owned by whoever drives the quiz
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettings {
    volume: f32,
    /// Play each new question's chord automatically
    pub auto_play: bool,
}

impl AudioSettings {
    pub const DEFAULT_VOLUME: f32 = 0.5;

    pub fn new(volume: f32, auto_play: bool) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            auto_play,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the master volume, clamped to [0, 1]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            Self::DEFAULT_VOLUME
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    /// Gain actually sent to the synthesizer for a requested gain
    pub fn effective_gain(&self, requested: f32) -> f32 {
        requested * self.volume
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: Self::DEFAULT_VOLUME,
            auto_play: true,
        }
    }
}
