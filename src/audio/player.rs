use super::voice::Voice;
use anyhow::{anyhow, Result};
use chordquiz_core::theory::frequency;
use chordquiz_core::{AudioSettings, Note, PlaybackPreset};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::{Arc, Mutex};

/// Voices currently sounding, shared with the output callback
#[derive(Default)]
pub struct AudioState {
    pub voices: Vec<Voice>,
}

/// Open output stream mixing sine voices
pub struct AudioPlayer {
    // Playback stops when the stream is dropped
    _stream: Stream,
    state: Arc<Mutex<AudioState>>,
    sample_rate: f32,
}

impl AudioPlayer {
    /// Open the default output device and start the stream
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;
        let config = device.default_output_config()?;

        let sample_format = config.sample_format();
        let config: StreamConfig = config.into();
        let sample_rate = config.sample_rate.0 as f32;

        let state = Arc::new(Mutex::new(AudioState::default()));
        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, state.clone())?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, state.clone())?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, state.clone())?,
            _ => return Err(anyhow!("Unsupported sample format: {:?}", sample_format)),
        };
        stream
            .play()
            .map_err(|e| anyhow!("Failed to play stream: {}", e))?;

        log::info!(
            "Audio output opened: {} Hz, {} channels, {:?}",
            config.sample_rate.0,
            config.channels,
            sample_format
        );
        Ok(AudioPlayer {
            _stream: stream,
            state,
            sample_rate,
        })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        state: Arc<Mutex<AudioState>>,
    ) -> Result<Stream>
    where
        T: Sample + SizedSample + Send + 'static + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;
        let err_fn = |err| log::error!("Output audio stream error: {:?}", err);

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut state) = state.lock() else {
                        data.fill(T::EQUILIBRIUM);
                        return;
                    };

                    for frame in data.chunks_mut(channels) {
                        let mixed = mix(&mut state.voices);
                        let value: T = cpal::Sample::from_sample(mixed);
                        for sample in frame.iter_mut() {
                            *sample = value;
                        }
                    }
                    state.voices.retain(|v| !v.is_finished());
                },
                err_fn,
                None,
            )
            .map_err(|e| anyhow!("Failed to build output stream: {}", e))?;

        Ok(stream)
    }

    /// Start voices for `(frequency, gain)` pairs
    pub fn start_voices(&self, voices: &[(f32, f32)], duration_secs: f32) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| anyhow!("Failed to lock audio state: {}", e))?;
        for &(freq, gain) in voices {
            state
                .voices
                .push(Voice::new(freq, gain, duration_secs, self.sample_rate));
        }
        Ok(())
    }

    /// Silence everything that is sounding
    pub fn stop_all(&self) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| anyhow!("Failed to lock audio state: {}", e))?;
        state.voices.clear();
        Ok(())
    }
}

/// Sum one sample from every voice, clamped to [-1, 1]
fn mix(voices: &mut [Voice]) -> f32 {
    voices
        .iter_mut()
        .map(Voice::next_sample)
        .sum::<f32>()
        .clamp(-1.0, 1.0)
}

/// Frequencies and gains for the notes to play. Notes without a frequency
/// are skipped.
pub fn plan_voices(notes: &[Note], preset: PlaybackPreset, settings: &AudioSettings) -> Vec<(f32, f32)> {
    let gain = settings.effective_gain(preset.gain);
    notes
        .iter()
        .filter_map(|note| {
            let freq = frequency(note.name());
            if freq <= 0.0 {
                log::warn!("Not playing {}: no frequency", note);
                return None;
            }
            Some((freq, gain))
        })
        .collect()
}

enum Device {
    Uninitialized,
    Ready(AudioPlayer),
    Unavailable,
}

/// Audio front end for the quiz.
///
/// Owns the volume settings and opens the output device on first use.
/// If the device can't be opened the failure is reported once and every
/// later call is a silent no-op.
pub struct AudioPlayerHandle {
    settings: AudioSettings,
    enabled: bool,
    device: Device,
}

impl AudioPlayerHandle {
    pub fn new(settings: AudioSettings) -> Self {
        Self {
            settings,
            enabled: true,
            device: Device::Uninitialized,
        }
    }

    /// A handle that never touches an audio device
    pub fn disabled(settings: AudioSettings) -> Self {
        Self {
            settings,
            enabled: false,
            device: Device::Unavailable,
        }
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut AudioSettings {
        &mut self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open the output device if that hasn't been tried yet.
    ///
    /// Returns the error only the first time opening fails.
    pub fn ensure_ready(&mut self) -> Result<bool> {
        match self.device {
            Device::Ready(_) => Ok(true),
            Device::Unavailable => Ok(false),
            Device::Uninitialized => match AudioPlayer::new() {
                Ok(player) => {
                    self.device = Device::Ready(player);
                    Ok(true)
                }
                Err(e) => {
                    self.device = Device::Unavailable;
                    Err(e.context("Audio unavailable, continuing without sound"))
                }
            },
        }
    }

    fn play(&mut self, notes: &[Note], preset: PlaybackPreset) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let voices = plan_voices(notes, preset, &self.settings);
        if voices.is_empty() || !self.ensure_ready()? {
            return Ok(());
        }
        if let Device::Ready(player) = &self.device {
            player.start_voices(&voices, preset.duration_secs)?;
        }
        Ok(())
    }

    /// Fire-and-forget single note
    pub fn play_note(&mut self, note: Note, preset: PlaybackPreset) -> Result<()> {
        self.play(&[note], preset)
    }

    /// Fire-and-forget chord, all notes at once
    pub fn play_chord(&mut self, notes: &[Note], preset: PlaybackPreset) -> Result<()> {
        self.play(notes, preset)
    }

    pub fn stop(&mut self) -> Result<()> {
        match &self.device {
            Device::Ready(player) => player.stop_all(),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(names: &[&str]) -> Vec<Note> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[test]
    fn test_plan_voices_applies_volume() {
        let settings = AudioSettings::new(0.5, true);
        let voices = plan_voices(&notes(&["A", "Db"]), PlaybackPreset::CHORD, &settings);
        assert_eq!(voices.len(), 2);
        assert!((voices[0].0 - 440.0).abs() < 0.01);
        assert!((voices[1].0 - 277.18).abs() < 0.01);
        assert!(voices.iter().all(|&(_, gain)| (gain - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_mix_is_clamped() {
        let mut voices: Vec<Voice> = (0..8)
            .map(|_| Voice::new(100.0, 1.0, 1.0, 1000.0))
            .collect();
        for _ in 0..500 {
            let sample = mix(&mut voices);
            assert!((-1.0..=1.0).contains(&sample));
        }
    }

    #[test]
    fn test_disabled_handle_is_silent() {
        let mut handle = AudioPlayerHandle::disabled(AudioSettings::default());
        assert!(!handle.is_enabled());
        assert!(handle.play_chord(&notes(&["C", "E", "G"]), PlaybackPreset::CHORD).is_ok());
        assert!(handle.play_note(notes(&["C"])[0], PlaybackPreset::SINGLE_NOTE).is_ok());
        assert!(!handle.ensure_ready().unwrap());
        assert!(handle.stop().is_ok());
    }

    #[test]
    fn test_audio_player_creation() {
        // May fail on machines without an audio device
        match AudioPlayer::new() {
            Ok(player) => assert!(player.stop_all().is_ok()),
            Err(e) => println!("AudioPlayer creation failed - likely no audio device: {}", e),
        }
    }
}
