//! A single sine voice shaped by the note envelope

use chordquiz_core::Envelope;
use std::f32::consts::PI;

/// One sounding note: a sine oscillator with a fixed-length envelope
#[derive(Debug, Clone)]
pub struct Voice {
    frequency: f32,
    phase: f32,
    sample_rate: f32,
    gain: f32,
    duration_secs: f32,
    envelope: Envelope,
    /// Samples generated so far
    elapsed: u64,
}

impl Voice {
    pub fn new(frequency: f32, gain: f32, duration_secs: f32, sample_rate: f32) -> Self {
        Self::with_envelope(
            frequency,
            gain,
            duration_secs,
            sample_rate,
            Envelope::default(),
        )
    }

    pub fn with_envelope(
        frequency: f32,
        gain: f32,
        duration_secs: f32,
        sample_rate: f32,
        envelope: Envelope,
    ) -> Self {
        Self {
            frequency,
            phase: 0.0,
            sample_rate,
            gain,
            duration_secs,
            envelope,
            elapsed: 0,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    fn time(&self) -> f32 {
        self.elapsed as f32 / self.sample_rate
    }

    /// True once the envelope's tail has passed
    pub fn is_finished(&self) -> bool {
        self.time() >= self.envelope.lifetime(self.duration_secs)
    }

    /// Generate the next sample
    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }

        let amplitude = self
            .envelope
            .level_at(self.time(), self.duration_secs, self.gain);
        let value = (2.0 * PI * self.phase).sin() * amplitude;

        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        self.elapsed += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44100.0;

    #[test]
    fn test_voice_stays_within_gain() {
        let mut voice = Voice::new(440.0, 0.4, 0.2, SAMPLE_RATE);
        for _ in 0..(SAMPLE_RATE as usize / 2) {
            let sample = voice.next_sample();
            assert!(sample.abs() <= 0.4 + 1e-6, "sample {} above gain", sample);
        }
    }

    #[test]
    fn test_voice_finishes_after_tail() {
        let mut voice = Voice::new(261.63, 0.5, 0.8, SAMPLE_RATE);
        // 0.8s note + 0.1s tail
        let lifetime = (0.9 * SAMPLE_RATE) as usize;
        for _ in 0..lifetime - 10 {
            voice.next_sample();
        }
        assert!(!voice.is_finished());
        for _ in 0..20 {
            voice.next_sample();
        }
        assert!(voice.is_finished());
        assert_eq!(voice.next_sample(), 0.0);
    }

    #[test]
    fn test_voice_starts_quiet() {
        let mut voice = Voice::new(440.0, 0.5, 0.8, SAMPLE_RATE);
        // Phase 0 and the attack floor: the first samples are tiny
        assert!(voice.next_sample().abs() < 1e-3);
        assert_eq!(voice.frequency(), 440.0);
    }
}
