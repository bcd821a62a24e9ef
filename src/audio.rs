//! Procedural music and cues
//!
//! Each level has an ambient theme: random notes from a level-specific scale,
//! scheduled slightly ahead of the audio clock. No external files needed.
//!
//! `MusicSequencer` decides *what* to play and is pure. `AudioManager`
//! (wasm only) turns its notes into Web Audio oscillators.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// How far ahead of the audio clock notes are scheduled (seconds)
pub const LOOKAHEAD_SECS: f64 = 0.1;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Triangle,
    Square,
    Sawtooth,
}

/// Musical settings for one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTheme {
    /// Scale frequencies (Hz)
    pub scale: &'static [f32],
    /// Seconds per step
    pub step_secs: f64,
    pub waveform: Waveform,
    /// Peak note gain before volume settings
    pub gain: f32,
}

// C minor pentatonic
const SCALE_GENESIS: [f32; 6] = [130.81, 155.56, 174.61, 196.00, 233.08, 261.63];
// G major
const SCALE_BULL_RUN: [f32; 6] = [196.00, 246.94, 293.66, 392.00, 493.88, 587.33];
// Diminished cluster
const SCALE_CHAOS: [f32; 7] = [110.00, 116.54, 123.47, 130.81, 155.56, 311.13, 622.25];

impl LevelTheme {
    pub fn for_level(level: u32) -> Self {
        match level {
            0 | 1 => Self {
                scale: &SCALE_GENESIS,
                step_secs: 0.4,
                waveform: Waveform::Triangle,
                gain: 0.1,
            },
            2 => Self {
                scale: &SCALE_BULL_RUN,
                step_secs: 0.25,
                waveform: Waveform::Square,
                gain: 0.05,
            },
            _ => Self {
                scale: &SCALE_CHAOS,
                step_secs: 0.15,
                waveform: Waveform::Sawtooth,
                gain: 0.04,
            },
        }
    }
}

/// A note ready to hand to the synth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Audio-clock start time (seconds)
    pub time: f64,
    pub freq: f32,
    pub duration: f64,
    pub waveform: Waveform,
    pub gain: f32,
}

/// Note scheduler for the level themes
#[derive(Debug, Clone)]
pub struct MusicSequencer {
    level: u32,
    playing: bool,
    next_note_time: f64,
    rng: Pcg32,
}

impl MusicSequencer {
    pub fn new(seed: u64) -> Self {
        Self {
            level: 1,
            playing: false,
            next_note_time: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Switch to `level`'s theme and start playing if stopped
    ///
    /// Returns false if music was already running; the theme still switches
    /// from the next note on.
    pub fn start(&mut self, level: u32, now: f64) -> bool {
        self.level = level;
        if self.playing {
            return false;
        }
        self.playing = true;
        self.next_note_time = now + LOOKAHEAD_SECS;
        true
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Notes that start before `now + LOOKAHEAD_SECS`
    pub fn schedule(&mut self, now: f64) -> Vec<Note> {
        let mut notes = Vec::new();
        if !self.playing {
            return notes;
        }

        // Throttled tab: skip the backlog instead of bursting it out
        if self.next_note_time < now - 1.0 {
            self.next_note_time = now + LOOKAHEAD_SECS;
        }

        let theme = LevelTheme::for_level(self.level);
        while self.next_note_time < now + LOOKAHEAD_SECS {
            let index = self.rng.random_range(0..theme.scale.len());
            let mut freq = theme.scale[index];
            if self.rng.random::<f32>() > 0.8 {
                freq *= 2.0;
            }
            if self.rng.random::<f32>() > 0.9 {
                freq /= 2.0;
            }

            notes.push(Note {
                time: self.next_note_time,
                freq,
                duration: theme.step_secs,
                waveform: theme.waveform,
                gain: theme.gain,
            });

            let rhythm = if self.rng.random::<f32>() > 0.7 { 2.0 } else { 1.0 };
            self.next_note_time += theme.step_secs * rhythm;
        }
        notes
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{MusicSequencer, Note, Waveform};
    use crate::settings::Settings;

    impl From<Waveform> for OscillatorType {
        fn from(w: Waveform) -> Self {
            match w {
                Waveform::Triangle => OscillatorType::Triangle,
                Waveform::Square => OscillatorType::Square,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
            }
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        sequencer: MusicSequencer,
        music_gain: f32,
        sfx_gain: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings, seed: u64) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                sequencer: MusicSequencer::new(seed),
                music_gain: settings.music_gain(),
                sfx_gain: settings.sfx_gain(),
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.music_gain = settings.music_gain();
            self.sfx_gain = settings.sfx_gain();
        }

        /// Mute everything until settings are applied again
        pub fn silence(&mut self) {
            self.music_gain = 0.0;
            self.sfx_gain = 0.0;
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                if ctx.state() == web_sys::AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
        }

        fn now(&self) -> f64 {
            self.ctx.as_ref().map_or(0.0, |c| c.current_time())
        }

        /// Start (or retheme) the ambient music. Calling it while music is
        /// already playing never stacks a second sequence.
        pub fn start_level_music(&mut self, level: u32) {
            self.resume();
            let now = self.now();
            if self.sequencer.start(level, now) {
                log::info!("Music started (level {} theme)", level);
            }
        }

        pub fn stop_music(&mut self) {
            self.sequencer.stop();
        }

        /// Schedule upcoming notes; call every frame
        pub fn pump(&mut self) {
            let Some(ctx) = &self.ctx else { return };
            let notes = self.sequencer.schedule(ctx.current_time());
            if self.music_gain <= 0.0 {
                return;
            }
            for note in notes {
                self.play_note(ctx, &note);
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_note(&self, ctx: &AudioContext, note: &Note) {
            let Some((osc, gain)) = self.create_osc(ctx, note.freq, note.waveform.into()) else {
                return;
            };
            let t = note.time;
            let peak = note.gain * self.music_gain;

            osc.frequency().set_value_at_time(note.freq, t).ok();
            // Short attack, exponential decay
            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain().linear_ramp_to_value_at_time(peak, t + 0.05).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + note.duration - 0.05)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + note.duration).ok();
        }

        /// Level cleared - rising sweep
        pub fn play_victory_cue(&self) {
            if self.sfx_gain <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            self.resume();

            let Some((osc, gain)) = self.create_osc(ctx, 440.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            osc.frequency().set_value_at_time(440.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(880.0, t + 0.1)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(1760.0, t + 0.3)
                .ok();

            gain.gain().set_value_at_time(0.1 * self.sfx_gain, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.8)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.8).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_themes_by_level() {
        assert_eq!(LevelTheme::for_level(1).waveform, Waveform::Triangle);
        assert_eq!(LevelTheme::for_level(1).step_secs, 0.4);
        assert_eq!(LevelTheme::for_level(2).waveform, Waveform::Square);
        assert_eq!(LevelTheme::for_level(3).waveform, Waveform::Sawtooth);
        assert_eq!(LevelTheme::for_level(12), LevelTheme::for_level(3));
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut seq = MusicSequencer::new(1);
        assert!(seq.start(1, 0.0));
        assert!(!seq.start(2, 0.5));
        assert!(seq.is_playing());
        assert_eq!(seq.level(), 2);

        // One sequence only: a step of notes, not two interleaved
        let notes = seq.schedule(0.9);
        assert!(!notes.is_empty());
        assert!(notes.windows(2).all(|w| w[1].time - w[0].time >= 0.25 - 1e-9));
        assert!(notes.iter().all(|n| n.waveform == Waveform::Square));
    }

    #[test]
    fn test_stop_silences() {
        let mut seq = MusicSequencer::new(1);
        seq.start(1, 0.0);
        seq.stop();
        assert!(seq.schedule(1.0).is_empty());
        assert!(seq.start(1, 2.0));
    }

    #[test]
    fn test_lookahead_window() {
        let mut seq = MusicSequencer::new(9);
        seq.start(1, 0.0);
        // First note lands at 0.1, outside a window ending at 0.0 + 0.1
        assert!(seq.schedule(0.0).is_empty());

        let notes = seq.schedule(0.05);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].time, 0.1);
        assert_eq!(notes[0].duration, 0.4);
        assert!(seq.schedule(0.05).is_empty());
    }

    #[test]
    fn test_notes_come_from_scale() {
        let mut seq = MusicSequencer::new(3);
        seq.start(3, 0.0);
        let mut now = 0.0;
        for _ in 0..100 {
            now += 0.5;
            for note in seq.schedule(now) {
                let base = SCALE_CHAOS.iter().any(|&f| {
                    note.freq == f || note.freq == f * 2.0 || note.freq == f / 2.0
                });
                assert!(base, "unexpected frequency {}", note.freq);
                assert_eq!(note.waveform, Waveform::Sawtooth);
            }
        }
    }

    #[test]
    fn test_backlog_skipped() {
        let mut seq = MusicSequencer::new(5);
        seq.start(2, 0.0);
        assert!(seq.schedule(60.0).is_empty());
        let notes = seq.schedule(60.3);
        assert!(!notes.is_empty() && notes.len() <= 2);
        assert!((notes[0].time - 60.1).abs() < 1e-9);
    }
}
