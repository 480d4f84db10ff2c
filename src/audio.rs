//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!

use web_sys::{AudioContext, OscillatorType};

use crate::error::CollaboratorError;
use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Laser shot
    Shot,
    /// Bullet destroyed an obstacle
    Explosion,
    /// Obstacle struck the ship
    PlayerHit,
    /// Session started
    Launch,
    /// Health ran out
    GameOver,
}

impl SoundEffect {
    fn name(&self) -> &'static str {
        match self {
            SoundEffect::Shot => "shot",
            SoundEffect::Explosion => "explosion",
            SoundEffect::PlayerHit => "player_hit",
            SoundEffect::Launch => "launch",
            SoundEffect::GameOver => "game_over",
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: settings.effective_sfx_volume(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_sfx_volume();
    }

    /// Play a sound effect
    ///
    /// A missing AudioContext means audio is disabled, not an error. Failing
    /// to build nodes on a live context is reported.
    pub fn play(&self, effect: SoundEffect) -> Result<(), CollaboratorError> {
        let vol = self.volume;
        if vol <= 0.0 {
            return Ok(());
        }

        let Some(ctx) = &self.ctx else { return Ok(()) };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let played = match effect {
            SoundEffect::Shot => self.play_shot(ctx, vol),
            SoundEffect::Explosion => self.play_explosion(ctx, vol),
            SoundEffect::PlayerHit => self.play_player_hit(ctx, vol),
            SoundEffect::Launch => self.play_launch(ctx, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
        };

        played.ok_or_else(|| CollaboratorError::Notifier {
            event: effect.name(),
            reason: "could not build audio nodes".to_string(),
        })
    }

    // === Sound generators ===

    /// One oscillator voice: instant attack at `peak`, exponential decay
    /// over `length` seconds while the pitch glides from `from_hz` to `to_hz`
    #[allow(clippy::too_many_arguments)]
    fn voice(
        &self,
        ctx: &AudioContext,
        osc_type: OscillatorType,
        from_hz: f32,
        to_hz: f32,
        peak: f32,
        start: f64,
        length: f64,
    ) -> Option<()> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        osc.set_type(osc_type);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        let end = start + length;
        let freq = osc.frequency();
        freq.set_value_at_time(from_hz, start).ok()?;
        if to_hz != from_hz {
            freq.exponential_ramp_to_value_at_time(to_hz, end).ok()?;
        }
        let env = gain.gain();
        env.set_value_at_time(peak.max(0.001), start).ok()?;
        env.exponential_ramp_to_value_at_time(0.001, end).ok()?;

        osc.start_with_when(start).ok()?;
        osc.stop_with_when(end + 0.02).ok()?;
        Some(())
    }

    /// Shot - short bright zap
    fn play_shot(&self, ctx: &AudioContext, vol: f32) -> Option<()> {
        let t = ctx.current_time();
        self.voice(ctx, OscillatorType::Square, 1400.0, 300.0, vol * 0.15, t, 0.08)
    }

    /// Explosion - detuned rumble with a thump underneath
    fn play_explosion(&self, ctx: &AudioContext, vol: f32) -> Option<()> {
        let t = ctx.current_time();
        self.voice(ctx, OscillatorType::Sawtooth, 140.0, 45.0, vol * 0.35, t, 0.55)?;
        self.voice(ctx, OscillatorType::Sawtooth, 147.0, 42.0, vol * 0.25, t, 0.5)?;
        self.voice(ctx, OscillatorType::Triangle, 70.0, 35.0, vol * 0.5, t, 0.25)
    }

    /// Player hit - low crunch then a warning blip
    fn play_player_hit(&self, ctx: &AudioContext, vol: f32) -> Option<()> {
        let t = ctx.current_time();
        self.voice(ctx, OscillatorType::Sawtooth, 80.0, 40.0, vol * 0.6, t, 0.3)?;
        self.voice(ctx, OscillatorType::Square, 880.0, 880.0, vol * 0.15, t + 0.12, 0.1)
    }

    /// Launch - rising engine spool with an octave shimmer
    fn play_launch(&self, ctx: &AudioContext, vol: f32) -> Option<()> {
        let t = ctx.current_time();
        self.voice(ctx, OscillatorType::Square, 150.0, 450.0, vol * 0.12, t, 0.35)?;
        self.voice(ctx, OscillatorType::Sine, 300.0, 900.0, vol * 0.2, t + 0.05, 0.3)
    }

    /// Game over - falling three-note arpeggio, last note held
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) -> Option<()> {
        let t = ctx.current_time();
        let notes = [(523.25, 0.0, 0.25), (392.0, 0.25, 0.25), (261.63, 0.5, 0.9)];
        for (hz, offset, length) in notes {
            self.voice(ctx, OscillatorType::Triangle, hz, hz, vol * 0.3, t + offset, length)?;
        }
        Some(())
    }
}
