//! Obstacle spawner
//!
//! Runs on the host's millisecond clock, not on simulation ticks, so it keeps
//! spawning at the same cadence no matter how many frames are dropped.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::ObstacleKind;
use crate::host::AssetProvider;
use crate::tuning::Tuning;

/// An armed repeating timer. Dropping the handle is the only way to stop it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnTimer {
    interval_ms: f64,
    next_due_ms: f64,
}

impl SpawnTimer {
    /// First firing is one full interval after `now_ms`
    pub fn new(now_ms: f64, interval_ms: f64) -> Self {
        Self {
            interval_ms,
            next_due_ms: now_ms + interval_ms,
        }
    }

    pub fn next_due_ms(&self) -> f64 {
        self.next_due_ms
    }

    /// Count firings due at `now_ms` (at most `max`) and advance.
    ///
    /// Intervals beyond `max` are dropped rather than queued, so a long stall
    /// does not dump a wall of obstacles on the player.
    pub fn poll(&mut self, now_ms: f64, max: u32) -> u32 {
        if now_ms < self.next_due_ms {
            return 0;
        }
        let elapsed = ((now_ms - self.next_due_ms) / self.interval_ms).floor() as u64 + 1;
        self.next_due_ms += elapsed as f64 * self.interval_ms;
        elapsed.min(max as u64) as u32
    }
}

/// What to spawn and where
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    pub kind: ObstacleKind,
    pub position: Vec3,
    pub spin: Vec3,
}

#[derive(Debug, Clone)]
pub struct Spawner {
    timer: Option<SpawnTimer>,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            timer: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Arm (or re-arm) the interval timer
    pub fn arm(&mut self, now_ms: f64, interval_ms: f64) {
        self.timer = Some(SpawnTimer::new(now_ms, interval_ms));
    }

    /// Cancel the timer. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        self.timer.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn timer(&self) -> Option<&SpawnTimer> {
        self.timer.as_ref()
    }

    /// Obstacles due at `now_ms`. Empty while disarmed.
    pub fn try_spawn(
        &mut self,
        now_ms: f64,
        score: u32,
        assets: &impl AssetProvider,
        tuning: &Tuning,
    ) -> Vec<SpawnPlan> {
        let Some(timer) = self.timer.as_mut() else {
            return Vec::new();
        };
        let due = timer.poll(now_ms, tuning.max_catch_up_spawns);

        (0..due)
            .map(|_| {
                let kind = select_archetype(score, tuning.tier2_threshold, assets);
                SpawnPlan {
                    kind,
                    position: self.random_position(tuning),
                    spin: self.random_spin(),
                }
            })
            .collect()
    }

    /// Uniform over the flight envelope, at spawn depth
    fn random_position(&mut self, tuning: &Tuning) -> Vec3 {
        Vec3::new(
            self.rng.random_range(-tuning.envelope_x..=tuning.envelope_x),
            self.rng.random_range(-tuning.envelope_y..=tuning.envelope_y),
            tuning.spawn_depth,
        )
    }

    fn random_spin(&mut self) -> Vec3 {
        use std::f32::consts::PI;
        Vec3::new(
            self.rng.random_range(0.0..PI),
            self.rng.random_range(0.0..PI),
            self.rng.random_range(0.0..PI),
        )
    }
}

/// Tier selection with the asteroid fallback while craft models load
pub fn select_archetype(score: u32, tier2_threshold: u32, assets: &impl AssetProvider) -> ObstacleKind {
    if score < tier2_threshold {
        return ObstacleKind::Asteroid;
    }
    if assets.is_ready(ObstacleKind::HostileCraft) {
        ObstacleKind::HostileCraft
    } else {
        log::debug!("Hostile craft model not loaded, spawning asteroid instead");
        ObstacleKind::Asteroid
    }
}
