//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. Defaults reproduce the
//! shipped game; a JSON document may override any subset of fields.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::SIM_HZ;
use crate::error::TuningError;

/// Gameplay tuning (distances in world units, speeds in units per tick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Ship ===
    /// Lateral ship speed per tick along each held axis
    pub ship_speed: f32,
    /// Flight envelope half-width (x clamped to [-x, x])
    pub envelope_x: f32,
    /// Flight envelope half-height (y clamped to [-y, y])
    pub envelope_y: f32,
    /// Where `start` puts the ship
    pub ship_play_position: Vec3,
    /// Where the ship idles while the menu is showing
    pub ship_menu_position: Vec3,
    /// Half extents of the ship's geometric bounds
    pub ship_half_extents: Vec3,
    /// Amount the ship box is shrunk on every side before obstacle tests
    pub forgiveness_margin: f32,
    /// Banking roll (radians) while strafing
    pub bank_roll: f32,
    /// Banking pitch (radians) while climbing/diving
    pub bank_pitch: f32,

    // === Bullets ===
    /// Bullet speed per tick (travels toward -z)
    pub bullet_speed: f32,
    /// Bullets spawn this far in front of the ship
    pub muzzle_offset: f32,
    /// Bullets past this depth expire
    pub bullet_expiry_depth: f32,
    pub bullet_half_extents: Vec3,
    /// Minimum time between shots
    pub fire_cooldown_ms: f64,

    // === Obstacles ===
    /// Obstacle speed per tick (travels toward +z)
    pub obstacle_speed: f32,
    /// Depth at which new obstacles appear
    pub spawn_depth: f32,
    /// Obstacles past this depth have passed the player
    pub pass_depth: f32,
    pub asteroid_half_extents: Vec3,
    pub hostile_half_extents: Vec3,

    // === Spawner ===
    pub spawn_interval_ms: f64,
    /// Score at which hostile craft replace asteroids
    pub tier2_threshold: u32,
    /// Most spawns a single late timer check may catch up on
    pub max_catch_up_spawns: u32,

    // === Scoring / health ===
    pub hit_reward: u32,
    pub max_health: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ship_speed: 0.2,
            envelope_x: 12.0,
            envelope_y: 5.0,
            ship_play_position: Vec3::new(0.0, -3.0, 0.0),
            ship_menu_position: Vec3::new(0.0, -2.0, -15.0),
            ship_half_extents: Vec3::new(2.5, 0.8, 2.0),
            forgiveness_margin: 0.5,
            bank_roll: 0.2,
            bank_pitch: 0.1,

            bullet_speed: 1.0,
            muzzle_offset: 2.0,
            bullet_expiry_depth: -100.0,
            bullet_half_extents: Vec3::new(0.1, 0.1, 0.75),
            fire_cooldown_ms: 200.0,

            obstacle_speed: 0.3,
            spawn_depth: -100.0,
            pass_depth: 15.0,
            asteroid_half_extents: Vec3::splat(1.5),
            hostile_half_extents: Vec3::new(1.8, 0.8, 1.8),

            spawn_interval_ms: 1000.0,
            tier2_threshold: 100,
            max_catch_up_spawns: 4,

            hit_reward: 10,
            max_health: 3,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Fire cooldown expressed in simulation ticks (at least one)
    pub fn fire_cooldown_ticks(&self) -> u32 {
        ((self.fire_cooldown_ms * SIM_HZ as f64 / 1000.0).round() as u32).max(1)
    }

    /// Reject values that would break the simulation's invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("ship_speed", self.ship_speed),
            ("envelope_x", self.envelope_x),
            ("envelope_y", self.envelope_y),
            ("bullet_speed", self.bullet_speed),
            ("obstacle_speed", self.obstacle_speed),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::OutOfRange {
                    field,
                    value: value as f64,
                });
            }
        }

        if self.forgiveness_margin < 0.0 {
            return Err(TuningError::OutOfRange {
                field: "forgiveness_margin",
                value: self.forgiveness_margin as f64,
            });
        }
        if !(self.spawn_interval_ms > 0.0) {
            return Err(TuningError::OutOfRange {
                field: "spawn_interval_ms",
                value: self.spawn_interval_ms,
            });
        }
        if self.fire_cooldown_ms < 0.0 {
            return Err(TuningError::OutOfRange {
                field: "fire_cooldown_ms",
                value: self.fire_cooldown_ms,
            });
        }
        let extents = [
            ("ship_half_extents", self.ship_half_extents),
            ("bullet_half_extents", self.bullet_half_extents),
            ("asteroid_half_extents", self.asteroid_half_extents),
            ("hostile_half_extents", self.hostile_half_extents),
        ];
        for (field, half) in extents {
            let smallest = half.min_element();
            if !(smallest > 0.0) {
                return Err(TuningError::OutOfRange {
                    field,
                    value: smallest as f64,
                });
            }
        }
        // The shrunk ship box must keep some volume or nothing can hit it
        if self.ship_half_extents.min_element() <= self.forgiveness_margin {
            return Err(TuningError::OutOfRange {
                field: "forgiveness_margin",
                value: self.forgiveness_margin as f64,
            });
        }
        if self.max_catch_up_spawns == 0 {
            return Err(TuningError::OutOfRange {
                field: "max_catch_up_spawns",
                value: 0.0,
            });
        }
        if self.max_health == 0 {
            return Err(TuningError::OutOfRange {
                field: "max_health",
                value: 0.0,
            });
        }
        // Obstacles must travel from spawn depth toward the pass plane
        if self.spawn_depth >= self.pass_depth {
            return Err(TuningError::OutOfRange {
                field: "spawn_depth",
                value: self.spawn_depth as f64,
            });
        }

        Ok(())
    }
}
