//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed timestep only (one `update` = one tick)
//! - Seeded RNG only
//! - Stable iteration order (pool insertion order)
//! - No rendering, DOM or audio dependencies; output is `GameEvent`s

pub mod aabb;
pub mod input;
pub mod pool;
pub mod rules;
pub mod spawner;
pub mod state;
pub mod step;
pub mod tick;

pub use aabb::Aabb;
pub use input::{ControlIntent, InputSampler, Key};
pub use pool::{Body, EntityPool};
pub use rules::{HealthOutcome, apply_player_hit, hits_remaining_message, score_after_hit};
pub use spawner::{SpawnPlan, SpawnTimer, Spawner, select_archetype};
pub use state::{
    Bullet, EntityHandle, EntityKind, FireControl, GameEvent, GamePhase, GameState, Obstacle,
    ObstacleKind, Ship,
};
pub use step::{Hit, PlayerHit, StepOutcome, move_ship, step_entities};
pub use tick::{TickOutcome, reset, start, try_spawn, update};
