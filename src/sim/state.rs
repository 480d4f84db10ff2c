//! Game state and core simulation types
//!
//! One [`GameState`] is one play session. The host owns it and passes it to
//! every operation in [`super::tick`]; nothing here is global.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::input::InputSampler;
use super::pool::{Body, EntityPool};
use super::spawner::Spawner;
use crate::error::TuningError;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing moves
    Menu,
    /// Active gameplay
    Playing,
    /// Health ran out; waits for reset
    GameOver,
}

/// Obstacle archetypes, selected by score tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Tier 1
    Asteroid,
    /// Tier 2
    HostileCraft,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Asteroid => "asteroid",
            ObstacleKind::HostileCraft => "hostile-craft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Ship,
    Bullet,
    Obstacle(ObstacleKind),
}

/// Opaque reference handed to the scene when entities come and go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    pub id: u32,
    pub kind: EntityKind,
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntityKind::Ship => write!(f, "ship#{}", self.id),
            EntityKind::Bullet => write!(f, "bullet#{}", self.id),
            EntityKind::Obstacle(kind) => write!(f, "{}#{}", kind.as_str(), self.id),
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub handle: EntityHandle,
    pub pos: Vec3,
    /// Visual banking only (x = pitch, z = roll). Never used for collision.
    pub rotation: Vec3,
    pub half_extents: Vec3,
}

impl Ship {
    pub fn new(id: u32, pos: Vec3, half_extents: Vec3) -> Self {
        Self {
            handle: EntityHandle {
                id,
                kind: EntityKind::Ship,
            },
            pos,
            rotation: Vec3::ZERO,
            half_extents,
        }
    }

    /// Full geometric bounds at the current position
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.half_extents)
    }

    /// Bounds used against obstacles, shrunk so near-misses are forgiven
    pub fn collision_bounds(&self, forgiveness_margin: f32) -> Aabb {
        self.bounds().expand_by_scalar(-forgiveness_margin)
    }
}

/// A player bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub handle: EntityHandle,
    pub pos: Vec3,
    pub half_extents: Vec3,
    bounds: Aabb,
}

impl Bullet {
    pub fn new(id: u32, pos: Vec3, half_extents: Vec3) -> Self {
        Self {
            handle: EntityHandle {
                id,
                kind: EntityKind::Bullet,
            },
            pos,
            half_extents,
            bounds: Aabb::from_center(pos, half_extents),
        }
    }
}

/// An incoming obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub handle: EntityHandle,
    pub kind: ObstacleKind,
    pub pos: Vec3,
    /// Random visual orientation picked at spawn
    pub spin: Vec3,
    pub half_extents: Vec3,
    /// Cached once per tick after motion
    bounds: Aabb,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec3, spin: Vec3, half_extents: Vec3) -> Self {
        Self {
            handle: EntityHandle {
                id,
                kind: EntityKind::Obstacle(kind),
            },
            kind,
            pos,
            spin,
            half_extents,
            bounds: Aabb::from_center(pos, half_extents),
        }
    }
}

impl Body for Bullet {
    fn handle(&self) -> EntityHandle {
        self.handle
    }

    fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    fn translate(&mut self, delta: Vec3) {
        self.pos += delta;
        self.bounds = Aabb::from_center(self.pos, self.half_extents);
    }
}

impl Body for Obstacle {
    fn handle(&self) -> EntityHandle {
        self.handle
    }

    fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    fn translate(&mut self, delta: Vec3) {
        self.pos += delta;
        self.bounds = Aabb::from_center(self.pos, self.half_extents);
    }
}

/// Discrete outbound events, drained by the host once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Entity entered the world; the scene should add its visual
    EntitySpawned(EntityHandle),
    /// Entity left the world; the scene should drop its visual
    EntityDespawned(EntityHandle),
    ShotFired,
    /// A bullet destroyed an obstacle
    ObstacleDestroyed(EntityHandle),
    ScoreChanged(u32),
    HealthChanged(u8),
    /// Non-lethal ship collision
    PlayerHit { remaining: u8 },
    GameOver { final_score: u32 },
}

/// Fire-trigger cooldown, counted in ticks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FireControl {
    remaining_ticks: u32,
}

impl FireControl {
    /// Advance one tick. Returns true when a shot should be fired.
    pub fn update(&mut self, trigger_held: bool, cooldown_ticks: u32) -> bool {
        if self.remaining_ticks > 0 {
            self.remaining_ticks -= 1;
        }
        if trigger_held && self.remaining_ticks == 0 {
            self.remaining_ticks = cooldown_ticks;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.remaining_ticks = 0;
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u32,
    pub health: u8,
    /// Simulation ticks since the session last (re)started
    pub time_ticks: u64,
    pub ship: Ship,
    pub bullets: EntityPool<Bullet>,
    pub obstacles: EntityPool<Obstacle>,
    pub input: InputSampler,
    pub fire: FireControl,
    pub spawner: Spawner,
    /// Whether the ship's visual has been handed to the scene
    pub(crate) ship_in_scene: bool,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session sitting at the menu
    pub fn new(seed: u64) -> Self {
        Self::from_tuning(seed, Tuning::default())
    }

    /// Create a session with custom balance, rejecting tuning that would
    /// stop spawning or collision from working
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::from_tuning(seed, tuning))
    }

    fn from_tuning(seed: u64, tuning: Tuning) -> Self {
        let ship = Ship::new(1, tuning.ship_menu_position, tuning.ship_half_extents);
        Self {
            seed,
            health: tuning.max_health,
            tuning,
            phase: GamePhase::Menu,
            score: 0,
            time_ticks: 0,
            ship,
            bullets: EntityPool::new(),
            obstacles: EntityPool::new(),
            input: InputSampler::new(),
            fire: FireControl::default(),
            spawner: Spawner::new(seed),
            ship_in_scene: false,
            events: Vec::new(),
            next_id: 2,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event produced since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // Render sync queries

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn bullets(&self) -> &[Bullet] {
        self.bullets.as_slice()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.obstacles.as_slice()
    }
}
