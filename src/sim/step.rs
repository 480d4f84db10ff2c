//! Per-tick motion and collision
//!
//! Order within a tick is fixed:
//! 1. move bullets (-z) and obstacles (+z), rebuilding their boxes
//! 2. expire bullets past the far depth
//! 3. drop obstacles that passed the player
//! 4. bullets vs obstacles
//! 5. ship vs obstacles
//!
//! Each obstacle box is rebuilt exactly once, in step 1, and then shared by
//! every test that follows. An obstacle leaves the pool at most once per
//! tick, so it can never be both passed and hit.

use glam::Vec3;

use super::input::ControlIntent;
use super::pool::{Body, EntityPool};
use super::state::{Bullet, EntityHandle, Obstacle, Ship};
use crate::tuning::Tuning;

/// A bullet destroyed an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub bullet: EntityHandle,
    pub obstacle: EntityHandle,
}

/// An obstacle struck the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHit {
    pub obstacle: EntityHandle,
}

/// Everything that left the world during one step
#[derive(Debug, Clone, Default)]
pub struct StepOutcome {
    pub expired_bullets: Vec<EntityHandle>,
    pub passed_obstacles: Vec<EntityHandle>,
    pub hits: Vec<Hit>,
    pub player_hits: Vec<PlayerHit>,
}

/// Move the ship one tick along held axes, clamped to the flight envelope,
/// and set its banking.
///
/// Opposite keys on the same axis cancel: no motion on that axis and the
/// ship flies level on it.
pub fn move_ship(ship: &mut Ship, intent: ControlIntent, tuning: &Tuning) {
    let dx = intent.horizontal();
    let dy = intent.vertical();

    ship.pos.x = (ship.pos.x + dx * tuning.ship_speed).clamp(-tuning.envelope_x, tuning.envelope_x);
    ship.pos.y = (ship.pos.y + dy * tuning.ship_speed).clamp(-tuning.envelope_y, tuning.envelope_y);

    // Roll into the turn, nose down when climbing
    ship.rotation.z = -dx * tuning.bank_roll;
    ship.rotation.x = -dy * tuning.bank_pitch;
}

/// Advance every bullet and obstacle one tick and resolve collisions
pub fn step_entities(
    ship: &Ship,
    bullets: &mut EntityPool<Bullet>,
    obstacles: &mut EntityPool<Obstacle>,
    tuning: &Tuning,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    bullets.translate_all(Vec3::new(0.0, 0.0, -tuning.bullet_speed));
    obstacles.translate_all(Vec3::new(0.0, 0.0, tuning.obstacle_speed));

    outcome.expired_bullets = bullets.remove_where(|b| b.pos.z < tuning.bullet_expiry_depth);
    outcome.passed_obstacles = obstacles.remove_where(|o| o.pos.z > tuning.pass_depth);

    // First obstacle in pool order wins; one obstacle per bullet
    for bi in (0..bullets.len()).rev() {
        let Some(bullet) = bullets.get(bi) else {
            continue;
        };
        if let Some(oi) = obstacles.first_intersecting(bullet.bounds()) {
            let bullet = bullets.remove_at(bi);
            let obstacle = obstacles.remove_at(oi);
            outcome.hits.push(Hit {
                bullet: bullet.handle,
                obstacle: obstacle.handle,
            });
        }
    }
    outcome.hits.reverse();

    let ship_box = ship.collision_bounds(tuning.forgiveness_margin);
    let struck = obstacles.remove_where(|o| o.bounds().intersects(&ship_box));
    outcome.player_hits = struck
        .into_iter()
        .map(|obstacle| PlayerHit { obstacle })
        .collect();

    outcome
}
