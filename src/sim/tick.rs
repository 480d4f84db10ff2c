//! Session lifecycle and the fixed-timestep tick
//!
//! `Menu -> Playing -> GameOver`, and `GameOver -> Playing` through
//! [`reset`]. [`update`] advances exactly one tick; the host decides how
//! many ticks a display frame is worth.

use glam::Vec3;

use super::rules::{self, HealthOutcome};
use super::state::{Bullet, GameEvent, GamePhase, GameState, Obstacle, ObstacleKind};
use super::step::{move_ship, step_entities};
use crate::host::AssetProvider;

/// What a tick meant for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing happened
    Idle,
    Running,
    /// Health hit zero during this tick
    GameOver,
}

/// Begin play from the menu
///
/// Calling this from any other phase behaves like [`reset`].
pub fn start(state: &mut GameState, now_ms: f64) {
    if state.phase != GamePhase::Menu {
        log::warn!("start() called while {:?}, resetting instead", state.phase);
        reset(state, now_ms);
        return;
    }
    begin_session(state, now_ms);
}

/// Clear the field and start over
pub fn reset(state: &mut GameState, now_ms: f64) {
    for handle in state.bullets.clear() {
        state.emit(GameEvent::EntityDespawned(handle));
    }
    for handle in state.obstacles.clear() {
        state.emit(GameEvent::EntityDespawned(handle));
    }
    if state.spawner.stop() {
        log::debug!("Spawner stopped for reset");
    }
    begin_session(state, now_ms);
}

fn begin_session(state: &mut GameState, now_ms: f64) {
    state.score = 0;
    state.health = state.tuning.max_health;
    state.time_ticks = 0;
    state.fire.clear();

    state.ship.pos = state.tuning.ship_play_position;
    state.ship.rotation = Vec3::ZERO;
    if !state.ship_in_scene {
        state.ship_in_scene = true;
        state.emit(GameEvent::EntitySpawned(state.ship.handle));
    }

    state.emit(GameEvent::ScoreChanged(state.score));
    state.emit(GameEvent::HealthChanged(state.health));

    state.spawner.arm(now_ms, state.tuning.spawn_interval_ms);
    state.phase = GamePhase::Playing;

    log::info!(
        "Session started (seed {}, health {})",
        state.seed,
        state.health
    );
}

/// Spawner entry point, driven by the host's coarse wall-clock timer.
///
/// Safe to call in any phase; a no-op unless playing. Returns the number
/// of obstacles added.
pub fn try_spawn(state: &mut GameState, now_ms: f64, assets: &impl AssetProvider) -> usize {
    if state.phase != GamePhase::Playing {
        return 0;
    }

    let plans = state
        .spawner
        .try_spawn(now_ms, state.score, assets, &state.tuning);

    for plan in &plans {
        let half_extents = match plan.kind {
            ObstacleKind::Asteroid => state.tuning.asteroid_half_extents,
            ObstacleKind::HostileCraft => state.tuning.hostile_half_extents,
        };
        let id = state.next_entity_id();
        let obstacle = Obstacle::new(id, plan.kind, plan.position, plan.spin, half_extents);
        let handle = obstacle.handle;
        state.obstacles.push(obstacle);
        state.emit(GameEvent::EntitySpawned(handle));
        log::debug!("Spawned {} at {:?}", handle, plan.position);
    }

    plans.len()
}

/// Advance the session by one fixed timestep
pub fn update(state: &mut GameState) -> TickOutcome {
    if state.phase != GamePhase::Playing {
        return TickOutcome::Idle;
    }

    state.time_ticks += 1;

    let intent = state.input.sample();
    move_ship(&mut state.ship, intent, &state.tuning);

    let cooldown = state.tuning.fire_cooldown_ticks();
    if state.fire.update(intent.fire, cooldown) {
        fire_bullet(state);
    }

    let outcome = step_entities(
        &state.ship,
        &mut state.bullets,
        &mut state.obstacles,
        &state.tuning,
    );

    for handle in outcome
        .expired_bullets
        .iter()
        .chain(&outcome.passed_obstacles)
    {
        state.emit(GameEvent::EntityDespawned(*handle));
    }

    for hit in &outcome.hits {
        state.emit(GameEvent::EntityDespawned(hit.bullet));
        state.emit(GameEvent::EntityDespawned(hit.obstacle));
        state.emit(GameEvent::ObstacleDestroyed(hit.obstacle));
        state.score = rules::score_after_hit(state.score, state.tuning.hit_reward);
        state.emit(GameEvent::ScoreChanged(state.score));
    }

    for player_hit in &outcome.player_hits {
        state.emit(GameEvent::EntityDespawned(player_hit.obstacle));

        match rules::apply_player_hit(state.health) {
            HealthOutcome::Damaged { remaining } => {
                state.health = remaining;
                state.emit(GameEvent::HealthChanged(remaining));
                state.emit(GameEvent::PlayerHit { remaining });
            }
            HealthOutcome::Destroyed => {
                state.health = 0;
                state.emit(GameEvent::HealthChanged(0));
                end_session(state);
            }
            // Extra obstacles in the same tick after the lethal one
            HealthOutcome::AlreadyDestroyed => {}
        }
    }

    if state.phase == GamePhase::GameOver {
        TickOutcome::GameOver
    } else {
        TickOutcome::Running
    }
}

fn fire_bullet(state: &mut GameState) {
    let id = state.next_entity_id();
    let pos = state.ship.pos - Vec3::new(0.0, 0.0, state.tuning.muzzle_offset);
    let bullet = Bullet::new(id, pos, state.tuning.bullet_half_extents);
    let handle = bullet.handle;
    state.bullets.push(bullet);
    state.emit(GameEvent::EntitySpawned(handle));
    state.emit(GameEvent::ShotFired);
}

fn end_session(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.spawner.stop();
    state.emit(GameEvent::GameOver {
        final_score: state.score,
    });
    log::info!(
        "GAME OVER after {} ticks, score {}",
        state.time_ticks,
        state.score
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::AssetStatus;
    use crate::sim::input::Key;
    use crate::sim::pool::Body;
    use crate::tuning::Tuning;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        start(&mut state, 0.0);
        state.drain_events();
        state
    }

    fn push_obstacle(state: &mut GameState, pos: Vec3) -> u32 {
        let id = state.next_entity_id();
        let half = state.tuning.asteroid_half_extents;
        state
            .obstacles
            .push(Obstacle::new(id, ObstacleKind::Asteroid, pos, Vec3::ZERO, half));
        id
    }

    fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_start_enters_playing() {
        let mut state = GameState::new(1);
        assert_eq!(update(&mut state), TickOutcome::Idle);

        start(&mut state, 500.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.health, 3);
        assert_eq!(state.ship.pos, state.tuning.ship_play_position);
        assert!(state.spawner.is_armed());
        assert_eq!(state.spawner.timer().map(|t| t.next_due_ms()), Some(1500.0));

        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::EntitySpawned(state.ship.handle));
        assert!(events.contains(&GameEvent::ScoreChanged(0)));
        assert!(events.contains(&GameEvent::HealthChanged(3)));
    }

    #[test]
    fn test_try_spawn_only_while_playing() {
        let assets = AssetStatus::all_ready();
        let mut state = GameState::new(1);
        assert_eq!(try_spawn(&mut state, 5000.0, &assets), 0);

        start(&mut state, 0.0);
        assert_eq!(try_spawn(&mut state, 999.0, &assets), 0);
        assert_eq!(try_spawn(&mut state, 1000.0, &assets), 1);
        assert_eq!(state.obstacles.len(), 1);

        let obstacle = state.obstacles.get(0).unwrap();
        assert_eq!(obstacle.pos.z, state.tuning.spawn_depth);
        assert!(obstacle.bounds().center().abs_diff_eq(obstacle.pos, 1e-4));
    }

    #[test]
    fn test_spawn_tier_follows_score() {
        let assets = AssetStatus::all_ready();
        let mut state = playing(3);

        state.score = 99;
        try_spawn(&mut state, 1000.0, &assets);
        assert_eq!(state.obstacles.get(0).unwrap().kind, ObstacleKind::Asteroid);

        state.score = 100;
        try_spawn(&mut state, 2000.0, &assets);
        let craft = state.obstacles.get(1).unwrap();
        assert_eq!(craft.kind, ObstacleKind::HostileCraft);
        assert_eq!(craft.half_extents, state.tuning.hostile_half_extents);

        // Model not loaded yet: asteroid fallback
        try_spawn(&mut state, 3000.0, &AssetStatus::default());
        assert_eq!(state.obstacles.get(2).unwrap().kind, ObstacleKind::Asteroid);
    }

    #[test]
    fn test_head_on_obstacle_costs_one_health() {
        let mut state = playing(5);
        state.ship.pos = Vec3::ZERO;
        let id = push_obstacle(&mut state, Vec3::new(0.0, 0.0, -20.0));

        let mut frames = 0;
        while state.health == 3 {
            assert_eq!(update(&mut state), TickOutcome::Running);
            frames += 1;
            assert!(frames < 200, "obstacle never reached the ship");
        }

        assert_eq!(state.health, 2);
        assert!(state.obstacles.is_empty());

        let events = state.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::PlayerHit { .. })),
            1
        );
        assert!(events.contains(&GameEvent::PlayerHit { remaining: 2 }));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::EntityDespawned(h) if h.id == id
        )));
    }

    #[test]
    fn test_bullet_hit_scores_fixed_reward() {
        let mut state = playing(5);
        state.ship.pos = Vec3::new(5.0, 0.0, 0.0);
        push_obstacle(&mut state, Vec3::new(5.0, 0.0, -30.0));
        state.input.set_held(Key::Fire, true);

        let mut frames = 0;
        while state.score == 0 {
            update(&mut state);
            frames += 1;
            assert!(frames < 100, "bullet never connected");
        }
        state.input.set_held(Key::Fire, false);

        assert_eq!(state.score, state.tuning.hit_reward);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.health, 3);

        let events = state.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::ObstacleDestroyed(_))),
            1
        );
        assert!(events.contains(&GameEvent::ScoreChanged(10)));
    }

    #[test]
    fn test_held_fire_respects_cooldown() {
        let mut state = playing(5);
        state.input.set_held(Key::Fire, true);
        let cooldown = state.tuning.fire_cooldown_ticks() as usize;

        let mut shot_ticks = Vec::new();
        for tick in 0..(cooldown * 4) {
            update(&mut state);
            if state.drain_events().contains(&GameEvent::ShotFired) {
                shot_ticks.push(tick);
            }
        }

        assert_eq!(shot_ticks, [0, cooldown, cooldown * 2, cooldown * 3]);
        assert_eq!(state.bullets.len(), 4);
    }

    #[test]
    fn test_bullet_spawns_in_front_of_ship() {
        let mut state = playing(5);
        state.input.set_held(Key::Fire, true);
        update(&mut state);

        let bullet = state.bullets.get(0).unwrap();
        let expected_z = state.ship.pos.z - state.tuning.muzzle_offset - state.tuning.bullet_speed;
        assert_eq!(bullet.pos.x, state.ship.pos.x);
        assert!((bullet.pos.z - expected_z).abs() < 1e-5);
    }

    #[test]
    fn test_game_over_exactly_once() {
        let mut state = playing(5);
        state.ship.pos = Vec3::ZERO;
        state.health = 1;
        // Two obstacles reach the ship on the same tick
        push_obstacle(&mut state, Vec3::new(-1.0, 0.0, -0.3));
        push_obstacle(&mut state, Vec3::new(1.0, 0.0, -0.3));

        assert_eq!(update(&mut state), TickOutcome::GameOver);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.health, 0);
        assert!(!state.spawner.is_armed());

        let events = state.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::GameOver { .. })),
            1
        );
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerHit { .. })));

        // Frozen afterwards
        assert_eq!(update(&mut state), TickOutcome::Idle);
        assert_eq!(try_spawn(&mut state, 99_000.0, &AssetStatus::all_ready()), 0);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_simultaneous_hits_cost_one_each() {
        let mut state = playing(5);
        state.ship.pos = Vec3::ZERO;
        push_obstacle(&mut state, Vec3::new(-1.0, 0.0, -0.3));
        push_obstacle(&mut state, Vec3::new(1.0, 0.0, -0.3));

        assert_eq!(update(&mut state), TickOutcome::Running);
        assert_eq!(state.health, 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PlayerHit { remaining: 2 }));
        assert!(events.contains(&GameEvent::PlayerHit { remaining: 1 }));
    }

    #[test]
    fn test_reset_after_game_over() {
        let assets = AssetStatus::all_ready();
        let mut state = playing(5);
        try_spawn(&mut state, 1000.0, &assets);
        state.input.set_held(Key::Fire, true);
        update(&mut state);
        state.input.set_held(Key::Fire, false);
        state.score = 40;

        state.ship.pos = Vec3::ZERO;
        state.health = 1;
        push_obstacle(&mut state, Vec3::new(0.0, 0.0, -0.3));
        assert_eq!(update(&mut state), TickOutcome::GameOver);
        assert!(!state.bullets.is_empty());
        state.drain_events();

        reset(&mut state, 10_000.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.health, state.tuning.max_health);
        assert!(state.bullets.is_empty());
        assert!(state.obstacles.is_empty());
        assert!(state.spawner.is_armed());
        assert_eq!(state.spawner.timer().map(|t| t.next_due_ms()), Some(11_000.0));
        assert_eq!(state.ship.pos, state.tuning.ship_play_position);

        let events = state.drain_events();
        // Ship stays in the scene across resets
        assert!(!events.contains(&GameEvent::EntitySpawned(state.ship.handle)));
        assert!(events.iter().any(|e| matches!(e, GameEvent::EntityDespawned(_))));
    }

    #[test]
    fn test_reset_while_playing_rearms_timer() {
        let assets = AssetStatus::all_ready();
        let mut state = playing(5);
        reset(&mut state, 250.0);
        // Old schedule (due at 1000) is gone
        assert_eq!(try_spawn(&mut state, 1000.0, &assets), 0);
        assert_eq!(try_spawn(&mut state, 1250.0, &assets), 1);
    }

    #[test]
    fn test_start_from_game_over_resets() {
        let mut state = playing(5);
        state.phase = GamePhase::GameOver;
        push_obstacle(&mut state, Vec3::new(0.0, 0.0, -50.0));
        start(&mut state, 0.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_same_seed_same_session() {
        let assets = AssetStatus::all_ready();
        let tuning = Tuning::default();
        let mut a = GameState::with_tuning(77, tuning.clone()).unwrap();
        let mut b = GameState::with_tuning(77, tuning).unwrap();
        start(&mut a, 0.0);
        start(&mut b, 0.0);

        for frame in 0..600u32 {
            let now = frame as f64 * 1000.0 / 60.0;
            for state in [&mut a, &mut b] {
                state.input.set_held(Key::Fire, frame % 30 < 10);
                state.input.set_held(Key::Left, frame % 90 < 45);
                try_spawn(state, now, &assets);
                update(state);
            }
        }

        assert_eq!(a.score, b.score);
        assert_eq!(a.health, b.health);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_pools_never_hold_stale_bounds() {
        let assets = AssetStatus::all_ready();
        let mut state = playing(11);
        state.input.set_held(Key::Fire, true);
        for frame in 0..400u32 {
            try_spawn(&mut state, frame as f64 * 50.0, &assets);
            if update(&mut state) != TickOutcome::Running {
                break;
            }
            for bullet in &state.bullets {
                assert!(bullet.bounds().center().abs_diff_eq(bullet.pos, 1e-4));
            }
            for obstacle in &state.obstacles {
                assert!(obstacle.bounds().center().abs_diff_eq(obstacle.pos, 1e-4));
                assert!(obstacle.pos.z <= state.tuning.pass_depth);
            }
        }
    }
}
