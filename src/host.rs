//! Host collaborators
//!
//! The simulation never touches the renderer, DOM, or audio directly. It
//! queues [`GameEvent`]s; the host drains them after each frame and hands
//! them to [`dispatch`], which calls into these traits.

use crate::error::CollaboratorError;
use crate::sim::{EntityHandle, GameEvent, GamePhase, ObstacleKind, hits_remaining_message};

/// Owns visuals for live entities
pub trait Scene {
    fn add_entity(&mut self, handle: EntityHandle) -> Result<(), CollaboratorError>;
    fn remove_entity(&mut self, handle: EntityHandle) -> Result<(), CollaboratorError>;
}

/// Reports whether archetype models have finished loading
pub trait AssetProvider {
    fn is_ready(&self, kind: ObstacleKind) -> bool;
}

/// HUD/audio feedback
pub trait Notifier {
    fn on_score_changed(&mut self, score: u32) -> Result<(), CollaboratorError>;
    fn on_health_changed(&mut self, health: u8) -> Result<(), CollaboratorError>;
    fn on_player_hit(&mut self, remaining: u8) -> Result<(), CollaboratorError>;
    fn on_game_over(&mut self, final_score: u32) -> Result<(), CollaboratorError>;
    fn on_shot_fired(&mut self) -> Result<(), CollaboratorError>;

    fn on_obstacle_destroyed(&mut self, _handle: EntityHandle) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Load flags the host flips as models arrive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetStatus {
    pub hostile_craft: bool,
}

impl AssetStatus {
    pub fn all_ready() -> Self {
        Self {
            hostile_craft: true,
        }
    }
}

impl AssetProvider for AssetStatus {
    fn is_ready(&self, kind: ObstacleKind) -> bool {
        match kind {
            // Procedural geometry, always available
            ObstacleKind::Asteroid => true,
            ObstacleKind::HostileCraft => self.hostile_craft,
        }
    }
}

/// Session command behind the host's confirm input (Enter, Start/Restart buttons)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Start,
    Restart,
}

/// Confirm only ever begins a session. It never interrupts one in progress.
pub fn confirm_action(phase: GamePhase) -> Option<SessionAction> {
    match phase {
        GamePhase::Menu => Some(SessionAction::Start),
        GamePhase::GameOver => Some(SessionAction::Restart),
        GamePhase::Playing => None,
    }
}

/// How long the hits-remaining banner stays up (fade in, hold, fade out)
pub const HIT_BANNER_MS: f64 = 1800.0;

/// Transient "N HITS REMAINING" banner state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitBanner {
    message: Option<String>,
    hide_at_ms: f64,
}

impl HitBanner {
    /// Show the banner for `remaining` health, replacing any current one.
    /// Returns the text to display, if any.
    pub fn show(&mut self, remaining: u8, now_ms: f64) -> Option<&str> {
        self.message = hits_remaining_message(remaining);
        self.hide_at_ms = now_ms + HIT_BANNER_MS;
        self.message.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Drop the banner once its time is up. True when it was just hidden.
    pub fn expire(&mut self, now_ms: f64) -> bool {
        if self.message.is_some() && now_ms >= self.hide_at_ms {
            self.message = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.message = None;
    }
}

/// Deliver events in order. A failing collaborator does not stop delivery
/// of the remaining events; every failure is logged and returned.
pub fn dispatch<S, N>(
    events: impl IntoIterator<Item = GameEvent>,
    scene: &mut S,
    notifier: &mut N,
) -> Vec<CollaboratorError>
where
    S: Scene + ?Sized,
    N: Notifier + ?Sized,
{
    let mut errors = Vec::new();

    for event in events {
        let result = match event {
            GameEvent::EntitySpawned(handle) => scene.add_entity(handle),
            GameEvent::EntityDespawned(handle) => scene.remove_entity(handle),
            GameEvent::ShotFired => notifier.on_shot_fired(),
            GameEvent::ObstacleDestroyed(handle) => notifier.on_obstacle_destroyed(handle),
            GameEvent::ScoreChanged(score) => notifier.on_score_changed(score),
            GameEvent::HealthChanged(health) => notifier.on_health_changed(health),
            GameEvent::PlayerHit { remaining } => notifier.on_player_hit(remaining),
            GameEvent::GameOver { final_score } => notifier.on_game_over(final_score),
        };

        if let Err(err) = result {
            log::warn!("Collaborator error: {}", err);
            errors.push(err);
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EntityKind;

    #[derive(Default)]
    struct RecordingScene {
        live: Vec<EntityHandle>,
        fail_adds: bool,
    }

    impl Scene for RecordingScene {
        fn add_entity(&mut self, handle: EntityHandle) -> Result<(), CollaboratorError> {
            if self.fail_adds {
                return Err(CollaboratorError::SceneAdd {
                    handle,
                    reason: "mesh not built".into(),
                });
            }
            self.live.push(handle);
            Ok(())
        }

        fn remove_entity(&mut self, handle: EntityHandle) -> Result<(), CollaboratorError> {
            self.live.retain(|h| *h != handle);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHud {
        score: u32,
        health: u8,
        shots: u32,
        game_overs: u32,
        audio_broken: bool,
    }

    impl Notifier for RecordingHud {
        fn on_score_changed(&mut self, score: u32) -> Result<(), CollaboratorError> {
            self.score = score;
            Ok(())
        }

        fn on_health_changed(&mut self, health: u8) -> Result<(), CollaboratorError> {
            self.health = health;
            Ok(())
        }

        fn on_player_hit(&mut self, _remaining: u8) -> Result<(), CollaboratorError> {
            Ok(())
        }

        fn on_game_over(&mut self, _final_score: u32) -> Result<(), CollaboratorError> {
            self.game_overs += 1;
            Ok(())
        }

        fn on_shot_fired(&mut self) -> Result<(), CollaboratorError> {
            self.shots += 1;
            if self.audio_broken {
                return Err(CollaboratorError::Notifier {
                    event: "shot_fired",
                    reason: "audio context closed".into(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_confirm_never_interrupts_play() {
        assert_eq!(confirm_action(GamePhase::Menu), Some(SessionAction::Start));
        assert_eq!(confirm_action(GamePhase::Playing), None);
        assert_eq!(
            confirm_action(GamePhase::GameOver),
            Some(SessionAction::Restart)
        );
    }

    #[test]
    fn test_hit_banner_is_transient() {
        let mut banner = HitBanner::default();
        assert_eq!(banner.show(2, 1000.0), Some("2 HITS REMAINING"));
        assert!(!banner.expire(1000.0 + HIT_BANNER_MS - 1.0));
        assert_eq!(banner.message(), Some("2 HITS REMAINING"));

        assert!(banner.expire(1000.0 + HIT_BANNER_MS));
        assert_eq!(banner.message(), None);
        // Already hidden
        assert!(!banner.expire(10_000.0));
    }

    #[test]
    fn test_hit_banner_second_hit_extends() {
        let mut banner = HitBanner::default();
        banner.show(2, 0.0);
        assert_eq!(banner.show(1, 1000.0), Some("1 HIT REMAINING!"));
        assert!(!banner.expire(HIT_BANNER_MS));
        assert!(banner.expire(1000.0 + HIT_BANNER_MS));
    }

    #[test]
    fn test_hit_banner_lethal_hit_shows_nothing() {
        let mut banner = HitBanner::default();
        assert_eq!(banner.show(0, 0.0), None);
        assert!(!banner.expire(HIT_BANNER_MS));
    }

    fn bullet(id: u32) -> EntityHandle {
        EntityHandle {
            id,
            kind: EntityKind::Bullet,
        }
    }

    #[test]
    fn test_dispatch_routes_events() {
        let mut scene = RecordingScene::default();
        let mut hud = RecordingHud::default();
        let events = [
            GameEvent::EntitySpawned(bullet(4)),
            GameEvent::EntitySpawned(bullet(5)),
            GameEvent::ShotFired,
            GameEvent::EntityDespawned(bullet(4)),
            GameEvent::ScoreChanged(10),
            GameEvent::HealthChanged(2),
        ];

        let errors = dispatch(events, &mut scene, &mut hud);
        assert!(errors.is_empty());
        assert_eq!(scene.live, [bullet(5)]);
        assert_eq!(hud.score, 10);
        assert_eq!(hud.health, 2);
        assert_eq!(hud.shots, 1);
    }

    #[test]
    fn test_failures_do_not_stop_delivery() {
        let mut scene = RecordingScene {
            fail_adds: true,
            ..Default::default()
        };
        let mut hud = RecordingHud {
            audio_broken: true,
            ..Default::default()
        };
        let events = [
            GameEvent::EntitySpawned(bullet(4)),
            GameEvent::ShotFired,
            GameEvent::ScoreChanged(30),
            GameEvent::GameOver { final_score: 30 },
        ];

        let errors = dispatch(events, &mut scene, &mut hud);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], CollaboratorError::SceneAdd { .. }));
        assert_eq!(hud.score, 30);
        assert_eq!(hud.game_overs, 1);
    }

    #[test]
    fn test_asset_status() {
        let loading = AssetStatus::default();
        assert!(loading.is_ready(ObstacleKind::Asteroid));
        assert!(!loading.is_ready(ObstacleKind::HostileCraft));
        assert!(AssetStatus::all_ready().is_ready(ObstacleKind::HostileCraft));
    }
}
