//! Scoring and health rules
//!
//! Pure functions; the state machine decides when to call them.

/// Score after one confirmed bullet-obstacle hit. Never decreases.
#[inline]
pub fn score_after_hit(score: u32, reward: u32) -> u32 {
    score.saturating_add(reward)
}

/// Result of one ship-obstacle collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthOutcome {
    /// Ship survives with this much health left
    Damaged { remaining: u8 },
    /// This hit took the last point
    Destroyed,
    /// Health was already zero; nothing changes
    AlreadyDestroyed,
}

/// Each collision costs exactly one point, never going below zero
pub fn apply_player_hit(health: u8) -> HealthOutcome {
    match health {
        0 => HealthOutcome::AlreadyDestroyed,
        1 => HealthOutcome::Destroyed,
        n => HealthOutcome::Damaged { remaining: n - 1 },
    }
}

/// HUD text for a non-lethal hit
pub fn hits_remaining_message(remaining: u8) -> Option<String> {
    match remaining {
        0 => None,
        1 => Some("1 HIT REMAINING!".to_string()),
        n => Some(format!("{} HITS REMAINING", n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_player_hit_sequence() {
        assert_eq!(apply_player_hit(3), HealthOutcome::Damaged { remaining: 2 });
        assert_eq!(apply_player_hit(2), HealthOutcome::Damaged { remaining: 1 });
        assert_eq!(apply_player_hit(1), HealthOutcome::Destroyed);
        assert_eq!(apply_player_hit(0), HealthOutcome::AlreadyDestroyed);
    }

    #[test]
    fn test_hits_remaining_message() {
        assert_eq!(hits_remaining_message(2).as_deref(), Some("2 HITS REMAINING"));
        assert_eq!(hits_remaining_message(1).as_deref(), Some("1 HIT REMAINING!"));
        assert_eq!(hits_remaining_message(0), None);
    }

    #[test]
    fn test_score_saturates() {
        assert_eq!(score_after_hit(0, 10), 10);
        assert_eq!(score_after_hit(u32::MAX - 5, 10), u32::MAX);
    }

    proptest! {
        #[test]
        fn prop_health_drops_by_one(health in 2u8..=255) {
            prop_assert_eq!(
                apply_player_hit(health),
                HealthOutcome::Damaged { remaining: health - 1 }
            );
        }

        #[test]
        fn prop_score_monotonic(score in 0u32..1_000_000, reward in 0u32..1000) {
            prop_assert!(score_after_hit(score, reward) >= score);
        }
    }
}
