//! Scoring and lifecycle rules
//!
//! Maps pop and escape events to score/life deltas. The `points` field on a
//! bubble is informational only; what a pop is worth is decided here.

use serde::{Deserialize, Serialize};

use super::state::{Bubble, BubbleKind, GameMode};

/// Flat award for bonus bubbles
pub const BONUS_POP_SCORE: i64 = 50;
/// Flat penalty for popping a bomb
pub const BOMB_POP_PENALTY: i64 = -20;

/// Result of resolving a pop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopOutcome {
    pub score_delta: i64,
    pub lives_lost: u32,
}

/// Tunable scoring rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringPolicy {
    /// Lower bound for a normal pop. `None` keeps the raw size formula, which
    /// goes to zero or below for bubbles larger than ~72 units.
    pub normal_minimum: Option<i64>,
    /// Count escaping bombs toward the survival life penalty
    pub penalize_bomb_escapes: bool,
}

impl ScoringPolicy {
    /// Score delta for popping a bubble of the given kind and size
    pub fn pop_delta(&self, kind: BubbleKind, size: f32) -> i64 {
        match kind {
            BubbleKind::Normal => {
                // Smaller bubbles are worth more
                let raw = 10 + ((60.0 - size) * 0.8).floor() as i64;
                match self.normal_minimum {
                    Some(min) => raw.max(min),
                    None => raw,
                }
            }
            BubbleKind::Bonus => BONUS_POP_SCORE,
            BubbleKind::Bomb => BOMB_POP_PENALTY,
        }
    }

    pub fn pop_outcome(&self, bubble: &Bubble) -> PopOutcome {
        PopOutcome {
            score_delta: self.pop_delta(bubble.kind, bubble.size),
            lives_lost: u32::from(bubble.kind == BubbleKind::Bomb),
        }
    }

    /// Whether an escaped bubble costs a life in this mode
    pub fn escape_costs_life(&self, mode: GameMode, kind: BubbleKind) -> bool {
        mode == GameMode::Survival && (kind != BubbleKind::Bomb || self.penalize_bomb_escapes)
    }

    /// Lives lost for a batch of escaped bubbles
    pub fn escape_penalty<'a>(
        &self,
        mode: GameMode,
        escaped: impl IntoIterator<Item = &'a Bubble>,
    ) -> u32 {
        escaped
            .into_iter()
            .filter(|b| self.escape_costs_life(mode, b.kind))
            .count() as u32
    }
}

/// Apply a signed delta to a score, clamping at zero
pub fn apply_score_delta(score: u64, delta: i64) -> u64 {
    if delta >= 0 {
        score.saturating_add(delta as u64)
    } else {
        score.saturating_sub(delta.unsigned_abs())
    }
}

/// Lives exhausted
pub fn is_game_over(lives: u32) -> bool {
    lives == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BubbleId;
    use glam::Vec2;
    use proptest::prelude::*;

    fn bubble(kind: BubbleKind, size: f32) -> Bubble {
        Bubble {
            id: BubbleId(1),
            pos: Vec2::new(0.0, 100.0),
            size,
            speed: 2.0,
            kind,
            points: kind.base_points(),
            color: 0,
        }
    }

    #[test]
    fn test_normal_pop_rewards_small_bubbles() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.pop_delta(BubbleKind::Normal, 40.0), 26);
        assert_eq!(policy.pop_delta(BubbleKind::Normal, 60.0), 10);
        assert_eq!(policy.pop_delta(BubbleKind::Normal, 18.0), 43);
        assert!(policy.pop_delta(BubbleKind::Normal, 20.0) > policy.pop_delta(BubbleKind::Normal, 50.0));
    }

    #[test]
    fn test_flat_kinds_ignore_size() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.pop_delta(BubbleKind::Bonus, 13.0), 50);
        assert_eq!(policy.pop_delta(BubbleKind::Bonus, 65.0), 50);
        assert_eq!(policy.pop_delta(BubbleKind::Bomb, 30.0), -20);
    }

    #[test]
    fn test_bomb_costs_a_life() {
        let policy = ScoringPolicy::default();
        let outcome = policy.pop_outcome(&bubble(BubbleKind::Bomb, 40.0));
        assert_eq!(outcome, PopOutcome { score_delta: -20, lives_lost: 1 });
        let outcome = policy.pop_outcome(&bubble(BubbleKind::Bonus, 40.0));
        assert_eq!(outcome.lives_lost, 0);
    }

    #[test]
    fn test_huge_normal_bubble_without_floor() {
        let policy = ScoringPolicy::default();
        // (60 - 80) * 0.8 = -16
        assert_eq!(policy.pop_delta(BubbleKind::Normal, 80.0), -6);

        let floored = ScoringPolicy {
            normal_minimum: Some(1),
            ..Default::default()
        };
        assert_eq!(floored.pop_delta(BubbleKind::Normal, 80.0), 1);
        assert_eq!(floored.pop_delta(BubbleKind::Normal, 40.0), 26);
    }

    #[test]
    fn test_escape_penalty_survival_only() {
        let policy = ScoringPolicy::default();
        let escaped = [
            bubble(BubbleKind::Normal, 30.0),
            bubble(BubbleKind::Bonus, 30.0),
            bubble(BubbleKind::Bomb, 30.0),
        ];
        assert_eq!(policy.escape_penalty(GameMode::Survival, &escaped), 2);
        assert_eq!(policy.escape_penalty(GameMode::Classic, &escaped), 0);
        assert_eq!(policy.escape_penalty(GameMode::TimeAttack, &escaped), 0);

        let strict = ScoringPolicy {
            penalize_bomb_escapes: true,
            ..Default::default()
        };
        assert_eq!(strict.escape_penalty(GameMode::Survival, &escaped), 3);
    }

    #[test]
    fn test_score_clamps_at_zero() {
        assert_eq!(apply_score_delta(100, -20), 80);
        assert_eq!(apply_score_delta(10, -20), 0);
        assert_eq!(apply_score_delta(0, 26), 26);
        assert!(is_game_over(0));
        assert!(!is_game_over(1));
    }

    proptest! {
        #[test]
        fn score_delta_never_underflows(score in 0u64..10_000, delta in -1_000i64..1_000) {
            let next = apply_score_delta(score, delta);
            prop_assert_eq!(next as i64, (score as i64 + delta).max(0));
        }
    }
}
