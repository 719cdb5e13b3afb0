//! Bubble generation and difficulty curves
//!
//! Every curve is a pure function of the current score. Randomness comes in
//! through the caller's RNG so a seeded session replays identically.

use glam::Vec2;
use rand::Rng;

use super::state::{Bubble, BubbleId, BubbleKind, PlayArea};
use crate::consts::BONUS_CHANCE;

/// Palette for normal bubbles
pub const BUBBLE_PALETTE: [u32; 7] = [
    0xFF6B6B, 0x4ECDC4, 0x45B7D1, 0x96CEB4, 0xFFEAA7, 0xDDA0DD, 0x98D8C8,
];
pub const BONUS_COLOR: u32 = 0xFFD700;
pub const BOMB_COLOR: u32 = 0xFF4444;

/// Base rise speed (units per motion tick), 2..=7
pub fn speed(score: u64) -> f32 {
    (2 + score / 100).min(7) as f32
}

/// Spawn tick period, 1000ms down to 350ms
pub fn spawn_interval_ms(score: u64) -> u64 {
    1000u64.saturating_sub((score / 50) * 70).max(350)
}

/// Chance a spawned bubble is a bomb, 8% up to 25%
pub fn bomb_probability(score: u64) -> f32 {
    (0.08 + score as f32 / 1000.0).min(0.25)
}

/// Bubble diameter before jitter, 60 down to 18
pub fn base_size(score: u64) -> f32 {
    60u64.saturating_sub((score / 50) * 4).max(18) as f32
}

/// Map a uniform roll in [0, 1) to a bubble kind
pub fn kind_for_roll(roll: f32, score: u64) -> BubbleKind {
    let bomb = bomb_probability(score);
    if roll < bomb {
        BubbleKind::Bomb
    } else if roll < bomb + BONUS_CHANCE {
        BubbleKind::Bonus
    } else {
        BubbleKind::Normal
    }
}

/// Create a new bubble at the bottom edge of the play area
pub fn spawn<R: Rng + ?Sized>(score: u64, area: PlayArea, id: BubbleId, rng: &mut R) -> Bubble {
    let size = base_size(score) + rng.random::<f32>() * 10.0 - 5.0;
    let kind = kind_for_roll(rng.random::<f32>(), score);

    let color = match kind {
        BubbleKind::Normal => BUBBLE_PALETTE[rng.random_range(0..BUBBLE_PALETTE.len())],
        BubbleKind::Bonus => BONUS_COLOR,
        BubbleKind::Bomb => BOMB_COLOR,
    };

    // Narrow areas pin the bubble to the left edge
    let x = rng.random::<f32>() * (area.width - size).max(0.0);

    Bubble {
        id,
        pos: Vec2::new(x, area.height),
        size,
        speed: speed(score) + rng.random::<f32>(),
        kind,
        points: kind.base_points(),
        color,
    }
}
