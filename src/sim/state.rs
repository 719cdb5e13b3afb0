//! Session state and core simulation types
//!
//! Everything a renderer needs to draw a frame lives here.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Game mode chosen from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// Pop at your own pace, no limit
    #[default]
    Classic,
    /// Score as much as possible in 60 seconds
    TimeAttack,
    /// Three lives, escaping bubbles cost a life
    Survival,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::TimeAttack => "timeAttack",
            GameMode::Survival => "survival",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "timeattack" | "time-attack" | "time_attack" => Some(GameMode::TimeAttack),
            "survival" => Some(GameMode::Survival),
            _ => None,
        }
    }

    /// Lives at session start
    pub fn starting_lives(&self) -> u32 {
        match self {
            GameMode::Survival => SURVIVAL_LIVES,
            _ => UNLIMITED,
        }
    }

    /// Seconds on the clock at session start
    pub fn starting_time(&self) -> u32 {
        match self {
            GameMode::TimeAttack => TIME_ATTACK_SECONDS,
            _ => UNLIMITED,
        }
    }
}

/// Bubble kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BubbleKind {
    #[default]
    Normal,
    Bonus,
    Bomb,
}

impl BubbleKind {
    /// Informational base value carried on the bubble.
    ///
    /// Not used for scoring: `ScoringPolicy` decides what a pop is worth.
    pub fn base_points(&self) -> i32 {
        match self {
            BubbleKind::Normal => 1,
            BubbleKind::Bonus => 5,
            BubbleKind::Bomb => -3,
        }
    }
}

/// Opaque bubble identifier, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BubbleId(pub u32);

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// A bubble entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: BubbleId,
    /// Top-left corner in play-area coordinates (y grows downward)
    pub pos: Vec2,
    /// Diameter
    pub size: f32,
    /// Vertical units per motion tick
    pub speed: f32,
    pub kind: BubbleKind,
    /// Informational base value (see `BubbleKind::base_points`)
    pub points: i32,
    /// Packed 0xRRGGBB appearance hint
    pub color: u32,
}

impl Bubble {
    /// Bottom edge relative to the top of the play area
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size
    }

    /// Still at least partially on screen
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.bottom() > 0.0
    }

    /// Fully past the top edge
    #[inline]
    pub fn has_escaped(&self) -> bool {
        self.bottom() < 0.0
    }
}

/// Play area dimensions (area-local units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self {
            width: DEFAULT_AREA_WIDTH,
            height: DEFAULT_AREA_HEIGHT,
        }
    }
}

/// Why a session stopped running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    LivesExhausted,
    TimeUp,
    /// `end_game` called by the host
    Ended,
    Reset,
}

/// Gameplay events for renderers/audio (drained by the host each frame)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    Spawned { id: BubbleId, kind: BubbleKind },
    Popped { id: BubbleId, kind: BubbleKind, delta: i64 },
    Escaped { id: BubbleId, kind: BubbleKind },
    LivesLost { count: u32, remaining: u32 },
    SpawnRateChanged { interval_ms: u64 },
    GameOver { reason: EndReason, score: u64 },
}

/// Complete state of one session (serializable for renderers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Live bubbles (order is not significant)
    pub bubbles: Vec<Bubble>,
    /// Score, never negative
    pub score: u64,
    /// Lives (non-binding sentinel outside survival)
    pub lives: u32,
    /// Seconds left (only counts down in time attack)
    pub time_remaining: u32,
    pub mode: GameMode,
    /// Simulation actively advancing (or paused mid-session)
    pub running: bool,
    /// Temporarily halted, implies `running`
    pub paused: bool,
    /// Instructional overlay dismissed (first pop or warm-up elapsed)
    pub started: bool,
    /// Running, unpaused time since start
    pub elapsed_ms: u64,
    pub bubbles_popped: u32,
    pub bubbles_escaped: u32,
    pub end_reason: Option<EndReason>,
    /// Next bubble ID
    #[serde(default)]
    next_id: u32,
}

impl SessionState {
    /// Fresh session for the given mode
    pub fn new(mode: GameMode) -> Self {
        Self {
            bubbles: Vec::new(),
            score: 0,
            lives: mode.starting_lives(),
            time_remaining: mode.starting_time(),
            mode,
            running: true,
            paused: false,
            started: false,
            elapsed_ms: 0,
            bubbles_popped: 0,
            bubbles_escaped: 0,
            end_reason: None,
            next_id: 1,
        }
    }

    /// Allocate a new bubble ID
    pub fn next_bubble_id(&mut self) -> BubbleId {
        // Restored states may carry a stale counter
        if let Some(max) = self.bubbles.iter().map(|b| b.id.0).max() {
            self.next_id = self.next_id.max(max.saturating_add(1));
        }
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Running and not paused
    pub fn is_active(&self) -> bool {
        self.running && !self.paused
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// Remove a bubble by ID (None if it is already gone)
    pub fn take_bubble(&mut self, id: BubbleId) -> Option<Bubble> {
        let idx = self.bubbles.iter().position(|b| b.id == id)?;
        Some(self.bubbles.swap_remove(idx))
    }

    /// Remove `count` lives, clamped at zero. Returns lives actually removed.
    pub fn lose_lives(&mut self, count: u32) -> u32 {
        let lost = count.min(self.lives);
        self.lives -= lost;
        lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_per_mode() {
        let classic = SessionState::new(GameMode::Classic);
        assert_eq!(classic.lives, UNLIMITED);
        assert_eq!(classic.time_remaining, UNLIMITED);
        assert!(classic.running && !classic.paused && !classic.started);

        let survival = SessionState::new(GameMode::Survival);
        assert_eq!(survival.lives, 3);

        let time_attack = SessionState::new(GameMode::TimeAttack);
        assert_eq!(time_attack.time_remaining, 60);
        assert_eq!(time_attack.lives, UNLIMITED);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut state = SessionState::new(GameMode::Classic);
        let a = state.next_bubble_id();
        let b = state.next_bubble_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_ids_survive_json_roundtrip() {
        let mut state = SessionState::new(GameMode::Classic);
        let first = state.next_bubble_id();
        state.bubbles.push(Bubble {
            id: first,
            pos: Vec2::new(0.0, 100.0),
            size: 40.0,
            speed: 2.0,
            kind: BubbleKind::Normal,
            points: 1,
            color: 0,
        });

        let json = serde_json::to_string(&state).unwrap();
        let mut restored: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
        assert_ne!(restored.next_bubble_id(), first);

        // Counter missing from the payload
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value.as_object_mut().unwrap().remove("nextId");
        let mut legacy: SessionState = serde_json::from_value(value).unwrap();
        assert_eq!(legacy.next_bubble_id(), BubbleId(first.0 + 1));
    }

    #[test]
    fn test_lose_lives_clamps() {
        let mut state = SessionState::new(GameMode::Survival);
        assert_eq!(state.lose_lives(5), 3);
        assert_eq!(state.lives, 0);
        assert_eq!(state.lose_lives(1), 0);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(GameMode::from_str("timeAttack"), Some(GameMode::TimeAttack));
        assert_eq!(GameMode::from_str("Survival"), Some(GameMode::Survival));
        assert_eq!(GameMode::from_str("arcade"), None);
    }

    #[test]
    fn test_visibility_boundary() {
        let bubble = Bubble {
            id: BubbleId(1),
            pos: Vec2::new(0.0, -10.0),
            size: 10.0,
            speed: 2.0,
            kind: BubbleKind::Normal,
            points: 1,
            color: 0,
        };
        // Exactly on the edge: neither visible nor escaped
        assert!(!bubble.is_visible());
        assert!(!bubble.has_escaped());
    }
}
