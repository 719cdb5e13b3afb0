//! Bubble Pop - A casual bubble-popping arcade game
//!
//! Core modules:
//! - `sim`: Simulation (bubble generation, clock, session state, scoring)
//! - `room`: Score projection into a shared multiplayer room record
//! - `settings`: Play area, seed and scoring policy configuration

pub mod room;
pub mod settings;
pub mod sim;

pub use room::{RoomBridge, RoomPlayer, RoomRecord};
pub use settings::{PlayerProfile, Settings, SettingsError};
pub use sim::{Command, GameMode, GamePhase, SessionState, Simulation};

/// Game configuration constants
pub mod consts {
    /// Motion tick period (bubbles advance by `speed` each tick)
    pub const MOTION_TICK_MS: u64 = 50;
    /// Time-attack countdown period
    pub const COUNTDOWN_TICK_MS: u64 = 1000;
    /// Delay after start before the instructional overlay is dismissed
    pub const WARM_UP_MS: u64 = 2000;

    /// Time-attack session length (seconds)
    pub const TIME_ATTACK_SECONDS: u32 = 60;
    /// Starting lives in survival mode
    pub const SURVIVAL_LIVES: u32 = 3;
    /// Non-binding lives/time value for modes that don't use them
    pub const UNLIMITED: u32 = 999;

    /// Bonus window above the bomb probability (independent of score)
    pub const BONUS_CHANCE: f32 = 0.08;
    /// A spawn tick with bubbles on screen only spawns when a draw exceeds this
    pub const SPAWN_SKIP_THRESHOLD: f32 = 0.5;

    /// Default play area (area-local units)
    pub const DEFAULT_AREA_WIDTH: f32 = 400.0;
    pub const DEFAULT_AREA_HEIGHT: f32 = 600.0;
}
