//! Multiplayer room score projection
//!
//! Room membership and ready-up signaling are delivered by an external
//! session service. The simulation only pushes its own score into the shared
//! record through `RoomBridge`; it never reads the room to decide gameplay.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Outward score channel used by `Simulation` after every pop
pub trait RoomBridge {
    /// Fire-and-forget; no acknowledgment
    fn report_score(&mut self, player_id: &str, score: u64);
}

impl<T: RoomBridge + ?Sized> RoomBridge for Rc<RefCell<T>> {
    fn report_score(&mut self, player_id: &str, score: u64) {
        self.borrow_mut().report_score(player_id, score);
    }
}

/// A player's entry in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPlayer {
    pub display_name: String,
    pub score: u64,
    pub ready: bool,
}

/// Shared room record: player ID -> name, score, ready
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub name: String,
    pub max_players: usize,
    /// Keyed by player ID (sorted for stable iteration)
    players: BTreeMap<String, RoomPlayer>,
}

impl RoomRecord {
    pub fn new(name: impl Into<String>, max_players: usize) -> Self {
        Self {
            name: name.into(),
            max_players,
            players: BTreeMap::new(),
        }
    }

    /// Add a player (not ready, zero score). Returns false if the room is full
    /// or the display name is blank. Re-joining keeps the existing entry.
    pub fn join(&mut self, player_id: &str, display_name: &str) -> bool {
        if self.players.contains_key(player_id) {
            return true;
        }
        let display_name = display_name.trim();
        if display_name.is_empty() || self.is_full() {
            return false;
        }
        self.players.insert(
            player_id.to_string(),
            RoomPlayer {
                display_name: display_name.to_string(),
                score: 0,
                ready: false,
            },
        );
        true
    }

    pub fn leave(&mut self, player_id: &str) -> Option<RoomPlayer> {
        self.players.remove(player_id)
    }

    pub fn set_ready(&mut self, player_id: &str, ready: bool) {
        if let Some(player) = self.players.get_mut(player_id) {
            player.ready = ready;
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&RoomPlayer> {
        self.players.get(player_id)
    }

    pub fn players(&self) -> impl Iterator<Item = (&str, &RoomPlayer)> {
        self.players.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn not_ready_count(&self) -> usize {
        self.players.values().filter(|p| !p.ready).count()
    }

    pub fn all_ready(&self) -> bool {
        !self.is_empty() && self.not_ready_count() == 0
    }

    /// Players ranked by score, highest first (ties by ID)
    pub fn standings(&self) -> Vec<(&str, &RoomPlayer)> {
        let mut ranked: Vec<_> = self.players().collect();
        ranked.sort_by(|a, b| b.1.score.cmp(&a.1.score).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

impl RoomBridge for RoomRecord {
    /// Unknown players are ignored: the record is a projection, not a roster
    fn report_score(&mut self, player_id: &str, score: u64) {
        match self.players.get_mut(player_id) {
            Some(player) => player.score = score,
            None => log::debug!("Score for unknown room player {} dropped", player_id),
        }
    }
}
