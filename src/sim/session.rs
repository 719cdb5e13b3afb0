//! Session state machine
//!
//! `Simulation` owns the session, the clock and the RNG. Every clock action
//! and every command runs as one discrete step; nothing interleaves.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{Clock, ClockAction};
use super::generator::{self, spawn_interval_ms};
use super::scoring::{PopOutcome, ScoringPolicy, apply_score_delta, is_game_over};
use super::state::{Bubble, BubbleId, EndReason, GameEvent, GameMode, PlayArea, SessionState};
use crate::consts::SPAWN_SKIP_THRESHOLD;
use crate::room::{RoomBridge, RoomRecord};
use crate::settings::Settings;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Menu, no session
    Idle,
    /// Active gameplay
    Running,
    /// Halted mid-session
    Paused,
    /// Lives or time exhausted, or ended by the host
    Ended,
}

/// Player/host commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start(GameMode),
    Pause,
    Resume,
    TogglePause,
    Pop(BubbleId),
    EndGame,
    Reset,
}

/// Why a multiplayer start was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    #[error("room has no players")]
    EmptyRoom,
    #[error("{0} player(s) not ready")]
    PlayersNotReady(usize),
}

/// One player's game: session state, clock, RNG and optional room bridge
pub struct Simulation {
    area: PlayArea,
    policy: ScoringPolicy,
    player_id: String,
    seed: u64,
    rng: Pcg32,
    clock: Clock,
    session: Option<SessionState>,
    events: Vec<GameEvent>,
    bridge: Option<Box<dyn RoomBridge>>,
}

impl Simulation {
    pub fn new(settings: &Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let player_id = settings
            .player
            .player_id()
            .unwrap_or_else(|| format!("player-{:08x}", rng.random::<u32>()));

        log::info!("Simulation created (seed {}, player {})", seed, player_id);

        Self {
            area: settings.area,
            policy: settings.scoring,
            player_id,
            seed,
            rng,
            clock: Clock::new(),
            session: None,
            events: Vec::new(),
            bridge: None,
        }
    }

    /// Default settings with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(&Settings {
            seed: Some(seed),
            ..Settings::default()
        })
    }

    /// Push scores into a shared room record after every pop
    pub fn attach_room(&mut self, bridge: Box<dyn RoomBridge>) {
        self.bridge = Some(bridge);
    }

    pub fn detach_room(&mut self) -> Option<Box<dyn RoomBridge>> {
        self.bridge.take()
    }

    /// Current session (None while idle)
    pub fn state(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        match &self.session {
            None => GamePhase::Idle,
            Some(s) if s.running && s.paused => GamePhase::Paused,
            Some(s) if s.running => GamePhase::Running,
            Some(_) => GamePhase::Ended,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn area(&self) -> PlayArea {
        self.area
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start(mode) => self.start(mode),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePause => self.toggle_pause(),
            Command::Pop(id) => {
                self.pop(id);
            }
            Command::EndGame => self.end_game(),
            Command::Reset => self.reset(),
        }
    }

    /// Begin a fresh session, replacing any current one
    pub fn start(&mut self, mode: GameMode) {
        self.clock.disarm_all();
        self.session = Some(SessionState::new(mode));
        self.clock
            .arm_running_actions(spawn_interval_ms(0), mode == GameMode::TimeAttack);
        self.clock.arm_warm_up();
        log::info!("Started {} session", mode.as_str());
    }

    /// Start a classic session once every player in the room is ready
    pub fn start_multiplayer(&mut self, room: &RoomRecord) -> Result<(), StartError> {
        if room.is_empty() {
            return Err(StartError::EmptyRoom);
        }
        let not_ready = room.not_ready_count();
        if not_ready > 0 {
            log::warn!("Multiplayer start refused: {} player(s) not ready", not_ready);
            return Err(StartError::PlayersNotReady(not_ready));
        }
        self.start(GameMode::Classic);
        Ok(())
    }

    pub fn pause(&mut self) {
        let Some(state) = self.session.as_mut() else {
            return;
        };
        if !state.is_active() {
            return;
        }
        state.paused = true;
        self.clock.disarm_running_actions();
        log::info!("Paused at score {}", state.score);
    }

    pub fn resume(&mut self) {
        let Some(state) = self.session.as_mut() else {
            return;
        };
        if !(state.running && state.paused) {
            return;
        }
        state.paused = false;
        self.clock.arm_running_actions(
            spawn_interval_ms(state.score),
            state.mode == GameMode::TimeAttack,
        );
        log::info!("Resumed");
    }

    pub fn toggle_pause(&mut self) {
        match self.phase() {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Feed elapsed wall time; runs every clock action that falls due
    pub fn advance(&mut self, dt_ms: u64) {
        let mut budget = dt_ms;
        loop {
            let (used, action) = self.clock.step(budget);
            budget -= used;
            if let Some(state) = self.session.as_mut().filter(|s| s.is_active()) {
                state.elapsed_ms += used;
            }
            match action {
                Some(action) => self.run_action(action),
                None => break,
            }
        }
    }

    fn run_action(&mut self, action: ClockAction) {
        match action {
            ClockAction::Motion => self.advance_motion(),
            ClockAction::Spawn => self.spawn_tick(),
            ClockAction::Countdown => self.countdown_tick(),
            ClockAction::WarmUp => self.warm_up(),
        }
    }

    /// Move every bubble up by its speed and sweep the ones that left the top
    pub fn advance_motion(&mut self) {
        let Some(state) = self.session.as_mut() else {
            return;
        };
        if !state.is_active() {
            return;
        }

        for bubble in &mut state.bubbles {
            bubble.pos.y -= bubble.speed;
        }

        let (visible, gone): (Vec<Bubble>, Vec<Bubble>) =
            state.bubbles.drain(..).partition(Bubble::is_visible);
        state.bubbles = visible;
        if gone.is_empty() {
            return;
        }

        // Bubbles resting exactly on the edge leave without a penalty
        let penalty = self
            .policy
            .escape_penalty(state.mode, gone.iter().filter(|b| b.has_escaped()));
        state.bubbles_escaped += gone.len() as u32;
        for bubble in &gone {
            self.events.push(GameEvent::Escaped {
                id: bubble.id,
                kind: bubble.kind,
            });
        }

        if penalty == 0 {
            return;
        }
        let lost = state.lose_lives(penalty);
        self.events.push(GameEvent::LivesLost {
            count: lost,
            remaining: state.lives,
        });
        log::debug!("{} bubble(s) escaped, {} lives left", penalty, state.lives);

        if is_game_over(state.lives) {
            self.finish(EndReason::LivesExhausted);
        }
    }

    /// Spawn a bubble if the area is empty, otherwise on a coin flip
    pub fn spawn_tick(&mut self) {
        let Some(state) = self.session.as_mut() else {
            return;
        };
        if !state.is_active() {
            return;
        }
        if !state.bubbles.is_empty() && self.rng.random::<f32>() <= SPAWN_SKIP_THRESHOLD {
            return;
        }

        let id = state.next_bubble_id();
        let bubble = generator::spawn(state.score, self.area, id, &mut self.rng);
        self.events.push(GameEvent::Spawned {
            id,
            kind: bubble.kind,
        });
        state.bubbles.push(bubble);
    }

    /// Time-attack countdown. The last second ends the game instead of
    /// reaching zero.
    pub fn countdown_tick(&mut self) {
        let Some(state) = self.session.as_mut() else {
            return;
        };
        if !state.is_active() || state.mode != GameMode::TimeAttack {
            return;
        }
        if state.time_remaining <= 1 {
            self.finish(EndReason::TimeUp);
        } else {
            state.time_remaining -= 1;
        }
    }

    fn warm_up(&mut self) {
        if let Some(state) = self.session.as_mut().filter(|s| s.running) {
            state.started = true;
        }
    }

    /// Pop a bubble by ID.
    ///
    /// Returns None when the bubble is already gone (escaped, popped, or the
    /// session isn't active). That race is expected and harmless.
    pub fn pop(&mut self, id: BubbleId) -> Option<PopOutcome> {
        let state = self.session.as_mut().filter(|s| s.is_active())?;
        let bubble = state.take_bubble(id)?;

        let outcome = self.policy.pop_outcome(&bubble);
        let interval_before = spawn_interval_ms(state.score);
        state.score = apply_score_delta(state.score, outcome.score_delta);
        state.lose_lives(outcome.lives_lost);
        state.started = true;
        state.bubbles_popped += 1;

        self.events.push(GameEvent::Popped {
            id,
            kind: bubble.kind,
            delta: outcome.score_delta,
        });
        if outcome.lives_lost > 0 {
            self.events.push(GameEvent::LivesLost {
                count: outcome.lives_lost,
                remaining: state.lives,
            });
        }

        if let Some(bridge) = self.bridge.as_mut() {
            bridge.report_score(&self.player_id, state.score);
        }

        let interval = spawn_interval_ms(state.score);
        if interval != interval_before {
            self.clock.rearm_spawn(interval);
            self.events.push(GameEvent::SpawnRateChanged {
                interval_ms: interval,
            });
            log::debug!("Spawn interval {}ms -> {}ms", interval_before, interval);
        }

        if is_game_over(state.lives) {
            self.finish(EndReason::LivesExhausted);
        }
        Some(outcome)
    }

    /// Stop the session. Idempotent.
    pub fn end_game(&mut self) {
        self.finish(EndReason::Ended);
    }

    /// End the session and return to the menu
    pub fn reset(&mut self) {
        self.finish(EndReason::Reset);
        self.session = None;
    }

    fn finish(&mut self, reason: EndReason) {
        self.clock.disarm_all();
        let Some(state) = self.session.as_mut() else {
            return;
        };
        if !state.running {
            return;
        }
        state.running = false;
        state.paused = false;
        state.end_reason = Some(reason);
        self.events.push(GameEvent::GameOver {
            reason,
            score: state.score,
        });
        log::info!(
            "Game over ({:?}): score {}, popped {}, escaped {}",
            reason,
            state.score,
            state.bubbles_popped,
            state.bubbles_escaped
        );
    }
}
