//! Simulation clock
//!
//! Explicit scheduler for the periodic session actions. The host feeds
//! elapsed milliseconds; the clock hands back one due action at a time so
//! each action runs as its own step and can re-arm or disarm the clock
//! before the next one is looked up.
//!
//! Arming always starts a timer from a fresh zero offset. Partial periods are
//! never carried across a disarm.

use serde::{Deserialize, Serialize};

use crate::consts::{COUNTDOWN_TICK_MS, MOTION_TICK_MS, WARM_UP_MS};

/// Scheduled actions, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockAction {
    /// Advance bubbles (every 50ms)
    Motion,
    /// Time-attack countdown (every second)
    Countdown,
    /// Maybe spawn a bubble (period depends on score)
    Spawn,
    /// One-shot overlay dismissal after start
    WarmUp,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    action: ClockAction,
    period_ms: u64,
    elapsed_ms: u64,
    repeating: bool,
}

impl Timer {
    fn remaining(&self) -> u64 {
        self.period_ms.saturating_sub(self.elapsed_ms)
    }
}

/// Scheduler owned by a `Simulation`
#[derive(Debug, Clone, Default)]
pub struct Clock {
    /// Armed timers, kept in `ClockAction` order
    timers: Vec<Timer>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm motion, spawn and (optionally) countdown from zero.
    ///
    /// Leaves the warm-up timer alone.
    pub fn arm_running_actions(&mut self, spawn_interval_ms: u64, countdown: bool) {
        self.disarm_running_actions();
        self.arm(ClockAction::Motion, MOTION_TICK_MS, true);
        if countdown {
            self.arm(ClockAction::Countdown, COUNTDOWN_TICK_MS, true);
        }
        self.arm(ClockAction::Spawn, spawn_interval_ms, true);
    }

    /// Arm the one-shot warm-up deadline
    pub fn arm_warm_up(&mut self) {
        self.arm(ClockAction::WarmUp, WARM_UP_MS, false);
    }

    /// Re-arm spawn from zero with a new period (no-op if spawn isn't armed)
    pub fn rearm_spawn(&mut self, spawn_interval_ms: u64) {
        if self.is_armed(ClockAction::Spawn) {
            self.arm(ClockAction::Spawn, spawn_interval_ms, true);
        }
    }

    /// Cancel motion, spawn and countdown
    pub fn disarm_running_actions(&mut self) {
        self.timers.retain(|t| t.action == ClockAction::WarmUp);
    }

    pub fn disarm(&mut self, action: ClockAction) {
        self.timers.retain(|t| t.action != action);
    }

    /// Cancel everything
    pub fn disarm_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_armed(&self, action: ClockAction) -> bool {
        self.timers.iter().any(|t| t.action == action)
    }

    /// Period of an armed action
    pub fn period_ms(&self, action: ClockAction) -> Option<u64> {
        self.timers.iter().find(|t| t.action == action).map(|t| t.period_ms)
    }

    /// Time accumulated toward the next firing of an armed action
    pub fn elapsed_ms(&self, action: ClockAction) -> Option<u64> {
        self.timers.iter().find(|t| t.action == action).map(|t| t.elapsed_ms)
    }

    /// Consume up to `budget_ms` until the next action falls due.
    ///
    /// Returns the milliseconds consumed and the action that fired, if any.
    /// With nothing due inside the budget, the whole budget is consumed.
    pub fn step(&mut self, budget_ms: u64) -> (u64, Option<ClockAction>) {
        let next = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.remaining() <= budget_ms)
            .min_by_key(|(idx, t)| (t.remaining(), *idx))
            .map(|(idx, t)| (idx, t.remaining()));

        let Some((idx, wait)) = next else {
            self.advance_all(budget_ms);
            return (budget_ms, None);
        };

        self.advance_all(wait);
        let timer = self.timers[idx];
        if timer.repeating {
            self.timers[idx].elapsed_ms = 0;
        } else {
            self.timers.remove(idx);
        }
        (wait, Some(timer.action))
    }

    fn advance_all(&mut self, ms: u64) {
        for timer in &mut self.timers {
            timer.elapsed_ms += ms;
        }
    }

    fn arm(&mut self, action: ClockAction, period_ms: u64, repeating: bool) {
        // A zero period would fire forever within one step
        let timer = Timer {
            action,
            period_ms: period_ms.max(1),
            elapsed_ms: 0,
            repeating,
        };
        match self.timers.iter().position(|t| t.action == action) {
            Some(idx) => self.timers[idx] = timer,
            None => {
                self.timers.push(timer);
                self.timers.sort_by_key(|t| t.action as u8);
            }
        }
    }
}
