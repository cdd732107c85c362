//! Phase state machine.
//!
//! The coarse `GameStatus` lives on the persisted aggregate; the fine-grained
//! phase (voting, trial, execution) is in-memory per room. Transitions are an
//! explicit directional table, never inferred, and illegal moves leave the
//! controller untouched.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Waiting,
    Starting,
    Night,
    Day,
    Voting,
    Trial,
    Execution,
    Finished,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Waiting => "waiting",
            GamePhase::Starting => "starting",
            GamePhase::Night => "night",
            GamePhase::Day => "day",
            GamePhase::Voting => "voting",
            GamePhase::Trial => "trial",
            GamePhase::Execution => "execution",
            GamePhase::Finished => "finished",
        }
    }

    /// Legal successors. `Finished` is reachable from anywhere and terminal.
    pub fn allowed_transitions(&self) -> &'static [GamePhase] {
        match self {
            GamePhase::Waiting => &[GamePhase::Starting],
            GamePhase::Starting => &[GamePhase::Night],
            GamePhase::Night => &[GamePhase::Day],
            GamePhase::Day => &[GamePhase::Voting, GamePhase::Trial],
            GamePhase::Voting => &[GamePhase::Trial, GamePhase::Execution, GamePhase::Day],
            GamePhase::Trial => &[GamePhase::Execution, GamePhase::Day],
            GamePhase::Execution => &[GamePhase::Night, GamePhase::Finished],
            GamePhase::Finished => &[],
        }
    }

    pub fn can_transition_to(&self, next: GamePhase) -> bool {
        next == GamePhase::Finished && *self != GamePhase::Finished
            || self.allowed_transitions().contains(&next)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-phase timing settings, loaded from the `[phases]` config section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub duration_secs: u64,
    pub auto_advance: bool,
}

impl PhaseConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub starting_secs: u64,
    pub night_secs: u64,
    pub day_secs: u64,
    pub voting_secs: u64,
    pub trial_secs: u64,
    pub execution_secs: u64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            starting_secs: 60,
            night_secs: 180,
            day_secs: 300,
            voting_secs: 120,
            trial_secs: 60,
            execution_secs: 60,
        }
    }
}

impl PhaseDurations {
    pub fn config_for(&self, phase: GamePhase) -> PhaseConfig {
        match phase {
            GamePhase::Waiting => PhaseConfig { duration_secs: 0, auto_advance: false },
            GamePhase::Starting => {
                PhaseConfig { duration_secs: self.starting_secs, auto_advance: true }
            }
            GamePhase::Night => PhaseConfig { duration_secs: self.night_secs, auto_advance: true },
            GamePhase::Day => PhaseConfig { duration_secs: self.day_secs, auto_advance: true },
            GamePhase::Voting => {
                PhaseConfig { duration_secs: self.voting_secs, auto_advance: true }
            }
            GamePhase::Trial => PhaseConfig { duration_secs: self.trial_secs, auto_advance: true },
            GamePhase::Execution => {
                PhaseConfig { duration_secs: self.execution_secs, auto_advance: true }
            }
            GamePhase::Finished => PhaseConfig { duration_secs: 0, auto_advance: false },
        }
    }

    /// Where the timer goes when a phase expires with no manual input.
    pub fn timer_successor(&self, phase: GamePhase) -> Option<GamePhase> {
        match phase {
            GamePhase::Starting => Some(GamePhase::Night),
            GamePhase::Night => Some(GamePhase::Day),
            GamePhase::Day => Some(GamePhase::Voting),
            GamePhase::Voting => Some(GamePhase::Execution),
            GamePhase::Trial => Some(GamePhase::Execution),
            GamePhase::Execution => Some(GamePhase::Night),
            GamePhase::Waiting | GamePhase::Finished => None,
        }
    }
}

/// Tracks the current phase for one room and enforces the transition table.
#[derive(Debug, Clone)]
pub struct PhaseController {
    current: GamePhase,
    durations: PhaseDurations,
}

impl PhaseController {
    pub fn new(durations: PhaseDurations) -> Self {
        Self { current: GamePhase::Waiting, durations }
    }

    pub fn current(&self) -> GamePhase {
        self.current
    }

    pub fn config(&self) -> PhaseConfig {
        self.durations.config_for(self.current)
    }

    pub fn timer_successor(&self) -> Option<GamePhase> {
        self.durations.timer_successor(self.current)
    }

    pub fn transition_to(&mut self, next: GamePhase) -> Result<(), GameError> {
        if !self.current.can_transition_to(next) {
            return Err(GameError::InvalidTransition {
                from: self.current.as_str(),
                to: next.as_str(),
            });
        }
        tracing::debug!(from = %self.current, to = %next, "phase transition");
        self.current = next;
        Ok(())
    }
}
