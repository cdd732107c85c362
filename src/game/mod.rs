pub mod actions;
pub mod dealer;
pub mod domain;
pub mod phase;
pub mod resolution;
pub mod types;
pub mod victory;
pub mod voting;

#[cfg(test)]
pub(crate) mod testutil;
#[cfg(test)]
mod tests;

pub use domain::Game;
pub use phase::{GamePhase, PhaseController, PhaseDurations};
pub use resolution::{PendingAction, PhaseOutcome};
pub use types::{GameError, GameId, GameStatus, PlayerId, Role};
pub use victory::Victory;
pub use voting::{VoteType, VotingSession};
