//! Per-role ability resolvers.
//!
//! Every resolver validates in the same order: phase, actor exists and is
//! alive, actor holds the role, then role-specific legality. A violated rule
//! is a typed `GameError`, never a panic, and leaves the aggregate untouched.

pub mod cupid;
pub mod hunter;
pub mod seer;
pub mod sheriff;
pub mod vote;
pub mod werewolf;
pub mod wild_child;
pub mod witch;

use super::domain::Game;
use super::types::{GameError, GameStatus, PlayerId, Role};

/// Shared head of the validation chain: phase + actor liveness + role.
pub(crate) fn check_actor(
    game: &Game,
    actor: PlayerId,
    role: Role,
    phase: GameStatus,
) -> Result<(), GameError> {
    if game.get_status() != phase {
        return Err(GameError::WrongPhase);
    }
    let state = game.role_of(actor).ok_or(GameError::PlayerNotFound(actor))?;
    if !state.is_alive {
        return Err(GameError::PlayerDead(actor));
    }
    if state.role() != role {
        return Err(GameError::RoleMismatch(actor));
    }
    Ok(())
}

/// Target must be seated and alive.
pub(crate) fn check_living_target(game: &Game, target: PlayerId) -> Result<(), GameError> {
    let state = game.role_of(target).ok_or(GameError::TargetNotFound(target))?;
    if !state.is_alive {
        return Err(GameError::TargetDead(target));
    }
    Ok(())
}
