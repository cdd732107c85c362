//! Sheriff powers: breaking tied day votes, and naming a successor who
//! inherits the badge (and its bonuses) when the sheriff dies.

use std::collections::HashMap;

use crate::game::domain::Game;
use crate::game::types::{GameError, GameStatus, PlayerId, Role, RoleCard};

pub fn is_sheriff(game: &Game, player_id: PlayerId) -> bool {
    game.role_of(player_id)
        .map(|r| r.is_alive && r.role() == Role::Sheriff)
        .unwrap_or(false)
}

/// Weighted day-vote tally; a sheriff with the double-vote bonus counts
/// twice.
pub(crate) fn day_vote_counts(game: &Game) -> HashMap<PlayerId, usize> {
    let mut counts = HashMap::new();
    for (voter, target) in game.day_votes() {
        let weight = match game.role_of(*voter).map(|r| &r.card) {
            Some(RoleCard::Sheriff { has_double_vote: true, .. }) => 2,
            _ => 1,
        };
        *counts.entry(*target).or_insert(0) += weight;
    }
    counts
}

/// Ballot weight for a voter in external voting sessions.
pub fn vote_weight(game: &Game, voter: PlayerId) -> u32 {
    match game.role_of(voter).map(|r| &r.card) {
        Some(RoleCard::Sheriff { has_double_vote: true, .. }) => 2,
        _ => 1,
    }
}

/// Players sharing the current maximum of day votes; empty unless at least
/// two of them are tied.
pub fn tied_players(game: &Game) -> Vec<PlayerId> {
    let counts = day_vote_counts(game);
    let Some(max) = counts.values().copied().max() else {
        return Vec::new();
    };
    let tied: Vec<PlayerId> =
        counts.into_iter().filter(|(_, c)| *c == max).map(|(p, _)| p).collect();
    if tied.len() > 1 {
        tied
    } else {
        Vec::new()
    }
}

pub fn has_day_vote_tie(game: &Game) -> bool {
    !tied_players(game).is_empty()
}

pub fn can_break_tie(game: &Game, sheriff: PlayerId) -> bool {
    if super::check_actor(game, sheriff, Role::Sheriff, GameStatus::Day).is_err() {
        return false;
    }
    matches!(
        game.role_of(sheriff).map(|r| &r.card),
        Some(RoleCard::Sheriff { can_break_ties: true, .. })
    ) && has_day_vote_tie(game)
}

/// Eliminate one of the tied leaders and clear the day's votes.
#[tracing::instrument(skip(game))]
pub fn break_tie(game: &mut Game, sheriff: PlayerId, target: PlayerId) -> Result<(), GameError> {
    super::check_actor(game, sheriff, Role::Sheriff, GameStatus::Day)?;
    match game.role_of(sheriff).map(|r| &r.card) {
        Some(RoleCard::Sheriff { can_break_ties: true, .. }) => {}
        Some(RoleCard::Sheriff { .. }) => return Err(GameError::NoTieToBreak),
        _ => return Err(GameError::RoleMismatch(sheriff)),
    }

    let tied = tied_players(game);
    if tied.is_empty() {
        return Err(GameError::NoTieToBreak);
    }
    if !tied.contains(&target) {
        return Err(GameError::TargetNotTied);
    }
    super::check_living_target(game, target)?;

    game.kill(target);
    game.clear_day_votes();
    Ok(())
}

pub fn can_choose_successor(game: &Game, sheriff: PlayerId) -> bool {
    is_sheriff(game, sheriff)
}

#[tracing::instrument(skip(game))]
pub fn choose_successor(
    game: &mut Game,
    sheriff: PlayerId,
    successor: PlayerId,
) -> Result<(), GameError> {
    let state = game.role_of(sheriff).ok_or(GameError::PlayerNotFound(sheriff))?;
    if state.role() != Role::Sheriff {
        return Err(GameError::RoleMismatch(sheriff));
    }
    if !state.is_alive {
        return Err(GameError::PlayerDead(sheriff));
    }
    if sheriff == successor {
        return Err(GameError::SelfTarget);
    }
    super::check_living_target(game, successor)?;

    let state = game.role_of_mut(sheriff).ok_or(GameError::PlayerNotFound(sheriff))?;
    if let RoleCard::Sheriff { successor_id, .. } = &mut state.card {
        *successor_id = Some(successor);
    }
    Ok(())
}

/// Transfer the badge to the designated successor once the sheriff is dead.
/// Invoked by the death-consequence pipeline, never by a player. Returns the
/// promoted player, if any.
#[tracing::instrument(skip(game))]
pub fn promote_successor(game: &mut Game, deceased: PlayerId) -> Option<PlayerId> {
    let successor = match game.role_of(deceased).map(|r| &r.card) {
        Some(RoleCard::Sheriff { successor_id: Some(successor), .. }) => *successor,
        _ => return None,
    };
    if !game.is_alive(successor) {
        return None;
    }

    let state = game.role_of_mut(successor)?;
    state.card = RoleCard::Sheriff {
        has_double_vote: true,
        can_break_ties: true,
        successor_id: None,
    };
    Some(successor)
}
