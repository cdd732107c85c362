//! Daytime lynch vote intake. Tallying and tie handling live in the
//! resolution pipeline; here we only validate and record ballots.

use crate::game::domain::Game;
use crate::game::types::{GameError, GameStatus, PlayerId};

pub fn can_vote(game: &Game, voter: PlayerId) -> bool {
    game.get_status() == GameStatus::Day && game.is_alive(voter)
}

/// Records a day vote. Re-voting replaces the previous ballot.
#[tracing::instrument(skip(game))]
pub fn cast_day_vote(game: &mut Game, voter: PlayerId, target: PlayerId) -> Result<(), GameError> {
    if game.get_status() != GameStatus::Day {
        return Err(GameError::WrongPhase);
    }
    if !game.get_players().contains(&voter) {
        return Err(GameError::PlayerNotFound(voter));
    }
    if !game.is_alive(voter) {
        return Err(GameError::PlayerDead(voter));
    }
    if voter == target {
        return Err(GameError::SelfVote);
    }
    super::check_living_target(game, target)?;

    game.record_day_vote(voter, target);
    Ok(())
}

pub fn vote_targets(game: &Game, voter: PlayerId) -> Vec<PlayerId> {
    game.living_players().into_iter().filter(|p| *p != voter).collect()
}
