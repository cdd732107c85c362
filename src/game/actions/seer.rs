//! Seer night vision: one look per night at another living player's true
//! role. The flag resets when a new night begins.

use crate::game::domain::Game;
use crate::game::types::{GameError, GameStatus, PlayerId, Role, RoleCard};

pub fn can_act(game: &Game, player_id: PlayerId) -> bool {
    if super::check_actor(game, player_id, Role::Seer, GameStatus::Night).is_err() {
        return false;
    }
    matches!(
        game.role_of(player_id).map(|r| &r.card),
        Some(RoleCard::Seer { has_used_vision_tonight: false })
    )
}

#[tracing::instrument(skip(game))]
pub fn vision(game: &mut Game, seer: PlayerId, target: PlayerId) -> Result<Role, GameError> {
    super::check_actor(game, seer, Role::Seer, GameStatus::Night)?;
    if seer == target {
        return Err(GameError::SelfTarget);
    }
    super::check_living_target(game, target)?;

    {
        let state = game.role_of(seer).ok_or(GameError::PlayerNotFound(seer))?;
        if let RoleCard::Seer { has_used_vision_tonight: true } = state.card {
            return Err(GameError::AlreadyActed(seer));
        }
    }

    let revealed = game.role_of(target).ok_or(GameError::TargetNotFound(target))?.role();

    let state = game.role_of_mut(seer).ok_or(GameError::PlayerNotFound(seer))?;
    if let RoleCard::Seer { has_used_vision_tonight } = &mut state.card {
        *has_used_vision_tonight = true;
    }
    state.target_player_id = Some(target);
    state.has_acted_tonight = true;

    Ok(revealed)
}

/// Living players the seer may look at (everyone but the seer).
pub fn eligible_targets(game: &Game, seer: PlayerId) -> Vec<PlayerId> {
    game.living_players().into_iter().filter(|p| *p != seer).collect()
}
