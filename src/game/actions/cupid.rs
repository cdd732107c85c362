//! Cupid's arrow: on the first night only, two distinct living players are
//! bound as mutual lovers. The bond outlives Cupid.

use crate::game::domain::Game;
use crate::game::types::{GameError, GameStatus, PlayerId, Role, RoleCard};

pub fn is_cupid(game: &Game, player_id: PlayerId) -> bool {
    game.role_of(player_id)
        .map(|r| r.is_alive && r.role() == Role::Cupid)
        .unwrap_or(false)
}

pub fn can_choose_lovers(game: &Game, player_id: PlayerId) -> bool {
    super::check_actor(game, player_id, Role::Cupid, GameStatus::Night).is_ok()
        && game.get_round() == 1
        && matches!(
            game.role_of(player_id).map(|r| &r.card),
            Some(RoleCard::Cupid { has_chosen_lovers: false })
        )
}

#[tracing::instrument(skip(game))]
pub fn choose_lovers(
    game: &mut Game,
    cupid: PlayerId,
    first: PlayerId,
    second: PlayerId,
) -> Result<(), GameError> {
    super::check_actor(game, cupid, Role::Cupid, GameStatus::Night)?;
    if game.get_round() != 1 {
        return Err(GameError::NotFirstNight);
    }
    if let Some(RoleCard::Cupid { has_chosen_lovers: true }) =
        game.role_of(cupid).map(|r| &r.card)
    {
        return Err(GameError::LoversAlreadyChosen);
    }
    if first == second {
        return Err(GameError::SelfTarget);
    }
    super::check_living_target(game, first)?;
    super::check_living_target(game, second)?;

    let a = game.role_of_mut(first).ok_or(GameError::TargetNotFound(first))?;
    a.is_lover = true;
    a.lover_partner_id = Some(second);

    let b = game.role_of_mut(second).ok_or(GameError::TargetNotFound(second))?;
    b.is_lover = true;
    b.lover_partner_id = Some(first);

    let state = game.role_of_mut(cupid).ok_or(GameError::PlayerNotFound(cupid))?;
    state.card = RoleCard::Cupid { has_chosen_lovers: true };
    state.has_acted_tonight = true;
    Ok(())
}

pub fn lovers(game: &Game) -> Vec<PlayerId> {
    game.get_players()
        .iter()
        .copied()
        .filter(|p| game.role_of(*p).map(|r| r.is_lover).unwrap_or(false))
        .collect()
}
