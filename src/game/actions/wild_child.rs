//! Wild child: picks a model on the first night; if the model ever dies
//! while the wild child lives, the child joins the werewolf pack. The
//! transformation itself runs inside the death-consequence cascade.

use crate::game::domain::Game;
use crate::game::types::{GameError, GameStatus, PlayerId, Role, RoleCard};

pub fn can_choose_model(game: &Game, player_id: PlayerId) -> bool {
    super::check_actor(game, player_id, Role::WildChild, GameStatus::Night).is_ok()
        && game.get_round() == 1
        && matches!(
            game.role_of(player_id).map(|r| &r.card),
            Some(RoleCard::WildChild { model_player_id: None, .. })
        )
}

#[tracing::instrument(skip(game))]
pub fn choose_model(game: &mut Game, child: PlayerId, model: PlayerId) -> Result<(), GameError> {
    super::check_actor(game, child, Role::WildChild, GameStatus::Night)?;
    if game.get_round() != 1 {
        return Err(GameError::NotFirstNight);
    }
    if child == model {
        return Err(GameError::SelfTarget);
    }
    if let Some(RoleCard::WildChild { model_player_id: Some(_), .. }) =
        game.role_of(child).map(|r| &r.card)
    {
        return Err(GameError::ModelAlreadyChosen);
    }
    super::check_living_target(game, model)?;

    let state = game.role_of_mut(child).ok_or(GameError::PlayerNotFound(child))?;
    if let RoleCard::WildChild { model_player_id, .. } = &mut state.card {
        *model_player_id = Some(model);
    }
    state.has_acted_tonight = true;
    Ok(())
}

/// Living wild children whose model is the given dead player. Each flips to
/// the werewolf side exactly once.
#[tracing::instrument(skip(game))]
pub fn check_transformation(game: &mut Game, dead_player: PlayerId) -> Vec<PlayerId> {
    let children: Vec<PlayerId> = game
        .get_players()
        .iter()
        .copied()
        .filter(|p| {
            matches!(
                game.role_of(*p),
                Some(state)
                    if state.is_alive
                        && matches!(
                            state.card,
                            RoleCard::WildChild {
                                model_player_id: Some(model),
                                has_transformed: false,
                            } if model == dead_player
                        )
            )
        })
        .collect();

    for child in &children {
        if let Some(state) = game.role_of_mut(*child) {
            state.card = RoleCard::Werewolf;
            tracing::info!(wild_child = %child, "wild child joined the pack");
        }
    }
    children
}

/// Existing pack members to notify about a freshly transformed wild child.
pub fn pack_to_notify(game: &Game, new_member: PlayerId) -> Vec<PlayerId> {
    game.living_with_role(Role::Werewolf)
        .into_iter()
        .filter(|p| *p != new_member)
        .collect()
}
