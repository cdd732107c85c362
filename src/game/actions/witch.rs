//! Witch night actions. The heal is legal only against the werewolves'
//! consensus victim of the same night; the poison may hit any living player,
//! the witch included. Each potion is one-time and never refilled.

use crate::game::actions::werewolf;
use crate::game::domain::Game;
use crate::game::types::{GameError, GameStatus, NightActionKind, PlayerId, Role, RoleCard};

pub fn is_witch(game: &Game, player_id: PlayerId) -> bool {
    game.role_of(player_id)
        .map(|r| r.is_alive && r.role() == Role::Witch)
        .unwrap_or(false)
}

pub fn can_heal(game: &Game, player_id: PlayerId) -> bool {
    super::check_actor(game, player_id, Role::Witch, GameStatus::Night).is_ok()
        && matches!(
            game.role_of(player_id).map(|r| &r.card),
            Some(RoleCard::Witch { has_healing_potion: true, .. })
        )
}

pub fn can_poison(game: &Game, player_id: PlayerId) -> bool {
    super::check_actor(game, player_id, Role::Witch, GameStatus::Night).is_ok()
        && matches!(
            game.role_of(player_id).map(|r| &r.card),
            Some(RoleCard::Witch { has_poison_potion: true, .. })
        )
}

/// What the witch learns at night: the pack's victim, if decided, and which
/// potions she still holds.
#[derive(Debug, Clone, PartialEq)]
pub struct NightInfo {
    pub attacked_player: Option<PlayerId>,
    pub can_heal: bool,
    pub can_poison: bool,
}

pub fn night_info(game: &Game, witch: PlayerId) -> Option<NightInfo> {
    if !is_witch(game, witch) {
        return None;
    }
    Some(NightInfo {
        attacked_player: werewolf::attack_consensus(game),
        can_heal: can_heal(game, witch),
        can_poison: can_poison(game, witch),
    })
}

#[tracing::instrument(skip(game))]
pub fn heal(game: &mut Game, witch: PlayerId, victim: PlayerId) -> Result<(), GameError> {
    super::check_actor(game, witch, Role::Witch, GameStatus::Night)?;

    match game.role_of(witch).map(|r| &r.card) {
        Some(RoleCard::Witch { has_healing_potion: true, .. }) => {}
        Some(RoleCard::Witch { .. }) => return Err(GameError::PotionSpent),
        _ => return Err(GameError::RoleMismatch(witch)),
    }

    // The heal is tied to the pack's chosen victim, nobody else.
    if werewolf::attack_consensus(game) != Some(victim) {
        return Err(GameError::NotConsensusVictim);
    }

    let state = game.role_of_mut(witch).ok_or(GameError::PlayerNotFound(witch))?;
    if let RoleCard::Witch { has_healing_potion, .. } = &mut state.card {
        *has_healing_potion = false;
    }
    state.has_acted_tonight = true;
    game.record_night_action(NightActionKind::WitchHeal, witch, victim);
    Ok(())
}

#[tracing::instrument(skip(game))]
pub fn poison(game: &mut Game, witch: PlayerId, target: PlayerId) -> Result<(), GameError> {
    super::check_actor(game, witch, Role::Witch, GameStatus::Night)?;
    super::check_living_target(game, target)?; // self-poison is allowed

    match game.role_of(witch).map(|r| &r.card) {
        Some(RoleCard::Witch { has_poison_potion: true, .. }) => {}
        Some(RoleCard::Witch { .. }) => return Err(GameError::PotionSpent),
        _ => return Err(GameError::RoleMismatch(witch)),
    }

    let state = game.role_of_mut(witch).ok_or(GameError::PlayerNotFound(witch))?;
    if let RoleCard::Witch { has_poison_potion, .. } = &mut state.card {
        *has_poison_potion = false;
    }
    state.has_acted_tonight = true;
    game.record_night_action(NightActionKind::WitchPoison, witch, target);
    Ok(())
}

/// Outcome of the witch's recorded actions for the night.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WitchNightResult {
    pub healed: Vec<PlayerId>,
    pub poisoned: Vec<PlayerId>,
}

/// Apply poison deaths and report who was healed and who was poisoned.
/// Healing does not kill anyone by itself; the resolution engine uses the
/// healed set to spare the consensus victim.
pub fn process_night_actions(game: &mut Game) -> WitchNightResult {
    let healed: Vec<PlayerId> = game
        .night_actions(NightActionKind::WitchHeal)
        .map(|m| m.values().copied().collect())
        .unwrap_or_default();

    let poisoned: Vec<PlayerId> = game
        .night_actions(NightActionKind::WitchPoison)
        .map(|m| m.values().copied().collect())
        .unwrap_or_default();

    let mut result = WitchNightResult { healed, poisoned: Vec::new() };
    for target in poisoned {
        if game.kill(target) {
            result.poisoned.push(target);
        }
    }
    result
}
