//! Werewolf pack attack: each living wolf records a vote during the night;
//! the kill only lands if the whole pack has voted and one target holds a
//! strict plurality. A split pack means no kill, which is deliberately
//! different from the day-vote sheriff tie-break.

use std::collections::HashMap;

use crate::game::domain::Game;
use crate::game::types::{GameError, GameStatus, NightActionKind, PlayerId, Role};

pub fn can_act(game: &Game, player_id: PlayerId) -> bool {
    super::check_actor(game, player_id, Role::Werewolf, GameStatus::Night).is_ok()
        && !has_voted(game, player_id)
}

pub fn has_voted(game: &Game, player_id: PlayerId) -> bool {
    game.night_actions(NightActionKind::WerewolfAttack)
        .map(|votes| votes.contains_key(&player_id))
        .unwrap_or(false)
}

#[tracing::instrument(skip(game))]
pub fn attack(game: &mut Game, attacker: PlayerId, target: PlayerId) -> Result<(), GameError> {
    super::check_actor(game, attacker, Role::Werewolf, GameStatus::Night)?;
    super::check_living_target(game, target)?;

    let target_state = game.role_of(target).ok_or(GameError::TargetNotFound(target))?;
    if target_state.role() == Role::Werewolf {
        return Err(GameError::WerewolfTarget);
    }
    if has_voted(game, attacker) {
        return Err(GameError::AlreadyActed(attacker));
    }

    let actor = game.role_of_mut(attacker).ok_or(GameError::PlayerNotFound(attacker))?;
    actor.has_acted_tonight = true;
    actor.target_player_id = Some(target);

    game.record_night_action(NightActionKind::WerewolfAttack, attacker, target);
    Ok(())
}

/// The pack's agreed victim, if any. None while wolves are still voting, and
/// None on a split vote.
pub fn attack_consensus(game: &Game) -> Option<PlayerId> {
    let votes = game.night_actions(NightActionKind::WerewolfAttack)?;
    let wolves = game.living_with_role(Role::Werewolf);
    if wolves.is_empty() || wolves.iter().any(|w| !votes.contains_key(w)) {
        return None;
    }

    let mut counts: HashMap<PlayerId, usize> = HashMap::new();
    for wolf in &wolves {
        if let Some(target) = votes.get(wolf) {
            *counts.entry(*target).or_default() += 1;
        }
    }

    let max = counts.values().copied().max()?;
    let mut leaders = counts.iter().filter(|(_, c)| **c == max).map(|(t, _)| *t);
    let leader = leaders.next()?;
    if leaders.next().is_some() {
        return None; // split pack, no kill tonight
    }
    Some(leader)
}

/// Living players outside the pack: the valid attack targets.
pub fn valid_targets(game: &Game) -> Vec<PlayerId> {
    game.living_players()
        .into_iter()
        .filter(|p| game.role_of(*p).map(|r| r.role() != Role::Werewolf).unwrap_or(false))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testutil::started_game;

    #[test]
    fn attack_requires_night_phase() {
        let (mut game, seats) = started_game();
        game.set_status(GameStatus::Day);
        let err = attack(&mut game, seats.werewolves[0], seats.villagers[0]).unwrap_err();
        assert_eq!(err, GameError::WrongPhase);
    }

    #[test]
    fn werewolves_cannot_attack_each_other() {
        let (mut game, seats) = started_game();
        game.begin_night();
        let err = attack(&mut game, seats.werewolves[0], seats.werewolves[1]).unwrap_err();
        assert_eq!(err, GameError::WerewolfTarget);
    }

    #[test]
    fn second_attack_in_one_night_is_rejected() {
        let (mut game, seats) = started_game();
        game.begin_night();
        attack(&mut game, seats.werewolves[0], seats.villagers[0]).unwrap();
        let err = attack(&mut game, seats.werewolves[0], seats.villagers[1]).unwrap_err();
        assert_eq!(err, GameError::AlreadyActed(seats.werewolves[0]));
    }

    #[test]
    fn unanimous_pack_reaches_consensus() {
        let (mut game, seats) = started_game();
        game.begin_night();
        let victim = seats.villagers[0];
        for wolf in &seats.werewolves {
            attack(&mut game, *wolf, victim).unwrap();
        }
        assert_eq!(attack_consensus(&game), Some(victim));
    }

    #[test]
    fn no_consensus_until_every_wolf_votes() {
        let (mut game, seats) = started_game();
        game.begin_night();
        attack(&mut game, seats.werewolves[0], seats.villagers[0]).unwrap();
        assert_eq!(attack_consensus(&game), None);
    }

    #[test]
    fn split_pack_means_no_kill() {
        let (mut game, seats) = started_game();
        game.begin_night();
        attack(&mut game, seats.werewolves[0], seats.villagers[0]).unwrap();
        attack(&mut game, seats.werewolves[1], seats.villagers[0]).unwrap();
        attack(&mut game, seats.werewolves[2], seats.villagers[1]).unwrap();
        attack(&mut game, seats.werewolves[3], seats.villagers[1]).unwrap();
        assert_eq!(attack_consensus(&game), None);
    }

    #[test]
    fn plurality_wins_over_scattered_votes() {
        let (mut game, seats) = started_game();
        game.begin_night();
        let victim = seats.villagers[0];
        attack(&mut game, seats.werewolves[0], victim).unwrap();
        attack(&mut game, seats.werewolves[1], victim).unwrap();
        attack(&mut game, seats.werewolves[2], seats.villagers[1]).unwrap();
        attack(&mut game, seats.werewolves[3], seats.villagers[2]).unwrap();
        assert_eq!(attack_consensus(&game), Some(victim));
    }

    #[test]
    fn dead_wolves_are_not_waited_on() {
        let (mut game, seats) = started_game();
        game.begin_night();
        game.kill(seats.werewolves[3]);
        let victim = seats.villagers[0];
        attack(&mut game, seats.werewolves[0], victim).unwrap();
        attack(&mut game, seats.werewolves[1], victim).unwrap();
        attack(&mut game, seats.werewolves[2], victim).unwrap();
        assert_eq!(attack_consensus(&game), Some(victim));
    }
}
