//! Hunter revenge. The only resolver whose precondition is being dead: it
//! models the hunter's last act at the moment of elimination.

use crate::game::domain::Game;
use crate::game::types::{GameError, PlayerId, Role, RoleCard};

pub fn is_hunter(game: &Game, player_id: PlayerId) -> bool {
    game.role_of(player_id).map(|r| r.role() == Role::Hunter).unwrap_or(false)
}

/// Revenge is available once the hunter has died and only until it is used.
pub fn can_revenge(game: &Game, player_id: PlayerId) -> bool {
    matches!(
        game.role_of(player_id),
        Some(state)
            if !state.is_alive
                && matches!(
                    state.card,
                    RoleCard::Hunter { can_revenge_kill: true, has_used_revenge: false }
                )
    )
}

#[tracing::instrument(skip(game))]
pub fn revenge_kill(game: &mut Game, hunter: PlayerId, target: PlayerId) -> Result<(), GameError> {
    let state = game.role_of(hunter).ok_or(GameError::PlayerNotFound(hunter))?;
    match &state.card {
        RoleCard::Hunter { can_revenge_kill, has_used_revenge } => {
            if state.is_alive {
                return Err(GameError::HunterStillAlive);
            }
            if !can_revenge_kill || *has_used_revenge {
                return Err(GameError::RevengeSpent);
            }
        }
        _ => return Err(GameError::RoleMismatch(hunter)),
    }
    if hunter == target {
        return Err(GameError::SelfTarget);
    }
    super::check_living_target(game, target)?;

    game.kill(target);
    let state = game.role_of_mut(hunter).ok_or(GameError::PlayerNotFound(hunter))?;
    if let RoleCard::Hunter { has_used_revenge, .. } = &mut state.card {
        *has_used_revenge = true;
    }
    state.target_player_id = Some(target);
    Ok(())
}

/// Living players the dead hunter may take down with them.
pub fn revenge_targets(game: &Game, hunter: PlayerId) -> Vec<PlayerId> {
    game.living_players().into_iter().filter(|p| *p != hunter).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testutil::started_game;

    #[test]
    fn living_hunter_cannot_take_revenge() {
        let (mut game, seats) = started_game();
        game.begin_night();
        let err = revenge_kill(&mut game, seats.hunter, seats.villagers[0]).unwrap_err();
        assert_eq!(err, GameError::HunterStillAlive);
    }

    #[test]
    fn dead_hunter_kills_once() {
        let (mut game, seats) = started_game();
        game.kill(seats.hunter);
        assert!(can_revenge(&game, seats.hunter));

        revenge_kill(&mut game, seats.hunter, seats.villagers[0]).unwrap();
        assert!(!game.is_alive(seats.villagers[0]));
        assert!(!can_revenge(&game, seats.hunter));

        let err = revenge_kill(&mut game, seats.hunter, seats.villagers[1]).unwrap_err();
        assert_eq!(err, GameError::RevengeSpent);
    }

    #[test]
    fn revenge_rejects_self_and_dead_targets() {
        let (mut game, seats) = started_game();
        game.kill(seats.hunter);
        game.kill(seats.villagers[0]);

        assert_eq!(
            revenge_kill(&mut game, seats.hunter, seats.hunter).unwrap_err(),
            GameError::SelfTarget
        );
        assert_eq!(
            revenge_kill(&mut game, seats.hunter, seats.villagers[0]).unwrap_err(),
            GameError::TargetDead(seats.villagers[0])
        );
    }

    #[test]
    fn revenge_targets_exclude_the_dead() {
        let (mut game, seats) = started_game();
        game.kill(seats.hunter);
        game.kill(seats.villagers[0]);
        let targets = revenge_targets(&game, seats.hunter);
        assert!(!targets.contains(&seats.villagers[0]));
        assert!(!targets.contains(&seats.hunter));
    }
}
