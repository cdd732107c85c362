//! End-of-game detection.
//!
//! Checked after every death cascade. Ordering matters: a surviving lover
//! pair outranks both factions, then the werewolves' numbers check, then the
//! villagers' extermination check.

use serde::{Deserialize, Serialize};

use super::domain::Game;
use super::types::{PlayerId, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "winner", rename_all = "snake_case")]
pub enum Victory {
    Lovers { pair: [PlayerId; 2] },
    Werewolves,
    Villagers,
}

impl Victory {
    pub fn announcement(&self) -> String {
        match self {
            Victory::Lovers { .. } => "The lovers have survived together and win!".to_string(),
            Victory::Werewolves => "The werewolves have overrun the village!".to_string(),
            Victory::Villagers => "The village has slain the last werewolf!".to_string(),
        }
    }
}

/// Returns the winning side, if any.
pub fn evaluate(game: &Game) -> Option<Victory> {
    let living = game.living_players();

    // Lovers win only as the final two, and only if they point at each other.
    if living.len() == 2 {
        let a = game.role_of(living[0])?;
        let b = game.role_of(living[1])?;
        if a.is_lover
            && b.is_lover
            && a.lover_partner_id == Some(living[1])
            && b.lover_partner_id == Some(living[0])
        {
            return Some(Victory::Lovers { pair: [living[0], living[1]] });
        }
    }

    let werewolves = living
        .iter()
        .filter(|p| game.role_of(**p).map(|r| r.role()) == Some(Role::Werewolf))
        .count();
    let others = living.len() - werewolves;

    if werewolves == 0 {
        Some(Victory::Villagers)
    } else if werewolves >= others {
        Some(Victory::Werewolves)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testutil::started_game;

    #[test]
    fn no_winner_while_the_village_outnumbers_the_pack() {
        let (game, _) = started_game();
        assert_eq!(evaluate(&game), None);
    }

    #[test]
    fn villagers_win_when_the_pack_is_gone() {
        let (mut game, seats) = started_game();
        for wolf in &seats.werewolves {
            game.kill(*wolf);
        }
        assert_eq!(evaluate(&game), Some(Victory::Villagers));
    }

    #[test]
    fn werewolves_win_on_parity() {
        let (mut game, seats) = started_game();
        // 13 seats, 4 wolves. Kill villagers until 4 vs 4.
        let mut to_kill: Vec<_> = seats.villagers.clone();
        to_kill.extend([seats.seer, seats.witch].iter());
        for p in to_kill {
            game.kill(p);
        }
        assert_eq!(evaluate(&game), Some(Victory::Werewolves));
    }

    #[test]
    fn lovers_outrank_both_factions() {
        let (mut game, seats) = started_game();
        let lover_a = seats.werewolves[0];
        let lover_b = seats.villagers[0];
        {
            let state = game.role_of_mut(lover_a).unwrap();
            state.is_lover = true;
            state.lover_partner_id = Some(lover_b);
        }
        {
            let state = game.role_of_mut(lover_b).unwrap();
            state.is_lover = true;
            state.lover_partner_id = Some(lover_a);
        }
        for p in game.get_players().to_vec() {
            if p != lover_a && p != lover_b {
                game.kill(p);
            }
        }
        assert_eq!(evaluate(&game), Some(Victory::Lovers { pair: [lover_a, lover_b] }));
    }

    #[test]
    fn two_survivors_without_a_bond_fall_through_to_faction_rules() {
        let (mut game, seats) = started_game();
        for p in game.get_players().to_vec() {
            if p != seats.werewolves[0] && p != seats.villagers[0] {
                game.kill(p);
            }
        }
        assert_eq!(evaluate(&game), Some(Victory::Werewolves));
    }
}
