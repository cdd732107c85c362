//! Test fixtures shared by the domain tests: a started 13-player game with a
//! known seating order, dealt with the deterministic `FixedDealer`.

use super::dealer::FixedDealer;
use super::domain::Game;
use super::types::{PlayerId, Role};

pub struct Seats {
    pub creator: PlayerId,
    pub werewolves: Vec<PlayerId>,
    pub seer: PlayerId,
    pub witch: PlayerId,
    pub hunter: PlayerId,
    pub cupid: PlayerId,
    pub wild_child: PlayerId,
    pub sheriff: PlayerId,
    pub villagers: Vec<PlayerId>,
}

/// 13 players: 4 werewolves, the 6 special roles, 3 villagers, dealt in deck
/// order so every seat's role is known up front.
pub fn started_game() -> (Game, Seats) {
    let creator = PlayerId::new();
    let mut game = Game::new("fixture", creator, 18);
    for _ in 0..12 {
        game.join(PlayerId::new()).unwrap();
    }
    game.assign_roles(creator, &mut FixedDealer).unwrap();

    let players: Vec<PlayerId> = game.get_players().to_vec();
    let by_role = |role: Role| -> Vec<PlayerId> {
        players
            .iter()
            .copied()
            .filter(|p| game.role_of(*p).unwrap().role() == role)
            .collect()
    };

    let seats = Seats {
        creator,
        werewolves: by_role(Role::Werewolf),
        seer: by_role(Role::Seer)[0],
        witch: by_role(Role::Witch)[0],
        hunter: by_role(Role::Hunter)[0],
        cupid: by_role(Role::Cupid)[0],
        wild_child: by_role(Role::WildChild)[0],
        sheriff: by_role(Role::Sheriff)[0],
        villagers: by_role(Role::Villager),
    };
    assert_eq!(seats.werewolves.len(), 4);
    assert_eq!(seats.villagers.len(), 3);
    (game, seats)
}
