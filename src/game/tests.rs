//! End-to-end scenarios driving a whole game through the public module
//! surface, the way the flow layer does at runtime.

use super::actions::{cupid, hunter, seer, sheriff, vote, werewolf, wild_child, witch};
use super::dealer::FixedDealer;
use super::domain::{Game, MAX_PLAYERS, MIN_PLAYERS};
use super::resolution::{self, DeathCause, Notification};
use super::testutil::started_game;
use super::types::{GameError, GameStatus, PlayerId, Role};
use super::victory::{self, Victory};

#[test]
fn role_counts_hold_for_every_legal_table_size() {
    for n in MIN_PLAYERS..=MAX_PLAYERS {
        let creator = PlayerId::new();
        let mut game = Game::new("counts", creator, MAX_PLAYERS as u8);
        for _ in 0..n - 1 {
            game.join(PlayerId::new()).unwrap();
        }
        game.assign_roles(creator, &mut FixedDealer).unwrap();

        let count = |role: Role| {
            game.get_players()
                .iter()
                .filter(|p| game.role_of(**p).unwrap().role() == role)
                .count()
        };
        let wolves = count(Role::Werewolf);
        assert_eq!(wolves, (n / 3).max(1), "n = {n}");
        for special in
            [Role::Seer, Role::Witch, Role::Hunter, Role::Cupid, Role::WildChild, Role::Sheriff]
        {
            assert_eq!(count(special), 1, "n = {n}");
        }
        assert_eq!(count(Role::Villager), n - wolves - 6, "n = {n}");
        assert!(count(Role::Villager) >= 1, "n = {n}");
    }
}

#[test]
fn too_few_players_cannot_start() {
    let creator = PlayerId::new();
    let mut game = Game::new("small", creator, 18);
    for _ in 0..5 {
        game.join(PlayerId::new()).unwrap();
    }
    let err = game.assign_roles(creator, &mut FixedDealer).unwrap_err();
    assert!(matches!(err, GameError::BadPlayerCount { got: 6, .. }));
}

/// A ten-player game played through a full first night and day: cupid binds
/// lovers, the pack eats a villager, the lover follows, the village lynches a
/// wolf, and the round counter moves on.
#[test]
fn ten_player_first_night_and_day() {
    let creator = PlayerId::new();
    let mut game = Game::new("full-loop", creator, 18);
    for _ in 0..9 {
        game.join(PlayerId::new()).unwrap();
    }
    game.assign_roles(creator, &mut FixedDealer).unwrap();
    assert_eq!(game.get_status(), GameStatus::Started);
    assert_eq!(game.get_round(), 1);

    let by_role = |game: &Game, role: Role| -> Vec<PlayerId> {
        game.get_players()
            .iter()
            .copied()
            .filter(|p| game.role_of(*p).unwrap().role() == role)
            .collect()
    };
    let wolves = by_role(&game, Role::Werewolf);
    let villagers = by_role(&game, Role::Villager);
    let the_seer = by_role(&game, Role::Seer)[0];
    let the_witch = by_role(&game, Role::Witch)[0];
    let the_cupid = by_role(&game, Role::Cupid)[0];
    assert_eq!(wolves.len(), 3);
    assert_eq!(villagers.len(), 1);

    // Night 1.
    game.begin_night();
    cupid::choose_lovers(&mut game, the_cupid, villagers[0], the_seer).unwrap();
    assert_eq!(seer::vision(&mut game, the_seer, wolves[0]).unwrap(), Role::Werewolf);
    for wolf in &wolves {
        werewolf::attack(&mut game, *wolf, villagers[0]).unwrap();
    }
    assert_eq!(werewolf::attack_consensus(&game), Some(villagers[0]));
    assert!(witch::night_info(&game, the_witch).unwrap().can_heal);

    let (game, outcome) = resolution::resolve_night(&game).unwrap();
    assert!(!game.is_alive(villagers[0]));
    assert!(!game.is_alive(the_seer), "lover follows the victim");
    assert!(outcome
        .deaths
        .contains(&resolution::Death { player_id: the_seer, cause: DeathCause::Heartbreak }));
    assert_eq!(game.get_status(), GameStatus::Day);

    // Day 1: everyone left piles onto a wolf.
    let mut game = game;
    for voter in game.living_players() {
        if voter != wolves[0] {
            vote::cast_day_vote(&mut game, voter, wolves[0]).unwrap();
        }
    }
    let (game, outcome) = resolution::resolve_day(&game).unwrap();
    assert!(!game.is_alive(wolves[0]));
    assert_eq!(game.get_status(), GameStatus::Night);
    assert_eq!(game.get_round(), 2);
    assert!(outcome.victory.is_none());
    assert_eq!(game.living_players().len(), 7);
}

#[test]
fn hunter_revenge_chains_into_victory() {
    let (mut game, seats) = started_game();
    // Thin the table so the board is 4 wolves vs hunter + 2 others.
    for p in [seats.seer, seats.witch, seats.cupid, seats.wild_child, seats.sheriff] {
        game.kill(p);
    }
    game.kill(seats.villagers[2]);
    game.begin_night();
    for wolf in &seats.werewolves {
        werewolf::attack(&mut game, *wolf, seats.hunter).unwrap();
    }

    let (game, outcome) = resolution::resolve_night(&game).unwrap();
    assert!(outcome
        .notifications
        .contains(&Notification::HunterRevengeAvailable { hunter: seats.hunter }));
    // Two villagers against four wolves: already over at dawn.
    assert_eq!(outcome.victory, Some(Victory::Werewolves));

    // The dead hunter still takes a wolf down with him.
    assert!(hunter::can_revenge(&game, seats.hunter));
    let (game, outcome) =
        resolution::resolve_hunter_revenge(&game, seats.hunter, seats.werewolves[0]).unwrap();
    assert!(!game.is_alive(seats.werewolves[0]));
    assert_eq!(outcome.victory, Some(Victory::Werewolves));
}

#[test]
fn sheriff_succession_transfers_the_badge_through_the_cascade() {
    let (mut game, seats) = started_game();
    game.begin_night();
    game.begin_day();
    sheriff::choose_successor(&mut game, seats.sheriff, seats.seer).unwrap();

    // Lynch the sheriff.
    for voter in game.living_players() {
        if voter != seats.sheriff {
            vote::cast_day_vote(&mut game, voter, seats.sheriff).unwrap();
        }
    }
    let (game, outcome) = resolution::resolve_day(&game).unwrap();
    assert!(!game.is_alive(seats.sheriff));
    assert!(outcome
        .notifications
        .contains(&Notification::SheriffPromoted { new_sheriff: seats.seer }));
    assert!(matches!(
        game.role_of(seats.seer).unwrap().card,
        super::types::RoleCard::Sheriff { has_double_vote: true, can_break_ties: true, .. }
    ));
}

#[test]
fn transformed_wild_child_counts_for_the_pack() {
    let (mut game, seats) = started_game();
    game.begin_night();
    wild_child::choose_model(&mut game, seats.wild_child, seats.villagers[0]).unwrap();
    for wolf in &seats.werewolves {
        werewolf::attack(&mut game, *wolf, seats.villagers[0]).unwrap();
    }
    let (game, _) = resolution::resolve_night(&game).unwrap();

    // 5 wolves now. Reduce the rest to 5 and the pack wins on parity.
    let mut game = game;
    for p in [seats.seer, seats.witch] {
        game.kill(p);
    }
    assert_eq!(victory::evaluate(&game), Some(Victory::Werewolves));
}
