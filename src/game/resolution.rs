//! Night and day resolution.
//!
//! Every resolver here is copy-compute-commit: it clones the aggregate, runs
//! the fixed pipeline against the copy, and hands back the evolved game plus
//! a `PhaseOutcome`. The caller persists the copy in one write, so a failure
//! mid-pipeline can never leave a half-applied game in the store.

use serde::{Deserialize, Serialize};

use super::actions::{hunter, sheriff, werewolf, wild_child, witch};
use super::domain::Game;
use super::phase::GamePhase;
use super::types::{GameError, GameStatus, PlayerId, RoleCard};
use super::victory::{self, Victory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    WerewolfAttack,
    Poison,
    Lynch,
    TieBreak,
    Heartbreak,
    HunterRevenge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Death {
    pub player_id: PlayerId,
    pub cause: DeathCause,
}

/// Side effects the flow layer must deliver to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    HunterRevengeAvailable { hunter: PlayerId },
    PackMemberJoined { new_member: PlayerId, pack: Vec<PlayerId> },
    SheriffPromoted { new_sheriff: PlayerId },
    SheriffTiebreakPending { sheriff: PlayerId, tied_players: Vec<PlayerId> },
}

/// Everything a resolution pass decided, in commit order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub events: Vec<String>,
    pub deaths: Vec<Death>,
    pub transformations: Vec<PlayerId>,
    pub notifications: Vec<Notification>,
    pub victory: Option<Victory>,
    pub next_phase: Option<GamePhase>,
}

/// Consequences of a death, applied in a fixed order so chain deaths settle
/// before sheriff succession reads liveness: wild-child transformation, lover
/// propagation (recursive), hunter revenge notice, sheriff succession.
fn run_death_cascade(game: &mut Game, seeds: Vec<Death>, outcome: &mut PhaseOutcome) {
    let mut worklist = seeds;
    while let Some(death) = worklist.pop() {
        outcome.deaths.push(death);
        let dead = death.player_id;

        for child in wild_child::check_transformation(game, dead) {
            outcome.transformations.push(child);
            outcome.notifications.push(Notification::PackMemberJoined {
                new_member: child,
                pack: wild_child::pack_to_notify(game, child),
            });
            outcome.events.push(format!("{child} has joined the werewolves"));
        }

        let partner = game
            .role_of(dead)
            .and_then(|state| state.lover_partner_id)
            .filter(|p| game.is_alive(*p));
        if let Some(partner) = partner {
            game.kill(partner);
            outcome.events.push(format!("{partner} died of heartbreak"));
            worklist.push(Death { player_id: partner, cause: DeathCause::Heartbreak });
        }

        if hunter::can_revenge(game, dead) {
            outcome.notifications.push(Notification::HunterRevengeAvailable { hunter: dead });
        }

        if let Some(new_sheriff) = sheriff::promote_successor(game, dead) {
            outcome.notifications.push(Notification::SheriffPromoted { new_sheriff });
            outcome.events.push(format!("{new_sheriff} is the new sheriff"));
        }
    }
}

/// Victory check; on a win the copy is moved to Finished.
fn settle(game: &mut Game, outcome: &mut PhaseOutcome) -> bool {
    if let Some(win) = victory::evaluate(game) {
        outcome.events.push(win.announcement());
        outcome.victory = Some(win);
        outcome.next_phase = Some(GamePhase::Finished);
        game.set_status(GameStatus::Finished);
        true
    } else {
        false
    }
}

/// Resolves a finished night: werewolf consensus, witch potions, deaths, the
/// death cascade, then either a victory or the move to Day.
#[tracing::instrument(skip(game), fields(game_id = %game.get_id(), round = game.get_round()))]
pub fn resolve_night(game: &Game) -> Result<(Game, PhaseOutcome), GameError> {
    if game.get_status() != GameStatus::Night {
        return Err(GameError::WrongPhase);
    }
    game.check_integrity()?;

    let mut game = game.clone();
    let mut outcome = PhaseOutcome::default();
    let mut seeds = Vec::new();

    let consensus = werewolf::attack_consensus(&game);
    let witch_result = witch::process_night_actions(&mut game);
    for poisoned in &witch_result.poisoned {
        seeds.push(Death { player_id: *poisoned, cause: DeathCause::Poison });
        outcome.events.push(format!("{poisoned} was poisoned"));
    }

    match consensus {
        Some(victim) if witch_result.healed.contains(&victim) => {
            outcome.events.push(format!("{victim} was attacked but saved by the witch"));
        }
        Some(victim) => {
            if game.kill(victim) {
                seeds.push(Death { player_id: victim, cause: DeathCause::WerewolfAttack });
                outcome.events.push(format!("{victim} was killed in the night"));
            }
        }
        None => outcome.events.push("the werewolves could not agree on a victim".to_string()),
    }

    run_death_cascade(&mut game, seeds, &mut outcome);

    if !settle(&mut game, &mut outcome) {
        game.begin_day();
        outcome.next_phase = Some(GamePhase::Day);
    }
    Ok((game, outcome))
}

/// Resolves the day vote: strict plurality lynches; a tie defers to a living
/// tie-breaking sheriff (votes kept, pending action emitted) or, with none,
/// ends the day with no lynching.
#[tracing::instrument(skip(game), fields(game_id = %game.get_id(), round = game.get_round()))]
pub fn resolve_day(game: &Game) -> Result<(Game, PhaseOutcome), GameError> {
    if game.get_status() != GameStatus::Day {
        return Err(GameError::WrongPhase);
    }
    game.check_integrity()?;

    let mut game = game.clone();
    let mut outcome = PhaseOutcome::default();

    let counts = sheriff::day_vote_counts(&game);
    let tied = sheriff::tied_players(&game);

    if tied.len() > 1 {
        let live_tiebreaker = game
            .living_players()
            .into_iter()
            .find(|p| sheriff::can_break_tie(&game, *p));
        return match live_tiebreaker {
            Some(s) => {
                // Votes stay recorded; the room waits on the sheriff's call.
                outcome.notifications.push(Notification::SheriffTiebreakPending {
                    sheriff: s,
                    tied_players: tied,
                });
                outcome.events.push("the vote is tied; the sheriff must decide".to_string());
                Ok((game, outcome))
            }
            None => {
                outcome.events.push("the vote is tied; no one is lynched".to_string());
                end_day(&mut game, &mut outcome);
                Ok((game, outcome))
            }
        };
    }

    match counts.into_iter().max_by_key(|(_, n)| *n) {
        Some((victim, _)) => {
            game.kill(victim);
            outcome.events.push(format!("{victim} was lynched by the village"));
            run_death_cascade(
                &mut game,
                vec![Death { player_id: victim, cause: DeathCause::Lynch }],
                &mut outcome,
            );
        }
        None => outcome.events.push("no votes were cast; no one is lynched".to_string()),
    }

    if !settle(&mut game, &mut outcome) {
        end_day(&mut game, &mut outcome);
    }
    Ok((game, outcome))
}

fn end_day(game: &mut Game, outcome: &mut PhaseOutcome) {
    game.clear_day_votes();
    game.next_round();
    game.begin_night();
    outcome.next_phase = Some(GamePhase::Night);
}

/// A dead hunter's revenge shot, with the full cascade behind it.
#[tracing::instrument(skip(game), fields(game_id = %game.get_id()))]
pub fn resolve_hunter_revenge(
    game: &Game,
    hunter_id: PlayerId,
    target: PlayerId,
) -> Result<(Game, PhaseOutcome), GameError> {
    let mut game = game.clone();
    let mut outcome = PhaseOutcome::default();

    hunter::revenge_kill(&mut game, hunter_id, target)?;
    outcome.events.push(format!("{target} was shot by the hunter"));
    run_death_cascade(
        &mut game,
        vec![Death { player_id: target, cause: DeathCause::HunterRevenge }],
        &mut outcome,
    );
    settle(&mut game, &mut outcome);
    Ok((game, outcome))
}

/// The sheriff settles a tied day vote, then the day ends normally.
#[tracing::instrument(skip(game), fields(game_id = %game.get_id()))]
pub fn resolve_tie_break(
    game: &Game,
    sheriff_id: PlayerId,
    target: PlayerId,
) -> Result<(Game, PhaseOutcome), GameError> {
    let mut game = game.clone();
    let mut outcome = PhaseOutcome::default();

    sheriff::break_tie(&mut game, sheriff_id, target)?;
    outcome.events.push(format!("the sheriff has condemned {target}"));
    run_death_cascade(
        &mut game,
        vec![Death { player_id: target, cause: DeathCause::TieBreak }],
        &mut outcome,
    );
    if !settle(&mut game, &mut outcome) {
        end_day(&mut game, &mut outcome);
    }
    Ok((game, outcome))
}

/// A pending action a client still owes the current phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingAction {
    WerewolfVote { player_id: PlayerId },
    SeerVision { player_id: PlayerId },
    WitchPotions { player_id: PlayerId },
    CupidLovers { player_id: PlayerId },
    WildChildModel { player_id: PlayerId },
    DayVote { player_id: PlayerId },
    SheriffTiebreak { player_id: PlayerId, tied_players: Vec<PlayerId> },
}

/// What the current phase is still waiting on, per player.
pub fn pending_actions(game: &Game) -> Vec<PendingAction> {
    let mut pending = Vec::new();
    match game.get_status() {
        GameStatus::Night => {
            for p in game.living_players() {
                let Some(state) = game.role_of(p) else { continue };
                match &state.card {
                    RoleCard::Werewolf if !werewolf::has_voted(game, p) => {
                        pending.push(PendingAction::WerewolfVote { player_id: p });
                    }
                    RoleCard::Seer { has_used_vision_tonight: false } => {
                        pending.push(PendingAction::SeerVision { player_id: p });
                    }
                    RoleCard::Witch { has_healing_potion, has_poison_potion }
                        if (*has_healing_potion || *has_poison_potion)
                            && !state.has_acted_tonight =>
                    {
                        pending.push(PendingAction::WitchPotions { player_id: p });
                    }
                    RoleCard::Cupid { has_chosen_lovers: false } if game.get_round() == 1 => {
                        pending.push(PendingAction::CupidLovers { player_id: p });
                    }
                    RoleCard::WildChild { model_player_id: None, .. }
                        if game.get_round() == 1 =>
                    {
                        pending.push(PendingAction::WildChildModel { player_id: p });
                    }
                    _ => {}
                }
            }
        }
        GameStatus::Day => {
            let tied = sheriff::tied_players(game);
            let tiebreaker = game
                .living_players()
                .into_iter()
                .find(|p| sheriff::can_break_tie(game, *p));
            if let (true, Some(s)) = (tied.len() > 1, tiebreaker) {
                pending.push(PendingAction::SheriffTiebreak {
                    player_id: s,
                    tied_players: tied,
                });
            } else {
                for p in game.living_players() {
                    if !game.day_votes().contains_key(&p) {
                        pending.push(PendingAction::DayVote { player_id: p });
                    }
                }
            }
        }
        _ => {}
    }
    pending
}
