//! Game flow orchestration: phase advancement, timers, resolution commits
//! and fan-out to connected clients.
//!
//! Every mutation of a room's engine state happens under its mutex, whether
//! it came from a player handler or an expiring timer, so double resolution
//! of the same phase is impossible by construction.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::instrument;

use crate::data::{GameView, ServerMessage};
use crate::game::Game;
use crate::error::AppError;
use crate::game::actions::sheriff;
use crate::game::dealer::ThreadRngDealer;
use crate::game::phase::GamePhase;
use crate::game::resolution::{self, Notification, PhaseOutcome};
use crate::game::voting::{VoteType, VotingSession};
use crate::game::{GameError, GameId, GameStatus, PlayerId};
use crate::state::{GameMessage, GameRoom, RoomEngine, SharedState};

// --- Fan-out helpers ---

/// Send to every connected player; stale senders are pruned afterwards so a
/// dead socket never wedges the room.
pub async fn broadcast(room: &GameRoom, message: &ServerMessage) {
    let payload = match serde_json::to_value(message) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode server message");
            return;
        }
    };

    let mut stale = Vec::new();
    {
        let players = room.players.read().await;
        for (pid, sender) in players.iter() {
            let msg = GameMessage { r#type: "SERVER_PUSH".to_string(), payload: payload.clone() };
            if sender.send(msg).is_err() {
                stale.push(*pid);
            }
        }
    }
    if !stale.is_empty() {
        let mut players = room.players.write().await;
        for pid in stale {
            players.remove(&pid);
        }
    }
}

pub async fn send_to_player(room: &GameRoom, player_id: PlayerId, message: &ServerMessage) {
    let payload = match serde_json::to_value(message) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode server message");
            return;
        }
    };
    if let Some(sender) = room.players.read().await.get(&player_id) {
        let _ = sender.send(GameMessage { r#type: "SERVER_PUSH".to_string(), payload });
    }
}

/// Fan the aggregate out as per-viewer redacted views; the raw `Game` never
/// crosses the wire.
pub async fn push_game_state(room: &GameRoom, game: &Game) {
    let connected: Vec<PlayerId> = room.players.read().await.keys().copied().collect();
    for player_id in connected {
        let view = GameView::for_player(game, Some(player_id));
        send_to_player(room, player_id, &ServerMessage::GameState(view)).await;
    }
}

async fn broadcast_outcome(room: &GameRoom, outcome: &PhaseOutcome) {
    if !outcome.deaths.is_empty() {
        broadcast(
            room,
            &ServerMessage::PlayerEliminated {
                deaths: outcome.deaths.clone(),
                events: outcome.events.clone(),
            },
        )
        .await;
    }
    for notification in &outcome.notifications {
        match notification {
            Notification::HunterRevengeAvailable { hunter } => {
                send_to_player(room, *hunter, &ServerMessage::HunterRevengeAvailable).await;
            }
            Notification::PackMemberJoined { new_member, pack } => {
                for member in pack.iter().chain(std::iter::once(new_member)) {
                    send_to_player(
                        room,
                        *member,
                        &ServerMessage::PackMemberJoined { player_id: *new_member },
                    )
                    .await;
                }
            }
            Notification::SheriffPromoted { new_sheriff } => {
                broadcast(room, &ServerMessage::SheriffPromoted { player_id: *new_sheriff })
                    .await;
            }
            Notification::SheriffTiebreakPending { tied_players, .. } => {
                broadcast(
                    room,
                    &ServerMessage::SheriffTiebreakRequired {
                        tied_players: tied_players.clone(),
                    },
                )
                .await;
            }
        }
    }
    if let Some(victory) = &outcome.victory {
        broadcast(
            room,
            &ServerMessage::GameEnded {
                victory: victory.clone(),
                message: victory.announcement(),
            },
        )
        .await;
    }
}

// --- Phase machinery ---

fn schedule_timer(
    state: SharedState,
    game_id: GameId,
    from: GamePhase,
    next: GamePhase,
    duration: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        tracing::debug!(game_id = %game_id, phase = %from, "phase timer expired");
        if let Err(e) = Box::pin(advance_phase(state, game_id, next)).await {
            tracing::warn!(game_id = %game_id, error = %e, "timer-driven advance failed");
        }
    })
}

/// Deal the roles and push the lobby into the Starting phase.
#[instrument(skip(state))]
pub async fn start_game(
    state: SharedState,
    game_id: GameId,
    caller: PlayerId,
) -> Result<(), AppError> {
    let mut game = state.repository.load_game(game_id).await?;
    game.assign_roles(caller, &mut ThreadRngDealer::new())?;
    state.repository.save_game(&game).await?;

    let room = state.registry.room(game_id, state.config.phases).await;
    let mut engine = room.engine.lock().await;
    engine.phase.transition_to(GamePhase::Starting)?;
    arm_timer(&state, game_id, &mut engine);

    push_game_state(&room, &game).await;
    announce_phase(&room, &engine, 1).await;
    Ok(())
}

/// Move a room to `to`, running the resolution legs where the transition
/// demands them. Timer firings and manual advances both come through here.
#[instrument(skip(state))]
pub async fn advance_phase(
    state: SharedState,
    game_id: GameId,
    to: GamePhase,
) -> Result<GamePhase, AppError> {
    let room = state.registry.get(game_id).await.ok_or(AppError::GameNotFound(game_id))?;
    let mut engine = room.engine.lock().await;
    let from = engine.phase.current();
    if !from.can_transition_to(to) {
        return Err(GameError::InvalidTransition { from: from.as_str(), to: to.as_str() }.into());
    }
    engine.cancel_timer();

    let destination = match (from, to) {
        (GamePhase::Night, GamePhase::Day) => {
            resolve_night_leg(&state, game_id, &room).await?
        }
        (GamePhase::Voting | GamePhase::Trial, GamePhase::Execution) => {
            match resolve_day_leg(&state, game_id, &room, &mut engine).await? {
                Some(phase) => phase,
                // Tied vote with a live sheriff: hold the phase, keep the
                // votes, and wait for the tie-break command with no timer.
                None => return Ok(from),
            }
        }
        (_, GamePhase::Night) => {
            // Starting -> Night, or a new round after Execution. The day
            // resolution already rolled the aggregate into the night.
            let mut game = state.repository.load_game(game_id).await?;
            if game.get_status() != GameStatus::Night {
                game.begin_night();
                state.repository.save_game(&game).await?;
                push_game_state(&room, &game).await;
            }
            GamePhase::Night
        }
        (_, GamePhase::Voting) => {
            open_voting_session(&state, game_id, &room, &mut engine).await?;
            GamePhase::Voting
        }
        (_, GamePhase::Finished) => GamePhase::Finished,
        (_, other) => other,
    };

    engine.phase.transition_to(destination)?;
    let round = state.repository.load_game(game_id).await.map(|g| g.get_round()).unwrap_or(0);
    announce_phase(&room, &engine, round).await;

    if destination == GamePhase::Finished {
        engine.voting = None;
        engine.cancel_timer();
        drop(engine);
        release_room(&state, game_id).await;
    } else {
        arm_timer(&state, game_id, &mut engine);
    }
    Ok(destination)
}

async fn announce_phase(room: &GameRoom, engine: &RoomEngine, round: u32) {
    let phase = engine.phase.current();
    broadcast(room, &ServerMessage::PhaseChanged { phase, round }).await;
    let config = engine.phase.config();
    if config.auto_advance {
        broadcast(
            room,
            &ServerMessage::PhaseTimer { phase, duration_secs: config.duration_secs },
        )
        .await;
    }
}

fn arm_timer(state: &SharedState, game_id: GameId, engine: &mut RoomEngine) {
    engine.cancel_timer();
    let config = engine.phase.config();
    if !config.auto_advance {
        return;
    }
    if let Some(next) = engine.phase.timer_successor() {
        engine.timer = Some(schedule_timer(
            Arc::clone(state),
            game_id,
            engine.phase.current(),
            next,
            config.duration(),
        ));
    }
}

/// Night -> Day: commit the night resolution. A victory turns the leg into
/// a move to Finished instead.
async fn resolve_night_leg(
    state: &SharedState,
    game_id: GameId,
    room: &GameRoom,
) -> Result<GamePhase, AppError> {
    let game = state.repository.load_game(game_id).await?;
    let (game, outcome) = resolution::resolve_night(&game)?;
    state.repository.save_game(&game).await?;

    broadcast_outcome(room, &outcome).await;
    push_game_state(room, &game).await;
    Ok(if outcome.victory.is_some() { GamePhase::Finished } else { GamePhase::Day })
}

/// Voting/Trial -> Execution: close the session, commit the day resolution.
/// `None` means a tie is waiting on the sheriff and the phase must hold.
async fn resolve_day_leg(
    state: &SharedState,
    game_id: GameId,
    room: &GameRoom,
    engine: &mut RoomEngine,
) -> Result<Option<GamePhase>, AppError> {
    if let Some(mut session) = engine.voting.take() {
        let result = session.close();
        broadcast(
            room,
            &ServerMessage::VotingResults {
                winner: result.winner,
                is_tie: result.is_tie,
                tied_players: result.tied_players,
            },
        )
        .await;
    }

    let game = state.repository.load_game(game_id).await?;
    let (game, outcome) = resolution::resolve_day(&game)?;
    state.repository.save_game(&game).await?;

    broadcast_outcome(room, &outcome).await;
    push_game_state(room, &game).await;

    match outcome.next_phase {
        None => {
            // Record the held tie; the tie-break command is legal only now.
            engine.held_tie = outcome.notifications.iter().find_map(|n| match n {
                Notification::SheriffTiebreakPending { tied_players, .. } => {
                    Some(tied_players.clone())
                }
                _ => None,
            });
            Ok(None)
        }
        Some(GamePhase::Finished) => Ok(Some(GamePhase::Finished)),
        Some(_) => Ok(Some(GamePhase::Execution)),
    }
}

/// Open a lynch session over the living players, carrying over any ballots
/// already cast during open discussion.
async fn open_voting_session(
    state: &SharedState,
    game_id: GameId,
    room: &GameRoom,
    engine: &mut RoomEngine,
) -> Result<(), AppError> {
    let game = state.repository.load_game(game_id).await?;
    let living = game.living_players();
    let mut session = VotingSession::new(VoteType::DayLynch, living.clone(), living.clone());
    for (voter, target) in game.day_votes() {
        let _ = session.cast_vote(*voter, *target, sheriff::vote_weight(&game, *voter));
    }
    broadcast(room, &ServerMessage::VotingStarted { eligible_voters: living }).await;
    engine.voting = Some(session);
    engine.held_tie = None;
    Ok(())
}

/// Drop the room: abort its timer and forget its connections. The persisted
/// game record stays in the store until its TTL expires.
pub async fn release_room(state: &SharedState, game_id: GameId) {
    if let Some(room) = state.registry.remove(game_id).await {
        let mut engine = room.engine.lock().await;
        engine.cancel_timer();
        engine.voting = None;
        drop(engine);
        room.players.write().await.clear();
        tracing::info!(game_id = %game_id, "room released");
    }
}

/// The dead hunter's shot, committed and fanned out; a resulting victory
/// finishes the room.
#[instrument(skip(state))]
pub async fn apply_hunter_revenge(
    state: SharedState,
    game_id: GameId,
    hunter: PlayerId,
    target: PlayerId,
) -> Result<(), AppError> {
    let room = state.registry.get(game_id).await.ok_or(AppError::GameNotFound(game_id))?;
    let _engine = room.engine.lock().await;

    let game = state.repository.load_game(game_id).await?;
    let (game, outcome) = resolution::resolve_hunter_revenge(&game, hunter, target)?;
    state.repository.save_game(&game).await?;

    broadcast_outcome(&room, &outcome).await;
    push_game_state(&room, &game).await;

    if outcome.victory.is_some() {
        drop(_engine);
        let _ = advance_phase(state, game_id, GamePhase::Finished).await;
    }
    Ok(())
}

/// The sheriff settles a held tie; the room then moves to Execution (or
/// Finished) like any other completed vote.
#[instrument(skip(state))]
pub async fn apply_tie_break(
    state: SharedState,
    game_id: GameId,
    sheriff_id: PlayerId,
    target: PlayerId,
) -> Result<(), AppError> {
    let room = state.registry.get(game_id).await.ok_or(AppError::GameNotFound(game_id))?;
    let mut engine = room.engine.lock().await;
    // Only a tie recorded by a closed day vote can be broken; a snapshot of
    // ballots still trickling in does not count.
    match &engine.held_tie {
        Some(tied) if tied.contains(&target) => {}
        Some(_) => return Err(GameError::TargetNotTied.into()),
        None => return Err(GameError::NoTieToBreak.into()),
    }
    engine.cancel_timer();

    let game = state.repository.load_game(game_id).await?;
    let (game, outcome) = resolution::resolve_tie_break(&game, sheriff_id, target)?;
    state.repository.save_game(&game).await?;
    engine.held_tie = None;

    broadcast_outcome(&room, &outcome).await;
    push_game_state(&room, &game).await;

    let destination = if outcome.victory.is_some() {
        GamePhase::Finished
    } else {
        GamePhase::Execution
    };
    engine.phase.transition_to(destination)?;
    let round = state.repository.load_game(game_id).await.map(|g| g.get_round()).unwrap_or(0);
    announce_phase(&room, &engine, round).await;

    if destination == GamePhase::Finished {
        engine.voting = None;
        drop(engine);
        release_room(&state, game_id).await;
    } else {
        arm_timer(&state, game_id, &mut engine);
    }
    Ok(())
}

/// Creator-only: freeze the phase timer and mark the game paused. The room
/// and its connections stay up.
#[instrument(skip(state))]
pub async fn pause_game(
    state: SharedState,
    game_id: GameId,
    caller: PlayerId,
) -> Result<(), AppError> {
    let room = state.registry.get(game_id).await.ok_or(AppError::GameNotFound(game_id))?;
    let mut engine = room.engine.lock().await;

    let mut game = state.repository.load_game(game_id).await?;
    if game.get_creator() != caller {
        return Err(GameError::NotCreator.into());
    }
    match game.get_status() {
        GameStatus::Started | GameStatus::Night | GameStatus::Day => {}
        other => {
            return Err(AppError::Conflict(format!("cannot pause a game in status {other:?}")))
        }
    }

    engine.cancel_timer();
    game.set_status(GameStatus::Paused);
    state.repository.save_game(&game).await?;
    push_game_state(&room, &game).await;
    Ok(())
}

/// Creator-only: restore the coarse status from the held phase and restart
/// the timer.
#[instrument(skip(state))]
pub async fn resume_game(
    state: SharedState,
    game_id: GameId,
    caller: PlayerId,
) -> Result<(), AppError> {
    let room = state.registry.get(game_id).await.ok_or(AppError::GameNotFound(game_id))?;
    let mut engine = room.engine.lock().await;

    let mut game = state.repository.load_game(game_id).await?;
    if game.get_creator() != caller {
        return Err(GameError::NotCreator.into());
    }
    if game.get_status() != GameStatus::Paused {
        return Err(AppError::Conflict("game is not paused".to_string()));
    }

    let restored = match engine.phase.current() {
        GamePhase::Starting => GameStatus::Started,
        // During Execution the aggregate has already rolled into the next
        // night, so that is where it resumes.
        GamePhase::Night | GamePhase::Execution => GameStatus::Night,
        GamePhase::Day | GamePhase::Voting | GamePhase::Trial => GameStatus::Day,
        other => {
            return Err(AppError::Conflict(format!("cannot resume from phase {other}")))
        }
    };
    game.set_status(restored);
    state.repository.save_game(&game).await?;

    arm_timer(&state, game_id, &mut engine);
    let round = game.get_round();
    push_game_state(&room, &game).await;
    announce_phase(&room, &engine, round).await;
    Ok(())
}

/// Night actions can finish a night early: once nothing is pending, resolve
/// without waiting for the timer.
pub async fn try_finish_night_early(state: SharedState, game_id: GameId) {
    let Ok(game) = state.repository.load_game(game_id).await else { return };
    if game.get_status() != GameStatus::Night {
        return;
    }
    if resolution::pending_actions(&game).is_empty() {
        tracing::info!(game_id = %game_id, "all night actions in, resolving early");
        if let Err(e) = advance_phase(state, game_id, GamePhase::Day).await {
            tracing::warn!(game_id = %game_id, error = %e, "early night resolution failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DatabaseConfig, LoggingConfig, ServerConfig};
    use crate::data::MockGameRepository;
    use crate::game::phase::PhaseDurations;
    use crate::game::Game;
    use crate::state::{AppState, GameRegistry};

    fn test_state() -> SharedState {
        let config = Config {
            server: ServerConfig { addr: "0.0.0.0:0".to_string(), heartbeat_secs: 30 },
            database: DatabaseConfig { redis_url: "redis://mock".to_string() },
            logging: LoggingConfig { level: "debug".to_string() },
            phases: PhaseDurations::default(),
        };
        Arc::new(AppState {
            repository: Arc::new(MockGameRepository::new()),
            registry: GameRegistry::default(),
            config: Arc::new(config),
        })
    }

    async fn seeded_game(state: &SharedState, players: usize) -> (GameId, PlayerId) {
        let creator = PlayerId::new();
        let mut game = Game::new("flow-test", creator, 18);
        for _ in 0..players - 1 {
            game.join(PlayerId::new()).unwrap();
        }
        let id = game.get_id();
        state.repository.save_game(&game).await.unwrap();
        (id, creator)
    }

    #[tokio::test]
    async fn start_game_deals_roles_and_arms_the_timer() {
        let state = test_state();
        let (game_id, creator) = seeded_game(&state, 10).await;

        start_game(state.clone(), game_id, creator).await.unwrap();

        let game = state.repository.load_game(game_id).await.unwrap();
        assert_eq!(game.get_status(), GameStatus::Started);
        assert_eq!(game.get_round(), 1);

        let room = state.registry.get(game_id).await.unwrap();
        let engine = room.engine.lock().await;
        assert_eq!(engine.phase.current(), GamePhase::Starting);
        assert!(engine.timer.is_some());
    }

    #[tokio::test]
    async fn start_game_rejects_non_creator() {
        let state = test_state();
        let (game_id, _) = seeded_game(&state, 10).await;
        let stranger = PlayerId::new();
        let err = start_game(state.clone(), game_id, stranger).await.unwrap_err();
        assert!(matches!(err, AppError::Game(GameError::NotCreator)));
    }

    #[tokio::test]
    async fn manual_advance_walks_starting_into_night() {
        let state = test_state();
        let (game_id, creator) = seeded_game(&state, 10).await;
        start_game(state.clone(), game_id, creator).await.unwrap();

        let phase = advance_phase(state.clone(), game_id, GamePhase::Night).await.unwrap();
        assert_eq!(phase, GamePhase::Night);
        let game = state.repository.load_game(game_id).await.unwrap();
        assert_eq!(game.get_status(), GameStatus::Night);
    }

    #[tokio::test]
    async fn illegal_advance_is_rejected() {
        let state = test_state();
        let (game_id, creator) = seeded_game(&state, 10).await;
        start_game(state.clone(), game_id, creator).await.unwrap();

        let err = advance_phase(state.clone(), game_id, GamePhase::Voting).await.unwrap_err();
        assert!(matches!(err, AppError::Game(GameError::InvalidTransition { .. })));

        let room = state.registry.get(game_id).await.unwrap();
        assert_eq!(room.engine.lock().await.phase.current(), GamePhase::Starting);
    }

    #[tokio::test]
    async fn night_leg_resolves_and_lands_in_day() {
        let state = test_state();
        let (game_id, creator) = seeded_game(&state, 10).await;
        start_game(state.clone(), game_id, creator).await.unwrap();
        advance_phase(state.clone(), game_id, GamePhase::Night).await.unwrap();

        // Nobody acted: a split (empty) pack kills no one.
        let phase = advance_phase(state.clone(), game_id, GamePhase::Day).await.unwrap();
        assert_eq!(phase, GamePhase::Day);
        let game = state.repository.load_game(game_id).await.unwrap();
        assert_eq!(game.get_status(), GameStatus::Day);
        assert_eq!(game.living_players().len(), 10);
    }

    #[tokio::test]
    async fn voting_leg_without_votes_rolls_into_the_next_night() {
        let state = test_state();
        let (game_id, creator) = seeded_game(&state, 10).await;
        start_game(state.clone(), game_id, creator).await.unwrap();
        advance_phase(state.clone(), game_id, GamePhase::Night).await.unwrap();
        advance_phase(state.clone(), game_id, GamePhase::Day).await.unwrap();
        advance_phase(state.clone(), game_id, GamePhase::Voting).await.unwrap();

        let phase = advance_phase(state.clone(), game_id, GamePhase::Execution).await.unwrap();
        assert_eq!(phase, GamePhase::Execution);
        let game = state.repository.load_game(game_id).await.unwrap();
        assert_eq!(game.get_status(), GameStatus::Night);
        assert_eq!(game.get_round(), 2);

        let phase = advance_phase(state.clone(), game_id, GamePhase::Night).await.unwrap();
        assert_eq!(phase, GamePhase::Night);
    }

    #[tokio::test]
    async fn pause_freezes_the_timer_and_resume_restores_the_status() {
        let state = test_state();
        let (game_id, creator) = seeded_game(&state, 10).await;
        start_game(state.clone(), game_id, creator).await.unwrap();
        advance_phase(state.clone(), game_id, GamePhase::Night).await.unwrap();

        pause_game(state.clone(), game_id, creator).await.unwrap();
        let game = state.repository.load_game(game_id).await.unwrap();
        assert_eq!(game.get_status(), GameStatus::Paused);
        let room = state.registry.get(game_id).await.unwrap();
        assert!(room.engine.lock().await.timer.is_none());

        // Only the creator can resume.
        let err = resume_game(state.clone(), game_id, PlayerId::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Game(GameError::NotCreator)));

        resume_game(state.clone(), game_id, creator).await.unwrap();
        let game = state.repository.load_game(game_id).await.unwrap();
        assert_eq!(game.get_status(), GameStatus::Night);
        assert!(room.engine.lock().await.timer.is_some());
    }

    #[tokio::test]
    async fn tie_break_waits_for_a_closed_vote() {
        use crate::game::actions::vote::cast_day_vote;
        use crate::game::testutil::started_game;

        let state = test_state();
        let (mut game, seats) = started_game();
        game.begin_night();
        game.begin_day();
        // Two of thirteen ballots happen to tie while the vote is still open.
        cast_day_vote(&mut game, seats.seer, seats.villagers[0]).unwrap();
        cast_day_vote(&mut game, seats.witch, seats.villagers[1]).unwrap();
        let game_id = game.get_id();
        state.repository.save_game(&game).await.unwrap();

        let room = state.registry.room(game_id, PhaseDurations::default()).await;
        {
            let mut engine = room.engine.lock().await;
            engine.phase.transition_to(GamePhase::Starting).unwrap();
            engine.phase.transition_to(GamePhase::Night).unwrap();
            engine.phase.transition_to(GamePhase::Day).unwrap();
            engine.phase.transition_to(GamePhase::Voting).unwrap();
        }

        let err = apply_tie_break(state.clone(), game_id, seats.sheriff, seats.villagers[0])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Game(GameError::NoTieToBreak)));
        let game = state.repository.load_game(game_id).await.unwrap();
        assert!(game.is_alive(seats.villagers[0]));
        assert_eq!(game.day_votes().len(), 2);

        // Closing the vote records the tie; only then can the sheriff call it.
        let phase = advance_phase(state.clone(), game_id, GamePhase::Execution).await.unwrap();
        assert_eq!(phase, GamePhase::Voting);
        assert!(room.engine.lock().await.held_tie.is_some());

        apply_tie_break(state.clone(), game_id, seats.sheriff, seats.villagers[0])
            .await
            .unwrap();
        let game = state.repository.load_game(game_id).await.unwrap();
        assert!(!game.is_alive(seats.villagers[0]));
        assert!(room.engine.lock().await.held_tie.is_none());
    }

    #[tokio::test]
    async fn finishing_a_game_releases_the_room() {
        let state = test_state();
        let (game_id, creator) = seeded_game(&state, 10).await;
        start_game(state.clone(), game_id, creator).await.unwrap();

        let phase = advance_phase(state.clone(), game_id, GamePhase::Finished).await.unwrap();
        assert_eq!(phase, GamePhase::Finished);
        assert!(state.registry.get(game_id).await.is_none());
    }
}
