use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    data::{
        CreateGameRequest, CreateGameResponse, GameStateSummary, GameView, JoinGameRequest,
        StartGameRequest, User,
    },
    error::AppError,
    flow,
    game::{resolution, Game, GameId, GamePhase, GameStatus, PlayerId},
    state::SharedState,
};

// ==============================================================================
// === REST API Handlers
// =============================================================================

#[instrument(skip(state))]
pub async fn create_game_handler(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<CreateGameResponse>), AppError> {
    let creator_id = payload.creator_id.unwrap_or_else(PlayerId::new);
    let max_players = payload.max_players.unwrap_or(18);
    let new_game = Game::new(payload.name, creator_id, max_players);
    let game_id = new_game.get_id();

    state.repository.save_game(&new_game).await?;
    state.registry.room(game_id, state.config.phases).await;

    tracing::info!(game_id = %game_id, creator_id = %creator_id, "Game created");
    Ok((StatusCode::CREATED, Json(CreateGameResponse { game_id, creator_id })))
}

#[instrument(skip(state))]
pub async fn get_game_handler(
    State(state): State<SharedState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<GameView>, AppError> {
    let game = state.repository.load_game(game_id).await?;
    // Unauthenticated endpoint: public view only, no role cards.
    Ok(Json(GameView::for_player(&game, None)))
}

#[instrument(skip(state))]
pub async fn join_game_handler(
    State(state): State<SharedState>,
    Path(game_id): Path<GameId>,
    Json(payload): Json<JoinGameRequest>,
) -> Result<Json<GameView>, AppError> {
    let mut game = state.repository.load_game(game_id).await?;
    let joining_player = payload.player_id.unwrap_or_else(PlayerId::new);

    match game.get_status() {
        GameStatus::Waiting => {
            // Idempotent for players already seated in the lobby.
            game.join(joining_player)?;
        }
        _ if game.get_players().contains(&joining_player) => {
            tracing::info!(game_id = %game_id, player_id = %joining_player, "Player rejoining active game");
        }
        _ => {
            tracing::warn!(game_id = %game_id, intruder = %joining_player, "Unauthorized join attempt on active game");
            return Err(AppError::Forbidden("Unauthorized".to_string()));
        }
    }

    let user = User::new(joining_player, payload.username);
    state.repository.save_user(&user).await?;
    state.repository.save_game(&game).await?;

    tracing::info!(game_id = %game_id, player_id = %joining_player, "Player joined");
    Ok(Json(GameView::for_player(&game, Some(joining_player))))
}

/// Deals roles and kicks off the phase loop. Creator only.
#[instrument(skip(state))]
pub async fn start_game_handler(
    State(state): State<SharedState>,
    Path(game_id): Path<GameId>,
    Json(payload): Json<StartGameRequest>,
) -> Result<Json<GameView>, AppError> {
    flow::start_game(state.clone(), game_id, payload.player_id).await?;
    let game = state.repository.load_game(game_id).await?;
    Ok(Json(GameView::for_player(&game, Some(payload.player_id))))
}

#[instrument(skip(state))]
pub async fn game_summary_handler(
    State(state): State<SharedState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<GameStateSummary>, AppError> {
    let game = state.repository.load_game(game_id).await?;

    let phase = match state.registry.get(game_id).await {
        Some(room) => room.engine.lock().await.phase.current(),
        None => match game.get_status() {
            GameStatus::Finished => GamePhase::Finished,
            _ => GamePhase::Waiting,
        },
    };

    let mut role_counts = std::collections::HashMap::new();
    for p in game.living_players() {
        if let Some(role_state) = game.role_of(p) {
            *role_counts.entry(role_state.role().as_str().to_string()).or_insert(0) += 1;
        }
    }
    let pending = resolution::pending_actions(&game);

    let summary = GameStateSummary {
        game_id,
        status: game.get_status(),
        phase,
        round: game.get_round(),
        alive_count: game.living_players().len(),
        dead_count: game.dead_players().len(),
        role_counts,
        can_advance_phase: pending.is_empty() && !phase.allowed_transitions().is_empty(),
        pending_actions: pending,
    };
    Ok(Json(summary))
}

/// Immediately runs the night resolution instead of waiting for the timer.
#[instrument(skip(state))]
pub async fn process_night_handler(
    State(state): State<SharedState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<GamePhase>, AppError> {
    let phase = flow::advance_phase(state, game_id, GamePhase::Day).await?;
    Ok(Json(phase))
}

/// Immediately closes the vote and runs the day resolution.
#[instrument(skip(state))]
pub async fn process_day_handler(
    State(state): State<SharedState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<GamePhase>, AppError> {
    let phase = flow::advance_phase(state, game_id, GamePhase::Execution).await?;
    Ok(Json(phase))
}

#[instrument(skip(state))]
pub async fn pause_game_handler(
    State(state): State<SharedState>,
    Path(game_id): Path<GameId>,
    Json(payload): Json<StartGameRequest>,
) -> Result<StatusCode, AppError> {
    flow::pause_game(state, game_id, payload.player_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn resume_game_handler(
    State(state): State<SharedState>,
    Path(game_id): Path<GameId>,
    Json(payload): Json<StartGameRequest>,
) -> Result<StatusCode, AppError> {
    flow::resume_game(state, game_id, payload.player_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AdvancePhaseRequest {
    pub to: GamePhase,
}

/// Manual phase advance; still validated against the transition table.
#[instrument(skip(state))]
pub async fn advance_phase_handler(
    State(state): State<SharedState>,
    Path(game_id): Path<GameId>,
    Json(payload): Json<AdvancePhaseRequest>,
) -> Result<Json<GamePhase>, AppError> {
    let phase = flow::advance_phase(state, game_id, payload.to).await?;
    Ok(Json(phase))
}
