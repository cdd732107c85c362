use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    data::{ClientMessage, GameView, ServerMessage},
    error::AppError,
    flow,
    game::actions::{cupid, seer, sheriff, vote, werewolf, wild_child, witch},
    game::{Game, GameId, PlayerId},
    state::{GameMessage, GameRoom, SharedState},
};

// ==============================================================================
// === Websocket Handlers
// =============================================================================
#[derive(Deserialize, Debug)]
pub struct WebSocketParams {
    pub player_id: PlayerId,
}

#[instrument(skip(ws, state))]
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(game_id): Path<GameId>,
    Query(params): Query<WebSocketParams>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    tracing::info!(game_id = %game_id, player_id = %params.player_id, "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, game_id, params.player_id, state))
}

/// Orchestrates the WebSocket lifecycle: Connect -> Register -> Loop -> Disconnect
async fn handle_socket(mut socket: WebSocket, game_id: GameId, player_id: PlayerId, state: SharedState) {
    if !validate_connection(&state, game_id, player_id).await {
        let _ = socket.close().await;
        return;
    }

    let (sender_tx, mut sender_rx) = register_player(&state, game_id, player_id).await;

    // Send initial state, redacted down to what this player may see.
    if let Ok(game) = state.repository.load_game(game_id).await {
        let view = GameView::for_player(&game, Some(player_id));
        let msg = GameMessage {
            r#type: "SERVER_PUSH".into(),
            payload: serde_json::to_value(ServerMessage::GameState(view)).unwrap_or_default(),
        };
        let _ = sender_tx.send(msg);
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Write task (Server -> Client)
    let send_task = tokio::spawn(async move {
        while let Some(msg) = sender_rx.recv().await {
            let json_str = serde_json::to_string(&msg.payload).unwrap_or_default();
            if ws_sender.send(Message::Text(json_str.into())).await.is_err() {
                break;
            }
        }
    });

    // Read loop (Client -> Server)
    while let Some(Ok(msg)) = ws_receiver.next().await {
        if let Message::Text(text) = msg {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    process_client_message(client_msg, game_id, player_id, &state).await;
                }
                Err(e) => {
                    send_error_to_player(&state, game_id, player_id, &format!("bad message: {e}"))
                        .await;
                }
            }
        }
    }

    handle_disconnect(&state, game_id, player_id).await;
    send_task.abort();
}

/// Reject sockets for unknown games or players not seated in them.
async fn validate_connection(state: &SharedState, game_id: GameId, player_id: PlayerId) -> bool {
    match state.repository.load_game(game_id).await {
        Ok(game) if game.get_players().contains(&player_id) => true,
        Ok(_) => {
            tracing::warn!(game_id = %game_id, player_id = %player_id, "Connection rejected: player not in game");
            false
        }
        Err(e) => {
            tracing::warn!(game_id = %game_id, player_id = %player_id, error = ?e, "Connection rejected: game load failed");
            false
        }
    }
}

/// Bind the player's sender into the room and announce them.
async fn register_player(
    state: &SharedState,
    game_id: GameId,
    player_id: PlayerId,
) -> (
    tokio::sync::mpsc::UnboundedSender<GameMessage>,
    tokio::sync::mpsc::UnboundedReceiver<GameMessage>,
) {
    let (sender_tx, sender_rx) = tokio::sync::mpsc::unbounded_channel::<GameMessage>();

    let room = state.registry.room(game_id, state.config.phases).await;
    room.players.write().await.insert(player_id, sender_tx.clone());

    flow::broadcast(&room, &ServerMessage::PlayerJoined { player_id }).await;
    tracing::info!(game_id = %game_id, player_id = %player_id, "WebSocket connected");
    (sender_tx, sender_rx)
}

/// Route an incoming command to the matching resolver, commit, fan out.
async fn process_client_message(
    msg: ClientMessage,
    game_id: GameId,
    player_id: PlayerId,
    state: &SharedState,
) {
    tracing::debug!(game_id = %game_id, player_id = %player_id, ?msg, "Received message");

    // Commands with their own orchestration.
    match &msg {
        ClientMessage::Connect { .. } => return,
        ClientMessage::HunterRevenge { target_id } => {
            if let Err(e) =
                flow::apply_hunter_revenge(state.clone(), game_id, player_id, *target_id).await
            {
                send_error_to_player(state, game_id, player_id, &e.to_string()).await;
            }
            return;
        }
        ClientMessage::SheriffBreakTie { target_id } => {
            if let Err(e) =
                flow::apply_tie_break(state.clone(), game_id, player_id, *target_id).await
            {
                send_error_to_player(state, game_id, player_id, &e.to_string()).await;
            }
            return;
        }
        _ => {}
    }

    // Plain role actions: load, mutate, save, notify.
    let Some(room) = state.registry.get(game_id).await else {
        send_error_to_player(state, game_id, player_id, "game is not running").await;
        return;
    };
    let mut engine = room.engine.lock().await;

    let mut game = match state.repository.load_game(game_id).await {
        Ok(game) => game,
        Err(e) => {
            send_error_to_player(state, game_id, player_id, &e.to_string()).await;
            return;
        }
    };

    let result = apply_role_action(&msg, &mut game, player_id);
    match result {
        Ok(reply) => {
            if let Err(e) = state.repository.save_game(&game).await {
                tracing::error!(game_id = %game_id, error = %e, "failed to save game state");
                return;
            }
            if let Some(reply) = reply {
                flow::send_to_player(&room, player_id, &reply).await;
            }
            // Each lover learns who their partner is, nobody else does.
            if let ClientMessage::CupidChooseLovers { first_id, second_id } = &msg {
                flow::send_to_player(&room, *first_id, &ServerMessage::LoversChosen {
                    partner_id: *second_id,
                })
                .await;
                flow::send_to_player(&room, *second_id, &ServerMessage::LoversChosen {
                    partner_id: *first_id,
                })
                .await;
            }
            // Once the pack settles on a victim the witch hears about it.
            if let ClientMessage::WerewolfAttack { .. } = &msg {
                notify_witch_of_consensus(&room, &game).await;
            }
            // Mirror lynch ballots into the live voting session so clients
            // see the progress as it happens.
            if let ClientMessage::DayVote { target_id } = &msg {
                if let Some(session) = engine.voting.as_mut() {
                    let weight = sheriff::vote_weight(&game, player_id);
                    let _ = session.cast_vote(player_id, *target_id, weight);
                    flow::broadcast(
                        &room,
                        &ServerMessage::VoteCast {
                            voter_id: player_id,
                            votes_cast: session.votes_cast(),
                            voters_total: session.eligible_voters().len(),
                        },
                    )
                    .await;
                }
            }
            drop(engine);
            flow::try_finish_night_early(state.clone(), game_id).await;
        }
        Err(e) => {
            send_error_to_player(state, game_id, player_id, &AppError::from(e).to_string()).await;
        }
    }
}

/// Private push to the living witch once the pack has agreed on a victim.
/// Nothing goes out while the wolves are still split.
async fn notify_witch_of_consensus(room: &GameRoom, game: &Game) {
    let Some(the_witch) = game.get_players().iter().copied().find(|p| witch::is_witch(game, *p))
    else {
        return;
    };
    let Some(info) = witch::night_info(game, the_witch) else {
        return;
    };
    if info.attacked_player.is_none() {
        return;
    }
    flow::send_to_player(
        room,
        the_witch,
        &ServerMessage::WitchNightInfo {
            attacked_player: info.attacked_player,
            can_heal: info.can_heal,
            can_poison: info.can_poison,
        },
    )
    .await;
}

/// Validate and apply one role action against the aggregate. Returns an
/// optional private reply for the actor.
fn apply_role_action(
    msg: &ClientMessage,
    game: &mut Game,
    player_id: PlayerId,
) -> Result<Option<ServerMessage>, crate::game::GameError> {
    match msg {
        ClientMessage::WerewolfAttack { target_id } => {
            werewolf::attack(game, player_id, *target_id)?;
            Ok(None)
        }
        ClientMessage::SeerVision { target_id } => {
            let role = seer::vision(game, player_id, *target_id)?;
            Ok(Some(ServerMessage::VisionResult { target_id: *target_id, role }))
        }
        ClientMessage::WitchHeal { target_id } => {
            witch::heal(game, player_id, *target_id)?;
            Ok(None)
        }
        ClientMessage::WitchPoison { target_id } => {
            witch::poison(game, player_id, *target_id)?;
            Ok(None)
        }
        ClientMessage::CupidChooseLovers { first_id, second_id } => {
            cupid::choose_lovers(game, player_id, *first_id, *second_id)?;
            Ok(None)
        }
        ClientMessage::WildChildChooseModel { model_id } => {
            wild_child::choose_model(game, player_id, *model_id)?;
            Ok(None)
        }
        ClientMessage::SheriffChooseSuccessor { successor_id } => {
            sheriff::choose_successor(game, player_id, *successor_id)?;
            Ok(None)
        }
        ClientMessage::DayVote { target_id } => {
            vote::cast_day_vote(game, player_id, *target_id)?;
            Ok(None)
        }
        ClientMessage::Connect { .. }
        | ClientMessage::HunterRevenge { .. }
        | ClientMessage::SheriffBreakTie { .. } => Ok(None),
    }
}

/// Cleanup when the socket closes. The game itself keeps running; the seat
/// stays and the player can reconnect with the same identity.
async fn handle_disconnect(state: &SharedState, game_id: GameId, player_id: PlayerId) {
    tracing::info!(game_id = %game_id, player_id = %player_id, "WebSocket disconnected");

    if let Some(room) = state.registry.get(game_id).await {
        room.players.write().await.remove(&player_id);
        flow::broadcast(&room, &ServerMessage::PlayerDisconnected { player_id }).await;
    }
}

/// Send an error message to a specific player
async fn send_error_to_player(state: &SharedState, game_id: GameId, player_id: PlayerId, msg: &str) {
    if let Some(room) = state.registry.get(game_id).await {
        flow::send_to_player(&room, player_id, &ServerMessage::Error { message: msg.into() })
            .await;
    }
}
