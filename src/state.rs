use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::data::GameRepository;
use crate::game::phase::{PhaseController, PhaseDurations};
use crate::game::voting::VotingSession;
use crate::game::{GameId, PlayerId};

#[derive(Debug, Clone)]
pub struct GameMessage {
    pub r#type: String, // Use r#type because 'type' is a reserved keyword
    pub payload: Value,
}

pub type PlayerSender = mpsc::UnboundedSender<GameMessage>;

/// Engine state serialized by the room mutex: every mutation, whether a
/// player intent or a timer firing, goes through here one at a time.
pub struct RoomEngine {
    pub phase: PhaseController,
    pub voting: Option<VotingSession>,
    pub timer: Option<JoinHandle<()>>,
    // Tied leaders recorded by a closed day vote; set only while the day
    // resolution is held waiting on the sheriff's call.
    pub held_tie: Option<Vec<PlayerId>>,
}

impl RoomEngine {
    pub fn new(durations: PhaseDurations) -> Self {
        Self { phase: PhaseController::new(durations), voting: None, timer: None, held_tie: None }
    }

    pub fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// In-memory room for one game: engine state plus connected sockets.
pub struct GameRoom {
    pub engine: Mutex<RoomEngine>,
    // Maps PlayerId to their WebSocket sender channel
    pub players: RwLock<HashMap<PlayerId, PlayerSender>>,
}

impl GameRoom {
    pub fn new(durations: PhaseDurations) -> Self {
        Self { engine: Mutex::new(RoomEngine::new(durations)), players: RwLock::new(HashMap::new()) }
    }
}

/// Maps GameId to its in-memory room. Owned by `AppState`; rooms for
/// different games never contend.
#[derive(Default)]
pub struct GameRegistry {
    pub rooms: RwLock<HashMap<GameId, Arc<GameRoom>>>,
}

impl GameRegistry {
    pub async fn room(&self, game_id: GameId, durations: PhaseDurations) -> Arc<GameRoom> {
        let mut rooms = self.rooms.write().await;
        rooms.entry(game_id).or_insert_with(|| Arc::new(GameRoom::new(durations))).clone()
    }

    pub async fn get(&self, game_id: GameId) -> Option<Arc<GameRoom>> {
        self.rooms.read().await.get(&game_id).cloned()
    }

    pub async fn remove(&self, game_id: GameId) -> Option<Arc<GameRoom>> {
        self.rooms.write().await.remove(&game_id)
    }
}

pub struct AppState {
    pub repository: Arc<dyn GameRepository>,
    pub registry: GameRegistry,
    pub config: Arc<Config>,
}

pub type SharedState = Arc<AppState>;
