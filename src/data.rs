use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::AppError;
use crate::game::resolution::{Death, PendingAction};
use crate::game::types::{Role, RoleState};
use crate::game::{Game, GameId, GamePhase, GameStatus, PlayerId, Victory};

const GAME_TTL_SECS: u64 = 86400;

// --- DTOs (Data Transfer Objects) ---
#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub name: String,
    pub creator_id: Option<PlayerId>,
    pub max_players: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub game_id: GameId,
    pub creator_id: PlayerId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinGameRequest {
    pub player_id: Option<PlayerId>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartGameRequest {
    pub player_id: PlayerId,
}

/// Lobby-level profile, stored separately from any one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: PlayerId,
    pub username: String,
}

impl User {
    pub fn new(id: PlayerId, username: Option<String>) -> Self {
        Self { id, username: username.unwrap_or_else(|| "Unknown Player".to_string()) }
    }
}

/// One seat as a given viewer may see it. `role` is present only when that
/// viewer is entitled to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatView {
    pub player_id: PlayerId,
    pub is_alive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Redacted projection of the aggregate, built per viewer. The full `Game`
/// never crosses the wire: a seat's role shows only once revealed (death),
/// to its owner, or between pack members; everything else a player knows
/// about themselves rides in `you`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: GameId,
    pub name: String,
    pub status: GameStatus,
    pub round: u32,
    pub seats: Vec<SeatView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub you: Option<RoleState>,
}

impl GameView {
    /// What `viewer` may see; `None` yields the public view only.
    pub fn for_player(game: &Game, viewer: Option<PlayerId>) -> Self {
        let viewer_is_wolf = viewer
            .and_then(|v| game.role_of(v))
            .map(|r| r.role() == Role::Werewolf)
            .unwrap_or(false);

        let seats = game
            .get_players()
            .iter()
            .map(|p| {
                let state = game.role_of(*p);
                let is_alive = state.map(|s| s.is_alive).unwrap_or(true);
                let role = state.and_then(|s| {
                    let own = viewer == Some(*p);
                    let packmate = viewer_is_wolf && s.role() == Role::Werewolf;
                    (s.is_revealed || own || packmate).then(|| s.role())
                });
                SeatView { player_id: *p, is_alive, role }
            })
            .collect();

        Self {
            game_id: game.get_id(),
            name: game.get_name().to_string(),
            status: game.get_status(),
            round: game.get_round(),
            seats,
            you: viewer.and_then(|v| game.role_of(v)).cloned(),
        }
    }
}

/// Aggregated view served by the state-summary endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameStateSummary {
    pub game_id: GameId,
    pub status: GameStatus,
    pub phase: GamePhase,
    pub round: u32,
    pub alive_count: usize,
    pub dead_count: usize,
    pub role_counts: HashMap<String, usize>,
    pub pending_actions: Vec<PendingAction>,
    pub can_advance_phase: bool,
}

// --- Wire messages ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    Connect { player_id: PlayerId },
    WerewolfAttack { target_id: PlayerId },
    SeerVision { target_id: PlayerId },
    WitchHeal { target_id: PlayerId },
    WitchPoison { target_id: PlayerId },
    HunterRevenge { target_id: PlayerId },
    CupidChooseLovers { first_id: PlayerId, second_id: PlayerId },
    WildChildChooseModel { model_id: PlayerId },
    SheriffChooseSuccessor { successor_id: PlayerId },
    SheriffBreakTie { target_id: PlayerId },
    DayVote { target_id: PlayerId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    GameState(GameView),
    PlayerJoined { player_id: PlayerId },
    PlayerDisconnected { player_id: PlayerId },
    PhaseChanged { phase: GamePhase, round: u32 },
    PhaseTimer { phase: GamePhase, duration_secs: u64 },
    VotingStarted { eligible_voters: Vec<PlayerId> },
    VoteCast { voter_id: PlayerId, votes_cast: usize, voters_total: usize },
    VotingResults { winner: Option<PlayerId>, is_tie: bool, tied_players: Vec<PlayerId> },
    PlayerEliminated { deaths: Vec<Death>, events: Vec<String> },
    VisionResult { target_id: PlayerId, role: Role },
    WitchNightInfo { attacked_player: Option<PlayerId>, can_heal: bool, can_poison: bool },
    HunterRevengeAvailable,
    LoversChosen { partner_id: PlayerId },
    PackMemberJoined { player_id: PlayerId },
    SheriffPromoted { player_id: PlayerId },
    SheriffTiebreakRequired { tied_players: Vec<PlayerId> },
    GameEnded { victory: Victory, message: String },
    Heartbeat,
    Error { message: String },
}

// --- Repository seam ---

#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn load_game(&self, game_id: GameId) -> Result<Game, AppError>;
    async fn save_game(&self, game: &Game) -> Result<(), AppError>;
    async fn load_user(&self, user_id: PlayerId) -> Result<Option<User>, AppError>;
    async fn save_user(&self, user: &User) -> Result<(), AppError>;
}

pub struct RedisRepository {
    client: redis::Client,
}

impl RedisRepository {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GameRepository for RedisRepository {
    #[instrument(skip_all, fields(game_id = %game_id))]
    async fn load_game(&self, game_id: GameId) -> Result<Game, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("game:{}", game_id);

        let game_json: Option<String> = conn.get(&key).await?;
        let game_json = game_json.ok_or(AppError::GameNotFound(game_id))?;
        let game: Game = serde_json::from_str(&game_json)?;
        Ok(game)
    }

    #[instrument(skip_all, fields(game_id = %game.get_id()))]
    async fn save_game(&self, game: &Game) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("game:{}", game.get_id());
        let game_json = serde_json::to_string(game)?;

        conn.set_ex::<_, _, ()>(&key, game_json, GAME_TTL_SECS).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn load_user(&self, user_id: PlayerId) -> Result<Option<User>, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("user:{}", user_id);

        let user_json: Option<String> = conn.get(&key).await?;
        match user_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip_all, fields(user_id = %user.id))]
    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("user:{}", user.id);
        let user_json = serde_json::to_string(user)?;

        conn.set_ex::<_, _, ()>(&key, user_json, GAME_TTL_SECS).await?;
        Ok(())
    }
}

/// In-memory repository for handler tests; no Redis needed.
#[derive(Default)]
pub struct MockGameRepository {
    games: RwLock<HashMap<GameId, Game>>,
    users: RwLock<HashMap<PlayerId, User>>,
}

impl MockGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameRepository for MockGameRepository {
    async fn load_game(&self, game_id: GameId) -> Result<Game, AppError> {
        self.games
            .read()
            .await
            .get(&game_id)
            .cloned()
            .ok_or(AppError::GameNotFound(game_id))
    }

    async fn save_game(&self, game: &Game) -> Result<(), AppError> {
        self.games.write().await.insert(game.get_id(), game.clone());
        Ok(())
    }

    async fn load_user(&self, user_id: PlayerId) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_repository_round_trips_games_and_users() {
        let repo = MockGameRepository::new();
        let creator = PlayerId::new();
        let game = Game::new("persisted", creator, 18);
        repo.save_game(&game).await.unwrap();
        let loaded = repo.load_game(game.get_id()).await.unwrap();
        assert_eq!(loaded.get_id(), game.get_id());
        assert_eq!(loaded.get_players(), game.get_players());

        let user = User::new(creator, Some("alice".into()));
        repo.save_user(&user).await.unwrap();
        assert_eq!(repo.load_user(creator).await.unwrap().unwrap().username, "alice");
        assert!(repo.load_user(PlayerId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_game_is_not_found() {
        let repo = MockGameRepository::new();
        let err = repo.load_game(GameId::new()).await.unwrap_err();
        assert!(matches!(err, AppError::GameNotFound(_)));
    }

    #[test]
    fn anonymous_user_gets_a_placeholder_name() {
        let user = User::new(PlayerId::new(), None);
        assert_eq!(user.username, "Unknown Player");
    }

    #[test]
    fn client_messages_parse_from_wire_form() {
        let raw = r#"{"type":"DAY_VOTE","payload":{"target_id":"00000000-0000-0000-0000-000000000000"}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        assert!(matches!(msg, ClientMessage::DayVote { .. }));
    }

    #[test]
    fn game_view_hides_hidden_roles_and_night_actions() {
        let (mut game, seats) = crate::game::testutil::started_game();
        game.begin_night();
        for wolf in seats.werewolves.clone() {
            crate::game::actions::werewolf::attack(&mut game, wolf, seats.villagers[0]).unwrap();
        }

        let view = GameView::for_player(&game, Some(seats.villagers[1]));
        assert!(matches!(view.you, Some(ref s) if s.role() == Role::Villager));
        assert!(view
            .seats
            .iter()
            .all(|s| s.role.is_none() || s.player_id == seats.villagers[1]));

        let wire =
            serde_json::to_string(&ServerMessage::GameState(view)).unwrap();
        assert!(!wire.contains("werewolf"));
        assert!(!wire.contains("night_actions"));
    }

    #[test]
    fn game_view_shows_the_pack_to_a_wolf() {
        let (game, seats) = crate::game::testutil::started_game();
        let view = GameView::for_player(&game, Some(seats.werewolves[0]));
        let wolves_seen =
            view.seats.iter().filter(|s| s.role == Some(Role::Werewolf)).count();
        assert_eq!(wolves_seen, seats.werewolves.len());
        assert!(view
            .seats
            .iter()
            .find(|s| s.player_id == seats.seer)
            .unwrap()
            .role
            .is_none());
    }

    #[test]
    fn death_reveals_the_seat_to_everyone() {
        let (mut game, seats) = crate::game::testutil::started_game();
        game.kill(seats.seer);
        let view = GameView::for_player(&game, None);
        let seer_seat =
            view.seats.iter().find(|s| s.player_id == seats.seer).unwrap();
        assert!(!seer_seat.is_alive);
        assert_eq!(seer_seat.role, Some(Role::Seer));
        assert!(view.you.is_none());
    }
}
