pub mod config;
pub mod data;
pub mod error;
pub mod flow;
pub mod game;
pub mod handlers;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use config::Config;
use data::{RedisRepository, ServerMessage};
use handlers::{rest, ws};
use state::{AppState, GameRegistry, SharedState};

pub fn create_app(config: Config) -> Router {
    let client = redis::Client::open(config.database.redis_url.clone()).expect("Invalid Redis URL");

    let repository = Arc::new(RedisRepository::new(client));
    let state = Arc::new(AppState {
        repository,
        registry: GameRegistry::default(),
        config: Arc::new(config),
    });
    create_app_with_state(state)
}

pub fn create_app_with_state(state: SharedState) -> Router {
    spawn_heartbeat(state.clone());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/game", post(rest::create_game_handler))
        .route("/game/{id}", get(rest::get_game_handler))
        .route("/game/{id}/join", post(rest::join_game_handler))
        .route("/game/{id}/start", post(rest::start_game_handler))
        .route("/game/{id}/summary", get(rest::game_summary_handler))
        .route("/game/{id}/process-night", post(rest::process_night_handler))
        .route("/game/{id}/process-day", post(rest::process_day_handler))
        .route("/game/{id}/advance-phase", post(rest::advance_phase_handler))
        .route("/game/{id}/pause", post(rest::pause_game_handler))
        .route("/game/{id}/resume", post(rest::resume_game_handler))
        .route("/ws/game/{id}", get(ws::websocket_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(true)))
        .layer(cors)
}

/// Fixed-interval ping across every room. Stale senders are pruned by the
/// broadcast itself, so this never takes a room's engine mutex.
fn spawn_heartbeat(state: SharedState) {
    let interval = Duration::from_secs(state.config.server.heartbeat_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let rooms: Vec<_> =
                state.registry.rooms.read().await.values().cloned().collect();
            for room in rooms {
                flow::broadcast(&room, &ServerMessage::Heartbeat).await;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, LoggingConfig, ServerConfig};
    use crate::game::phase::PhaseDurations;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            server: ServerConfig { addr: "0.0.0.0:0".to_string(), heartbeat_secs: 30 },
            database: DatabaseConfig {
                redis_url: "redis://127.0.0.1:6379/".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string() },
            phases: PhaseDurations::default(),
        }
    }

    #[tokio::test]
    async fn test_create_app_initialization() {
        let app = create_app(test_config());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_unknown_game_returns_not_found() {
        let state = Arc::new(AppState {
            repository: Arc::new(crate::data::MockGameRepository::new()),
            registry: GameRegistry::default(),
            config: Arc::new(test_config()),
        });
        let app = create_app_with_state(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/game/{}", crate::game::GameId::new()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rule_violation_maps_to_bad_request() {
        let state = Arc::new(AppState {
            repository: Arc::new(crate::data::MockGameRepository::new()),
            registry: GameRegistry::default(),
            config: Arc::new(test_config()),
        });
        let app = create_app_with_state(state.clone());

        let creator = crate::game::PlayerId::new();
        let game = crate::game::Game::new("http-test", creator, 18);
        state.repository.save_game(&game).await.unwrap();

        // Starting a six-seat lobby breaks the player-count rule.
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/game/{}/start", game.get_id()))
                    .header("content-type", "application/json")
                    .body(Body::from(format!(r#"{{"player_id":"{creator}"}}"#)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
