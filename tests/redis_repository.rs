//! Round-trip tests against a real Redis instance. Run them with
//! `cargo test -- --ignored` once Redis is listening on 127.0.0.1:6379.

use nighthowl::data::{GameRepository, RedisRepository, User};
use nighthowl::error::AppError;
use nighthowl::game::{Game, GameId, PlayerId};
use serial_test::serial;

fn repository() -> RedisRepository {
    let client =
        redis::Client::open("redis://127.0.0.1:6379/").expect("invalid redis url");
    RedisRepository::new(client)
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Redis"]
async fn game_round_trip() {
    let repo = repository();
    let creator = PlayerId::new();
    let mut game = Game::new("redis-round-trip", creator, 18);
    for _ in 0..9 {
        game.join(PlayerId::new()).unwrap();
    }
    repo.save_game(&game).await.unwrap();

    let loaded = repo.load_game(game.get_id()).await.unwrap();
    assert_eq!(loaded.get_id(), game.get_id());
    assert_eq!(loaded.get_players(), game.get_players());
    assert_eq!(loaded.get_status(), game.get_status());
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Redis"]
async fn missing_game_is_not_found() {
    let repo = repository();
    let err = repo.load_game(GameId::new()).await.unwrap_err();
    assert!(matches!(err, AppError::GameNotFound(_)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Redis"]
async fn user_round_trip() {
    let repo = repository();
    let user = User::new(PlayerId::new(), Some("integration".into()));
    repo.save_user(&user).await.unwrap();
    let loaded = repo.load_user(user.id).await.unwrap().unwrap();
    assert_eq!(loaded.username, "integration");
}
