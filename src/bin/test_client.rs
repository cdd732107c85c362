use futures::{SinkExt, StreamExt};
use nighthowl::game::{GameId, PlayerId};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

// --- Re-definitions of DTOs ---
// In a bigger repo, we would put these in a shared `common` library crate.
// For now, we just redefine the ones we need for the client.

#[derive(Debug, Deserialize)]
struct CreateGameResponse {
    game_id: GameId,
}

#[derive(Debug, Serialize)]
struct CreateGameRequest {
    name: String,
    creator_id: Option<PlayerId>,
    max_players: Option<u8>,
}

#[derive(Debug, Serialize)]
struct JoinGameRequest {
    player_id: Option<PlayerId>,
    username: Option<String>,
}

#[derive(Debug, Serialize)]
struct StartGameRequest {
    player_id: PlayerId,
}

async fn spawn_game_connection(
    game_id: GameId,
    player_id: PlayerId,
    name: String,
) -> Result<tokio::task::JoinHandle<()>, Box<dyn std::error::Error>> {
    let ws_base = "ws://127.0.0.1:3000/ws/game";

    let handle = tokio::spawn(async move {
        let url_str = format!("{}/{}?player_id={}", ws_base, game_id, player_id);
        let (ws_stream, _) = connect_async(url_str).await.expect("failed to connect");
        let (mut write, mut read) = ws_stream.split();

        println!("....[{name}] Connected!");

        while let Some(msg) = read.next().await {
            let msg = msg.expect("Error reading message");
            if msg.is_text() {
                println!("....[{name} RX] {}", msg.to_text().unwrap());
            } else if msg.is_ping() {
                let _ = write.send(Message::Pong(Vec::new().into())).await;
            }
        }
    });

    Ok(handle)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let creator_id = PlayerId::new();
    let client = reqwest::Client::new();
    let base_url = "http://127.0.0.1:3000";

    println!("--- NIGHTHOWL TEST CLIENT ---");
    println!("Creator ID: {}", creator_id);

    println!("\n[1] Creating Game...");
    let resp = client
        .post(format!("{}/game", base_url))
        .json(&CreateGameRequest {
            name: "test-village".to_string(),
            creator_id: Some(creator_id),
            max_players: Some(18),
        })
        .send()
        .await?
        .json::<CreateGameResponse>()
        .await?;

    let game_id = resp.game_id;
    println!("Success! Game ID: {}", game_id);

    println!("\n[2] Seating nine guests...");
    let mut guests = Vec::new();
    for i in 0..9 {
        let guest_id = PlayerId::new();
        let _ = client
            .post(format!("{}/game/{}/join", base_url, game_id))
            .json(&JoinGameRequest {
                player_id: Some(guest_id),
                username: Some(format!("villager-{}", i + 1)),
            })
            .send()
            .await?;
        guests.push(guest_id);
    }
    println!("Success! Table of {} seated.", guests.len() + 1);

    println!("\n[3] Connecting WebSockets...");
    let mut handles = Vec::new();
    handles.push(spawn_game_connection(game_id, creator_id, "Creator".to_string()).await?);
    for (i, guest_id) in guests.iter().enumerate() {
        handles
            .push(spawn_game_connection(game_id, *guest_id, format!("Guest-{}", i + 1)).await?);
    }
    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;

    println!("\n[4] Starting Game (dealing roles)...");
    let _ = client
        .post(format!("{}/game/{}/start", base_url, game_id))
        .json(&StartGameRequest { player_id: creator_id })
        .send()
        .await?;
    println!("Success! Watching the phase loop; Ctrl-C to stop.");

    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
