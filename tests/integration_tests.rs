//! Integration tests for the matchmaking relay
//!
//! These boot the real router on an ephemeral port and drive it with plain
//! WebSocket clients, validating the protocol end to end.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use trail_arena::app::AppState;
use trail_arena::config::Config;
use trail_arena::http::build_router;
use trail_arena::ws::protocol::{ClientMsg, Direction, PlayerSlot, ServerMsg};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

async fn spawn_server() -> SocketAddr {
    let config = Config {
        server_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
        client_origin: "http://localhost:8080".to_string(),
        static_dir: "public".to_string(),
    };
    let state = AppState::new(config);
    let router = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("WebSocket connect failed");
    ws
}

async fn send(ws: &mut WsClient, msg: &ClientMsg) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(Message::Text(json)).await.unwrap();
}

/// Receive the next protocol message, skipping transport frames
async fn recv(ws: &mut WsClient) -> ServerMsg {
    let deadline = timeout(RECV_TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str::<ServerMsg>(&text).expect("bad server message");
                }
                Some(Ok(_)) => continue,
                other => panic!("connection ended while waiting: {other:?}"),
            }
        }
    });
    deadline.await.expect("timed out waiting for a message")
}

/// Assert that nothing arrives within the silence window
async fn expect_silence(ws: &mut WsClient) {
    let got = timeout(SILENCE_WINDOW, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return text,
                Some(Ok(_)) => continue,
                _ => std::future::pending::<()>().await,
            }
        }
    })
    .await;
    assert!(got.is_err(), "expected silence, got: {got:?}");
}

/// Pair two fresh clients and return them with their announced match id
async fn pair(addr: SocketAddr) -> (WsClient, WsClient, u64) {
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    send(&mut a, &ClientMsg::FindMatch).await;
    expect_silence(&mut a).await;
    send(&mut b, &ClientMsg::FindMatch).await;

    let (id_a, slot_a) = match recv(&mut a).await {
        ServerMsg::MatchFound {
            match_id,
            player_num,
        } => (match_id, player_num),
        other => panic!("expected match_found, got {other:?}"),
    };
    let (id_b, slot_b) = match recv(&mut b).await {
        ServerMsg::MatchFound {
            match_id,
            player_num,
        } => (match_id, player_num),
        other => panic!("expected match_found, got {other:?}"),
    };

    assert_eq!(id_a, id_b);
    assert_eq!(slot_a, PlayerSlot::One);
    assert_eq!(slot_b, PlayerSlot::Two);

    (a, b, id_a)
}

#[tokio::test]
async fn pairing_assigns_roles_in_request_order() {
    let addr = spawn_server().await;
    let (_a, _b, match_id) = pair(addr).await;
    assert_eq!(match_id, 1);

    // A third requester waits until a fourth arrives.
    let mut c = connect(addr).await;
    send(&mut c, &ClientMsg::FindMatch).await;
    expect_silence(&mut c).await;

    let mut d = connect(addr).await;
    send(&mut d, &ClientMsg::FindMatch).await;

    match recv(&mut c).await {
        ServerMsg::MatchFound {
            match_id,
            player_num,
        } => {
            assert_eq!(match_id, 2);
            assert_eq!(player_num, PlayerSlot::One);
        }
        other => panic!("expected match_found, got {other:?}"),
    }
    match recv(&mut d).await {
        ServerMsg::MatchFound {
            match_id,
            player_num,
        } => {
            assert_eq!(match_id, 2);
            assert_eq!(player_num, PlayerSlot::Two);
        }
        other => panic!("expected match_found, got {other:?}"),
    }
}

#[tokio::test]
async fn direction_update_reaches_the_peer_only() {
    let addr = spawn_server().await;
    let (mut a, mut b, match_id) = pair(addr).await;

    send(
        &mut b,
        &ClientMsg::UpdateDirection {
            direction: Direction::Up,
            match_id,
            player_num: PlayerSlot::Two,
        },
    )
    .await;

    match recv(&mut a).await {
        ServerMsg::Update {
            player_num,
            direction,
        } => {
            assert_eq!(player_num, PlayerSlot::Two);
            assert_eq!(direction, Direction::Up);
        }
        other => panic!("expected update, got {other:?}"),
    }

    // The sender hears nothing back.
    expect_silence(&mut b).await;
}

#[tokio::test]
async fn spoofed_player_number_is_not_relayed() {
    let addr = spawn_server().await;
    let (mut a, mut b, match_id) = pair(addr).await;

    send(
        &mut a,
        &ClientMsg::UpdateDirection {
            direction: Direction::Down,
            match_id,
            player_num: PlayerSlot::Two,
        },
    )
    .await;

    match recv(&mut a).await {
        ServerMsg::Error { code, .. } => assert_eq!(code, "slot_mismatch"),
        other => panic!("expected error, got {other:?}"),
    }
    expect_silence(&mut b).await;
}

#[tokio::test]
async fn disconnect_notifies_peer_exactly_once() {
    let addr = spawn_server().await;
    let (a, mut b, match_id) = pair(addr).await;

    drop(a);

    match recv(&mut b).await {
        ServerMsg::PlayerLeft => {}
        other => panic!("expected player_left, got {other:?}"),
    }
    expect_silence(&mut b).await;

    // The dead match relays nothing anymore.
    send(
        &mut b,
        &ClientMsg::UpdateDirection {
            direction: Direction::Up,
            match_id,
            player_num: PlayerSlot::Two,
        },
    )
    .await;
    match recv(&mut b).await {
        ServerMsg::Error { code, .. } => assert_eq!(code, "not_in_match"),
        other => panic!("expected error, got {other:?}"),
    }
}
