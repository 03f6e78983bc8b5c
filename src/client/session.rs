//! Client session - the protocol loop around the local simulation
//!
//! Mirrors the browser client's structure: a frame-rate tick driving the
//! simulation, with server messages applied between ticks. The server is
//! never consulted about outcomes; it only relays the peer's headings.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

use crate::client::bot;
use crate::game::{RoundOutcome, SimPhase, Simulation};
use crate::util::time::tick_duration;
use crate::ws::protocol::{ClientMsg, MatchId, PlayerSlot, ServerMsg};

/// Seconds between the matched announcement and movement start
///
/// Each side runs this timer locally; the protocol carries no "go" signal,
/// so start synchronization is best-effort by design.
pub const MATCH_START_DELAY: f32 = 2.0;

/// Client session errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("WebSocket transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("server closed the connection unexpectedly")]
    ConnectionClosed,
}

/// Result of one completed session
#[derive(Debug, Clone, Copy)]
pub struct SessionSummary {
    pub rounds_played: u32,
    /// Final cumulative scores as (player 1, player 2)
    pub scores: (u32, u32),
}

/// Where the session is within one connection
enum SessionPhase {
    /// find_match sent, waiting for a pairing
    Searching,
    /// Matched; movement starts when the announcement period elapses
    Starting { remaining: f32 },
    /// Both agents under way, rounds running locally
    Playing,
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = futures::stream::SplitSink<WsStream, tungstenite::Message>;

/// A headless client session
pub struct GameClient {
    server_url: String,
    rounds_limit: Option<u32>,
}

impl GameClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            rounds_limit: None,
        }
    }

    /// Stop after this many completed rounds instead of waiting for the peer
    /// to leave
    pub fn with_rounds_limit(mut self, rounds: u32) -> Self {
        self.rounds_limit = Some(rounds);
        self
    }

    /// Connect, join the queue, and play until the peer leaves (or the round
    /// limit is reached)
    pub async fn run(&self) -> Result<SessionSummary, ClientError> {
        let (ws, _) = connect_async(self.server_url.as_str()).await?;
        let (mut sink, mut stream) = ws.split();

        send(&mut sink, &ClientMsg::FindMatch).await?;
        info!(url = %self.server_url, "Searching for a match");

        let mut sim = Simulation::new();
        let mut phase = SessionPhase::Searching;
        let mut role: Option<(MatchId, PlayerSlot)> = None;
        let mut rounds_played = 0u32;

        let mut ticker = interval(tick_duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = tokio::time::Instant::now();

        loop {
            tokio::select! {
                frame = stream.next() => {
                    let msg = match frame {
                        Some(Ok(tungstenite::Message::Text(text))) => {
                            match serde_json::from_str::<ServerMsg>(&text) {
                                Ok(msg) => msg,
                                Err(e) => {
                                    warn!(error = %e, "Failed to parse server message");
                                    continue;
                                }
                            }
                        }
                        Some(Ok(tungstenite::Message::Close(_))) | None => {
                            return Err(ClientError::ConnectionClosed);
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                    };

                    match msg {
                        ServerMsg::MatchFound { match_id, player_num } => {
                            info!(match_id, slot = ?player_num, "Match found");
                            role = Some((match_id, player_num));
                            sim = Simulation::new();
                            phase = SessionPhase::Starting {
                                remaining: MATCH_START_DELAY,
                            };
                        }
                        ServerMsg::Update { player_num, direction } => {
                            sim.set_direction(player_num, direction);
                        }
                        ServerMsg::PlayerLeft => {
                            info!("Peer left the match");
                            return Ok(SessionSummary {
                                rounds_played,
                                scores: sim.scores(),
                            });
                        }
                        ServerMsg::Error { code, message } => {
                            warn!(%code, %message, "Server rejected a message");
                        }
                    }
                }

                now = ticker.tick() => {
                    let dt = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;

                    if let SessionPhase::Starting { remaining } = &mut phase {
                        *remaining -= dt;
                        if *remaining <= 0.0 {
                            sim.start_round();
                            phase = SessionPhase::Playing;
                            info!("Round started");
                        }
                    }

                    // Steer the local agent and announce heading changes.
                    if matches!(phase, SessionPhase::Playing) {
                        if let Some((match_id, slot)) = role {
                            if matches!(sim.phase(), SimPhase::Running) {
                                let turn = bot::choose_direction(sim.board(), sim.player(slot));
                                if let Some(direction) = turn {
                                    sim.set_direction(slot, direction);
                                    send(&mut sink, &ClientMsg::UpdateDirection {
                                        direction,
                                        match_id,
                                        player_num: slot,
                                    })
                                    .await?;
                                }
                            }
                        }
                    }

                    if let Some(outcome) = sim.tick(dt) {
                        rounds_played += 1;
                        let (p1, p2) = sim.scores();
                        match outcome {
                            RoundOutcome::Draw => {
                                info!(score_p1 = p1, score_p2 = p2, "Round drawn");
                            }
                            RoundOutcome::Loss { loser } => {
                                info!(loser = ?loser, score_p1 = p1, score_p2 = p2, "Round over");
                            }
                        }

                        if self.rounds_limit.is_some_and(|limit| rounds_played >= limit) {
                            return Ok(SessionSummary {
                                rounds_played,
                                scores: sim.scores(),
                            });
                        }
                    }
                }
            }
        }
    }
}

/// Send a message over WebSocket
async fn send(sink: &mut WsSink, msg: &ClientMsg) -> Result<(), ClientError> {
    let json = serde_json::to_string(msg)?;
    sink.send(tungstenite::Message::Text(json)).await?;
    Ok(())
}
