//! Matchmaking service - pairing, direction relay, and session lifecycle
//!
//! All lobby bookkeeping lives in one owned [`LobbyState`] behind a single
//! mutex, so every protocol event (find-match, update-direction, disconnect)
//! runs to completion before the next one touches the queue or match table.

use std::collections::HashMap;

use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ws::protocol::{Direction, MatchId, PlayerSlot, ServerMsg};

use super::queue::MatchQueue;

/// An active pairing: exactly two members, slot-indexed
#[derive(Debug, Clone, Copy)]
struct MatchRoom {
    members: [Uuid; 2],
}

impl MatchRoom {
    fn slot_of(&self, conn_id: &Uuid) -> Option<PlayerSlot> {
        if self.members[0] == *conn_id {
            Some(PlayerSlot::One)
        } else if self.members[1] == *conn_id {
            Some(PlayerSlot::Two)
        } else {
            None
        }
    }

    fn peer_of(&self, conn_id: &Uuid) -> Option<Uuid> {
        let slot = self.slot_of(conn_id)?;
        Some(self.members[slot.peer().index()])
    }
}

/// Lobby bookkeeping: the queue, active matches, and who belongs where
///
/// Mutated only through [`MatchmakingService`] operations.
#[derive(Debug)]
struct LobbyState {
    queue: MatchQueue,
    matches: HashMap<MatchId, MatchRoom>,
    /// Connection -> the match it belongs to
    membership: HashMap<Uuid, MatchId>,
    /// Next match id to hand out; strictly increasing, never reused
    next_match_id: MatchId,
}

impl LobbyState {
    fn new() -> Self {
        Self {
            queue: MatchQueue::new(),
            matches: HashMap::new(),
            membership: HashMap::new(),
            next_match_id: 1,
        }
    }
}

/// Matchmaking service: pairs connections and relays direction updates
pub struct MatchmakingService {
    state: Mutex<LobbyState>,
    /// Outbound channel per connected client, drained by its writer task
    connections: DashMap<Uuid, mpsc::UnboundedSender<ServerMsg>>,
}

impl MatchmakingService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LobbyState::new()),
            connections: DashMap::new(),
        }
    }

    /// Register a connection; the transport drains the returned receiver
    pub fn register(&self, conn_id: Uuid) -> mpsc::UnboundedReceiver<ServerMsg> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(conn_id, tx);
        info!(%conn_id, "client connected");
        rx
    }

    /// Pair with the first waiter, or start waiting
    ///
    /// Repeat requests while waiting or matched are ignored, so a connection
    /// can never hold two queue slots or two matches.
    pub async fn find_match(&self, conn_id: Uuid) {
        let mut state = self.state.lock().await;

        if state.membership.contains_key(&conn_id) {
            warn!(%conn_id, "find_match while already in a match");
            return;
        }
        if state.queue.contains(&conn_id) {
            warn!(%conn_id, "find_match while already queued");
            return;
        }

        match state.queue.take_waiting() {
            Some(peer) => {
                let match_id = state.next_match_id;
                state.next_match_id += 1;

                state.matches.insert(
                    match_id,
                    MatchRoom {
                        members: [peer, conn_id],
                    },
                );
                state.membership.insert(peer, match_id);
                state.membership.insert(conn_id, match_id);
                drop(state);

                self.send(peer, ServerMsg::MatchFound {
                    match_id,
                    player_num: PlayerSlot::One,
                });
                self.send(conn_id, ServerMsg::MatchFound {
                    match_id,
                    player_num: PlayerSlot::Two,
                });

                info!(match_id, player_one = %peer, player_two = %conn_id, "match formed");
            }
            None => {
                state.queue.enqueue(conn_id);
                info!(%conn_id, "waiting for a peer");
            }
        }
    }

    /// Relay a heading change to the sender's match peer
    ///
    /// The claimed match id and slot must agree with the binding recorded at
    /// match formation; mismatches are rejected instead of relayed.
    pub async fn update_direction(
        &self,
        conn_id: Uuid,
        match_id: MatchId,
        player_num: PlayerSlot,
        direction: Direction,
    ) {
        let state = self.state.lock().await;

        let Some(&member_match) = state.membership.get(&conn_id) else {
            warn!(%conn_id, "update_direction from a connection not in a match");
            self.reject(conn_id, "not_in_match", "You are not in a match");
            return;
        };

        if member_match != match_id {
            warn!(%conn_id, claimed = match_id, actual = member_match, "match id mismatch");
            self.reject(conn_id, "match_mismatch", "That is not your match");
            return;
        }

        let Some(room) = state.matches.get(&member_match).copied() else {
            return;
        };

        if room.slot_of(&conn_id) != Some(player_num) {
            warn!(%conn_id, claimed = ?player_num, "player number mismatch");
            self.reject(conn_id, "slot_mismatch", "That is not your player number");
            return;
        }

        let Some(peer) = room.peer_of(&conn_id) else {
            return;
        };
        drop(state);

        debug!(%conn_id, match_id, direction = ?direction, "relaying direction update");
        self.send(peer, ServerMsg::Update {
            player_num,
            direction,
        });
    }

    /// Session teardown on disconnect
    ///
    /// Removes the connection from the queue or its match; a match peer gets
    /// exactly one player-left notification and both match records go away -
    /// a match never outlives either member.
    pub async fn disconnect(&self, conn_id: Uuid) {
        self.connections.remove(&conn_id);

        let mut state = self.state.lock().await;
        state.queue.remove(&conn_id);

        let Some(match_id) = state.membership.remove(&conn_id) else {
            info!(%conn_id, "client disconnected");
            return;
        };

        let peer = state
            .matches
            .remove(&match_id)
            .and_then(|room| room.peer_of(&conn_id));
        if let Some(peer) = peer {
            state.membership.remove(&peer);
        }
        drop(state);

        if let Some(peer) = peer {
            self.send(peer, ServerMsg::PlayerLeft);
        }

        info!(%conn_id, match_id, "match terminated by disconnect");
    }

    /// Get current queue size
    pub async fn queue_size(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    /// Number of active matches
    pub async fn active_matches(&self) -> usize {
        self.state.lock().await.matches.len()
    }

    /// Number of registered connections
    pub fn connected_clients(&self) -> usize {
        self.connections.len()
    }

    fn send(&self, conn_id: Uuid, msg: ServerMsg) {
        if let Some(tx) = self.connections.get(&conn_id) {
            if tx.send(msg).is_err() {
                debug!(%conn_id, "outbox closed, dropping message");
            }
        }
    }

    fn reject(&self, conn_id: Uuid, code: &str, message: &str) {
        self.send(conn_id, ServerMsg::Error {
            code: code.to_string(),
            message: message.to_string(),
        });
    }
}

impl Default for MatchmakingService {
    fn default() -> Self {
        Self::new()
    }
}
