//! Relay server: a minimal multiplayer peer
//!
//! Every client draws from the same seeded piece sequence, so all players get
//! the same pieces in the same order. Score, lives and death reports update the
//! sender's record; `SCORES` returns every connected or dead client. The relay never
//! checks that a report is plausible.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::leaderboard::LeaderboardEntry;
use crate::core::rng::SimpleRng;
use crate::protocol::PeerMessage;
use crate::types::{PlayerStatus, STARTING_LIVES};
use crate::wirelog::{Direction, WireLog};

/// Marker reported for a client that sent `DIE`
pub const DEAD_MARKER: &str = "DEAD";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seed: u32,
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7788,
            seed: 12345,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TETRECS_RELAY_HOST").unwrap_or(defaults.host);
        let port = env::var("TETRECS_RELAY_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let seed = env::var("TETRECS_RELAY_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.seed);
        let log_path = env::var("TETRECS_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            seed,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid relay address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone)]
struct ClientRecord {
    id: usize,
    name: String,
    score: u32,
    status: PlayerStatus,
    /// This client's copy of the piece generator, started from the relay seed
    pieces: SimpleRng,
}

/// Relay bookkeeping, independent of sockets
#[derive(Debug)]
pub struct Relay {
    seed: u32,
    clients: Vec<ClientRecord>,
}

impl Relay {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            clients: Vec::new(),
        }
    }

    pub fn join(&mut self, id: usize) {
        self.clients.push(ClientRecord {
            id,
            name: format!("player{}", id),
            score: 0,
            status: PlayerStatus::Lives(STARTING_LIVES),
            pieces: SimpleRng::new(self.seed),
        });
    }

    /// Forget a disconnected client. Dead players stay on the board.
    pub fn leave(&mut self, id: usize) {
        self.clients.retain(|c| c.id != id || c.status.is_dead());
    }

    /// Apply one message from client `id`; returns the reply, if any
    pub fn handle(&mut self, id: usize, msg: PeerMessage) -> Option<PeerMessage> {
        let Some(pos) = self.clients.iter().position(|c| c.id == id) else {
            log::warn!("Message from unknown client {}", id);
            return None;
        };

        match msg {
            PeerMessage::RequestPiece => {
                let index = self.clients[pos].pieces.next_piece_index();
                Some(PeerMessage::Piece(index))
            }
            PeerMessage::RequestScores => Some(PeerMessage::Scores(self.entries())),
            PeerMessage::Score(score) => {
                self.clients[pos].score = score;
                None
            }
            PeerMessage::Lives(lives) => {
                self.clients[pos].status = PlayerStatus::Lives(lives);
                None
            }
            PeerMessage::Die => {
                log::info!("Client {} died", id);
                self.clients[pos].status = PlayerStatus::Dead(DEAD_MARKER.to_string());
                None
            }
            PeerMessage::Nick(name) => {
                log::info!("Client {} is now {}", id, name);
                self.clients[pos].name = name;
                None
            }
            other @ (PeerMessage::Piece(_) | PeerMessage::Scores(_)) => {
                log::warn!("Client {} sent server-only message {}", id, other.command());
                None
            }
        }
    }

    /// Every client, in join order
    pub fn entries(&self) -> Vec<LeaderboardEntry> {
        self.clients
            .iter()
            .map(|c| LeaderboardEntry::new(c.name.clone(), c.score, c.status.clone()))
            .collect()
    }
}

/// Start the relay and serve until the listener fails
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log = config.log_path.clone().map(WireLog::open);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    log::info!("Relay listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let relay = Arc::new(RwLock::new(Relay::new(config.seed)));
    let mut client_id_counter = 0usize;

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        log::info!("Client {} connected from {}", client_id, addr);
        relay.write().await.join(client_id);

        let relay = Arc::clone(&relay);
        let wire_log = wire_log.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, Arc::clone(&relay), wire_log).await
            {
                log::warn!("Client {} error: {}", client_id, e);
            }
            relay.write().await.leave(client_id);
            log::info!("Client {} disconnected", client_id);
        });
    }
}

async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    relay: Arc<RwLock<Relay>>,
    wire_log: Option<WireLog>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let peer = addr.to_string();

    let (tx, mut rx) = mpsc::unbounded_channel::<PeerMessage>();

    let write_log = wire_log.clone();
    let write_peer = peer.clone();
    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let frame = msg.to_frame();
            if writer.write_all(frame.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
            if let Some(log) = write_log.as_ref() {
                log.record(Direction::Sent, &write_peer, &frame);
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let raw = line.trim_end_matches(['\n', '\r']);
        if raw.trim().is_empty() {
            continue;
        }
        if let Some(log) = wire_log.as_ref() {
            log.record(Direction::Received, &peer, raw);
        }

        let msg = match PeerMessage::from_frame(raw) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("Client {} sent bad message: {}", client_id, e);
                continue;
            }
        };

        let reply = relay.write().await.handle(client_id, msg);
        if let Some(reply) = reply {
            if tx.send(reply).is_err() {
                break;
            }
        }
    }

    drop(tx);
    let _ = write_task.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_share_piece_sequence() {
        let mut relay = Relay::new(42);
        relay.join(1);
        relay.join(2);

        let first: Vec<_> = (0..5)
            .map(|_| relay.handle(1, PeerMessage::RequestPiece))
            .collect();
        let second: Vec<_> = (0..5)
            .map(|_| relay.handle(2, PeerMessage::RequestPiece))
            .collect();
        assert_eq!(first, second);
        assert!(first
            .iter()
            .all(|m| matches!(m, Some(PeerMessage::Piece(i)) if *i < 15)));
    }

    #[test]
    fn test_late_joiner_starts_from_the_top() {
        let mut relay = Relay::new(42);
        relay.join(1);
        let early: Vec<_> = (0..500)
            .map(|_| relay.handle(1, PeerMessage::RequestPiece))
            .collect();

        relay.join(2);
        let late: Vec<_> = (0..500)
            .map(|_| relay.handle(2, PeerMessage::RequestPiece))
            .collect();
        assert_eq!(early, late);
    }

    #[test]
    fn test_reports_update_records() {
        let mut relay = Relay::new(1);
        relay.join(1);
        relay.join(2);

        assert_eq!(relay.handle(1, PeerMessage::Nick("ada".to_string())), None);
        relay.handle(1, PeerMessage::Score(400));
        relay.handle(1, PeerMessage::Lives(1));
        relay.handle(2, PeerMessage::Die);

        let Some(PeerMessage::Scores(entries)) = relay.handle(2, PeerMessage::RequestScores) else {
            panic!("expected scores");
        };
        assert_eq!(entries[0].to_record(), "ada:400:1");
        assert_eq!(entries[1].to_record(), "player2:0:DEAD");
    }

    #[test]
    fn test_leave_drops_record() {
        let mut relay = Relay::new(1);
        relay.join(1);
        relay.join(2);
        relay.leave(1);
        assert_eq!(relay.entries().len(), 1);
        assert_eq!(relay.handle(1, PeerMessage::RequestPiece), None);
    }

    #[test]
    fn test_dead_client_stays_after_leaving() {
        let mut relay = Relay::new(1);
        relay.join(1);
        relay.handle(1, PeerMessage::Die);
        relay.leave(1);
        assert_eq!(relay.entries()[0].to_record(), "player1:0:DEAD");
    }

    #[test]
    fn test_config_default_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 7788);
    }
}
