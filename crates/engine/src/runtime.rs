//! Engine runtime - one tokio task owns the game
//!
//! Player commands, countdown expiries, poll ticks and peer messages all arrive
//! on channels and are handled one at a time by the engine task, so the game
//! state has a single writer. After every mutation the engine drains the game
//! events, schedules timers from them, reports to the peer, forwards them to
//! the handle and publishes a fresh snapshot.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::adapter::{PeerLink, PeerMessage};
use crate::core::{
    high_score_from, GameSnapshot, GameState, Leaderboard, LeaderboardEntry, LocalPieces,
    PieceSource, RemotePieces,
};
use crate::report::{report, ChannelSink, NullSink, PeerSink};
use crate::timer::{poll_interval, Countdown};
use crate::types::{GameAction, GameEvent, GRID_COLS, GRID_ROWS, LEADERBOARD_POLL_MS, STARTING_LIVES};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub cols: usize,
    pub rows: usize,
    pub lives: i32,
    pub seed: u32,
    pub poll_interval: Duration,
    /// Score file to read the high score from
    pub scores_path: Option<PathBuf>,
    /// Sent to the peer as `NICK` when a multiplayer game starts
    pub player_name: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            lives: STARTING_LIVES,
            seed: 12345,
            poll_interval: Duration::from_millis(LEADERBOARD_POLL_MS),
            scores_path: None,
            player_name: None,
        }
    }
}

impl EngineConfig {
    /// Defaults, with the score file taken from `TETRECS_SCORES_PATH`
    pub fn from_env() -> Self {
        let scores_path = std::env::var("TETRECS_SCORES_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "scores.txt".to_string());

        Self {
            scores_path: Some(PathBuf::from(scores_path)),
            ..Self::default()
        }
    }

    fn high_score(&self) -> u32 {
        self.scores_path
            .as_deref()
            .map(high_score_from)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Action(GameAction),
    /// Place the current piece centred on a board cell
    PlaceAt { x: i32, y: i32 },
    Cancel,
}

/// Caller's side of a running engine
#[derive(Debug)]
pub struct EngineHandle {
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::UnboundedReceiver<GameEvent>,
    snapshot_rx: watch::Receiver<GameSnapshot>,
    leaderboard_rx: watch::Receiver<Vec<LeaderboardEntry>>,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Queue a command. Returns false once the engine has stopped.
    pub fn send(&self, cmd: EngineCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    /// Next game event; `None` after the game has ended and all events were read
    pub async fn next_event(&mut self) -> Option<GameEvent> {
        self.event_rx.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<GameEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Latest published state
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Latest leaderboard, highest score first. Empty in single player.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard_rx.borrow().clone()
    }

    pub fn subscribe_leaderboard(&self) -> watch::Receiver<Vec<LeaderboardEntry>> {
        self.leaderboard_rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// End the game if it is still running and wait for the engine task
    pub async fn shutdown(self) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel);
        drop(self.cmd_tx);
        if let Err(e) = self.task.await {
            log::error!("Engine task failed: {}", e);
        }
    }
}

/// Start a local game drawing pieces from a seeded generator
pub fn spawn_single_player(config: EngineConfig) -> EngineHandle {
    let state = GameState::new(config.cols, config.rows, LocalPieces::new(config.seed))
        .with_lives(config.lives)
        .with_high_score(config.high_score());
    spawn_engine(state, Box::new(NullSink), None, None)
}

/// Start a game fed and scored by a peer
pub fn spawn_multiplayer(config: EngineConfig, link: PeerLink) -> EngineHandle {
    let (out_tx, in_rx) = link.into_parts();
    let mut sink = ChannelSink::new(out_tx);
    if let Some(name) = config.player_name.clone() {
        sink.send(PeerMessage::Nick(name));
    }

    let state = GameState::new(config.cols, config.rows, RemotePieces::new())
        .with_lives(config.lives)
        .with_high_score(config.high_score());
    spawn_engine(state, Box::new(sink), Some(in_rx), Some(config.poll_interval))
}

fn spawn_engine<S>(
    state: GameState<S>,
    sink: Box<dyn PeerSink>,
    peer_rx: Option<mpsc::UnboundedReceiver<PeerMessage>>,
    poll: Option<Duration>,
) -> EngineHandle
where
    S: PieceSource + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (timer_tx, timer_rx) = mpsc::unbounded_channel();

    let mut snapshot = GameSnapshot::default();
    state.snapshot_into(&mut snapshot);
    let (snapshot_tx, snapshot_rx) = watch::channel(snapshot.clone());
    let (leaderboard_tx, leaderboard_rx) = watch::channel(Vec::new());

    let engine = Engine {
        state,
        sink,
        countdown: Countdown::new(timer_tx),
        leaderboard: Leaderboard::new(),
        event_tx,
        snapshot_tx,
        leaderboard_tx,
        snapshot,
    };
    let task = tokio::spawn(engine.run(cmd_rx, timer_rx, peer_rx, poll));

    EngineHandle {
        cmd_tx,
        event_rx,
        snapshot_rx,
        leaderboard_rx,
        task,
    }
}

struct Engine<S> {
    state: GameState<S>,
    sink: Box<dyn PeerSink>,
    countdown: Countdown,
    leaderboard: Leaderboard,
    event_tx: mpsc::UnboundedSender<GameEvent>,
    snapshot_tx: watch::Sender<GameSnapshot>,
    leaderboard_tx: watch::Sender<Vec<LeaderboardEntry>>,
    snapshot: GameSnapshot,
}

impl<S: PieceSource + Send + 'static> Engine<S> {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<EngineCommand>,
        mut timer_rx: mpsc::UnboundedReceiver<u64>,
        mut peer_rx: Option<mpsc::UnboundedReceiver<PeerMessage>>,
        poll: Option<Duration>,
    ) {
        self.state.initialise();
        self.flush();

        let polling = poll.is_some();
        let mut poller = poll_interval(poll.unwrap_or(Duration::from_millis(LEADERBOARD_POLL_MS)));

        while !self.state.is_ended() {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        log::info!("Engine handle dropped");
                        self.state.cancel();
                    }
                },
                Some(generation) = timer_rx.recv() => {
                    self.state.on_timer_expired(generation);
                }
                msg = recv_peer(&mut peer_rx), if peer_rx.is_some() => match msg {
                    Some(msg) => self.handle_peer(msg),
                    None => {
                        log::warn!("Lost connection to peer");
                        peer_rx = None;
                        self.state.cancel();
                    }
                },
                _ = poller.tick(), if polling => {
                    self.sink.send(PeerMessage::RequestScores);
                }
            }
            self.flush();
        }

        self.countdown.stop();
        log::info!("Engine stopped");
    }

    fn handle_command(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::Action(action) => {
                if !self.state.apply_action(action) {
                    log::debug!("Action {} had no effect", action.as_str());
                }
            }
            EngineCommand::PlaceAt { x, y } => {
                if let Err(e) = self.state.place_at(x, y) {
                    log::debug!("Placement at {}, {} refused: {}", x, y, e);
                }
            }
            EngineCommand::Cancel => self.state.cancel(),
        }
    }

    fn handle_peer(&mut self, msg: PeerMessage) {
        match msg {
            PeerMessage::Piece(index) => {
                if let Err(e) = self.state.receive_piece(index) {
                    log::warn!("Ignoring piece {} from peer: {}", index, e);
                }
            }
            PeerMessage::Scores(entries) => {
                self.leaderboard.replace(entries);
                self.leaderboard_tx.send_replace(self.leaderboard.snapshot());
            }
            other => log::warn!("Unexpected {} message from peer", other.command()),
        }
    }

    /// Act on and publish everything the last mutation produced
    fn flush(&mut self) {
        for event in self.state.drain_events() {
            match &event {
                GameEvent::TimerRestarted {
                    generation,
                    delay_ms,
                } => self.countdown.restart(*generation, *delay_ms),
                GameEvent::TimerStopped => self.countdown.stop(),
                _ => {}
            }
            report(&event, self.sink.as_mut());
            let _ = self.event_tx.send(event);
        }

        self.state.snapshot_into(&mut self.snapshot);
        let changed = *self.snapshot_tx.borrow() != self.snapshot;
        if changed {
            self.snapshot_tx.send_replace(self.snapshot.clone());
        }
    }
}

async fn recv_peer(rx: &mut Option<mpsc::UnboundedReceiver<PeerMessage>>) -> Option<PeerMessage> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_single_player_forfeits_to_game_over() {
        let mut handle = spawn_single_player(EngineConfig::default());

        let mut lives = Vec::new();
        let mut ended = 0;
        while let Some(event) = handle.next_event().await {
            match event {
                GameEvent::LifeLost { lives: l } => lives.push(l),
                GameEvent::GameEnded => ended += 1,
                _ => {}
            }
        }

        assert_eq!(lives, [2, 1, 0, -1]);
        assert_eq!(ended, 1);
        assert!(handle.snapshot().is_ended());
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_engine() {
        let mut handle = spawn_single_player(EngineConfig::default());
        assert!(handle.send(EngineCommand::Cancel));

        let mut saw_end = false;
        while let Some(event) = handle.next_event().await {
            if event == GameEvent::GameEnded {
                saw_end = true;
            }
            assert!(!matches!(event, GameEvent::LifeLost { .. }));
        }
        assert!(saw_end);
        handle.shutdown().await;
    }
}
