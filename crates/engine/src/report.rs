//! Reporting game events to the peer

use tokio::sync::mpsc;

use crate::adapter::PeerMessage;
use crate::types::GameEvent;

/// Where peer-bound messages go
pub trait PeerSink: Send {
    fn send(&mut self, msg: PeerMessage);
}

/// Single player: nobody is listening
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PeerSink for NullSink {
    fn send(&mut self, _msg: PeerMessage) {}
}

/// Multiplayer: forward to the peer link
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<PeerMessage>,
    closed: bool,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<PeerMessage>) -> Self {
        Self { tx, closed: false }
    }
}

impl PeerSink for ChannelSink {
    fn send(&mut self, msg: PeerMessage) {
        if self.tx.send(msg).is_err() && !self.closed {
            log::warn!("Peer link closed, dropping reports");
            self.closed = true;
        }
    }
}

/// Send whatever the peer must hear about `event`.
///
/// Score increases go out as `SCORE`, each lost life as `LIVES` except the one
/// that crosses below zero, which is reported as `DIE` instead.
pub fn report(event: &GameEvent, sink: &mut dyn PeerSink) {
    match event {
        GameEvent::ScoreChanged { score } => sink.send(PeerMessage::Score(*score)),
        GameEvent::LifeLost { lives } if *lives >= 0 => sink.send(PeerMessage::Lives(*lives)),
        GameEvent::Died => sink.send(PeerMessage::Die),
        GameEvent::PiecesRequested { count } => {
            for _ in 0..*count {
                sink.send(PeerMessage::RequestPiece);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<PeerMessage>);

    impl PeerSink for Recorder {
        fn send(&mut self, msg: PeerMessage) {
            self.0.push(msg);
        }
    }

    #[test]
    fn test_lives_then_die() {
        let mut sink = Recorder::default();
        for event in [
            GameEvent::LifeLost { lives: 0 },
            GameEvent::LifeLost { lives: -1 },
            GameEvent::Died,
        ] {
            report(&event, &mut sink);
        }
        assert_eq!(sink.0, vec![PeerMessage::Lives(0), PeerMessage::Die]);
    }

    #[test]
    fn test_piece_requests_expand() {
        let mut sink = Recorder::default();
        report(&GameEvent::PiecesRequested { count: 3 }, &mut sink);
        assert_eq!(sink.0, vec![PeerMessage::RequestPiece; 3]);
    }

    #[test]
    fn test_local_events_not_reported() {
        let mut sink = Recorder::default();
        report(&GameEvent::CursorMoved { x: 1, y: 1 }, &mut sink);
        report(&GameEvent::MultiplierChanged { multiplier: 2 }, &mut sink);
        assert!(sink.0.is_empty());
    }
}
