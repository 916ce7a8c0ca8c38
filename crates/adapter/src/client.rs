//! Peer connection: one message channel in each direction
//!
//! [`PeerLink::connect`] opens a TCP connection and runs a reader and a writer
//! task that translate between frames and [`PeerMessage`]s. Nothing on the
//! game side ever awaits the socket; sends are fire-and-forget.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;

use crate::protocol::PeerMessage;
use crate::wirelog::{Direction, WireLog};

#[derive(Debug)]
pub struct PeerLink {
    outbound: mpsc::UnboundedSender<PeerMessage>,
    inbound: mpsc::UnboundedReceiver<PeerMessage>,
}

impl PeerLink {
    /// Connect to a peer over TCP
    pub async fn connect(addr: impl ToSocketAddrs, wire_log: Option<WireLog>) -> anyhow::Result<Self> {
        let socket = TcpStream::connect(addr)
            .await
            .context("Failed to connect to peer")?;
        let peer = socket.peer_addr()?;
        log::info!("Connected to peer {}", peer);

        let (reader, mut writer) = socket.into_split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<PeerMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<PeerMessage>();
        let peer_name = peer.to_string();

        // Writer task
        {
            let wire_log = wire_log.clone();
            let peer_name = peer_name.clone();
            tokio::spawn(async move {
                while let Some(msg) = out_rx.recv().await {
                    let frame = msg.to_frame();
                    if writer.write_all(frame.as_bytes()).await.is_err()
                        || writer.write_all(b"\n").await.is_err()
                        || writer.flush().await.is_err()
                    {
                        log::warn!("Peer {} stopped accepting messages", peer_name);
                        break;
                    }
                    if let Some(log) = wire_log.as_ref() {
                        log.record(Direction::Sent, &peer_name, &frame);
                    }
                }
            });
        }

        // Reader task
        tokio::spawn(async move {
            if let Err(e) = read_frames(reader, peer, in_tx, wire_log).await {
                log::warn!("Peer {} read error: {}", peer, e);
            }
            log::info!("Peer {} disconnected", peer);
        });

        Ok(Self {
            outbound: out_tx,
            inbound: in_rx,
        })
    }

    /// Two links wired to each other in memory
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (
            Self {
                outbound: a_tx,
                inbound: b_rx,
            },
            Self {
                outbound: b_tx,
                inbound: a_rx,
            },
        )
    }

    /// Queue a message for the peer. Returns false once the link is closed.
    pub fn send(&self, msg: PeerMessage) -> bool {
        self.outbound.send(msg).is_ok()
    }

    /// Next message from the peer, `None` once the peer has gone
    pub async fn recv(&mut self) -> Option<PeerMessage> {
        self.inbound.recv().await
    }

    pub fn try_recv(&mut self) -> Option<PeerMessage> {
        self.inbound.try_recv().ok()
    }

    pub fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedSender<PeerMessage>,
        mpsc::UnboundedReceiver<PeerMessage>,
    ) {
        (self.outbound, self.inbound)
    }
}

async fn read_frames(
    reader: tokio::net::tcp::OwnedReadHalf,
    peer: SocketAddr,
    in_tx: mpsc::UnboundedSender<PeerMessage>,
    wire_log: Option<WireLog>,
) -> anyhow::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    let peer_name = peer.to_string();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }

        let raw = line.trim_end_matches(['\n', '\r']);
        if raw.trim().is_empty() {
            continue;
        }
        if let Some(log) = wire_log.as_ref() {
            log.record(Direction::Received, &peer_name, raw);
        }

        match PeerMessage::from_frame(raw) {
            Ok(msg) => {
                if in_tx.send(msg).is_err() {
                    return Ok(());
                }
            }
            Err(e) => log::warn!("Dropping message from {}: {}", peer, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_is_crossed() {
        let (mut a, mut b) = PeerLink::pair();
        assert!(a.send(PeerMessage::RequestPiece));
        assert_eq!(b.recv().await, Some(PeerMessage::RequestPiece));
        assert!(b.send(PeerMessage::Piece(4)));
        assert_eq!(a.recv().await, Some(PeerMessage::Piece(4)));
    }

    #[tokio::test]
    async fn test_closed_peer_ends_stream() {
        let (mut a, b) = PeerLink::pair();
        drop(b);
        assert_eq!(a.recv().await, None);
        assert!(!a.send(PeerMessage::Die));
    }
}
