//! Piece sources - where the next piece comes from
//!
//! A single-player game draws locally ([`crate::rng::LocalPieces`]). A
//! multiplayer game is fed by its peer: [`RemotePieces`] buffers the pieces the
//! peer pushes and keeps a credit count of requests still in flight, so it only
//! asks for as many as are needed to get back to a full buffer.

use std::collections::VecDeque;

use crate::pieces::Piece;
use crate::types::{BOOTSTRAP_THRESHOLD, PIECE_LOW_WATERMARK, PIECE_REQUEST_BATCH};

/// Capability the game state uses to obtain pieces
pub trait PieceSource {
    /// Pop the next piece, if one is available
    fn next_piece(&mut self) -> Option<Piece>;

    /// Whether the first deal may happen
    fn is_ready(&self) -> bool;

    /// Pieces to request from a peer when the game starts
    fn initial_requests(&mut self) -> u32 {
        0
    }

    /// Pieces to request after consuming one
    fn top_up(&mut self) -> u32 {
        0
    }

    /// Buffer a peer-supplied piece.
    ///
    /// Returns true exactly once: on the arrival that opens the bootstrap gate.
    fn accept(&mut self, _piece: Piece) -> bool {
        false
    }

    /// Account for a peer answer that carried no usable piece.
    ///
    /// Returns how many pieces to request in its place.
    fn reject(&mut self) -> u32 {
        0
    }

    /// Pieces currently buffered
    fn buffered(&self) -> usize {
        0
    }
}

/// Peer-fed FIFO piece queue
#[derive(Debug, Clone)]
pub struct RemotePieces {
    queue: VecDeque<Piece>,
    /// Requests sent but not yet answered
    outstanding: u32,
    /// Buffer size a top-up aims for
    target: u32,
    low_watermark: usize,
    threshold: usize,
    bootstrapped: bool,
}

impl RemotePieces {
    pub fn new() -> Self {
        Self::with_limits(
            PIECE_REQUEST_BATCH,
            PIECE_LOW_WATERMARK,
            BOOTSTRAP_THRESHOLD,
        )
    }

    /// Custom buffer target, top-up watermark and bootstrap threshold
    pub fn with_limits(target: u32, low_watermark: usize, threshold: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(target as usize),
            outstanding: 0,
            target,
            low_watermark,
            threshold,
            bootstrapped: false,
        }
    }

    pub fn outstanding(&self) -> u32 {
        self.outstanding
    }

    pub fn bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    fn request_up_to_target(&mut self) -> u32 {
        let have = self.queue.len() as u32 + self.outstanding;
        let wanted = self.target.saturating_sub(have);
        self.outstanding += wanted;
        wanted
    }
}

impl Default for RemotePieces {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceSource for RemotePieces {
    fn next_piece(&mut self) -> Option<Piece> {
        self.queue.pop_front()
    }

    fn is_ready(&self) -> bool {
        self.bootstrapped
    }

    fn initial_requests(&mut self) -> u32 {
        self.request_up_to_target()
    }

    fn top_up(&mut self) -> u32 {
        let have = self.queue.len() + self.outstanding as usize;
        if have >= self.low_watermark {
            return 0;
        }
        let requested = self.request_up_to_target();
        log::info!(
            "Piece buffer low ({} queued, {} in flight), requesting {} more",
            self.queue.len(),
            self.outstanding - requested,
            requested
        );
        requested
    }

    fn accept(&mut self, piece: Piece) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.queue.push_back(piece);

        if !self.bootstrapped && self.queue.len() > self.threshold {
            self.bootstrapped = true;
            return true;
        }
        false
    }

    fn reject(&mut self) -> u32 {
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.bootstrapped {
            self.top_up()
        } else {
            // The gate needs a full batch; ask again for the lost piece.
            self.request_up_to_target()
        }
    }

    fn buffered(&self) -> usize {
        self.queue.len()
    }
}
