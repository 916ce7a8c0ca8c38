//! Adapter module - peer communication over a line-oriented TCP protocol
//!
//! A multiplayer game talks to exactly one peer, normally the relay server in
//! [`server`]. Messages are plain text commands, one per line:
//!
//! | Direction | Message | Meaning |
//! |-----------|---------|---------|
//! | send | `PIECE` | request one piece |
//! | recv | `PIECE <index>` | next piece, catalog index |
//! | send | `SCORE <n>` | current score |
//! | send | `LIVES <n>` | current lives |
//! | send | `DIE` | lives crossed below zero |
//! | send | `SCORES` | request the leaderboard |
//! | recv | `SCORES <records>` | `name:score:lives` per line |
//! | send | `NICK <name>` | label this player |
//!
//! # Environment Variables
//!
//! - `TETRECS_RELAY_HOST`: relay bind address (default: "127.0.0.1")
//! - `TETRECS_RELAY_PORT`: relay port (default: 7788)
//! - `TETRECS_RELAY_SEED`: seed for the shared piece sequence
//! - `TETRECS_WIRE_LOG`: append every frame to this JSON-lines file

pub mod client;
pub mod protocol;
pub mod server;
pub mod wirelog;

pub use tetrecs_core as core;
pub use tetrecs_types as types;

pub use client::PeerLink;
pub use protocol::{decode_frame, encode_frame, PeerMessage, ProtocolError};
pub use server::{run_server, Relay, ServerConfig};
pub use wirelog::{Direction, WireLog, WireRecord};
