//! Engine - runs one game on a tokio task
//!
//! The engine owns a [`core::GameState`], drives its countdown, and in
//! multiplayer connects it to a peer: piece requests and score, lives and death
//! reports go out, pieces and leaderboard answers come in. Callers talk to it
//! through an [`EngineHandle`].
//!
//! # Example
//!
//! ```no_run
//! use tetrecs_engine::{spawn_single_player, EngineCommand, EngineConfig};
//! use tetrecs_engine::types::GameAction;
//!
//! # async fn demo() {
//! let mut engine = spawn_single_player(EngineConfig::default());
//! engine.send(EngineCommand::Action(GameAction::CursorRight));
//! engine.send(EngineCommand::PlaceAt { x: 2, y: 2 });
//! while let Some(event) = engine.next_event().await {
//!     println!("{:?}", event);
//! }
//! # }
//! ```

pub mod report;
pub mod runtime;
pub mod timer;

pub use tetrecs_adapter as adapter;
pub use tetrecs_core as core;
pub use tetrecs_types as types;

pub use report::{ChannelSink, NullSink, PeerSink};
pub use runtime::{spawn_multiplayer, spawn_single_player, EngineCommand, EngineConfig, EngineHandle};
pub use timer::Countdown;
