//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`]. Kept free of
//! any UI framework so the same mapping serves any terminal front end.

pub mod map;

pub use tetrecs_types as types;

pub use map::{handle_key_event, should_quit};
