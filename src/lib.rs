//! TetrECS (workspace facade crate).
//!
//! Re-exports the member crates under `tetrecs::{core,adapter,engine,input,types}`
//! so applications and integration tests depend on one package.

pub use tetrecs_adapter as adapter;
pub use tetrecs_core as core;
pub use tetrecs_engine as engine;
pub use tetrecs_input as input;
pub use tetrecs_types as types;
