//! # Shared Game Model
//!
//! Types used by both the authoritative server and client replicas: the
//! falling shape model, the placed-cell grid, per-player state, scoring and
//! the wire protocol. Keeping them in one crate guarantees that the server
//! and every replica validate placements and compute scores identically.
//!
//! ## Module Organization
//!
//! - `shape`: shape kinds, rotations and occupied-cell geometry
//! - `grid`: collision tests, grounding and line clearing
//! - `player`: per-player state and the insertion-ordered roster
//! - `scoring`: score formula, winner selection and the `GameView` trait
//! - `protocol`: message kinds, intents and the JSON envelope codec
//! - `config`: board dimensions and points per line

pub mod config;
pub mod grid;
pub mod player;
pub mod protocol;
pub mod scoring;
pub mod shape;

/// Session-scoped player identifier, reassigned from 0 after every game over
pub type PlayerId = u32;

pub use config::{ConfigError, GameConfig};
pub use grid::{Cell, GridError, GridMap};
pub use player::{PlayerState, Players};
pub use protocol::{decode, encode, Intent, Message, MessageKind, ProtocolError};
pub use scoring::{GameOutcome, GameView};
pub use shape::{Direction, Rotation, Shape, ShapeKind};
