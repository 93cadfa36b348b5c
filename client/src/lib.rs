//! # Game Client Library
//!
//! Client side of the multiplayer falling-block game. The client never
//! decides anything about the game: it sends intents typed by the player and
//! mirrors whatever the server broadcasts.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! `ClientReplica`, the passive mirror of the grid and of every player. It
//! changes only by applying server notifications in arrival order and
//! computes the final standings on game over with the same scoring code as
//! the server.
//!
//! ### Input Module (`input`)
//! Parses text commands (`m <col>`, `<`, `>`, `l`, `r`, `d`, `q`) and turns
//! them into intents.
//!
//! ### Network Module (`network`)
//! WebSocket connection to the server, multiplexing server frames and stdin
//! lines on one task.
//!
//! ### Rendering Module (`rendering`)
//! Plain text view of the mirror: `@` for the own falling shape, `#` for the
//! others, the owner's last digit for grounded cells.
//!
//! ## Usage Example
//!
//! ```rust
//! use client::game::ClientReplica;
//! use client::rendering::Renderer;
//! use shared::GameConfig;
//!
//! let mut replica = ClientReplica::new(GameConfig::default());
//! replica.apply_frame(r#"{"type":"Join","data":0}"#).unwrap();
//!
//! let board = Renderer::new(false).render(&replica, replica.own_id());
//! assert_eq!(board.lines().count(), 20);
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
