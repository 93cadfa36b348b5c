//! # Game Server Library
//!
//! This library provides the authoritative server for the multiplayer
//! falling-block game. It owns the only writable copy of the grid and of every
//! player's state, validates every client intent against it, and broadcasts
//! each accepted change so that client replicas converge on the same view.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! All placement, grounding and line clearing decisions are made here. Clients
//! only send intents (move, rotate, drop) and never mutate state themselves.
//!
//! ### Client Management
//! Handles the lifecycle of WebSocket connections:
//! - Player id assignment on connect, restarting from 0 every session
//! - Routing of encoded notifications to one or all connections
//! - Closing connections that violate the protocol
//!
//! ### State Broadcasting
//! Every accepted change produces a full-state notification (SetPlayer or
//! UpdateMap). A full roster resync follows every tick.
//!
//! ## Architecture Design
//!
//! ### Single-Writer Event Loop
//! One loop owns the engine and serializes connection events and ticks with
//! `tokio::select!`. Each event runs to completion before the next one is
//! observed, so an operation never sees a half-applied state.
//!
//! ### Outbox Broadcasting
//! The engine writes its notifications into an outbox. The loop drains it
//! after every event, encodes each message once and hands the frames to
//! per-connection writer tasks.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! - Connection registry in connection order
//! - Session-scoped player ids and their reassignment on game over
//! - Frame routing to writer tasks
//!
//! ### Game Module (`game`)
//! - Grid, roster and game phase
//! - Intent handling, tick stepping, drops and line clearing
//! - Game over detection and the reset hook
//!
//! ### Network Module (`network`)
//! - WebSocket accept, reader and writer tasks
//! - The event loop and tick timer
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         bind_addr: "127.0.0.1:8080".to_string(),
//!         tick_interval: Duration::from_millis(500),
//!         ..ServerConfig::default()
//!     };
//!
//!     let mut server = Server::new(config).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod game;
pub mod network;
