//! Connection registry and outbound frame routing for the game server
//!
//! This module tracks every live WebSocket connection together with the
//! player id it currently plays as. Connection ids are never reused for the
//! lifetime of the process, while player ids restart from 0 whenever a game
//! over starts a new session. Routing by player id therefore always resolves
//! against the current session.
//!
//! Frames are handed to each connection's writer task through an unbounded
//! channel, so routing never blocks the event loop on a slow socket.

use log::{debug, info};
use shared::PlayerId;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Process-unique identifier of one WebSocket connection
pub type ConnectionId = u64;

/// A live connection and the player it currently controls
#[derive(Debug)]
pub struct Client {
    pub connection_id: ConnectionId,
    pub addr: SocketAddr,
    pub player_id: PlayerId,
    sender: mpsc::UnboundedSender<String>,
}

impl Client {
    pub fn new(
        connection_id: ConnectionId,
        addr: SocketAddr,
        player_id: PlayerId,
        sender: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            connection_id,
            addr,
            player_id,
            sender,
        }
    }

    /// Queues an encoded frame for the writer task
    ///
    /// Returns false if the writer task has already gone away.
    pub fn send(&self, frame: &str) -> bool {
        self.sender.send(frame.to_owned()).is_ok()
    }
}

/// Manages all connected clients in connection order
///
/// Connection order decides how player ids are handed out again when a new
/// session starts.
pub struct ClientManager {
    clients: Vec<Client>,
    next_connection_id: ConnectionId,
    next_player_id: PlayerId,
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: Vec::new(),
            next_connection_id: 1,
            next_player_id: 0,
            max_clients,
        }
    }

    /// Reserves the id for a connection that has just been accepted
    pub fn allocate_connection_id(&mut self) -> ConnectionId {
        let id = self.next_connection_id;
        self.next_connection_id += 1;
        id
    }

    /// Registers a connection and assigns it the next player id of the session
    ///
    /// Returns `None` if the server is at capacity. Dropping the sender in that
    /// case lets the writer task close the socket.
    pub fn add_client(
        &mut self,
        connection_id: ConnectionId,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<String>,
    ) -> Option<PlayerId> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let player_id = self.next_player_id;
        self.next_player_id += 1;

        info!(
            "Connection {} from {} plays as player {}",
            connection_id, addr, player_id
        );
        self.clients
            .push(Client::new(connection_id, addr, player_id, sender));
        Some(player_id)
    }

    /// Removes a connection, returning the player it controlled
    pub fn remove_client(&mut self, connection_id: ConnectionId) -> Option<PlayerId> {
        let index = self
            .clients
            .iter()
            .position(|c| c.connection_id == connection_id)?;
        let client = self.clients.remove(index);
        info!(
            "Connection {} from {} closed (player {})",
            client.connection_id, client.addr, client.player_id
        );
        Some(client.player_id)
    }

    pub fn player_of(&self, connection_id: ConnectionId) -> Option<PlayerId> {
        self.clients
            .iter()
            .find(|c| c.connection_id == connection_id)
            .map(|c| c.player_id)
    }

    /// Hands out player ids again from 0, in connection order
    ///
    /// Returns the new `(connection, player)` assignments.
    pub fn reset_session(&mut self) -> Vec<(ConnectionId, PlayerId)> {
        self.next_player_id = 0;
        let mut assignments = Vec::with_capacity(self.clients.len());
        for client in &mut self.clients {
            client.player_id = self.next_player_id;
            self.next_player_id += 1;
            assignments.push((client.connection_id, client.player_id));
        }
        assignments
    }

    pub fn broadcast(&self, frame: &str) {
        for client in &self.clients {
            if !client.send(frame) {
                debug!("Writer for connection {} already closed", client.connection_id);
            }
        }
    }

    pub fn send_to_player(&self, player_id: PlayerId, frame: &str) -> bool {
        self.clients
            .iter()
            .find(|c| c.player_id == player_id)
            .map_or(false, |c| c.send(frame))
    }

    pub fn send_to_connection(&self, connection_id: ConnectionId, frame: &str) -> bool {
        self.clients
            .iter()
            .find(|c| c.connection_id == connection_id)
            .map_or(false, |c| c.send(frame))
    }

    /// Current player ids in connection order
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.clients.iter().map(|c| c.player_id).collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn connect(
        manager: &mut ClientManager,
    ) -> (ConnectionId, Option<PlayerId>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = manager.allocate_connection_id();
        let player_id = manager.add_client(connection_id, test_addr(), tx);
        (connection_id, player_id, rx)
    }

    #[test]
    fn test_player_ids_start_at_zero() {
        let mut manager = ClientManager::new(4);
        let (c1, p1, _rx1) = connect(&mut manager);
        let (c2, p2, _rx2) = connect(&mut manager);

        assert_eq!((p1, p2), (Some(0), Some(1)));
        assert_ne!(c1, c2);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.player_of(c2), Some(1));
    }

    #[test]
    fn test_max_capacity() {
        let mut manager = ClientManager::new(1);
        let (_, first, _rx1) = connect(&mut manager);
        let (rejected, second, _rx2) = connect(&mut manager);

        assert_eq!(first, Some(0));
        assert_eq!(second, None);
        assert_eq!(manager.player_of(rejected), None);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_remove_client() {
        let mut manager = ClientManager::new(4);
        let (c1, _, _rx1) = connect(&mut manager);

        assert_eq!(manager.remove_client(c1), Some(0));
        assert_eq!(manager.remove_client(c1), None);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_player_ids_not_reused_within_session() {
        let mut manager = ClientManager::new(4);
        let (c1, _, _rx1) = connect(&mut manager);
        manager.remove_client(c1);
        let (_, p2, _rx2) = connect(&mut manager);

        assert_eq!(p2, Some(1));
    }

    #[test]
    fn test_reset_session_follows_connection_order() {
        let mut manager = ClientManager::new(4);
        let (c1, _, _rx1) = connect(&mut manager);
        let (c2, _, _rx2) = connect(&mut manager);
        let (c3, _, _rx3) = connect(&mut manager);
        manager.remove_client(c1);

        let assignments = manager.reset_session();
        assert_eq!(assignments, vec![(c2, 0), (c3, 1)]);
        assert_eq!(manager.player_ids(), vec![0, 1]);

        let (c4, p4, _rx4) = connect(&mut manager);
        assert_eq!(p4, Some(2));
        assert!(c4 > c3);
    }

    #[test]
    fn test_routing() {
        let mut manager = ClientManager::new(4);
        let (c1, _, mut rx1) = connect(&mut manager);
        let (_, _, mut rx2) = connect(&mut manager);

        manager.broadcast("all");
        assert!(manager.send_to_player(1, "second"));
        assert!(manager.send_to_connection(c1, "first"));
        assert!(!manager.send_to_player(7, "nobody"));

        assert_eq!(rx1.try_recv().unwrap(), "all");
        assert_eq!(rx1.try_recv().unwrap(), "first");
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), "all");
        assert_eq!(rx2.try_recv().unwrap(), "second");
    }

    #[test]
    fn test_send_after_writer_closed() {
        let mut manager = ClientManager::new(4);
        let (c1, _, rx1) = connect(&mut manager);
        drop(rx1);

        assert!(!manager.send_to_connection(c1, "lost"));
        manager.broadcast("lost");
    }
}
