//! Server network layer handling WebSocket connections and event loop coordination

use crate::client_manager::{ClientManager, ConnectionId};
use crate::game::{GameEngine, Outbound, Outbox};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{decode, encode, GameConfig, Intent, Message, ProtocolError};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Time between two engine steps
    pub tick_interval: Duration,
    pub max_clients: usize,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            tick_interval: Duration::from_millis(500),
            max_clients: 16,
            game: GameConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Messages sent from connection tasks and the engine to the main server loop
#[derive(Debug)]
pub enum ServerEvent {
    Connected {
        connection_id: ConnectionId,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<String>,
    },
    Intent {
        connection_id: ConnectionId,
        intent: Intent,
    },
    ProtocolViolation {
        connection_id: ConnectionId,
        error: ProtocolError,
    },
    Disconnected {
        connection_id: ConnectionId,
    },
    /// Raised by the engine's game-over hook
    SessionReset,
}

/// Main server coordinating connections and the authoritative game
///
/// The event loop is the only owner of the engine. Connection tasks never
/// touch game state; they forward decoded intents as [`ServerEvent`]s and
/// write whatever frames the loop routes to them.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    clients: ClientManager,
    engine: GameEngine<Outbox>,

    // Communication channels
    event_tx: mpsc::UnboundedSender<ServerEvent>,
    event_rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let listener =
            TcpListener::bind(&config.bind_addr)
                .await
                .map_err(|source| ServerError::Bind {
                    addr: config.bind_addr.clone(),
                    source,
                })?;
        info!("Server listening on {}", listener.local_addr()?);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut engine = GameEngine::new(config.game, Outbox::new());
        let reset_tx = event_tx.clone();
        engine.set_game_over_hook(move || {
            if reset_tx.send(ServerEvent::SessionReset).is_err() {
                warn!("Event loop gone; cannot schedule a new session");
            }
        });

        Ok(Server {
            listener,
            clients: ClientManager::new(config.max_clients),
            config,
            engine,
            event_tx,
            event_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Main server loop: accepts connections, applies events and steps the game
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let mut tick_interval = interval(self.config.tick_interval);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Skip the first tick since it fires immediately
        tick_interval.tick().await;

        info!(
            "Server started: {}x{} board, tick every {:?}",
            self.config.game.width, self.config.game.height, self.config.tick_interval
        );

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.spawn_connection(stream, addr),
                        Err(e) => error!("Accept error: {}", e),
                    }
                },

                // The server holds a sender itself, so the channel never closes
                Some(event) = self.event_rx.recv() => self.handle_event(event),

                _ = tick_interval.tick() => self.on_tick(),
            }

            self.flush();
        }
    }

    fn spawn_connection(&mut self, stream: TcpStream, addr: SocketAddr) {
        let connection_id = self.clients.allocate_connection_id();
        let events = self.event_tx.clone();
        debug!("Accepted TCP connection {} from {}", connection_id, addr);

        tokio::spawn(async move {
            if let Err(e) = serve_connection(connection_id, stream, addr, events.clone()).await {
                warn!("Connection {} from {} failed: {}", connection_id, addr, e);
            }
            if events.send(ServerEvent::Disconnected { connection_id }).is_err() {
                debug!("Server gone before connection {} closed", connection_id);
            }
        });
    }

    fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected {
                connection_id,
                addr,
                sender,
            } => self.on_connected(connection_id, addr, sender),

            ServerEvent::Intent {
                connection_id,
                intent,
            } => {
                let Some(player_id) = self.clients.player_of(connection_id) else {
                    debug!("Dropping {:?} from unregistered connection {}", intent, connection_id);
                    return;
                };
                debug!("Player {} sent {:?}", player_id, intent);
                if let Err(e) = self.engine.apply_intent(player_id, intent) {
                    warn!("Ignoring intent from player {}: {}", player_id, e);
                }
            }

            ServerEvent::ProtocolViolation {
                connection_id,
                error,
            } => {
                warn!("Closing connection {}: {}", connection_id, error);
                self.disconnect(connection_id);
            }

            ServerEvent::Disconnected { connection_id } => self.disconnect(connection_id),

            ServerEvent::SessionReset => self.reset_session(),
        }
    }

    fn on_connected(
        &mut self,
        connection_id: ConnectionId,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<String>,
    ) {
        let Some(player_id) = self.clients.add_client(connection_id, addr, sender) else {
            warn!("Server full, rejecting connection {} from {}", connection_id, addr);
            return;
        };

        self.send_to_connection(connection_id, &Message::Join(player_id));
        self.engine.sync_player(player_id);
        self.engine.introduce_player(player_id);
        self.engine.broadcast_map();
    }

    fn disconnect(&mut self, connection_id: ConnectionId) {
        if let Some(player_id) = self.clients.remove_client(connection_id) {
            self.engine.remove_player(player_id);
        }
    }

    /// Starts a new game for every connection still open
    fn reset_session(&mut self) {
        self.engine.restart();
        let assignments = self.clients.reset_session();
        info!("New session with {} player(s)", assignments.len());

        for (connection_id, player_id) in assignments {
            self.send_to_connection(connection_id, &Message::Join(player_id));
            self.engine.introduce_player(player_id);
        }
        self.engine.broadcast_map();
    }

    fn on_tick(&mut self) {
        if let Err(e) = self.engine.step() {
            error!("Tick aborted: {}", e);
        }
        self.engine.broadcast_roster();
    }

    fn send_to_connection(&self, connection_id: ConnectionId, message: &Message) {
        match encode(message) {
            Ok(frame) => {
                self.clients.send_to_connection(connection_id, &frame);
            }
            Err(e) => error!("Failed to encode {}: {}", message.kind(), e),
        }
    }

    /// Encodes every queued engine notification once and routes it
    fn flush(&mut self) {
        for outbound in self.engine.broadcaster_mut().drain() {
            let (target, message) = match outbound {
                Outbound::Broadcast(message) => (None, message),
                Outbound::To(player_id, message) => (Some(player_id), message),
            };

            let frame = match encode(&message) {
                Ok(frame) => frame,
                Err(e) => {
                    error!("Failed to encode {}: {}", message.kind(), e);
                    continue;
                }
            };

            match target {
                None => self.clients.broadcast(&frame),
                Some(player_id) => {
                    if !self.clients.send_to_player(player_id, &frame) {
                        debug!("No open connection for player {}", player_id);
                    }
                }
            }
        }
    }
}

/// Runs one WebSocket connection until it closes or violates the protocol
async fn serve_connection(
    connection_id: ConnectionId,
    stream: TcpStream,
    addr: SocketAddr,
    events: mpsc::UnboundedSender<ServerEvent>,
) -> Result<(), ServerError> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<String>();

    if events
        .send(ServerEvent::Connected {
            connection_id,
            addr,
            sender: frame_tx,
        })
        .is_err()
    {
        return Ok(());
    }

    // Ends once the event loop drops this connection's sender
    tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            if let Err(e) = ws_sender.send(WsMessage::Text(frame)).await {
                debug!("Write to connection {} failed: {}", connection_id, e);
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    while let Some(frame) = ws_receiver.next().await {
        let event = match frame? {
            WsMessage::Text(text) => match decode_intent(&text) {
                Ok(intent) => ServerEvent::Intent {
                    connection_id,
                    intent,
                },
                Err(error) => ServerEvent::ProtocolViolation {
                    connection_id,
                    error,
                },
            },
            WsMessage::Binary(_) => ServerEvent::ProtocolViolation {
                connection_id,
                error: ProtocolError::BinaryFrame,
            },
            WsMessage::Close(_) => break,
            _ => continue,
        };

        let violation = matches!(event, ServerEvent::ProtocolViolation { .. });
        if events.send(event).is_err() || violation {
            break;
        }
    }

    Ok(())
}

fn decode_intent(text: &str) -> Result<Intent, ProtocolError> {
    Intent::try_from(decode(text)?)
}
