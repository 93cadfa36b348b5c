use crate::game::ClientReplica;
use crate::input::{parse_command, Command, HELP};
use crate::rendering::Renderer;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{encode, GameConfig, Intent, Message, ProtocolError};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Client {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    replica: ClientReplica,
    renderer: Renderer,
}

impl Client {
    pub async fn new(url: &str, config: GameConfig) -> Result<Self, ClientError> {
        info!("Connecting to {}...", url);
        let (socket, _) = connect_async(url).await?;
        info!("Connected");

        Ok(Client {
            socket,
            replica: ClientReplica::new(config),
            renderer: Renderer::new(true),
        })
    }

    pub fn replica(&self) -> &ClientReplica {
        &self.replica
    }

    async fn send_intent(&mut self, intent: Intent) -> Result<(), ClientError> {
        let frame = encode(&Message::from(intent))?;
        debug!("Sending {}", frame);
        self.socket.send(WsMessage::Text(frame)).await?;
        Ok(())
    }

    /// Applies one server frame and prints the result
    fn handle_frame(&mut self, frame: &str) -> Result<(), ClientError> {
        let own_id = self.replica.own_id();
        match self.replica.apply_frame(frame)? {
            Some(outcome) => print!("{}", self.renderer.render_outcome(&outcome, own_id)),
            None => print!("{}", self.renderer.render(&self.replica, self.replica.own_id())),
        }
        Ok(())
    }

    /// Returns false once the player asked to quit
    async fn handle_line(&mut self, line: &str) -> Result<bool, ClientError> {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                println!("{} ({})", e, HELP);
                return Ok(true);
            }
        };

        if command == Command::Quit {
            return Ok(false);
        }

        match command.to_intent(self.replica.own_shape()) {
            Some(intent) => self.send_intent(intent).await?,
            None => warn!("No falling shape to move yet"),
        }
        Ok(true)
    }

    pub async fn run(&mut self) -> Result<(), ClientError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{}", HELP);

        loop {
            tokio::select! {
                frame = self.socket.next() => {
                    match frame {
                        Some(Ok(WsMessage::Text(text))) => self.handle_frame(&text)?,
                        Some(Ok(WsMessage::Close(_))) | None => {
                            info!("Server closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("Connection error: {}", e);
                            return Err(e.into());
                        }
                    }
                },

                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if !self.handle_line(&line).await? {
                                break;
                            }
                        }
                        None => break,
                    }
                },
            }
        }

        let _ = self.socket.close(None).await;
        Ok(())
    }
}
