use log::{debug, info};
use shared::{
    decode, GameConfig, GameOutcome, GameView, GridMap, Message, PlayerId, Players, ProtocolError,
    Shape,
};

/// Passive mirror of the authoritative game
///
/// Changes only by applying server notifications in arrival order. Shares
/// [`GameView`] with the engine, so scores are computed by the same code on
/// both sides.
#[derive(Debug, Clone)]
pub struct ClientReplica {
    grid: GridMap,
    players: Players,
    points_per_line: u32,
    own_id: Option<PlayerId>,
}

impl ClientReplica {
    pub fn new(config: GameConfig) -> Self {
        Self {
            grid: GridMap::new(config.width, config.height),
            players: Players::new(),
            points_per_line: config.points_per_line,
            own_id: None,
        }
    }

    /// Player id assigned by the last Join, if any
    pub fn own_id(&self) -> Option<PlayerId> {
        self.own_id
    }

    pub fn own_shape(&self) -> Option<&Shape> {
        self.own_id.and_then(|id| self.shape(id))
    }

    /// Decodes one text frame and applies it
    pub fn apply_frame(&mut self, frame: &str) -> Result<Option<GameOutcome>, ProtocolError> {
        self.on_message(decode(frame)?)
    }

    /// Applies one server notification
    ///
    /// Returns the final standings when the message is GameOver; the replica
    /// is empty afterwards and waits for the next Join. Client intents are
    /// rejected without touching the mirror.
    pub fn on_message(&mut self, message: Message) -> Result<Option<GameOutcome>, ProtocolError> {
        match message {
            Message::Join(id) => {
                info!("Joined as player {}", id);
                self.own_id = Some(id);
            }
            Message::SetPlayer(player) => self.players.upsert(player),
            Message::RemovePlayer(id) => {
                if self.players.remove(id).is_none() {
                    debug!("RemovePlayer for unknown player {}", id);
                }
            }
            Message::UpdateMap(grid) => self.grid = grid,
            Message::GameOver => {
                let outcome = GameOutcome::from_scores(self.total_scores());
                info!("Game over, winner: {:?}", outcome.winner);
                self.players.clear();
                self.grid.reset();
                self.own_id = None;
                return Ok(Some(outcome));
            }
            intent @ (Message::Move(_) | Message::Rotate(_) | Message::Drop) => {
                return Err(ProtocolError::NotANotification(intent.kind()));
            }
        }
        Ok(None)
    }
}

impl GameView for ClientReplica {
    fn grid(&self) -> &GridMap {
        &self.grid
    }

    fn players(&self) -> &Players {
        &self.players
    }

    fn points_per_line(&self) -> u32 {
        self.points_per_line
    }
}
