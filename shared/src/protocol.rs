//! Message envelope codec used in both directions over the text transport
//!
//! Every message travels as one JSON object `{"type": <kind>, "data": <payload>}`.
//! `data` is absent for kinds without a payload. Decoding looks the `type` tag
//! up in the closed [`MessageKind`] registry on every call before touching the
//! payload, so an unknown kind is reported as such rather than as a parse
//! failure.

use crate::grid::GridMap;
use crate::player::PlayerState;
use crate::shape::Direction;
use crate::PlayerId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Which side of the connection originates a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    ClientToServer,
    ServerToClient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Join,
    Move,
    Rotate,
    Drop,
    SetPlayer,
    RemovePlayer,
    UpdateMap,
    GameOver,
}

impl MessageKind {
    pub const ALL: [MessageKind; 8] = [
        MessageKind::Join,
        MessageKind::Move,
        MessageKind::Rotate,
        MessageKind::Drop,
        MessageKind::SetPlayer,
        MessageKind::RemovePlayer,
        MessageKind::UpdateMap,
        MessageKind::GameOver,
    ];

    /// Tag written into the envelope's `type` field
    pub fn tag(self) -> &'static str {
        match self {
            MessageKind::Join => "Join",
            MessageKind::Move => "Move",
            MessageKind::Rotate => "Rotate",
            MessageKind::Drop => "Drop",
            MessageKind::SetPlayer => "SetPlayer",
            MessageKind::RemovePlayer => "RemovePlayer",
            MessageKind::UpdateMap => "UpdateMap",
            MessageKind::GameOver => "GameOver",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn flow(self) -> Flow {
        match self {
            MessageKind::Move | MessageKind::Rotate | MessageKind::Drop => Flow::ClientToServer,
            MessageKind::Join
            | MessageKind::SetPlayer
            | MessageKind::RemovePlayer
            | MessageKind::UpdateMap
            | MessageKind::GameOver => Flow::ServerToClient,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Tells a new connection its player id
    Join(PlayerId),
    /// Requests a horizontal move to the given column
    Move(i32),
    Rotate(Direction),
    Drop,
    /// Full state of one player after any validated change
    SetPlayer(PlayerState),
    RemovePlayer(PlayerId),
    /// Full grid contents after any grid mutation
    UpdateMap(GridMap),
    GameOver,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Join(_) => MessageKind::Join,
            Message::Move(_) => MessageKind::Move,
            Message::Rotate(_) => MessageKind::Rotate,
            Message::Drop => MessageKind::Drop,
            Message::SetPlayer(_) => MessageKind::SetPlayer,
            Message::RemovePlayer(_) => MessageKind::RemovePlayer,
            Message::UpdateMap(_) => MessageKind::UpdateMap,
            Message::GameOver => MessageKind::GameOver,
        }
    }
}

/// A client request to change its shape's placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveTo(i32),
    Rotate(Direction),
    Drop,
}

impl From<Intent> for Message {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::MoveTo(col) => Message::Move(col),
            Intent::Rotate(direction) => Message::Rotate(direction),
            Intent::Drop => Message::Drop,
        }
    }
}

impl TryFrom<Message> for Intent {
    type Error = ProtocolError;

    fn try_from(message: Message) -> Result<Self, Self::Error> {
        match message {
            Message::Move(col) => Ok(Intent::MoveTo(col)),
            Message::Rotate(direction) => Ok(Intent::Rotate(direction)),
            Message::Drop => Ok(Intent::Drop),
            other => Err(ProtocolError::NotAnIntent(other.kind())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid message envelope: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unknown message kind `{0}`")]
    UnknownKind(String),

    #[error("{0} message is missing its payload")]
    MissingPayload(MessageKind),

    #[error("malformed {kind} payload: {source}")]
    MalformedPayload {
        kind: MessageKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is not a client intent")]
    NotAnIntent(MessageKind),

    #[error("{0} is not a server notification")]
    NotANotification(MessageKind),

    #[error("binary frames are not part of the protocol")]
    BinaryFrame,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

pub fn encode(message: &Message) -> Result<String, ProtocolError> {
    let data = match message {
        Message::Join(id) | Message::RemovePlayer(id) => Some(serde_json::to_value(id)?),
        Message::Move(col) => Some(serde_json::to_value(col)?),
        Message::Rotate(direction) => Some(serde_json::to_value(direction)?),
        Message::SetPlayer(player) => Some(serde_json::to_value(player)?),
        Message::UpdateMap(grid) => Some(serde_json::to_value(grid)?),
        Message::Drop | Message::GameOver => None,
    };

    let envelope = Envelope {
        kind: message.kind().tag().to_string(),
        data,
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn decode(text: &str) -> Result<Message, ProtocolError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    let kind = MessageKind::from_tag(&envelope.kind)
        .ok_or_else(|| ProtocolError::UnknownKind(envelope.kind.clone()))?;
    let data = envelope.data;

    let message = match kind {
        MessageKind::Join => Message::Join(payload(kind, data)?),
        MessageKind::Move => Message::Move(payload(kind, data)?),
        MessageKind::Rotate => Message::Rotate(payload(kind, data)?),
        MessageKind::Drop => Message::Drop,
        MessageKind::SetPlayer => Message::SetPlayer(payload(kind, data)?),
        MessageKind::RemovePlayer => Message::RemovePlayer(payload(kind, data)?),
        MessageKind::UpdateMap => Message::UpdateMap(payload(kind, data)?),
        MessageKind::GameOver => Message::GameOver,
    };
    Ok(message)
}

fn payload<T: DeserializeOwned>(kind: MessageKind, data: Option<Value>) -> Result<T, ProtocolError> {
    let data = data.ok_or(ProtocolError::MissingPayload(kind))?;
    serde_json::from_value(data).map_err(|source| ProtocolError::MalformedPayload { kind, source })
}
