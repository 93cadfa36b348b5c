use crate::shape::Shape;
use crate::PlayerId;
use serde::{Deserialize, Serialize};

/// Per-player state, as owned by the engine and mirrored by replicas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub shape: Option<Shape>,
    pub cleared_lines: u32,
}

impl PlayerState {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            shape: None,
            cleared_lines: 0,
        }
    }
}

/// Players keyed by id, iterated in insertion order
///
/// Iteration order decides notification order on the server and the winner
/// among tied scores on replicas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Players {
    entries: Vec<PlayerState>,
}

impl Players {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerState> {
        self.entries.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.entries.iter_mut().find(|p| p.id == id)
    }

    /// Adds `player` unless its id is already present; returns whether it was added
    pub fn insert_new(&mut self, player: PlayerState) -> bool {
        if self.contains(player.id) {
            return false;
        }
        self.entries.push(player);
        true
    }

    /// Replaces the entry with the same id in place, or appends it
    pub fn upsert(&mut self, player: PlayerState) {
        match self.position(player.id) {
            Some(index) => self.entries[index] = player,
            None => self.entries.push(player),
        }
    }

    pub fn remove(&mut self, id: PlayerId) -> Option<PlayerState> {
        self.position(id).map(|index| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerState> {
        self.entries.iter()
    }

    /// Player ids in insertion order
    pub fn ids(&self) -> Vec<PlayerId> {
        self.entries.iter().map(|p| p.id).collect()
    }

    fn position(&self, id: PlayerId) -> Option<usize> {
        self.entries.iter().position(|p| p.id == id)
    }
}
