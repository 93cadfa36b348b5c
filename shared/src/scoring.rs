//! Score computation and the read-only view shared by the engine and replicas

use crate::grid::GridMap;
use crate::player::Players;
use crate::shape::Shape;
use crate::PlayerId;

/// `cleared_lines × points_per_line − owned_blocks`; negative when blocks outweigh lines
pub fn score(cleared_lines: u32, owned_blocks: usize, points_per_line: u32) -> i64 {
    i64::from(cleared_lines) * i64::from(points_per_line) - owned_blocks as i64
}

/// Scores of every player in `players`, in insertion order
pub fn total_scores(players: &Players, grid: &GridMap, points_per_line: u32) -> Vec<(PlayerId, i64)> {
    let blocks = grid.blocks_per_player();
    players
        .iter()
        .map(|p| {
            let owned = blocks.get(&p.id).copied().unwrap_or(0);
            (p.id, score(p.cleared_lines, owned, points_per_line))
        })
        .collect()
}

/// Highest score; the earliest entry wins among equals
pub fn winner(scores: &[(PlayerId, i64)]) -> Option<(PlayerId, i64)> {
    let mut best: Option<(PlayerId, i64)> = None;
    for &(id, score) in scores {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((id, score)),
        }
    }
    best
}

/// Final standings handed to the presentation layer at game over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: Option<(PlayerId, i64)>,
    pub scores: Vec<(PlayerId, i64)>,
}

impl GameOutcome {
    pub fn from_scores(scores: Vec<(PlayerId, i64)>) -> Self {
        Self {
            winner: winner(&scores),
            scores,
        }
    }
}

/// Read accessors common to the authoritative engine and client replicas
pub trait GameView {
    fn grid(&self) -> &GridMap;

    fn players(&self) -> &Players;

    fn points_per_line(&self) -> u32;

    fn shape(&self, id: PlayerId) -> Option<&Shape> {
        self.players().get(id).and_then(|p| p.shape.as_ref())
    }

    /// Every falling shape, in player insertion order
    fn shapes(&self) -> Vec<Shape> {
        self.players().iter().filter_map(|p| p.shape).collect()
    }

    fn total_scores(&self) -> Vec<(PlayerId, i64)> {
        total_scores(self.players(), self.grid(), self.points_per_line())
    }
}
