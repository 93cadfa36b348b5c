use shared::{GameOutcome, GameView, PlayerId};
use std::fmt::Write;

const EMPTY: char = '.';
const OWN_SHAPE: char = '@';
const OTHER_SHAPE: char = '#';

/// Renders a game view as plain text, one line per grid row
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    show_scores: bool,
}

impl Renderer {
    pub fn new(show_scores: bool) -> Self {
        Self { show_scores }
    }

    pub fn render(&self, view: &impl GameView, own_id: Option<PlayerId>) -> String {
        let grid = view.grid();
        let mut canvas: Vec<Vec<char>> = grid
            .rows()
            .iter()
            .map(|row| row.iter().map(|cell| cell.map_or(EMPTY, owner_glyph)).collect())
            .collect();

        for shape in view.shapes() {
            let glyph = if Some(shape.player_id) == own_id {
                OWN_SHAPE
            } else {
                OTHER_SHAPE
            };
            for (row, col) in shape.cells() {
                // Cells above the top edge are not drawn
                if row < 0 || col < 0 {
                    continue;
                }
                if let Some(cell) = canvas
                    .get_mut(row as usize)
                    .and_then(|r| r.get_mut(col as usize))
                {
                    *cell = glyph;
                }
            }
        }

        let mut out = String::new();
        for row in canvas {
            out.extend(row);
            out.push('\n');
        }

        if self.show_scores {
            out.push_str(&self.render_scores(&view.total_scores(), own_id));
        }
        out
    }

    fn render_scores(&self, scores: &[(PlayerId, i64)], own_id: Option<PlayerId>) -> String {
        let mut line = String::from("scores:");
        for &(id, score) in scores {
            let marker = if Some(id) == own_id { "*" } else { "" };
            let _ = write!(line, " {}{}={}", id, marker, score);
        }
        line.push('\n');
        line
    }

    pub fn render_outcome(&self, outcome: &GameOutcome, own_id: Option<PlayerId>) -> String {
        let mut out = String::from("GAME OVER\n");
        match outcome.winner {
            Some((id, score)) if Some(id) == own_id => {
                let _ = writeln!(out, "You win with {} points!", score);
            }
            Some((id, score)) => {
                let _ = writeln!(out, "Player {} wins with {} points", id, score);
            }
            None => out.push_str("No players left\n"),
        }
        out.push_str(&self.render_scores(&outcome.scores, own_id));
        out
    }
}

/// Last decimal digit of the owner id
fn owner_glyph(owner: PlayerId) -> char {
    char::from_digit(owner % 10, 10).unwrap_or('?')
}
