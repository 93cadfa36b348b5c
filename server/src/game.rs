//! Authoritative game state and the tick/intent state machine
//!
//! The engine owns the only writable copy of the grid and of every player's
//! state. Each operation validates against the grid before mutating, runs to
//! completion, and reports every accepted change through its [`Broadcaster`].

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{
    Direction, GameConfig, GameView, GridError, GridMap, Intent, Message, PlayerId, PlayerState,
    Players, Shape,
};
use thiserror::Error;

/// Fire-and-forget sink for outbound notifications
pub trait Broadcaster {
    /// Sends `message` to every connected player
    fn send(&mut self, message: Message);

    /// Sends `message` to a single player
    fn send_to(&mut self, id: PlayerId, message: Message);
}

/// One queued notification and its destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Broadcast(Message),
    To(PlayerId, Message),
}

/// Broadcaster that queues notifications until the event loop drains them
#[derive(Debug, Default)]
pub struct Outbox {
    queue: Vec<Outbound>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every queued notification, oldest first
    pub fn drain(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Broadcaster for Outbox {
    fn send(&mut self, message: Message) {
        self.queue.push(Outbound::Broadcast(message));
    }

    fn send_to(&mut self, id: PlayerId, message: Message) {
        self.queue.push(Outbound::To(id, message));
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("player {0} is not in the game")]
    UnknownPlayer(PlayerId),

    #[error("player {0} has no falling shape")]
    NoShape(PlayerId),

    #[error("grid invariant violated: {0}")]
    Grid(#[from] GridError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    /// Entered on game over; left only through [`GameEngine::restart`]
    Over,
}

/// Callback run once per game over, after all state has been cleared
pub type GameOverHook = Box<dyn FnMut() + Send + Sync>;

pub struct GameEngine<B: Broadcaster> {
    config: GameConfig,
    grid: GridMap,
    players: Players,
    phase: Phase,
    broadcaster: B,
    rng: StdRng,
    on_game_over: Option<GameOverHook>,
}

impl<B: Broadcaster> GameEngine<B> {
    pub fn new(config: GameConfig, broadcaster: B) -> Self {
        Self::with_rng(config, broadcaster, StdRng::from_entropy())
    }

    pub fn with_rng(config: GameConfig, broadcaster: B, rng: StdRng) -> Self {
        Self {
            config,
            grid: GridMap::new(config.width, config.height),
            players: Players::new(),
            phase: Phase::Active,
            broadcaster,
            rng,
            on_game_over: None,
        }
    }

    pub fn set_game_over_hook(&mut self, hook: impl FnMut() + Send + Sync + 'static) {
        self.on_game_over = Some(Box::new(hook));
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    pub fn broadcaster_mut(&mut self) -> &mut B {
        &mut self.broadcaster
    }

    /// Score of one player, `None` if unknown
    pub fn score(&self, id: PlayerId) -> Option<i64> {
        let player = self.players.get(id)?;
        let owned = self.grid.blocks_per_player().get(&id).copied().unwrap_or(0);
        Some(shared::scoring::score(
            player.cleared_lines,
            owned,
            self.config.points_per_line,
        ))
    }

    /// Adds a player and spawns its first shape; no-op if the id is already present
    pub fn introduce_player(&mut self, id: PlayerId) {
        if self.phase == Phase::Over {
            warn!("Ignoring player {} joining a finished game", id);
            return;
        }

        if !self.players.insert_new(PlayerState::new(id)) {
            debug!("Player {} already in the game", id);
            return;
        }

        info!("Player {} joined", id);
        if let Err(e) = self.add_new_shape(id) {
            warn!("Could not spawn a shape for player {}: {}", id, e);
        }
    }

    pub fn remove_player(&mut self, id: PlayerId) {
        if self.players.remove(id).is_some() {
            info!("Player {} left", id);
            self.broadcaster.send(Message::RemovePlayer(id));
        }
    }

    /// Applies one client intent
    ///
    /// Moves and rotations that would collide are silently rejected. An error
    /// means the intent referenced state that does not exist; engine state is
    /// unchanged in that case.
    pub fn apply_intent(&mut self, id: PlayerId, intent: Intent) -> Result<(), EngineError> {
        if self.phase == Phase::Over {
            debug!("Ignoring {:?} from player {} after game over", intent, id);
            return Ok(());
        }

        match intent {
            Intent::MoveTo(col) => self.move_shape(id, col),
            Intent::Rotate(direction) => self.rotate_shape(id, direction),
            Intent::Drop => {
                let shape = self.falling_shape(id)?;
                self.resolve_drop(id, shape)
            }
        }
    }

    /// Advances every falling shape by one row
    ///
    /// Shapes that cannot descend are dropped after all players have been
    /// scanned. A marked shape that an earlier drop in the same tick already
    /// replaced is skipped.
    pub fn step(&mut self) -> Result<(), EngineError> {
        if self.phase == Phase::Over {
            return Ok(());
        }

        let mut to_ground = Vec::new();
        for id in self.players.ids() {
            let Some(shape) = self.players.get(id).and_then(|p| p.shape) else {
                continue;
            };

            if self
                .grid
                .fits_at(&shape, shape.row + 1, shape.col, shape.rotation)
            {
                self.update_shape(id, Shape { row: shape.row + 1, ..shape });
            } else {
                to_ground.push((id, shape));
            }
        }

        for (id, marked) in to_ground {
            if self.phase == Phase::Over {
                break;
            }

            match self.players.get(id).and_then(|p| p.shape) {
                Some(current) if current == marked && self.grid.fits(&current) => {
                    self.resolve_drop(id, current)?;
                }
                _ => debug!("Shape of player {} already resolved this tick", id),
            }
        }
        Ok(())
    }

    /// Ends the game for everyone: announces it, clears all state and runs the hook
    pub fn game_over(&mut self) {
        info!("Game over");
        self.phase = Phase::Over;
        self.broadcaster.send(Message::GameOver);
        self.players.clear();
        self.grid.reset();

        if let Some(hook) = self.on_game_over.as_mut() {
            hook();
        }
    }

    /// Starts a fresh session after a game over
    pub fn restart(&mut self) {
        self.players.clear();
        self.grid.reset();
        self.phase = Phase::Active;
        info!("New game started");
    }

    pub fn broadcast_map(&mut self) {
        self.broadcaster.send(Message::UpdateMap(self.grid.clone()));
    }

    /// Re-announces every player's full state to everyone
    pub fn broadcast_roster(&mut self) {
        for player in self.players.iter() {
            self.broadcaster.send(Message::SetPlayer(player.clone()));
        }
    }

    /// Sends every player's state to one player only
    ///
    /// Called for a newcomer before it is introduced, so its mirror lists
    /// players in the same order as the engine.
    pub fn sync_player(&mut self, id: PlayerId) {
        for player in self.players.iter() {
            self.broadcaster
                .send_to(id, Message::SetPlayer(player.clone()));
        }
    }

    fn falling_shape(&self, id: PlayerId) -> Result<Shape, EngineError> {
        let player = self.players.get(id).ok_or(EngineError::UnknownPlayer(id))?;
        player.shape.ok_or(EngineError::NoShape(id))
    }

    fn move_shape(&mut self, id: PlayerId, col: i32) -> Result<(), EngineError> {
        let shape = self.falling_shape(id)?;
        if self.grid.fits_at(&shape, shape.row, col, shape.rotation) {
            self.update_shape(id, Shape { col, ..shape });
        } else {
            debug!("Rejected move of player {} to column {}", id, col);
        }
        Ok(())
    }

    fn rotate_shape(&mut self, id: PlayerId, direction: Direction) -> Result<(), EngineError> {
        let shape = self.falling_shape(id)?;
        let rotation = shape.rotation.turned(direction);
        if self.grid.fits_at(&shape, shape.row, shape.col, rotation) {
            self.update_shape(id, Shape { rotation, ..shape });
        } else {
            debug!("Rejected {:?} rotation of player {}", direction, id);
        }
        Ok(())
    }

    fn update_shape(&mut self, id: PlayerId, shape: Shape) {
        if let Some(player) = self.players.get_mut(id) {
            player.shape = Some(shape);
            self.broadcaster.send(Message::SetPlayer(player.clone()));
        }
    }

    /// Drops `shape`, clears rows, then replaces the dropped shape and any
    /// other shape the cleared rows shifted blocks into
    fn resolve_drop(&mut self, id: PlayerId, mut shape: Shape) -> Result<(), EngineError> {
        match self.grid.drop_shape(&mut shape) {
            Ok(_) => {}
            // Resting with cells still above row 0: the stack reached the top
            Err(GridError::OutOfBounds { row, .. }) if row < 0 => {
                info!("Player {} topped out", id);
                self.game_over();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let cleared = self.grid.clear_full_rows();
        if let Some(player) = self.players.get_mut(id) {
            player.cleared_lines += cleared as u32;
        }
        if cleared > 0 {
            info!("Player {} cleared {} row(s)", id, cleared);
        }
        self.broadcast_map();

        self.add_new_shape(id)?;

        for other in self.players.ids() {
            if self.phase == Phase::Over {
                break;
            }
            if other == id {
                continue;
            }

            let overlapping = self
                .players
                .get(other)
                .and_then(|p| p.shape)
                .map_or(false, |s| !self.grid.fits(&s));
            if overlapping {
                debug!("Replacing shape of player {} buried by cleared rows", other);
                self.add_new_shape(other)?;
            }
        }
        Ok(())
    }

    /// Gives `id` a fresh random shape at the spawn point; ends the game if it
    /// does not fit
    fn add_new_shape(&mut self, id: PlayerId) -> Result<(), EngineError> {
        let shape = Shape::random(&mut self.rng, id, self.config.width);
        let player = self
            .players
            .get_mut(id)
            .ok_or(EngineError::UnknownPlayer(id))?;
        player.shape = Some(shape);
        self.broadcaster.send(Message::SetPlayer(player.clone()));

        if !self.grid.fits(&shape) {
            self.game_over();
        }
        Ok(())
    }
}

impl<B: Broadcaster> GameView for GameEngine<B> {
    fn grid(&self) -> &GridMap {
        &self.grid
    }

    fn players(&self) -> &Players {
        &self.players
    }

    fn points_per_line(&self) -> u32 {
        self.config.points_per_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{decode, MessageKind, Rotation, ShapeKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const GHOST: PlayerId = 99;

    fn engine() -> GameEngine<Outbox> {
        GameEngine::with_rng(GameConfig::default(), Outbox::new(), StdRng::seed_from_u64(1))
    }

    fn rotation(value: u8) -> Rotation {
        Rotation::try_from(value).unwrap()
    }

    fn set_shape(engine: &mut GameEngine<Outbox>, id: PlayerId, kind: ShapeKind, col: i32, row: i32, rot: u8) {
        let shape = Shape::new(kind, id, col, row, rotation(rot));
        engine.players.get_mut(id).unwrap().shape = Some(shape);
    }

    fn drain(engine: &mut GameEngine<Outbox>) -> Vec<Outbound> {
        engine.broadcaster_mut().drain()
    }

    fn kinds(outbound: &[Outbound]) -> Vec<MessageKind> {
        outbound
            .iter()
            .map(|o| match o {
                Outbound::Broadcast(m) | Outbound::To(_, m) => m.kind(),
            })
            .collect()
    }

    fn fill_row(engine: &mut GameEngine<Outbox>, row: usize, cols: impl IntoIterator<Item = usize>, owner: PlayerId) {
        for col in cols {
            engine.grid.place(row, col, owner).unwrap();
        }
    }

    #[test]
    fn test_introduce_assigns_spawn_shape() {
        let mut engine = engine();
        engine.introduce_player(0);

        let shape = engine.shape(0).copied().unwrap();
        assert_eq!(shape.col, engine.config().spawn_col());
        assert_eq!(shape.row, 0);
        assert_eq!(shape.rotation, Rotation::SPAWN);
        assert_eq!(kinds(&drain(&mut engine)), vec![MessageKind::SetPlayer]);
    }

    #[test]
    fn test_introduce_is_idempotent() {
        let mut engine = engine();
        engine.introduce_player(0);
        let once = engine.players().clone();
        drain(&mut engine);

        engine.introduce_player(0);
        assert_eq!(engine.players(), &once);
        assert!(drain(&mut engine).is_empty());
    }

    #[test]
    fn test_move_accepted_and_rejected() {
        let mut engine = engine();
        engine.introduce_player(0);
        set_shape(&mut engine, 0, ShapeKind::O, 4, 5, 0);
        drain(&mut engine);

        engine.apply_intent(0, Intent::MoveTo(7)).unwrap();
        assert_eq!(engine.shape(0).unwrap().col, 7);
        let sent = drain(&mut engine);
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Outbound::Broadcast(Message::SetPlayer(p)) => assert_eq!(p.shape.unwrap().col, 7),
            other => panic!("unexpected notification {:?}", other),
        }

        engine.apply_intent(0, Intent::MoveTo(9)).unwrap();
        assert_eq!(engine.shape(0).unwrap().col, 7);
        assert!(drain(&mut engine).is_empty());
    }

    #[test]
    fn test_move_far_off_the_board_is_rejected() {
        let mut engine = engine();
        engine.introduce_player(0);
        engine.introduce_player(1);
        set_shape(&mut engine, 0, ShapeKind::L, 4, 5, 0);
        set_shape(&mut engine, 1, ShapeKind::I, 4, 10, 0);
        drain(&mut engine);

        for frame in [
            r#"{"type":"Move","data":2147483647}"#,
            r#"{"type":"Move","data":-2147483648}"#,
        ] {
            let intent = Intent::try_from(decode(frame).unwrap()).unwrap();
            engine.apply_intent(0, intent).unwrap();
            engine.apply_intent(1, intent).unwrap();
        }

        assert_eq!(engine.shape(0).unwrap().col, 4);
        assert_eq!(engine.shape(1).unwrap().col, 4);
        assert!(drain(&mut engine).is_empty());
    }

    #[test]
    fn test_move_into_blocks_is_rejected() {
        let mut engine = engine();
        engine.introduce_player(0);
        set_shape(&mut engine, 0, ShapeKind::O, 4, 10, 0);
        engine.grid.place(11, 1, GHOST).unwrap();
        drain(&mut engine);

        engine.apply_intent(0, Intent::MoveTo(0)).unwrap();
        assert_eq!(engine.shape(0).unwrap().col, 4);
        assert!(drain(&mut engine).is_empty());
    }

    #[test]
    fn test_rotation() {
        let mut engine = engine();
        engine.introduce_player(0);
        set_shape(&mut engine, 0, ShapeKind::I, 5, 5, 0);

        engine.apply_intent(0, Intent::Rotate(Direction::Right)).unwrap();
        assert_eq!(engine.shape(0).unwrap().rotation, rotation(1));
        engine.apply_intent(0, Intent::Rotate(Direction::Left)).unwrap();
        assert_eq!(engine.shape(0).unwrap().rotation, rotation(0));
        engine.apply_intent(0, Intent::Rotate(Direction::Left)).unwrap();
        assert_eq!(engine.shape(0).unwrap().rotation, rotation(3));
    }

    #[test]
    fn test_rotation_against_wall_is_rejected() {
        let mut engine = engine();
        engine.introduce_player(0);
        set_shape(&mut engine, 0, ShapeKind::I, 0, 5, 1);
        drain(&mut engine);

        engine.apply_intent(0, Intent::Rotate(Direction::Right)).unwrap();
        assert_eq!(engine.shape(0).unwrap().rotation, rotation(1));
        assert!(drain(&mut engine).is_empty());
    }

    #[test]
    fn test_intent_for_unknown_player() {
        let mut engine = engine();
        assert_eq!(
            engine.apply_intent(4, Intent::Drop),
            Err(EngineError::UnknownPlayer(4))
        );
        assert_eq!(
            engine.apply_intent(4, Intent::MoveTo(1)),
            Err(EngineError::UnknownPlayer(4))
        );
        assert!(engine.grid().blocks_per_player().is_empty());
    }

    #[test]
    fn test_drops_filling_one_row() {
        let mut engine = engine();
        engine.introduce_player(0);

        set_shape(&mut engine, 0, ShapeKind::I, 1, 0, 0);
        engine.apply_intent(0, Intent::Drop).unwrap();
        set_shape(&mut engine, 0, ShapeKind::I, 5, 0, 0);
        engine.apply_intent(0, Intent::Drop).unwrap();
        assert_eq!(engine.players().get(0).unwrap().cleared_lines, 0);
        drain(&mut engine);

        set_shape(&mut engine, 0, ShapeKind::O, 8, 0, 0);
        engine.apply_intent(0, Intent::Drop).unwrap();

        assert_eq!(engine.players().get(0).unwrap().cleared_lines, 1);
        assert_eq!(engine.grid().height(), 20);
        assert_eq!(engine.grid().owner_at(19, 8), Some(0));
        assert_eq!(engine.grid().owner_at(19, 0), None);
        assert_eq!(engine.grid().blocks_per_player().get(&0), Some(&2));
        assert_eq!(engine.score(0), Some(8));

        let sent = drain(&mut engine);
        assert_eq!(kinds(&sent), vec![MessageKind::UpdateMap, MessageKind::SetPlayer]);
        match &sent[1] {
            Outbound::Broadcast(Message::SetPlayer(p)) => {
                assert_eq!(p.cleared_lines, 1);
                assert_eq!(p.shape.unwrap().row, 0);
            }
            other => panic!("unexpected notification {:?}", other),
        }
    }

    #[test]
    fn test_cleared_row_buries_other_shape() {
        let mut engine = engine();
        for id in [0, 1, 2] {
            engine.introduce_player(id);
        }

        fill_row(&mut engine, 19, 1..10, GHOST);
        engine.grid.place(15, 4, GHOST).unwrap();
        set_shape(&mut engine, 1, ShapeKind::O, 4, 16, 0);
        set_shape(&mut engine, 2, ShapeKind::O, 7, 5, 0);
        set_shape(&mut engine, 0, ShapeKind::I, 0, 1, 1);
        let bystander = engine.shape(2).copied();
        drain(&mut engine);

        engine.apply_intent(0, Intent::Drop).unwrap();

        assert_eq!(engine.players().get(0).unwrap().cleared_lines, 1);
        assert_eq!(engine.grid().owner_at(16, 4), Some(GHOST));

        let replaced = engine.shape(1).copied().unwrap();
        assert_eq!((replaced.col, replaced.row), (5, 0));
        assert!(engine.grid().fits(&replaced));
        assert_eq!(engine.shape(2).copied(), bystander);

        let sent = drain(&mut engine);
        assert_eq!(
            kinds(&sent),
            vec![MessageKind::UpdateMap, MessageKind::SetPlayer, MessageKind::SetPlayer]
        );
        match &sent[2] {
            Outbound::Broadcast(Message::SetPlayer(p)) => assert_eq!(p.id, 1),
            other => panic!("unexpected notification {:?}", other),
        }
    }

    #[test]
    fn test_step_moves_then_grounds() {
        let mut engine = engine();
        engine.introduce_player(0);
        set_shape(&mut engine, 0, ShapeKind::O, 0, 17, 0);
        drain(&mut engine);

        engine.step().unwrap();
        assert_eq!(engine.shape(0).unwrap().row, 18);
        assert_eq!(kinds(&drain(&mut engine)), vec![MessageKind::SetPlayer]);

        engine.step().unwrap();
        assert_eq!(engine.grid().owner_at(19, 1), Some(0));
        assert_eq!(engine.grid().owner_at(18, 0), Some(0));
        assert_eq!(engine.shape(0).unwrap().row, 0);
        assert_eq!(
            kinds(&drain(&mut engine)),
            vec![MessageKind::UpdateMap, MessageKind::SetPlayer]
        );
    }

    #[test]
    fn test_step_notifies_in_insertion_order() {
        let mut engine = engine();
        for id in [3, 1, 2] {
            engine.introduce_player(id);
        }
        drain(&mut engine);

        engine.step().unwrap();
        let ids: Vec<PlayerId> = drain(&mut engine)
            .into_iter()
            .map(|o| match o {
                Outbound::Broadcast(Message::SetPlayer(p)) => p.id,
                other => panic!("unexpected notification {:?}", other),
            })
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_step_skips_shape_replaced_by_earlier_drop() {
        let mut engine = engine();
        engine.introduce_player(0);
        engine.introduce_player(1);

        fill_row(&mut engine, 19, 1..10, GHOST);
        engine.grid.place(18, 5, GHOST).unwrap();
        engine.grid.place(15, 4, GHOST).unwrap();
        set_shape(&mut engine, 0, ShapeKind::I, 0, 17, 1);
        set_shape(&mut engine, 1, ShapeKind::O, 4, 16, 0);
        drain(&mut engine);

        engine.step().unwrap();

        assert_eq!(engine.players().get(0).unwrap().cleared_lines, 1);
        assert_eq!(engine.grid().blocks_per_player().get(&1), None);
        let replaced = engine.shape(1).copied().unwrap();
        assert_eq!((replaced.col, replaced.row), (5, 0));
    }

    #[test]
    fn test_spawn_conflict_ends_game() {
        let mut engine = engine();
        let resets = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&resets);
        engine.set_game_over_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        engine.introduce_player(0);
        engine.introduce_player(1);
        engine.grid.place(0, 5, GHOST).unwrap();
        set_shape(&mut engine, 0, ShapeKind::O, 0, 0, 0);
        drain(&mut engine);

        engine.apply_intent(0, Intent::Drop).unwrap();

        let sent = kinds(&drain(&mut engine));
        assert_eq!(sent.iter().filter(|k| **k == MessageKind::GameOver).count(), 1);
        assert_eq!(sent.last(), Some(&MessageKind::GameOver));
        assert_eq!(engine.phase(), Phase::Over);
        assert!(engine.players().is_empty());
        assert_eq!(engine.grid(), &GridMap::new(10, 20));
        assert_eq!(resets.load(Ordering::SeqCst), 1);

        engine.step().unwrap();
        engine.step().unwrap();
        engine.introduce_player(2);
        assert!(drain(&mut engine).is_empty());
        assert!(engine.players().is_empty());
    }

    #[test]
    fn test_grounding_above_top_ends_game() {
        let mut engine = engine();
        engine.introduce_player(0);
        engine.grid.place(1, 4, GHOST).unwrap();
        set_shape(&mut engine, 0, ShapeKind::J, 5, 0, 0);
        drain(&mut engine);

        engine.step().unwrap();

        assert_eq!(engine.phase(), Phase::Over);
        assert_eq!(
            drain(&mut engine),
            vec![Outbound::Broadcast(Message::GameOver)]
        );
        assert!(engine.grid().blocks_per_player().is_empty());
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut engine = engine();
        engine.grid.place(0, 5, GHOST).unwrap();
        engine.introduce_player(0);
        assert_eq!(engine.phase(), Phase::Over);

        engine.restart();
        assert_eq!(engine.phase(), Phase::Active);
        engine.introduce_player(0);
        assert!(engine.shape(0).is_some());
    }

    #[test]
    fn test_remove_player() {
        let mut engine = engine();
        engine.introduce_player(0);
        engine.introduce_player(1);
        drain(&mut engine);

        engine.remove_player(0);
        engine.remove_player(0);
        assert_eq!(engine.players().ids(), vec![1]);
        assert_eq!(
            drain(&mut engine),
            vec![Outbound::Broadcast(Message::RemovePlayer(0))]
        );
    }

    #[test]
    fn test_score() {
        let mut engine = engine();
        engine.introduce_player(0);
        engine.players.get_mut(0).unwrap().cleared_lines = 3;
        engine.grid.place(19, 0, 0).unwrap();
        engine.grid.place(19, 1, 0).unwrap();

        assert_eq!(engine.score(0), Some(28));
        assert_eq!(engine.total_scores(), vec![(0, 28)]);
        assert_eq!(engine.score(5), None);
    }

    #[test]
    fn test_sync_player_targets_one_player() {
        let mut engine = engine();
        engine.introduce_player(0);
        engine.introduce_player(1);
        drain(&mut engine);

        engine.sync_player(2);
        let sent = drain(&mut engine);
        assert!(sent.iter().all(|o| matches!(o, Outbound::To(2, _))));
        let ids: Vec<PlayerId> = sent
            .into_iter()
            .map(|o| match o {
                Outbound::To(_, Message::SetPlayer(p)) => p.id,
                other => panic!("unexpected notification {:?}", other),
            })
            .collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_broadcast_roster() {
        let mut engine = engine();
        engine.introduce_player(0);
        engine.introduce_player(1);
        drain(&mut engine);

        engine.broadcast_roster();
        assert_eq!(
            kinds(&drain(&mut engine)),
            vec![MessageKind::SetPlayer, MessageKind::SetPlayer]
        );
    }
}
