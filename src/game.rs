use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::Board;
use crate::piece::{Piece, PieceKind, Position};

// ============================================================================
// Configuration
// ============================================================================

pub const LINES_PER_LEVEL: u32 = 10;

// Scoring, multiplied by the level at the time of the clear
pub const SCORE_SINGLE: u32 = 100;
pub const SCORE_DOUBLE: u32 = 300;
pub const SCORE_TRIPLE: u32 = 500;
pub const SCORE_TETRIS: u32 = 800;

// Gravity pacing
pub const BASE_DROP_SPEED: f64 = 1.0;
pub const MIN_DROP_SPEED: f64 = 0.1;
pub const DROP_SPEED_STEP: f64 = 0.1;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceSpawned(PieceKind),
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    GameOver,
    GameReset,
}

/// Discrete inputs the presentation layer forwards to the engine.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Spawn,
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    Reset,
}

// ============================================================================
// Piece Source Trait
// ============================================================================

pub trait PieceSource {
    fn next_kind(&mut self) -> PieceKind;
}

/// Independent uniform draws over the seven kinds. Repeats are allowed.
pub struct RandomPieceSource {
    rng: StdRng,
}

impl RandomPieceSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PieceSource for RandomPieceSource {
    fn next_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())]
    }
}

/// Replays a fixed list of kinds, wrapping around at the end.
pub struct SequencePieceSource {
    kinds: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceSource {
    /// Panics if `kinds` is empty.
    pub fn new(kinds: Vec<PieceKind>) -> Self {
        assert!(!kinds.is_empty(), "piece sequence must not be empty");
        Self { kinds, index: 0 }
    }
}

impl PieceSource for SequencePieceSource {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.index % self.kinds.len()];
        self.index += 1;
        kind
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct GameState {
    pub board: Board,
    pub current: Option<Piece>,
    pub next: Option<Piece>,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
    source: Box<dyn PieceSource>,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new() -> Self {
        Self::with_source(Box::new(RandomPieceSource::from_entropy()))
    }

    /// A game with an empty board and no pieces yet; call `spawn_new_piece`
    /// to start.
    pub fn with_source(source: Box<dyn PieceSource>) -> Self {
        Self {
            board: Board::new(),
            current: None,
            next: None,
            score: 0,
            level: 1,
            lines_cleared: 0,
            game_over: false,
            source,
            events: Vec::new(),
        }
    }

    /// Starts from a prepared board with `piece` already active.
    pub fn with_board(board: Board, piece: Piece, source: Box<dyn PieceSource>) -> Self {
        let mut game = Self::with_source(source);
        game.board = board;
        game.current = Some(piece);
        game
    }

    fn draw_piece(&mut self) -> Piece {
        Piece::new(self.source.next_kind())
    }

    /// Makes the held next piece active and draws a new next piece. The very
    /// first call draws both. Returns false if the game is over, including
    /// when the new piece has no room at the spawn position.
    pub fn spawn_new_piece(&mut self) -> bool {
        if self.game_over {
            return false;
        }

        let current = match self.next.take() {
            Some(next) => next.at_spawn(),
            None => self.draw_piece(),
        };
        let next = self.draw_piece();
        self.current = Some(current);
        self.next = Some(next);
        self.events.push(GameEvent::PieceSpawned(current.kind));

        if self.board.collides(&current) {
            self.set_game_over();
            return false;
        }
        true
    }

    /// Translates the active piece if the target is free. A blocked downward
    /// move locks the piece instead; a blocked sideways move is ignored.
    pub fn move_piece(&mut self, dx: i16, dy: i16) -> bool {
        if self.game_over {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };

        let moved = piece.moved(dx, dy);
        if !self.board.collides(&moved) {
            self.current = Some(moved);
            self.events.push(GameEvent::PieceMoved);
            return true;
        }

        if dy > 0 {
            self.lock_and_advance();
        }
        false
    }

    pub fn move_left(&mut self) -> bool {
        self.move_piece(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_piece(1, 0)
    }

    /// One step down; locks the piece when it cannot fall further.
    pub fn soft_drop_step(&mut self) -> bool {
        self.move_piece(0, 1)
    }

    /// Gravity tick from the presentation loop.
    pub fn tick(&mut self) -> bool {
        self.soft_drop_step()
    }

    /// Quarter turn clockwise, kept only if the rotated piece fits where it is.
    pub fn rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };

        let rotated = piece.rotated();
        if self.board.collides(&rotated) {
            return false;
        }
        self.current = Some(rotated);
        self.events.push(GameEvent::PieceRotated);
        true
    }

    pub fn hard_drop(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let Some(mut piece) = self.current else {
            return false;
        };

        loop {
            let below = piece.moved(0, 1);
            if self.board.collides(&below) {
                break;
            }
            piece = below;
        }
        self.current = Some(piece);
        self.lock_and_advance();
        true
    }

    /// Settles the active piece, clears lines, checks for a topped-out board
    /// and, if the game goes on, brings in the next piece.
    pub fn lock_and_advance(&mut self) {
        if self.game_over {
            return;
        }
        let Some(piece) = self.current.take() else {
            return;
        };

        self.board.place(&piece);
        self.events.push(GameEvent::PieceLocked);
        self.clear_lines();

        if !self.board.is_row_empty(0) {
            self.set_game_over();
            return;
        }
        self.spawn_new_piece();
    }

    /// Removes complete rows and scores them as one clear.
    pub fn clear_lines(&mut self) -> u32 {
        let cleared = self.board.compact() as u32;
        if cleared > 0 {
            self.events.push(GameEvent::LinesCleared(cleared));
            self.add_score(cleared);
        }
        cleared
    }

    pub fn add_score(&mut self, lines: u32) {
        let base_score = match lines {
            1 => SCORE_SINGLE,
            2 => SCORE_DOUBLE,
            3 => SCORE_TRIPLE,
            4 => SCORE_TETRIS,
            _ => 0,
        };
        self.score += base_score * self.level;
        self.lines_cleared += lines;
        self.update_level();
    }

    /// Level follows total lines cleared and never goes down.
    pub fn update_level(&mut self) {
        let new_level = (self.lines_cleared / LINES_PER_LEVEL) + 1;
        if new_level > self.level {
            self.level = new_level;
            self.events.push(GameEvent::LevelUp(self.level));
        }
    }

    fn set_game_over(&mut self) {
        self.game_over = true;
        self.events.push(GameEvent::GameOver);
    }

    /// Back to a fresh game. Does not spawn; the caller starts the next round.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.current = None;
        self.next = None;
        self.score = 0;
        self.level = 1;
        self.lines_cleared = 0;
        self.game_over = false;
        self.events.clear();
        self.events.push(GameEvent::GameReset);
    }

    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Spawn => self.spawn_new_piece(),
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::SoftDrop => self.soft_drop_step(),
            Command::Rotate => self.rotate(),
            Command::HardDrop => self.hard_drop(),
            Command::Reset => {
                self.reset();
                true
            }
        }
    }

    /// Gravity multiplier for the current level; 1.0 is the base rate and
    /// smaller values mean faster ticks.
    pub fn drop_speed(&self) -> f64 {
        let slowdown = f64::from(self.level.saturating_sub(1)) * DROP_SPEED_STEP;
        (BASE_DROP_SPEED - slowdown).max(MIN_DROP_SPEED)
    }

    pub fn tick_duration(&self, base: Duration) -> Duration {
        base.mul_f64(self.drop_speed())
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn current_cells(&self) -> Option<[Position; 4]> {
        self.current.map(|piece| piece.cells())
    }

    pub fn next_cells(&self) -> Option<[Position; 4]> {
        self.next.map(|piece| piece.cells())
    }

    /// The settled board with the active piece drawn on top.
    pub fn render_board(&self) -> Board {
        let mut visual = self.board.clone();
        if let Some(piece) = &self.current {
            visual.place(piece);
        }
        visual
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::board::{CellState, BOARD_WIDTH};

    pub fn sequence(kinds: &[PieceKind]) -> Box<dyn PieceSource> {
        Box::new(SequencePieceSource::new(kinds.to_vec()))
    }

    pub fn fill_row(board: &mut Board, y: usize) {
        for x in 0..BOARD_WIDTH {
            board.set(x as i16, y as i16, CellState::Filled(PieceKind::T));
        }
    }

    pub fn fill_row_with_gap(board: &mut Board, y: usize, gap_x: usize) {
        for x in 0..BOARD_WIDTH {
            if x != gap_x {
                board.set(x as i16, y as i16, CellState::Filled(PieceKind::T));
            }
        }
    }
}
