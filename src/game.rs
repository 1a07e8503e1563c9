use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::collision::collides;
use crate::config::{ConfigError, GameConfig};
use crate::grid::{Cell, Grid};
use crate::piece::{Piece, PieceKind};

// ============================================================================
// Scoring
// ============================================================================

pub const SCORE_SINGLE: u32 = 10;
pub const SCORE_DOUBLE: u32 = 25;
pub const SCORE_TRIPLE: u32 = 50;
pub const SCORE_TETRIS: u32 = 100;

/// Points for clearing `rows` rows with a single lock.
pub fn score_for_rows(rows: u32) -> u32 {
    match rows {
        1 => SCORE_SINGLE,
        2 => SCORE_DOUBLE,
        3 => SCORE_TRIPLE,
        4 => SCORE_TETRIS,
        _ => 0,
    }
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    /// An active piece exists and accepts moves.
    Falling,
    /// Terminal: every mutation is rejected.
    GameOver,
}

/// Discrete commands delivered by an input source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    RotateClockwise,
    SoftDrop,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    PieceSpawned(PieceKind),
    GameOver { score: u32 },
}

/// Read-only snapshot handed to renderers.
#[derive(Clone, Copy, Debug)]
pub struct GameView<'a> {
    pub grid: &'a Grid,
    pub piece: &'a Piece,
    pub score: u32,
    pub lines_cleared: u32,
    pub state: GameState,
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> PieceKind;
}

/// Uniform choice over every real piece kind.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())]
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<PieceKind>) -> Self {
        assert!(!pieces.is_empty(), "sequence needs at least one piece");
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> PieceKind {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

// ============================================================================
// Game
// ============================================================================

/// One game session: owns the grid, the active piece and the score.
pub struct Game {
    grid: Grid,
    current_piece: Piece,
    score: u32,
    lines_cleared: u32,
    state: GameState,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

// ============================================================================
// Game Logic
// ============================================================================

impl Game {
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_provider(
            Grid::new(config.rows, config.columns),
            Box::new(RandomPieceProvider::new(config.seed)),
        ))
    }

    /// Starts a session on `grid`, spawning the first piece from `provider`.
    pub fn with_provider(grid: Grid, mut provider: Box<dyn PieceProvider>) -> Self {
        let current_piece = Piece::spawn(provider.next_piece());
        Self::with_grid(grid, current_piece, provider)
    }

    /// Starts a session with an already placed active piece. A piece that
    /// overlaps the stack or a wall ends the session straight away.
    pub fn with_grid(grid: Grid, current_piece: Piece, provider: Box<dyn PieceProvider>) -> Self {
        let mut game = Self {
            grid,
            current_piece,
            score: 0,
            lines_cleared: 0,
            state: GameState::Falling,
            piece_provider: provider,
            events: Vec::new(),
        };
        game.check_spawn();
        game
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn current_piece(&self) -> &Piece {
        &self.current_piece
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn view(&self) -> GameView<'_> {
        GameView {
            grid: &self.grid,
            piece: &self.current_piece,
            score: self.score,
            lines_cleared: self.lines_cleared,
            state: self.state,
        }
    }

    pub fn apply(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::MoveLeft => self.move_left(),
            Intent::MoveRight => self.move_right(),
            Intent::RotateClockwise => self.rotate(),
            Intent::SoftDrop => self.move_down(),
        }
    }

    /// Moves the piece down one row, locking it when it can't go further.
    /// Returns true only if the piece actually moved.
    pub fn move_down(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        if self.translate(0, 1) {
            return true;
        }
        self.lock_and_spawn();
        false
    }

    pub fn move_left(&mut self) -> bool {
        !self.is_game_over() && self.translate(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        !self.is_game_over() && self.translate(1, 0)
    }

    /// Rotates clockwise in place, or does nothing if the rotated shape
    /// doesn't fit where the piece is.
    pub fn rotate(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        let rotated = self.current_piece.rotated_shape();
        if collides(&self.grid, &self.current_piece, 0, 0, &rotated) {
            return false;
        }
        self.current_piece.shape = rotated;
        self.events.push(GameEvent::PieceRotated);
        true
    }

    fn translate(&mut self, dx: i16, dy: i16) -> bool {
        let piece = &self.current_piece;
        if collides(&self.grid, piece, dx, dy, &piece.shape) {
            return false;
        }
        self.current_piece.origin.x += dx;
        self.current_piece.origin.y += dy;
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// Writes the active piece into the grid. A piece still poking above
    /// row 0 ends the game instead, and nothing is written.
    fn lock_piece(&mut self) -> bool {
        let blocks = self.current_piece.blocks();
        if blocks.iter().any(|(position, _)| position.y < 0) {
            self.end_game();
            return false;
        }
        for (position, value) in blocks {
            self.grid
                .set_cell(position.y as usize, position.x as usize, value);
        }
        self.events.push(GameEvent::PieceLocked);
        true
    }

    fn lock_and_spawn(&mut self) {
        if !self.lock_piece() {
            return;
        }
        let lines = self.grid.clear_full_rows();
        if lines > 0 {
            self.events.push(GameEvent::LinesCleared(lines));
            self.add_score(lines);
        }
        self.spawn_next_piece();
    }

    fn add_score(&mut self, lines: u32) {
        self.score = self.score.saturating_add(score_for_rows(lines));
        self.lines_cleared += lines;
    }

    fn spawn_next_piece(&mut self) {
        self.current_piece = Piece::spawn(self.piece_provider.next_piece());
        self.events
            .push(GameEvent::PieceSpawned(self.current_piece.kind));
        self.check_spawn();
    }

    /// A freshly placed piece that already collides ends the game.
    fn check_spawn(&mut self) {
        let piece = &self.current_piece;
        if collides(&self.grid, piece, 0, 0, &piece.shape) {
            self.end_game();
        }
    }

    fn end_game(&mut self) {
        if self.is_game_over() {
            return;
        }
        self.state = GameState::GameOver;
        self.events.push(GameEvent::GameOver { score: self.score });
    }

    /// Returns the grid with the active piece overlaid
    pub fn render_grid(&self) -> Vec<Vec<Cell>> {
        let mut visual_grid: Vec<Vec<Cell>> =
            self.grid.iter_rows().map(<[Cell]>::to_vec).collect();

        for (position, value) in self.current_piece.blocks() {
            if position.y >= 0
                && (position.y as usize) < self.grid.rows()
                && position.x >= 0
                && (position.x as usize) < self.grid.columns()
            {
                visual_grid[position.y as usize][position.x as usize] = value;
            }
        }

        visual_grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::grid::{GRID_COLUMNS, GRID_ROWS};

    /// Arbitrary non-zero filler value for pre-built stacks.
    pub const FILLER: Cell = 6;

    pub fn empty_grid() -> Grid {
        Grid::new(GRID_ROWS, GRID_COLUMNS)
    }

    pub fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..grid.columns() {
            grid.set_cell(y, x, FILLER);
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
        for x in 0..grid.columns() {
            if x != gap_x {
                grid.set_cell(y, x, FILLER);
            }
        }
    }

    pub fn sequence(pieces: &[PieceKind]) -> Box<dyn PieceProvider> {
        Box::new(SequencePieceProvider::new(pieces.to_vec()))
    }
}
