use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::piece::{Piece, PieceKind};

// ============================================================================
// Configuration
// ============================================================================

pub const BOARD_WIDTH: usize = 12;
pub const BOARD_HEIGHT: usize = 20;

const EMPTY_SYMBOL: char = '.';

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl CellState {
    pub fn is_filled(self) -> bool {
        matches!(self, CellState::Filled(_))
    }
}

type Row = [CellState; BOARD_WIDTH];

const EMPTY_ROW: Row = [CellState::Empty; BOARD_WIDTH];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row}: expected {expected} cells, found {found}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: unknown cell {symbol:?}")]
    UnknownCell { row: usize, symbol: char },
}

// ============================================================================
// Board
// ============================================================================

/// Settled cells, row-major with row 0 at the top. A filled cell remembers
/// the kind of the piece that was locked there.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    grid: Vec<Row>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            grid: vec![EMPTY_ROW; BOARD_HEIGHT],
        }
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    pub fn in_bounds(&self, x: i16, y: i16) -> bool {
        x >= 0 && (x as usize) < BOARD_WIDTH && y >= 0 && (y as usize) < BOARD_HEIGHT
    }

    /// `None` outside the board.
    pub fn get(&self, x: i16, y: i16) -> Option<CellState> {
        if self.in_bounds(x, y) {
            Some(self.grid[y as usize][x as usize])
        } else {
            None
        }
    }

    /// Returns false (and changes nothing) when `(x, y)` is off the board.
    pub fn set(&mut self, x: i16, y: i16, cell: CellState) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.grid[y as usize][x as usize] = cell;
        true
    }

    pub fn is_empty(&self, x: i16, y: i16) -> bool {
        self.get(x, y) == Some(CellState::Empty)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> + '_ {
        self.grid.iter().map(|row| row.as_slice())
    }

    /// True if any cell of `piece` is off the board or already filled.
    pub fn collides(&self, piece: &Piece) -> bool {
        piece.cells().iter().any(|cell| !self.is_empty(cell.x, cell.y))
    }

    /// Writes the piece's kind into every in-bounds cell it covers.
    pub fn place(&mut self, piece: &Piece) {
        for cell in piece.cells() {
            self.set(cell.x, cell.y, CellState::Filled(piece.kind));
        }
    }

    pub fn remove(&mut self, piece: &Piece) {
        for cell in piece.cells() {
            self.set(cell.x, cell.y, CellState::Empty);
        }
    }

    pub fn is_row_complete(&self, y: usize) -> bool {
        self.grid[y].iter().all(|cell| cell.is_filled())
    }

    pub fn is_row_empty(&self, y: usize) -> bool {
        self.grid[y].iter().all(|cell| !cell.is_filled())
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.grid[y].iter().filter(|cell| cell.is_filled()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| cell.is_filled()).count()
    }

    /// Indices of complete rows, top to bottom.
    pub fn full_rows(&self) -> Vec<usize> {
        (0..BOARD_HEIGHT).filter(|&y| self.is_row_complete(y)).collect()
    }

    /// Drops every complete row in one pass and refills the top with empty
    /// rows. Surviving rows keep their relative order. Returns the number of
    /// rows removed.
    pub fn compact(&mut self) -> usize {
        let kept: Vec<Row> = self
            .grid
            .iter()
            .filter(|row| !row.iter().all(|cell| cell.is_filled()))
            .copied()
            .collect();
        let cleared = BOARD_HEIGHT - kept.len();
        if cleared == 0 {
            return 0;
        }

        let mut grid = vec![EMPTY_ROW; cleared];
        grid.extend(kept);
        self.grid = grid;
        cleared
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.grid {
            for cell in row {
                let symbol = match cell {
                    CellState::Empty => EMPTY_SYMBOL,
                    CellState::Filled(kind) => kind.symbol(),
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Parses the `Display` layout. Surrounding whitespace on each line is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() != BOARD_HEIGHT {
            return Err(ParseBoardError::RowCount {
                expected: BOARD_HEIGHT,
                found: lines.len(),
            });
        }

        let mut board = Board::new();
        for (y, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != BOARD_WIDTH {
                return Err(ParseBoardError::RowWidth {
                    row: y,
                    expected: BOARD_WIDTH,
                    found,
                });
            }
            for (x, symbol) in line.chars().enumerate() {
                board.grid[y][x] = match symbol {
                    EMPTY_SYMBOL => CellState::Empty,
                    other => CellState::Filled(
                        PieceKind::try_from(other)
                            .map_err(|symbol| ParseBoardError::UnknownCell { row: y, symbol })?,
                    ),
                };
            }
        }
        Ok(board)
    }
}
