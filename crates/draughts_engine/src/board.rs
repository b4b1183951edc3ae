//! Board representation and queries
//!
//! Provides the 10x10 grid the rest of the engine reads:
//! - Piece lookup and placement by `Square`
//! - Per-side piece iteration and counts
//! - The fixed initial position
//!
//! The grid is indexed `[row][col]`. Light squares are never written because
//! every write goes through a `Square`, which is always dark.

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, STARTING_ROWS};
use crate::error::{DraughtsError, DraughtsResult};
use crate::types::{Piece, Rank, Side, Square};

/// Raw grid layout used on the wire
pub type Grid = [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize];

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Grid", into = "Grid")]
pub struct Board {
    cells: Grid,
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    /// Board with no pieces, for building test and puzzle positions
    pub fn empty() -> Self {
        Board {
            cells: [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize],
        }
    }

    /// Standard starting position: 20 men per side on the four rows nearest
    /// each side's edge. WHITE occupies rows 0-3 and RED rows 6-9.
    pub fn initial() -> Self {
        let mut board = Board::empty();
        for square in Square::all() {
            if square.row() < STARTING_ROWS {
                board.place(square, Piece::man(Side::White));
            } else if square.row() >= BOARD_SIZE - STARTING_ROWS {
                board.place(square, Piece::man(Side::Red));
            }
        }
        board
    }

    #[inline]
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.cells[square.row() as usize][square.col() as usize]
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square).is_none()
    }

    pub fn place(&mut self, square: Square, piece: Piece) {
        self.cells[square.row() as usize][square.col() as usize] = Some(piece);
    }

    /// Remove and return whatever stands on `square`
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.cells[square.row() as usize][square.col() as usize].take()
    }

    /// All pieces of `side` with their squares, row by row
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |square| {
            self.get(square)
                .filter(|piece| piece.side == side)
                .map(|piece| (square, piece))
        })
    }

    pub fn count(&self, side: Side) -> usize {
        self.pieces(side).count()
    }

    pub fn count_rank(&self, side: Side, rank: Rank) -> usize {
        self.pieces(side).filter(|(_, piece)| piece.rank == rank).count()
    }
}

impl TryFrom<Grid> for Board {
    type Error = DraughtsError;

    /// Rejects grids with a piece on a light square
    fn try_from(cells: Grid) -> DraughtsResult<Self> {
        for (row, line) in cells.iter().enumerate() {
            for (col, cell) in line.iter().enumerate() {
                if cell.is_some() && (row + col) % 2 == 0 {
                    return Err(DraughtsError::InvalidCoordinate {
                        row: row as u8,
                        col: col as u8,
                    });
                }
            }
        }
        Ok(Board { cells })
    }
}

impl From<Board> for Grid {
    fn from(board: Board) -> Self {
        board.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MEN_PER_SIDE;

    #[test]
    fn test_initial_piece_counts() {
        let board = Board::initial();
        assert_eq!(board.count(Side::Red), MEN_PER_SIDE);
        assert_eq!(board.count(Side::White), MEN_PER_SIDE);
        assert_eq!(board.count_rank(Side::Red, Rank::King), 0);
    }

    #[test]
    fn test_initial_middle_rows_empty() {
        let board = Board::initial();
        for square in Square::all().filter(|sq| sq.row() == 4 || sq.row() == 5) {
            assert!(board.is_empty(square), "{square:?} should start empty");
        }
    }

    #[test]
    fn test_initial_sides_on_correct_edges() {
        let board = Board::initial();
        assert!(board.pieces(Side::White).all(|(sq, _)| sq.row() < 4));
        assert!(board.pieces(Side::Red).all(|(sq, _)| sq.row() > 5));
    }

    #[test]
    fn test_place_and_take() {
        let mut board = Board::empty();
        let square = Square::new(4, 5).unwrap();
        board.place(square, Piece::king(Side::Red));
        assert_eq!(board.get(square), Some(Piece::king(Side::Red)));
        assert_eq!(board.take(square), Some(Piece::king(Side::Red)));
        assert!(board.is_empty(square));
    }

    #[test]
    fn test_board_json_rejects_light_square_piece() {
        let mut cells: Grid = Board::empty().into();
        cells[0][0] = Some(Piece::man(Side::Red));
        let json = serde_json::to_string(&cells).unwrap();
        assert!(serde_json::from_str::<Board>(&json).is_err());
    }

    #[test]
    fn test_board_json_preserves_position() {
        let board = Board::initial();
        let json = serde_json::to_string(&board).unwrap();
        let decoded: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, board);
    }
}
