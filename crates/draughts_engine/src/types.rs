//! # Core Draughts Types
//!
//! ## Pieces
//!
//! A `Piece` is a `Side` plus a `Rank`. Men move one square forward and capture
//! in all four diagonal directions; kings ("flying kings") slide along whole
//! open diagonals and may land anywhere beyond a captured piece.
//!
//! ## Squares
//!
//! `Square` can only be built through `Square::new` (or its `TryFrom<(u8, u8)>`
//! impl, which serde uses), so every value in the engine is a dark square on
//! the board. Client-supplied coordinates are rejected with
//! `DraughtsError::InvalidCoordinate` before they touch any board.
//!
//! ## Moves
//!
//! A `Move` is one complete turn. For a capture chain `origin` and
//! `destination` are the ends of the whole chain and `captures` lists every
//! jumped square in traversal order. Two moves are equal only if all three
//! fields match, which is how the match session validates submissions.

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, RED_PROMOTION_ROW, WHITE_PROMOTION_ROW};
use crate::error::{DraughtsError, DraughtsResult};

/// One of the two players. RED always moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    White,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::White,
            Side::White => Side::Red,
        }
    }

    /// Row delta of a forward step
    pub(crate) fn forward(self) -> i8 {
        match self {
            Side::Red => -1,
            Side::White => 1,
        }
    }

    /// Farthest row from this side's home edge
    pub fn promotion_row(self) -> u8 {
        match self {
            Side::Red => RED_PROMOTION_ROW,
            Side::White => WHITE_PROMOTION_ROW,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Man,
    King,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub side: Side,
    pub rank: Rank,
}

impl Piece {
    pub const fn man(side: Side) -> Self {
        Piece {
            side,
            rank: Rank::Man,
        }
    }

    pub const fn king(side: Side) -> Self {
        Piece {
            side,
            rank: Rank::King,
        }
    }

    #[inline]
    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }
}

/// A playable (dark) square on the board
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Validate a coordinate pair
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinate` if either value is outside `0..10` or the
    /// square is light (`row + col` even).
    pub fn new(row: u8, col: u8) -> DraughtsResult<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE && (row + col) % 2 == 1 {
            Ok(Square { row, col })
        } else {
            Err(DraughtsError::InvalidCoordinate { row, col })
        }
    }

    #[inline]
    pub const fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// Square `dist` diagonal steps away in direction `(dr, dc)`, if on the board
    #[inline]
    pub(crate) fn offset(self, (dr, dc): (i8, i8), dist: i8) -> Option<Square> {
        let row = self.row as i8 + dr * dist;
        let col = self.col as i8 + dc * dist;
        let size = BOARD_SIZE as i8;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            // Diagonal steps keep row + col odd
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Every playable square, row by row
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|row| {
            (0..BOARD_SIZE)
                .filter(move |col| (row + col) % 2 == 1)
                .map(move |col| Square { row, col })
        })
    }
}

impl TryFrom<(u8, u8)> for Square {
    type Error = DraughtsError;

    fn try_from((row, col): (u8, u8)) -> DraughtsResult<Self> {
        Square::new(row, col)
    }
}

impl From<Square> for (u8, u8) {
    fn from(square: Square) -> Self {
        (square.row, square.col)
    }
}

/// One complete turn, possibly a chain of jumps by a single piece
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub origin: Square,
    pub destination: Square,
    pub captures: Vec<Square>,
}

impl Move {
    pub fn simple(origin: Square, destination: Square) -> Self {
        Move {
            origin,
            destination,
            captures: Vec::new(),
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        !self.captures.is_empty()
    }
}
