//! # Board Geometry Constants
//!
//! The board is a 10x10 grid indexed by `(row, col)`, both in `0..BOARD_SIZE`.
//! Row 0 is WHITE's home edge and row 9 is RED's home edge, so RED advances
//! towards row 0 and WHITE towards row 9.
//!
//! Only dark squares, where `row + col` is odd, are playable. Every diagonal
//! step changes both coordinates by one, which preserves that parity: a piece
//! that starts on a dark square can never reach a light one.

/// Width and height of the board
pub const BOARD_SIZE: u8 = 10;

/// Number of rows filled with men at the start, per side
pub const STARTING_ROWS: u8 = 4;

/// Men per side in the initial position
pub const MEN_PER_SIDE: usize = 20;

/// Row a RED man must reach to become a king
pub const RED_PROMOTION_ROW: u8 = 0;

/// Row a WHITE man must reach to become a king
pub const WHITE_PROMOTION_ROW: u8 = BOARD_SIZE - 1;

/// The four diagonal directions as `(row delta, col delta)`
pub const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
