//! Legal move generation
//!
//! Generates every legal move for one side under the international rules:
//! - Men step one square forward, kings slide along open diagonals
//! - Men and kings capture in all four diagonal directions
//! - Capturing is mandatory, and only the chains with the greatest number
//!   of captures across the whole side are legal ("quantite")
//!
//! Capture chains are searched per piece in `capture`, quiet moves in `simple`.

mod capture;
mod simple;


pub use capture::capture_moves;
pub use simple::simple_moves;

use crate::board::Board;
use crate::types::{Move, Side};

/// Generate the legal move set for `side`
///
/// The result holds either only captures or only simple moves, never both.
/// It is sorted and free of duplicates, so repeated calls on the same board
/// return identical vectors.
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    let mut captures: Vec<Move> = board
        .pieces(side)
        .flat_map(|(square, piece)| capture_moves(board, square, piece))
        .collect();

    let mut moves = if captures.is_empty() {
        board
            .pieces(side)
            .flat_map(|(square, piece)| simple_moves(board, square, piece))
            .collect()
    } else {
        let longest = captures.iter().map(|mv| mv.captures.len()).max().unwrap_or(0);
        captures.retain(|mv| mv.captures.len() == longest);
        captures
    };

    // A king can reach the same landing square through different
    // intermediate squares with an identical capture list
    moves.sort();
    moves.dedup();
    moves
}

/// Whether `side` has at least one legal move
pub fn has_any_move(board: &Board, side: Side) -> bool {
    board.pieces(side).any(|(square, piece)| {
        !simple_moves(board, square, piece).is_empty()
            || !capture_moves(board, square, piece).is_empty()
    })
}

/// Whether `mv` is in the legal set for `side`, matching every field exactly
pub fn is_legal_move(board: &Board, side: Side, mv: &Move) -> bool {
    legal_moves(board, side).contains(mv)
}
