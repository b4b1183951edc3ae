//! Non-capturing moves
//!
//! Men step one square diagonally forward. Kings slide any distance along
//! a diagonal until the edge or the first occupied square.

use crate::board::Board;
use crate::constants::{BOARD_SIZE, DIAGONALS};
use crate::types::{Move, Piece, Square};

/// Simple moves for `piece` standing on `origin`
pub fn simple_moves(board: &Board, origin: Square, piece: Piece) -> Vec<Move> {
    let mut moves = Vec::new();

    for dir in DIAGONALS {
        if piece.is_king() {
            for dist in 1..BOARD_SIZE as i8 {
                match origin.offset(dir, dist) {
                    Some(target) if board.is_empty(target) => {
                        moves.push(Move::simple(origin, target));
                    }
                    _ => break,
                }
            }
        } else if dir.0 == piece.side.forward() {
            if let Some(target) = origin.offset(dir, 1).filter(|sq| board.is_empty(*sq)) {
                moves.push(Move::simple(origin, target));
            }
        }
    }

    moves
}
