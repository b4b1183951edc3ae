//! Move execution
//!
//! Functions for applying a validated move to a board.

use crate::board::Board;
use crate::types::{Move, Piece, Rank};

/// Apply a move and return the resulting board
///
/// Relocates the piece from `origin` to `destination`, clears every square
/// in `captures` and promotes a man that ends its move on its promotion row.
/// Passing through the promotion row in the middle of a chain does not
/// promote, since only the final landing square is inspected.
///
/// The input board is left untouched.
///
/// # Panics
///
/// In debug builds, panics if `origin` is empty. Callers must only pass
/// moves taken from [`legal_moves`](crate::move_gen::legal_moves) for the
/// same board; the match session rejects anything else before this point.
///
/// # Examples
///
/// ```rust
/// use draughts_engine::{apply_move, legal_moves, Board, Side};
///
/// let board = Board::initial();
/// let mv = legal_moves(&board, Side::Red).remove(0);
/// let next = apply_move(&board, &mv);
/// assert!(next.is_empty(mv.origin));
/// assert!(!next.is_empty(mv.destination));
/// ```
pub fn apply_move(board: &Board, mv: &Move) -> Board {
    let mut next = board.clone();

    let Some(piece) = next.take(mv.origin) else {
        debug_assert!(false, "apply_move called with empty origin {:?}", mv.origin);
        return next;
    };

    for &captured in &mv.captures {
        let removed = next.take(captured);
        debug_assert!(
            removed.is_some_and(|p| p.side != piece.side),
            "capture list names {captured:?} which holds no enemy piece"
        );
    }

    let promoted = piece.rank == Rank::Man && mv.destination.row() == piece.side.promotion_row();
    let landed = if promoted {
        Piece::king(piece.side)
    } else {
        piece
    };
    next.place(mv.destination, landed);

    next
}
