//! Capture chain search
//!
//! Depth-first search over every jump sequence available to one piece.
//! Instead of copying the board at each level, the search keeps the
//! input board immutable and tracks two overlays:
//! - the origin square, which the moving piece has left
//! - the squares already captured in this chain, which count as empty
//!
//! A captured piece therefore cannot be jumped twice and a king may fly
//! over the square it vacated. Only maximal chains are recorded: a branch
//! emits a `Move` when it has at least one capture and no continuation.

use crate::board::Board;
use crate::constants::{BOARD_SIZE, DIAGONALS};
use crate::types::{Move, Piece, Square};

struct CaptureSearch<'a> {
    board: &'a Board,
    origin: Square,
    piece: Piece,
    captured: Vec<Square>,
    moves: Vec<Move>,
}

impl CaptureSearch<'_> {
    fn is_empty(&self, square: Square) -> bool {
        square == self.origin || self.captured.contains(&square) || self.board.is_empty(square)
    }

    fn is_enemy(&self, square: Square) -> bool {
        !self.captured.contains(&square)
            && self
                .board
                .get(square)
                .is_some_and(|other| other.side != self.piece.side)
    }

    fn search(&mut self, from: Square) {
        let mut continued = false;

        for dir in DIAGONALS {
            if self.piece.is_king() {
                continued |= self.search_king_direction(from, dir);
            } else {
                continued |= self.search_man_direction(from, dir);
            }
        }

        if !continued && !self.captured.is_empty() {
            self.moves.push(Move {
                origin: self.origin,
                destination: from,
                captures: self.captured.clone(),
            });
        }
    }

    /// Jump over an adjacent enemy into the empty square right behind it
    fn search_man_direction(&mut self, from: Square, dir: (i8, i8)) -> bool {
        let (Some(over), Some(landing)) = (from.offset(dir, 1), from.offset(dir, 2)) else {
            return false;
        };
        if !self.is_enemy(over) || !self.is_empty(landing) {
            return false;
        }

        self.branch(over, landing);
        true
    }

    /// Fly to the first occupied square; if it holds an enemy, every empty
    /// square beyond it up to the next piece is a landing square
    fn search_king_direction(&mut self, from: Square, dir: (i8, i8)) -> bool {
        let mut dist = 1;
        let over = loop {
            match from.offset(dir, dist) {
                None => return false,
                Some(square) if self.is_empty(square) => dist += 1,
                Some(square) if self.is_enemy(square) => break square,
                // Own piece blocks the whole diagonal
                Some(_) => return false,
            }
        };

        let mut continued = false;
        for landing_dist in dist + 1..BOARD_SIZE as i8 {
            match from.offset(dir, landing_dist) {
                Some(landing) if self.is_empty(landing) => {
                    self.branch(over, landing);
                    continued = true;
                }
                _ => break,
            }
        }
        continued
    }

    fn branch(&mut self, over: Square, landing: Square) {
        self.captured.push(over);
        self.search(landing);
        self.captured.pop();
    }
}

/// Every maximal capture chain `piece` on `origin` can play
///
/// Returns an empty vector when the piece has no jump available.
pub fn capture_moves(board: &Board, origin: Square, piece: Piece) -> Vec<Move> {
    let mut search = CaptureSearch {
        board,
        origin,
        piece,
        captured: Vec::new(),
        moves: Vec::new(),
    };
    search.search(origin);
    search.moves
}
