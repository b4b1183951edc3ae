//! Game state queries and bot move selection
//!
//! Functions for detecting the end of a game and picking a move for a bot.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::move_gen::{has_any_move, legal_moves};
use crate::types::{Move, Side};

/// Why a board position is decisive
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    /// The loser has no pieces left
    NoPieces,
    /// The loser has pieces but no legal move
    Blocked,
}

/// Result of inspecting a board for the side about to move
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Terminal {
    Pending,
    Decisive { winner: Side, reason: WinReason },
}

/// Decide whether the game is over with `side_to_move` on turn
///
/// A side without pieces loses. Otherwise, if `side_to_move` has pieces but
/// no legal move, it loses. Draws never arise here; they are agreed by the
/// players through the match session.
pub fn terminal(board: &Board, side_to_move: Side) -> Terminal {
    for side in [Side::Red, Side::White] {
        if board.count(side) == 0 {
            return Terminal::Decisive {
                winner: side.opponent(),
                reason: WinReason::NoPieces,
            };
        }
    }

    if !has_any_move(board, side_to_move) {
        return Terminal::Decisive {
            winner: side_to_move.opponent(),
            reason: WinReason::Blocked,
        };
    }

    Terminal::Pending
}

/// Pick a legal move uniformly at random
///
/// Returns `None` when `side` has no legal move.
pub fn random_move<R: Rng + ?Sized>(board: &Board, side: Side, rng: &mut R) -> Option<Move> {
    legal_moves(board, side).choose(rng).cloned()
}
