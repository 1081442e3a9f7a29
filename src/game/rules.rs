//! Win detection over the contiguous-run rule.

use crate::game::board::{Board, Player};

/// Directions scanned from each occupied cell, as (col step, row step).
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Report whether either player owns `n_in_row` contiguous stones.
///
/// Scans every occupied cell as the start of a run in the four line
/// directions. Deliberately not restricted to the latest move: the
/// orchestrator re-checks after the AI's reply with the same full scan.
pub fn has_a_winner(board: &Board) -> (bool, Option<Player>) {
    let n = board.n_in_row();
    // Nobody can have a run before the first player placed n stones.
    if board.history().len() < 2 * n - 1 {
        return (false, None);
    }

    let width = board.width() as isize;
    let height = board.height() as isize;
    for &mv in board.history() {
        let player = match board.stone_at(mv) {
            Some(p) => p,
            None => continue,
        };
        let col = (mv % board.width()) as isize;
        let row = (mv / board.width()) as isize;

        for (dc, dr) in DIRECTIONS {
            let end_col = col + dc * (n as isize - 1);
            let end_row = row + dr * (n as isize - 1);
            if end_col < 0 || end_col >= width || end_row < 0 || end_row >= height {
                continue;
            }
            let run = (0..n as isize).all(|k| {
                let idx = ((row + dr * k) * width + col + dc * k) as usize;
                board.stone_at(idx) == Some(player)
            });
            if run {
                return (true, Some(player));
            }
        }
    }
    (false, None)
}

/// Terminal check: a winning run, or a full board with no winner (draw).
pub fn game_end(board: &Board) -> (bool, Option<Player>) {
    let (won, winner) = has_a_winner(board);
    if won {
        (true, winner)
    } else if board.is_full() {
        (true, None)
    } else {
        (false, None)
    }
}
