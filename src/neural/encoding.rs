//! Board-to-tensor encoding for the policy-value network.
//!
//! Four stacked width×height planes: the current player's stones, the
//! opponent's stones, an indicator of the last move, and an indicator of
//! whose turn it is (all ones when the first player is to move). Rows are
//! reversed to match the orientation the legacy network was trained with.

use tch::Tensor;

use crate::game::Board;

pub const INPUT_PLANES: usize = 4;

pub fn board_to_tensor(board: &Board) -> Tensor {
    let width = board.width();
    let height = board.height();
    let cells = width * height;
    let mut planes = vec![0.0f32; INPUT_PLANES * cells];

    let flipped = |mv: usize| {
        let row = mv / width;
        let col = mv % width;
        (height - 1 - row) * width + col
    };

    let current = board.current_player();
    for mv in 0..cells {
        match board.stone_at(mv) {
            Some(player) if player == current => planes[flipped(mv)] = 1.0,
            Some(_) => planes[cells + flipped(mv)] = 1.0,
            None => {}
        }
    }
    if let Some(last) = board.last_move() {
        planes[2 * cells + flipped(last)] = 1.0;
    }
    if board.history().len() % 2 == 0 {
        planes[3 * cells..4 * cells].fill(1.0);
    }

    Tensor::from_slice(&planes).view([1, INPUT_PLANES as i64, height as i64, width as i64])
}
