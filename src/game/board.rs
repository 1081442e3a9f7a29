//! Board state and stateless replay.
//!
//! Every request rebuilds the board from scratch out of the client-supplied
//! move history, so nothing here survives across requests. Cells are indexed
//! `row * width + col`, row 0 at the top.

use crate::{GomokuError, Result};

/// The two sides. Black moves first and carries the legacy wire id 1,
/// White (the AI in the deployed setup) carries id 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// Numeric id used on the wire by the legacy frontend.
    pub fn id(self) -> i32 {
        match self {
            Player::Black => 1,
            Player::White => 2,
        }
    }

    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    n_in_row: usize,
    cells: Vec<Option<Player>>,
    availables: Vec<usize>,
    history: Vec<usize>,
    current_player: Player,
}

impl Board {
    /// Canonical empty board, Black to move.
    pub fn new(width: usize, height: usize, n_in_row: usize) -> Board {
        Board {
            width,
            height,
            n_in_row,
            cells: vec![None; width * height],
            availables: (0..width * height).collect(),
            history: Vec::new(),
            current_player: Player::Black,
        }
    }

    /// Rebuild a board by applying `moves` strictly in order onto an empty
    /// board. The first unavailable move aborts with
    /// [`GomokuError::InvalidMove`] naming that move.
    pub fn replay(width: usize, height: usize, n_in_row: usize, moves: &[usize]) -> Result<Board> {
        let mut board = Board::new(width, height, n_in_row);
        for &mv in moves {
            board.do_move(mv)?;
        }
        Ok(board)
    }

    /// Place the current player's stone on `mv` and pass the turn.
    pub fn do_move(&mut self, mv: usize) -> Result<()> {
        let slot = self
            .availables
            .iter()
            .position(|&m| m == mv)
            .ok_or(GomokuError::InvalidMove(mv))?;
        self.availables.swap_remove(slot);
        self.cells[mv] = Some(self.current_player);
        self.history.push(mv);
        self.current_player = self.current_player.opponent();
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn n_in_row(&self) -> usize {
        self.n_in_row
    }

    /// Cells not yet occupied by either player.
    pub fn availables(&self) -> &[usize] {
        &self.availables
    }

    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn last_move(&self) -> Option<usize> {
        self.history.last().copied()
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn stone_at(&self, mv: usize) -> Option<Player> {
        self.cells.get(mv).copied().flatten()
    }

    pub fn is_full(&self) -> bool {
        self.availables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_replay_yields_full_availables_and_black_to_move() {
        let board = Board::replay(8, 8, 5, &[]).unwrap();
        assert_eq!(board.availables().len(), 64);
        assert_eq!(board.current_player(), Player::Black);
        assert!(board.history().is_empty());
        assert_eq!(board.last_move(), None);
    }

    #[test]
    fn replay_places_alternating_stones() {
        let moves = [27, 28, 35, 36, 43];
        let board = Board::replay(8, 8, 5, &moves).unwrap();
        assert_eq!(board.history(), &moves);
        assert_eq!(board.availables().len(), 64 - moves.len());
        // Odd number of stones placed, so White is to move.
        assert_eq!(board.current_player(), Player::White);
        assert_eq!(board.stone_at(27), Some(Player::Black));
        assert_eq!(board.stone_at(28), Some(Player::White));
        assert_eq!(board.stone_at(43), Some(Player::Black));
        assert_eq!(board.stone_at(44), None);
    }

    #[test]
    fn parity_of_history_determines_side_to_move() {
        let board = Board::replay(8, 8, 5, &[0, 1, 2, 3]).unwrap();
        assert_eq!(board.current_player(), Player::Black);
    }

    #[test]
    fn resubmitted_move_is_rejected_with_the_offending_index() {
        let err = Board::replay(8, 8, 5, &[27, 12, 27]).unwrap_err();
        assert_matches!(err, GomokuError::InvalidMove(27));
    }

    #[test]
    fn out_of_range_move_is_rejected() {
        let err = Board::replay(8, 8, 5, &[64]).unwrap_err();
        assert_matches!(err, GomokuError::InvalidMove(64));
    }

    #[test]
    fn availables_and_occupied_partition_the_board() {
        let board = Board::replay(8, 8, 5, &[0, 63, 9]).unwrap();
        for mv in 0..64 {
            let available = board.availables().contains(&mv);
            let occupied = board.stone_at(mv).is_some();
            assert!(available != occupied, "cell {mv} must be in exactly one set");
        }
    }
}
