//! Turn orchestration: replay the client's history, consult the search
//! delegate, build the response.
//!
//! Per-request flow is stateless. RECEIVED -> REPLAYED ->
//! {TERMINAL_AFTER_HUMAN | AI_THINKING} -> {TERMINAL_AFTER_AI | RESPONDED};
//! nothing is retained once the response is built.

use serde::{Deserialize, Serialize};

use crate::game::{rules, Board, Player};
use crate::mcts::SearchDelegate;
use crate::Result;

/// Full game history including the human's latest move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub moves: Vec<usize>,
}

/// Legacy wire format: `move` is -1 when the game was already over,
/// `winner` is the player id (1 black, 2 white) or -1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub chosen: i64,
    pub game_over: bool,
    pub winner: i32,
}

fn winner_id(winner: Option<Player>) -> i32 {
    winner.map(Player::id).unwrap_or(-1)
}

pub struct TurnOrchestrator {
    width: usize,
    height: usize,
    n_in_row: usize,
    delegate: Box<dyn SearchDelegate>,
}

impl TurnOrchestrator {
    pub fn new(
        width: usize,
        height: usize,
        n_in_row: usize,
        delegate: Box<dyn SearchDelegate>,
    ) -> TurnOrchestrator {
        TurnOrchestrator {
            width,
            height,
            n_in_row,
            delegate,
        }
    }

    /// Replay the request, let the delegate answer if the game is still
    /// live, and report the outcome.
    ///
    /// The win check after the AI's move is the same full-board scan as the
    /// one after replay; it is deliberately not narrowed to the line through
    /// the new stone.
    pub fn play_turn(&self, request: &MoveRequest) -> Result<MoveResponse> {
        let mut board = Board::replay(self.width, self.height, self.n_in_row, &request.moves)?;

        let (ended, winner) = rules::game_end(&board);
        if ended {
            // Terminal after the human's move; the delegate is never asked.
            return Ok(MoveResponse {
                chosen: -1,
                game_over: true,
                winner: winner_id(winner),
            });
        }

        let ai_move = self.delegate.choose_move(&board)?;
        board.do_move(ai_move)?;
        let (ended, winner) = rules::game_end(&board);
        Ok(MoveResponse {
            chosen: ai_move as i64,
            game_over: ended,
            winner: winner_id(winner),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GomokuError;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Delegate that plays a fixed move and counts invocations.
    struct FixedDelegate {
        mv: usize,
        calls: Arc<AtomicUsize>,
    }

    impl SearchDelegate for FixedDelegate {
        fn choose_move(&self, _board: &Board) -> Result<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.mv)
        }
    }

    fn orchestrator_with(mv: usize) -> (TurnOrchestrator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let delegate = FixedDelegate {
            mv,
            calls: calls.clone(),
        };
        (TurnOrchestrator::new(8, 8, 5, Box::new(delegate)), calls)
    }

    #[test]
    fn live_game_gets_a_concrete_reply() {
        let (orchestrator, calls) = orchestrator_with(36);
        let response = orchestrator
            .play_turn(&MoveRequest { moves: vec![27] })
            .unwrap();
        assert_eq!(
            response,
            MoveResponse {
                chosen: 36,
                game_over: false,
                winner: -1
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn terminal_after_human_skips_the_delegate() {
        // Black completes 8..12 on row 1 with the last submitted move.
        let moves = vec![8, 24, 9, 25, 10, 26, 11, 27, 12];
        let (orchestrator, calls) = orchestrator_with(0);
        let response = orchestrator.play_turn(&MoveRequest { moves }).unwrap();
        assert_eq!(
            response,
            MoveResponse {
                chosen: -1,
                game_over: true,
                winner: 1
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ai_completing_a_run_reports_the_win() {
        // White owns 5, 13, 21, 29; the delegate answers 37.
        let moves = vec![0, 5, 1, 13, 2, 21, 3, 29, 10];
        let (orchestrator, _) = orchestrator_with(37);
        let response = orchestrator.play_turn(&MoveRequest { moves }).unwrap();
        assert_eq!(
            response,
            MoveResponse {
                chosen: 37,
                game_over: true,
                winner: 2
            }
        );
    }

    #[test]
    fn replaying_an_occupied_cell_is_rejected_without_consulting_the_ai() {
        let (orchestrator, calls) = orchestrator_with(0);
        let err = orchestrator
            .play_turn(&MoveRequest {
                moves: vec![27, 12, 27],
            })
            .unwrap_err();
        assert_matches!(err, GomokuError::InvalidMove(27));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drawn_board_is_terminal_with_no_winner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let delegate = FixedDelegate {
            mv: 0,
            calls: calls.clone(),
        };
        let orchestrator = TurnOrchestrator::new(4, 4, 4, Box::new(delegate));
        let moves = vec![0, 1, 2, 3, 4, 5, 6, 7, 9, 8, 11, 10, 13, 12, 15, 14];
        let response = orchestrator.play_turn(&MoveRequest { moves }).unwrap();
        assert_eq!(
            response,
            MoveResponse {
                chosen: -1,
                game_over: true,
                winner: -1
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn wire_format_uses_the_legacy_field_names() {
        let response = MoveResponse {
            chosen: 42,
            game_over: false,
            winner: -1,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"move": 42, "game_over": false, "winner": -1})
        );
    }
}
