//! Monte Carlo Tree Search move selection guided by a policy-value
//! evaluator.

use rand::RngExt;

use crate::game::{rules, Board};
use crate::mcts::tree::{SearchTree, ROOT};
use crate::neural::Evaluator;
use crate::{GomokuError, Result};

/// Anything able to pick exactly one legal move for a replayed board. The
/// turn orchestrator depends on this boundary only, never on how the move
/// was found or which network backs it.
pub trait SearchDelegate: Send + Sync {
    fn choose_move(&self, board: &Board) -> Result<usize>;
}

/// PUCT-style tree search. Each `get_action` call builds a fresh tree and
/// runs a fixed playout budget; no state survives between calls.
#[derive(Debug)]
pub struct MctsPlayer {
    c_puct: f64,
    n_playout: usize,
}

impl MctsPlayer {
    pub fn new(c_puct: f64, n_playout: usize) -> MctsPlayer {
        MctsPlayer { c_puct, n_playout }
    }

    /// Run the playout budget and return the most-visited root move, ties
    /// broken uniformly at random.
    pub fn get_action(&self, board: &Board, evaluator: &dyn Evaluator) -> Result<usize> {
        if board.availables().is_empty() {
            return Err(GomokuError::Search("no available moves".into()));
        }

        let mut tree = SearchTree::new();
        for _ in 0..self.n_playout {
            self.playout(&mut tree, board.clone(), evaluator)?;
        }

        let root = tree.node(ROOT);
        let top_visits = root
            .children
            .values()
            .map(|&child| tree.node(child).visits)
            .max()
            .ok_or_else(|| GomokuError::Search("search produced no candidate moves".into()))?;
        let best: Vec<usize> = root
            .children
            .iter()
            .filter(|(_, &child)| tree.node(child).visits == top_visits)
            .map(|(&mv, _)| mv)
            .collect();
        Ok(best[rand::rng().random_range(0..best.len())])
    }

    /// One playout: descend by PUCT to a leaf, evaluate or score the
    /// terminal position, back the value up.
    fn playout(
        &self,
        tree: &mut SearchTree,
        mut board: Board,
        evaluator: &dyn Evaluator,
    ) -> Result<()> {
        let mut idx = ROOT;
        while !tree.is_leaf(idx) {
            let (mv, child) = tree.select(idx, self.c_puct);
            board.do_move(mv)?;
            idx = child;
        }

        let (ended, winner) = rules::game_end(&board);
        let leaf_value = if ended {
            match winner {
                None => 0.0,
                Some(w) if w == board.current_player() => 1.0,
                Some(_) => -1.0,
            }
        } else {
            let (priors, value) = evaluator.evaluate(&board)?;
            tree.expand(idx, &priors);
            value
        };

        // The leaf value is from the perspective of the player to move at
        // the leaf; the node was reached by that player's opponent.
        tree.update_recursive(idx, -leaf_value);
        Ok(())
    }
}
