//! The process-wide AI engine and the slot it is published through.

use std::sync::{Arc, Mutex, OnceLock};

use crate::mcts::{MctsPlayer, SearchDelegate};
use crate::neural::{bridge, ParameterBundle, PolicyValueNet};
use crate::services::turn::TurnOrchestrator;
use crate::{GomokuError, Result};

/// Bridged network plus the search that consumes it. Built once at startup
/// and read-only afterwards; the Mutex exists because tch tensors are not
/// Sync, not because anything mutates the weights.
#[derive(Debug)]
pub struct AiEngine {
    net: Mutex<PolicyValueNet>,
    player: MctsPlayer,
}

impl AiEngine {
    /// Load the legacy bundle from `model_file`, bridge it and wire up the
    /// search. Every failure mode (missing file, corrupt content, schema
    /// mismatch) leaves the caller free to keep serving without an AI.
    pub fn load(
        model_file: &str,
        width: usize,
        height: usize,
        c_puct: f64,
        n_playout: usize,
    ) -> Result<AiEngine> {
        let bundle = ParameterBundle::load(model_file)?;
        let bridged = bridge(&bundle, width as i64, height as i64)?;
        let net = PolicyValueNet::from_bridged(width, height, &bridged)?;
        log::info!(
            "bridged {} parameter arrays from {model_file} for a {width}x{height} board",
            bundle.len()
        );
        Ok(AiEngine {
            net: Mutex::new(net),
            player: MctsPlayer::new(c_puct, n_playout),
        })
    }

    /// Build an engine around an already-bridged network (tests, arenas).
    pub fn from_parts(net: PolicyValueNet, player: MctsPlayer) -> AiEngine {
        AiEngine {
            net: Mutex::new(net),
            player,
        }
    }
}

impl SearchDelegate for AiEngine {
    fn choose_move(&self, board: &crate::game::Board) -> Result<usize> {
        let net = self
            .net
            .lock()
            .map_err(|_| GomokuError::Search("evaluator lock poisoned".into()))?;
        self.player.get_action(board, &*net)
    }
}

/// Write-once slot for the turn orchestrator.
///
/// Requests observe either the fully built handle or the distinct not-ready
/// state, never a partially constructed one; `OnceLock` makes the publish
/// atomic without putting a lock on the read path.
#[derive(Default)]
pub struct ModelSlot {
    slot: OnceLock<Arc<TurnOrchestrator>>,
}

impl ModelSlot {
    pub fn new() -> ModelSlot {
        ModelSlot::default()
    }

    /// Publish the handle. Returns false if something was published before.
    pub fn publish(&self, orchestrator: Arc<TurnOrchestrator>) -> bool {
        self.slot.set(orchestrator).is_ok()
    }

    pub fn get(&self) -> Option<Arc<TurnOrchestrator>> {
        self.slot.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::turn::TurnOrchestrator;

    struct NullDelegate;

    impl SearchDelegate for NullDelegate {
        fn choose_move(&self, _board: &crate::game::Board) -> Result<usize> {
            Err(GomokuError::Search("unused".into()))
        }
    }

    #[test]
    fn slot_starts_empty_and_publishes_once() {
        let slot = ModelSlot::new();
        assert!(!slot.is_ready());
        assert!(slot.get().is_none());

        let orchestrator = Arc::new(TurnOrchestrator::new(8, 8, 5, Box::new(NullDelegate)));
        assert!(slot.publish(orchestrator.clone()));
        assert!(slot.is_ready());
        assert!(!slot.publish(orchestrator));
    }
}
