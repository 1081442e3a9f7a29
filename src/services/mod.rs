pub mod engine;
pub mod turn;

pub use engine::{AiEngine, ModelSlot};
pub use turn::{MoveRequest, MoveResponse, TurnOrchestrator};
