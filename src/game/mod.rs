pub mod board;
pub mod rules;

pub use board::{Board, Player};
pub use rules::game_end;
