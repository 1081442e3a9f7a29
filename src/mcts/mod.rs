pub mod player;
pub mod tree;

pub use player::{MctsPlayer, SearchDelegate};
