pub mod game_state;
pub mod letters;
pub mod word_validation;

// Re-export main components
pub use game_state::*;
pub use letters::*;
pub use word_validation::*;
