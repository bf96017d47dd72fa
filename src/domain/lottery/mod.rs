// Lottery value types
pub mod draw;
pub mod game_type;
pub mod number_set;

pub use draw::Draw;
pub use game_type::{GameRange, GameType, NUMBER_COUNT};
pub use number_set::NumberSet;
