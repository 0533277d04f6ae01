//! Rendering free game core: grid, snake, food, difficulty, high scores and
//! the run state machine tying them together.

pub mod body;
pub mod common;
pub mod difficulty;
pub mod food;
pub mod game;
pub mod high_score;

pub use body::Snake;
pub use common::{Direction, Grid, Position};
pub use difficulty::{Difficulty, DifficultySettings, Millis};
pub use food::{place_food, CellSampler, FoodError, ThreadRngSampler};
pub use game::{
    Control, GameState, InputAction, SnakeError, SnakeGame, SnakeGameSnapshot, TickOutcome,
};
pub use high_score::{
    FileHighScoreStore, HighScoreError, HighScoreStore, HighScoreTable, MemoryHighScoreStore,
};
