use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{
    body::Snake,
    common::{Direction, Grid, Position},
    difficulty::{Difficulty, Millis},
    food::{place_food, CellSampler, FoodError},
    high_score::{HighScoreStore, HighScoreTable},
};

/// Proximity, in cells on both axes, that makes the snake hungry.
pub const DEFAULT_ALERT_THRESHOLD: i32 = 4;

pub const INITIAL_DIRECTION: Direction = Direction::Down;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeError {
    #[error("Snake is on the wall at {0:?}")]
    OnWall(Position),
    #[error("Snake is eating itself as {0:?}")]
    OnSnake(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    GameOver,
}

/// Discrete, edge triggered player intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ConfirmSelect,
    CycleDifficultyUp,
    CycleDifficultyDown,
    TogglePause,
    ToggleMute,
    ReturnToMenu,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeGameSnapshot {
    pub snake: Vec<Position>,
    pub food: Position,
    pub food_ate: bool,
    pub alert_triggered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing, paused, or the move delay has not elapsed yet.
    Waiting,
    Moved(SnakeGameSnapshot),
    Over(SnakeError),
}

pub struct SnakeGame {
    grid: Grid,
    state: GameState,
    difficulty: Difficulty,
    snake: Snake,
    // last direction actually moved, and the one requested for the next move
    heading: Direction,
    direction: Direction,
    food: Position,
    score: u32,
    move_delay: Millis,
    last_move: Millis,
    paused: bool,
    muted: bool,
    near_food: bool,
    // rising proximity edge raised outside of a tick, until taken
    pending_alert: bool,
    alert_threshold: i32,
    high_scores: HighScoreTable,
    store: Box<dyn HighScoreStore + Send + Sync>,
    sampler: Box<dyn CellSampler + Send + Sync>,
}

impl SnakeGame {
    pub fn new(
        grid: Grid,
        store: Box<dyn HighScoreStore + Send + Sync>,
        sampler: Box<dyn CellSampler + Send + Sync>,
    ) -> Self {
        let high_scores = match store.load() {
            Ok(table) => table,
            Err(e) => {
                warn!("Unable to load high scores, starting from zero: {}", e);
                HighScoreTable::default()
            }
        };

        let snake = Snake::reset(grid.center(), INITIAL_DIRECTION);
        let difficulty = Difficulty::Easy;

        Self {
            grid,
            state: GameState::Menu,
            difficulty,
            food: grid.center(),
            snake,
            heading: INITIAL_DIRECTION,
            direction: INITIAL_DIRECTION,
            score: 0,
            move_delay: difficulty.settings().initial_delay,
            last_move: 0,
            paused: false,
            muted: false,
            near_food: false,
            pending_alert: false,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            high_scores,
            store,
            sampler,
        }
    }

    pub fn with_alert_threshold(mut self, threshold: i32) -> Self {
        self.alert_threshold = threshold;
        self
    }

    /// Applies one input action. Only `Control::Quit` asks to stop the process.
    pub fn handle(&mut self, action: InputAction, now: Millis) -> Control {
        match action {
            InputAction::Quit => {
                info!("quit requested while {:?}", self.state);
                return Control::Quit;
            }
            InputAction::TogglePause => {
                self.paused = !self.paused;
                debug!("paused: {}", self.paused);
                return Control::Continue;
            }
            InputAction::ToggleMute => {
                self.muted = !self.muted;
                debug!("muted: {}", self.muted);
                return Control::Continue;
            }
            _ => {}
        }

        match self.state {
            GameState::Menu => match action {
                InputAction::CycleDifficultyUp => self.difficulty = self.difficulty.previous(),
                InputAction::CycleDifficultyDown => self.difficulty = self.difficulty.next(),
                InputAction::ConfirmSelect => self.start(now),
                _ => {}
            },
            GameState::Playing => {
                let requested = match action {
                    InputAction::MoveUp => Direction::Up,
                    InputAction::MoveDown => Direction::Down,
                    InputAction::MoveLeft => Direction::Left,
                    InputAction::MoveRight => Direction::Right,
                    _ => return Control::Continue,
                };
                self.change_direction(requested);
            }
            GameState::GameOver => {
                if action == InputAction::ReturnToMenu {
                    info!("back to menu");
                    self.state = GameState::Menu;
                }
            }
        }

        Control::Continue
    }

    /// Runs at most one simulation step, when the move delay has elapsed.
    pub fn play(&mut self, now: Millis) -> TickOutcome {
        if self.state != GameState::Playing || self.paused {
            return TickOutcome::Waiting;
        }
        if now.saturating_sub(self.last_move) < self.move_delay {
            return TickOutcome::Waiting;
        }

        self.snake.advance(self.direction);
        self.heading = self.direction;

        let head = self.snake.head();
        let collision = if self.snake.out_of_bounds(&self.grid) {
            Some(SnakeError::OnWall(head))
        } else if self.snake.self_collides() {
            Some(SnakeError::OnSnake(head))
        } else {
            None
        };

        let food_ate = self.grid.overlaps(&head, &self.food);
        if food_ate {
            self.eat();
        }

        self.last_move = now;

        if let Some(error) = collision {
            self.enter_game_over(error);
            return TickOutcome::Over(error);
        }

        let alert_triggered = self.refresh_proximity();

        TickOutcome::Moved(SnakeGameSnapshot {
            food_ate,
            alert_triggered,
            ..self.snapshot()
        })
    }

    pub fn snapshot(&self) -> SnakeGameSnapshot {
        SnakeGameSnapshot {
            snake: self.snake.segments().copied().collect(),
            food: self.food,
            food_ate: false,
            alert_triggered: false,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn selected_menu_index(&self) -> usize {
        self.difficulty.index()
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn move_delay(&self) -> Millis {
        self.move_delay
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn near_food(&self) -> bool {
        self.near_food
    }

    /// Returns, once, whether the food spawned within reach when the game started.
    pub fn take_alert(&mut self) -> bool {
        std::mem::take(&mut self.pending_alert)
    }

    pub fn high_score(&self) -> u32 {
        self.high_scores.get(self.difficulty)
    }

    fn start(&mut self, now: Millis) {
        info!("starting a {} game", self.difficulty);

        self.snake = Snake::reset(self.grid.center(), INITIAL_DIRECTION);
        self.heading = INITIAL_DIRECTION;
        self.direction = INITIAL_DIRECTION;
        self.food = self.new_food();
        self.move_delay = self.difficulty.settings().initial_delay;
        self.score = 0;
        self.last_move = now;
        self.paused = false;
        self.near_food = false;
        self.pending_alert = self.refresh_proximity();
        self.state = GameState::Playing;
    }

    fn change_direction(&mut self, requested: Direction) {
        if self.paused {
            debug!("ignoring {:?} while paused", requested);
            return;
        }
        // if the given direction is not allowed we ignore it
        if !self.heading.allows(&requested) {
            debug!("ignoring reversal {:?} -> {:?}", self.heading, requested);
            return;
        }
        self.direction = requested;
    }

    fn eat(&mut self) {
        self.score += 1;
        self.snake.grow();
        self.move_delay = self.difficulty.settings().speed_up(self.move_delay);
        self.food = self.new_food();

        debug!(
            "food eaten, score {} delay {}ms",
            self.score, self.move_delay
        );
    }

    fn new_food(&mut self) -> Position {
        match place_food(&self.snake, &self.grid, self.sampler.as_mut()) {
            Ok(position) => position,
            Err(e) => unplaceable_food(e),
        }
    }

    /// Updates `near_food`, returning true on a far to near transition.
    fn refresh_proximity(&mut self) -> bool {
        let near = self
            .snake
            .head()
            .is_near(&self.food, self.alert_threshold);
        let triggered = near && !self.near_food;
        self.near_food = near;
        triggered
    }

    fn enter_game_over(&mut self, error: SnakeError) {
        warn!("Game over: {}", error);

        self.state = GameState::GameOver;

        match self.store.update_if_better(self.difficulty, self.score) {
            Ok(table) => self.high_scores = table,
            Err(e) => {
                warn!("Unable to persist high score: {}", e);
                self.high_scores.record(self.difficulty, self.score);
            }
        }
    }
}

// The board is far larger than any reachable snake, so this is a logic error.
fn unplaceable_food(error: FoodError) -> ! {
    error!("{}", error);
    panic!("{}", error)
}
