use thiserror::Error;
use tracing::debug;

use super::body::Snake;
use super::common::{Grid, Position};

/// Upper bound on rejection sampling before giving up on a board.
pub const MAX_FOOD_ATTEMPTS: usize = 100_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FoodError {
    #[error("No free cell left for food: the snake covers all {0} cells")]
    BoardFull(usize),
    #[error("Unable to find a free cell for food after {0} attempts")]
    Exhausted(usize),
}

/// Source of uniformly distributed cells on a grid.
pub trait CellSampler {
    fn sample(&mut self, grid: &Grid) -> Position;
}

impl CellSampler for fastrand::Rng {
    fn sample(&mut self, grid: &Grid) -> Position {
        let x = self.i32(0..grid.columns());
        let y = self.i32(0..grid.rows());
        Position::new(x, y)
    }
}

/// Samples from fastrand's thread local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSampler;

impl CellSampler for ThreadRngSampler {
    fn sample(&mut self, grid: &Grid) -> Position {
        let x = fastrand::i32(0..grid.columns());
        let y = fastrand::i32(0..grid.rows());
        Position::new(x, y)
    }
}

pub fn place_food(
    snake: &Snake,
    grid: &Grid,
    sampler: &mut dyn CellSampler,
) -> Result<Position, FoodError> {
    if snake.len() >= grid.area() {
        return Err(FoodError::BoardFull(grid.area()));
    }

    for _ in 0..MAX_FOOD_ATTEMPTS {
        let position = sampler.sample(grid);

        debug!("position generated {:?}", position);

        if !grid.is_in_bounds(&position) {
            continue;
        }

        if snake.segments().any(|s| grid.overlaps(s, &position)) {
            continue;
        }

        return Ok(position);
    }

    Err(FoodError::Exhausted(MAX_FOOD_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{place_food, CellSampler, FoodError};
    use crate::snake::{
        body::Snake,
        common::{Grid, Position},
    };

    struct Repeating(Position);

    impl CellSampler for Repeating {
        fn sample(&mut self, _grid: &Grid) -> Position {
            self.0
        }
    }

    #[test]
    fn test_food_never_lands_on_snake() {
        // 5x4 board, the snake covers all cells but two
        let grid = Grid::new(125, 100, 25).unwrap();
        let free = [Position::new(4, 3), Position::new(0, 3)];
        let segments: Vec<_> = (0..grid.rows())
            .flat_map(|y| (0..grid.columns()).map(move |x| Position::new(x, y)))
            .filter(|p| !free.contains(p))
            .collect();
        let snake = Snake::from(segments);
        let occupied: HashSet<_> = snake.segments().copied().collect();

        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let food = place_food(&snake, &grid, &mut rng).unwrap();
            assert!(!occupied.contains(&food));
            assert!(free.contains(&food));
        }
    }

    #[test]
    fn test_full_board_is_reported() {
        let grid = Grid::new(50, 25, 25).unwrap();
        let snake = Snake::from(vec![Position::new(0, 0), Position::new(1, 0)]);
        let mut rng = fastrand::Rng::with_seed(1);

        assert_eq!(
            place_food(&snake, &grid, &mut rng),
            Err(FoodError::BoardFull(2))
        );
    }

    #[test]
    fn test_sampling_is_bounded() {
        let grid = Grid::new(100, 100, 25).unwrap();
        let snake = Snake::from(vec![Position::new(1, 1)]);
        let mut sampler = Repeating(Position::new(1, 1));

        assert!(matches!(
            place_food(&snake, &grid, &mut sampler),
            Err(FoodError::Exhausted(_))
        ));
    }
}
