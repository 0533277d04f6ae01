use std::collections::VecDeque;

use super::common::{Direction, Grid, Position};

pub const INITIAL_LENGTH: usize = 3;

/// Snake body, head first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    segments: VecDeque<Position>,
}

impl Snake {
    /// A three segment snake with its head on `center`, the body trailing
    /// behind it against `direction`.
    pub fn reset(center: Position, direction: Direction) -> Self {
        let behind = direction.opposite();

        let mut segments = VecDeque::with_capacity(INITIAL_LENGTH);
        let mut cursor = center;
        for _ in 0..INITIAL_LENGTH {
            segments.push_back(cursor);
            cursor = cursor.step(behind);
        }

        Self { segments }
    }

    /// Every segment takes the previous place of the one ahead of it, then
    /// the head moves one cell.
    pub fn advance(&mut self, direction: Direction) {
        let new_head = self.head().step(direction);
        self.segments.pop_back();
        self.segments.push_front(new_head);
    }

    /// Duplicates the tail, so the new piece is left behind on the next advance.
    pub fn grow(&mut self) {
        let tail = self.tail();
        self.segments.push_back(tail);
    }

    pub fn self_collides(&self) -> bool {
        let head = self.head();
        self.segments.iter().skip(1).any(|p| *p == head)
    }

    pub fn out_of_bounds(&self, grid: &Grid) -> bool {
        !grid.is_in_bounds(&self.head())
    }

    pub fn head(&self) -> Position {
        self.segments[0]
    }

    pub fn tail(&self) -> Position {
        self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.segments.contains(position)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.segments.iter()
    }

    /// Direction from segment `index` towards the segment ahead of it.
    ///
    /// `None` for the head, and for a freshly grown segment still sharing
    /// its predecessor's cell.
    pub fn segment_heading(&self, index: usize) -> Option<Direction> {
        if index == 0 || index >= self.segments.len() {
            return None;
        }
        Direction::between(&self.segments[index], &self.segments[index - 1])
    }
}

impl From<Vec<Position>> for Snake {
    fn from(segments: Vec<Position>) -> Self {
        assert!(!segments.is_empty(), "a snake needs at least its head");
        Self {
            segments: segments.into(),
        }
    }
}
