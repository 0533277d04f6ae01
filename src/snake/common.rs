use crate::configuration::ConfigurationError;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// True when both axes are within `threshold` cells of `other`.
    pub fn is_near(&self, other: &Position, threshold: i32) -> bool {
        (self.x - other.x).abs() <= threshold && (self.y - other.y).abs() <= threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Right,
    Down,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn allows(&self, direction: &Self) -> bool {
        self.opposite() != *direction
    }

    /// Grid offset of one step. Rows grow downwards.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Direction of the single step leading from `from` to `to`, if they are adjacent.
    pub fn between(from: &Position, to: &Position) -> Option<Self> {
        match (to.x - from.x, to.y - from.y) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

/// The playing field: `columns x rows` cells of `unit` pixels each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    unit: u32,
    width: u32,
    height: u32,
}

impl Grid {
    pub fn new(width: u32, height: u32, unit: u32) -> Result<Self, ConfigurationError> {
        if unit == 0 || width == 0 || height == 0 || width % unit != 0 || height % unit != 0 {
            return Err(ConfigurationError::Misaligned {
                width,
                height,
                unit,
            });
        }

        Ok(Self {
            unit,
            width,
            height,
        })
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    pub fn dimension(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn columns(&self) -> i32 {
        (self.width / self.unit) as i32
    }

    pub fn rows(&self) -> i32 {
        (self.height / self.unit) as i32
    }

    pub fn area(&self) -> usize {
        (self.columns() * self.rows()) as usize
    }

    /// The cell whose top-left corner sits at the pixel center of the board.
    pub fn center(&self) -> Position {
        self.from_pixels(self.width as i32 / 2, self.height as i32 / 2)
    }

    pub fn is_in_bounds(&self, position: &Position) -> bool {
        (0..self.columns()).contains(&position.x) && (0..self.rows()).contains(&position.y)
    }

    // Cells are grid aligned, so two of them overlap only when they coincide.
    pub fn overlaps(&self, a: &Position, b: &Position) -> bool {
        a == b
    }

    pub fn to_pixels(&self, position: &Position) -> (i32, i32) {
        let unit = self.unit as i32;
        (position.x * unit, position.y * unit)
    }

    pub fn from_pixels(&self, x: i32, y: i32) -> Position {
        let unit = self.unit as i32;
        Position::new(x.div_euclid(unit), y.div_euclid(unit))
    }
}
