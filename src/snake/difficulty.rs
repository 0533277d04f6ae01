use std::{fmt, str::FromStr};

use thiserror::Error;

/// Tick delays are expressed in milliseconds.
pub type Millis = u64;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown difficulty {0:?}")]
pub struct UnknownDifficulty(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Menu order, from the slowest tier to the fastest.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn settings(&self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings::new(220, 5, 120),
            Difficulty::Medium => DifficultySettings::new(180, 10, 80),
            Difficulty::Hard => DifficultySettings::new(140, 15, 50),
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|d| d == self)
            .unwrap_or_default()
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Self {
        Self::from_index(self.index() + Self::ALL.len() - 1)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultySettings {
    pub initial_delay: Millis,
    pub speedup_step: Millis,
    pub min_delay: Millis,
}

impl DifficultySettings {
    pub const fn new(initial_delay: Millis, speedup_step: Millis, min_delay: Millis) -> Self {
        Self {
            initial_delay,
            speedup_step,
            min_delay,
        }
    }

    /// Delay after one more food is eaten, never below `min_delay`.
    pub fn speed_up(&self, current_delay: Millis) -> Millis {
        current_delay
            .saturating_sub(self.speedup_step)
            .max(self.min_delay)
    }
}
